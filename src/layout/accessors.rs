//! Static accessor table, one getter/setter pair per numeric kind
//!
//! Fields resolve their entry once at layout time and dispatch through plain
//! function pointers afterwards. A getter reads window index
//! `byte_offset >> log2(width)`; a setter coerces then writes the same index.

use crate::memory::WindowCache;
use crate::types::{
    coerce_float32, coerce_float64, coerce_int16, coerce_int32, coerce_int8, coerce_uint16,
    coerce_uint32, coerce_uint8, Number, NumericKind, Value,
};

/// Getter/setter pair for one numeric kind
#[derive(Debug)]
pub struct ScalarAccessor {
    pub kind: NumericKind,
    pub get: fn(&WindowCache, usize) -> Value,
    pub set: fn(&WindowCache, usize, Number),
}

impl ScalarAccessor {
    /// The entry for `kind`
    pub fn for_kind(kind: NumericKind) -> &'static ScalarAccessor {
        &ACCESSORS[kind.index()]
    }

    #[inline]
    pub fn read(&self, mem: &WindowCache, byte_offset: usize) -> Value {
        (self.get)(mem, byte_offset)
    }

    #[inline]
    pub fn write(&self, mem: &WindowCache, byte_offset: usize, value: Number) {
        (self.set)(mem, byte_offset, value)
    }
}

macro_rules! scalar_accessor {
    ($get:ident, $set:ident, $window:ident, $variant:ident, $coerce:ident) => {
        fn $get(mem: &WindowCache, byte_offset: usize) -> Value {
            let window = mem.$window();
            // Past the end reads as zero rather than trapping.
            Value::$variant(window.get(byte_offset >> window.shift()).unwrap_or_default())
        }

        fn $set(mem: &WindowCache, byte_offset: usize, value: Number) {
            let window = mem.$window();
            window.set(byte_offset >> window.shift(), $coerce(value));
        }
    };
}

scalar_accessor!(get_int8, set_int8, int8, Int8, coerce_int8);
scalar_accessor!(get_uint8, set_uint8, uint8, Uint8, coerce_uint8);
scalar_accessor!(get_int16, set_int16, int16, Int16, coerce_int16);
scalar_accessor!(get_uint16, set_uint16, uint16, Uint16, coerce_uint16);
scalar_accessor!(get_int32, set_int32, int32, Int32, coerce_int32);
scalar_accessor!(get_uint32, set_uint32, uint32, Uint32, coerce_uint32);
scalar_accessor!(get_float32, set_float32, float32, Float32, coerce_float32);
scalar_accessor!(get_float64, set_float64, float64, Float64, coerce_float64);

/// Indexed by `NumericKind::index()`
static ACCESSORS: [ScalarAccessor; 8] = [
    ScalarAccessor { kind: NumericKind::Int8, get: get_int8, set: set_int8 },
    ScalarAccessor { kind: NumericKind::Uint8, get: get_uint8, set: set_uint8 },
    ScalarAccessor { kind: NumericKind::Int16, get: get_int16, set: set_int16 },
    ScalarAccessor { kind: NumericKind::Uint16, get: get_uint16, set: set_uint16 },
    ScalarAccessor { kind: NumericKind::Int32, get: get_int32, set: set_int32 },
    ScalarAccessor { kind: NumericKind::Uint32, get: get_uint32, set: set_uint32 },
    ScalarAccessor { kind: NumericKind::Float32, get: get_float32, set: set_float32 },
    ScalarAccessor { kind: NumericKind::Float64, get: get_float64, set: set_float64 },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Region;

    #[test]
    fn test_table_order_matches_kinds() {
        for kind in NumericKind::ALL {
            assert_eq!(ScalarAccessor::for_kind(kind).kind, kind);
        }
    }

    #[test]
    fn test_accessor_indexes_by_width() {
        let region = Region::heap(32).unwrap();
        let mem = region.windows();
        let acc = ScalarAccessor::for_kind(NumericKind::Uint16);
        acc.write(mem, 6, Number::Int(70_000));
        assert_eq!(mem.uint16().get(3), Some(70_000u32 as u16));
        assert_eq!(acc.read(mem, 6), Value::Uint16(4464));

        let acc = ScalarAccessor::for_kind(NumericKind::Float32);
        acc.write(mem, 8, Number::Float(0.1));
        assert_eq!(acc.read(mem, 8), Value::Float32(0.1));
    }

    #[test]
    fn test_accessor_past_end_reads_zero() {
        let region = Region::heap(8).unwrap();
        let mem = region.windows();
        let acc = ScalarAccessor::for_kind(NumericKind::Int32);
        acc.write(mem, 8, Number::Int(5));
        assert_eq!(acc.read(mem, 8), Value::Int32(0));
        assert_eq!(mem.int32().to_vec(), vec![0, 0]);
    }
}
