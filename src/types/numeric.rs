//! Primitive numeric kinds and their canonical coercion rules

use std::fmt;

use serde::{Deserialize, Serialize};

/// The eight primitive numeric kinds a field can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericKind {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl NumericKind {
    /// All kinds, in window-slot order
    pub const ALL: [NumericKind; 8] = [
        NumericKind::Int8,
        NumericKind::Uint8,
        NumericKind::Int16,
        NumericKind::Uint16,
        NumericKind::Int32,
        NumericKind::Uint32,
        NumericKind::Float32,
        NumericKind::Float64,
    ];

    /// Width in bytes
    pub const fn size(self) -> usize {
        match self {
            NumericKind::Int8 | NumericKind::Uint8 => 1,
            NumericKind::Int16 | NumericKind::Uint16 => 2,
            NumericKind::Int32 | NumericKind::Uint32 | NumericKind::Float32 => 4,
            NumericKind::Float64 => 8,
        }
    }

    /// Numeric fields are aligned to their own width
    pub const fn align(self) -> usize {
        self.size()
    }

    /// log2 of the width, turning a byte offset into a window index
    pub const fn shift(self) -> u32 {
        self.size().trailing_zeros()
    }

    /// Slot of this kind in a window cache
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Type name as used in declarations
    pub const fn name(self) -> &'static str {
        match self {
            NumericKind::Int8 => "int8",
            NumericKind::Uint8 => "uint8",
            NumericKind::Int16 => "int16",
            NumericKind::Uint16 => "uint16",
            NumericKind::Int32 => "int32",
            NumericKind::Uint32 => "uint32",
            NumericKind::Float32 => "float32",
            NumericKind::Float64 => "float64",
        }
    }

    /// Look a kind up by its declaration name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    pub const fn is_float(self) -> bool {
        matches!(self, NumericKind::Float32 | NumericKind::Float64)
    }

    /// Apply this kind's truncation/rounding rule to an arbitrary number
    pub fn coerce(self, value: impl Into<Number>) -> Value {
        let value = value.into();
        match self {
            NumericKind::Int8 => Value::Int8(value.to_int32() as i8),
            NumericKind::Uint8 => Value::Uint8(value.to_int32() as u8),
            NumericKind::Int16 => Value::Int16(value.to_int32() as i16),
            NumericKind::Uint16 => Value::Uint16(value.to_int32() as u16),
            NumericKind::Int32 => Value::Int32(value.to_int32()),
            NumericKind::Uint32 => Value::Uint32(value.to_int32() as u32),
            NumericKind::Float32 => Value::Float32(value.to_f64() as f32),
            NumericKind::Float64 => Value::Float64(value.to_f64()),
        }
    }

    /// Zero value of this kind
    pub fn zero(self) -> Value {
        self.coerce(0)
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An arbitrary numeric input, before coercion to a field's kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Two's-complement reduction modulo 2^32.
    ///
    /// Floats truncate toward zero first; NaN and the infinities become 0.
    pub fn to_int32(self) -> i32 {
        match self {
            Number::Int(v) => v as i32,
            Number::Float(v) => {
                if !v.is_finite() {
                    return 0;
                }
                let wrapped = v.trunc().rem_euclid(4_294_967_296.0);
                wrapped as u32 as i32
            }
        }
    }

    pub fn to_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

macro_rules! number_from {
    ($variant:ident, $cast:ty, $($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(v: $t) -> Self {
                    Number::$variant(v as $cast)
                }
            }
        )*
    };
}

number_from!(Int, i64, i8, u8, i16, u16, i32, u32, i64, isize);
number_from!(Float, f64, f32, f64);

impl From<u64> for Number {
    fn from(v: u64) -> Self {
        // Keeps the low 64 bits; every integer kind is narrower than that.
        Number::Int(v as i64)
    }
}

impl From<usize> for Number {
    fn from(v: usize) -> Self {
        Number::Int(v as i64)
    }
}

impl From<Value> for Number {
    fn from(v: Value) -> Self {
        match v {
            Value::Float32(f) => Number::Float(f as f64),
            Value::Float64(f) => Number::Float(f),
            other => Number::Int(other.as_i64()),
        }
    }
}

/// A value read from a numeric field, tagged with its kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Float32(f32),
    Float64(f64),
}

impl Value {
    pub fn kind(&self) -> NumericKind {
        match self {
            Value::Int8(_) => NumericKind::Int8,
            Value::Uint8(_) => NumericKind::Uint8,
            Value::Int16(_) => NumericKind::Int16,
            Value::Uint16(_) => NumericKind::Uint16,
            Value::Int32(_) => NumericKind::Int32,
            Value::Uint32(_) => NumericKind::Uint32,
            Value::Float32(_) => NumericKind::Float32,
            Value::Float64(_) => NumericKind::Float64,
        }
    }

    /// Widen to f64; exact for every kind
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Int8(v) => v as f64,
            Value::Uint8(v) => v as f64,
            Value::Int16(v) => v as f64,
            Value::Uint16(v) => v as f64,
            Value::Int32(v) => v as f64,
            Value::Uint32(v) => v as f64,
            Value::Float32(v) => v as f64,
            Value::Float64(v) => v,
        }
    }

    /// Widen to i64; floats truncate toward zero
    pub fn as_i64(&self) -> i64 {
        match *self {
            Value::Int8(v) => v as i64,
            Value::Uint8(v) => v as i64,
            Value::Int16(v) => v as i64,
            Value::Uint16(v) => v as i64,
            Value::Int32(v) => v as i64,
            Value::Uint32(v) => v as i64,
            Value::Float32(v) => v as i64,
            Value::Float64(v) => v as i64,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            other => write!(f, "{}", other.as_i64()),
        }
    }
}

/// int8 wraparound, e.g. `coerce_int8(-257) == -1`
pub fn coerce_int8(value: impl Into<Number>) -> i8 {
    value.into().to_int32() as i8
}

pub fn coerce_uint8(value: impl Into<Number>) -> u8 {
    value.into().to_int32() as u8
}

pub fn coerce_int16(value: impl Into<Number>) -> i16 {
    value.into().to_int32() as i16
}

pub fn coerce_uint16(value: impl Into<Number>) -> u16 {
    value.into().to_int32() as u16
}

pub fn coerce_int32(value: impl Into<Number>) -> i32 {
    value.into().to_int32()
}

pub fn coerce_uint32(value: impl Into<Number>) -> u32 {
    value.into().to_int32() as u32
}

/// Round to the nearest representable single-precision value
pub fn coerce_float32(value: impl Into<Number>) -> f32 {
    value.into().to_f64() as f32
}

pub fn coerce_float64(value: impl Into<Number>) -> f64 {
    value.into().to_f64()
}
