//! Type descriptors and numeric coercion

pub mod descriptor;
pub mod numeric;

pub use descriptor::{
    OpaqueKind, TypeDescriptor, ANY, FLOAT32, FLOAT64, INT16, INT32, INT8, OBJECT, STRING,
    UINT16, UINT32, UINT8,
};
pub use numeric::{
    coerce_float32, coerce_float64, coerce_int16, coerce_int32, coerce_int8, coerce_uint16,
    coerce_uint32, coerce_uint8, Number, NumericKind, Value,
};
