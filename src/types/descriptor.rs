//! Type descriptors: numeric, opaque placeholder, or composite

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, ViewError};
use crate::layout::StructType;
use crate::memory::Region;
use crate::view::View;

use super::numeric::{Number, NumericKind, Value};

/// Reference-typed field kinds that are declared but never implemented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpaqueKind {
    Any,
    Object,
    String,
}

impl OpaqueKind {
    pub const fn name(self) -> &'static str {
        match self {
            OpaqueKind::Any => "any",
            OpaqueKind::Object => "object",
            OpaqueKind::String => "string",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "any" => Some(OpaqueKind::Any),
            "object" => Some(OpaqueKind::Object),
            "string" => Some(OpaqueKind::String),
            _ => None,
        }
    }
}

/// Immutable metadata for one type
#[derive(Clone)]
pub enum TypeDescriptor {
    /// A primitive number; size and alignment equal its width
    Numeric(NumericKind),
    /// Placeholder for an unsupported reference type; size 4, alignment 1
    Opaque(OpaqueKind),
    /// A laid-out composite record
    Struct(Arc<StructType>),
}

pub const INT8: TypeDescriptor = TypeDescriptor::Numeric(NumericKind::Int8);
pub const UINT8: TypeDescriptor = TypeDescriptor::Numeric(NumericKind::Uint8);
pub const INT16: TypeDescriptor = TypeDescriptor::Numeric(NumericKind::Int16);
pub const UINT16: TypeDescriptor = TypeDescriptor::Numeric(NumericKind::Uint16);
pub const INT32: TypeDescriptor = TypeDescriptor::Numeric(NumericKind::Int32);
pub const UINT32: TypeDescriptor = TypeDescriptor::Numeric(NumericKind::Uint32);
pub const FLOAT32: TypeDescriptor = TypeDescriptor::Numeric(NumericKind::Float32);
pub const FLOAT64: TypeDescriptor = TypeDescriptor::Numeric(NumericKind::Float64);
pub const ANY: TypeDescriptor = TypeDescriptor::Opaque(OpaqueKind::Any);
pub const OBJECT: TypeDescriptor = TypeDescriptor::Opaque(OpaqueKind::Object);
pub const STRING: TypeDescriptor = TypeDescriptor::Opaque(OpaqueKind::String);

impl TypeDescriptor {
    /// Resolve a primitive or opaque type by name
    pub fn from_name(name: &str) -> Option<Self> {
        NumericKind::from_name(name)
            .map(TypeDescriptor::Numeric)
            .or_else(|| OpaqueKind::from_name(name).map(TypeDescriptor::Opaque))
    }

    /// Byte size
    pub fn size(&self) -> usize {
        match self {
            TypeDescriptor::Numeric(kind) => kind.size(),
            TypeDescriptor::Opaque(_) => 4,
            TypeDescriptor::Struct(ty) => ty.size(),
        }
    }

    /// Required alignment in bytes
    pub fn align(&self) -> usize {
        match self {
            TypeDescriptor::Numeric(kind) => kind.align(),
            TypeDescriptor::Opaque(_) => 1,
            TypeDescriptor::Struct(ty) => ty.align(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TypeDescriptor::Numeric(kind) => kind.name(),
            TypeDescriptor::Opaque(kind) => kind.name(),
            TypeDescriptor::Struct(ty) => ty.name(),
        }
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, TypeDescriptor::Struct(_))
    }

    pub fn as_struct(&self) -> Option<&Arc<StructType>> {
        match self {
            TypeDescriptor::Struct(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_numeric(&self) -> Option<NumericKind> {
        match self {
            TypeDescriptor::Numeric(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Use the descriptor as a converter, e.g. `INT8.coerce(-257) == Int8(-1)`
    pub fn coerce(&self, value: impl Into<Number>) -> Result<Value> {
        match self {
            TypeDescriptor::Numeric(kind) => Ok(kind.coerce(value)),
            TypeDescriptor::Opaque(kind) => {
                Err(ViewError::unsupported(format!("Invalid type: {}", kind.name())))
            }
            TypeDescriptor::Struct(_) => Err(ViewError::unsupported(
                "conversion of a number to a struct",
            )),
        }
    }

    /// Map a view of this type onto `region` at `offset`
    pub fn view<'a>(&'a self, region: &'a Region, offset: usize) -> Result<View<'a>> {
        match self {
            TypeDescriptor::Numeric(_) => Err(ViewError::unsupported("view of a primitive type")),
            TypeDescriptor::Opaque(_) => Err(ViewError::unsupported("view of an invalid type")),
            TypeDescriptor::Struct(ty) => ty.view(region, offset),
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Numeric(kind) => write!(f, "Numeric({})", kind),
            TypeDescriptor::Opaque(kind) => write!(f, "Opaque({})", kind.name()),
            TypeDescriptor::Struct(ty) => write!(
                f,
                "Struct({}, size={}, align={})",
                ty.name(),
                ty.size(),
                ty.align()
            ),
        }
    }
}

impl From<NumericKind> for TypeDescriptor {
    fn from(kind: NumericKind) -> Self {
        TypeDescriptor::Numeric(kind)
    }
}

impl From<Arc<StructType>> for TypeDescriptor {
    fn from(ty: Arc<StructType>) -> Self {
        TypeDescriptor::Struct(ty)
    }
}
