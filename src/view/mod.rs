//! Views: typed, non-owning aliases of a struct's bytes inside a region
//!
//! A [`View`] is a `(type, window cache, byte offset)` triple. It holds no
//! resources of its own; any number of views may alias the same or
//! overlapping bytes, and two views over the same region, offset and type
//! are field-equivalent but carry no identity.

pub mod introspect;

use std::fmt;

use crate::assign::{Update, UpdateValue};
use crate::error::{Result, ViewError};
use crate::layout::{Field, FieldAccess, StructType};
use crate::memory::{Region, WindowCache};
use crate::types::{Number, Value};

pub use introspect::{buffer_of, byte_length_of, byte_offset_of};

/// The result of reading a field: a number, or a view of a nested struct
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Scalar(Value),
    Struct(View<'a>),
}

impl<'a> FieldValue<'a> {
    pub fn as_scalar(&self) -> Option<Value> {
        match self {
            FieldValue::Scalar(value) => Some(*value),
            FieldValue::Struct(_) => None,
        }
    }

    pub fn as_struct(&self) -> Option<View<'a>> {
        match self {
            FieldValue::Struct(view) => Some(*view),
            FieldValue::Scalar(_) => None,
        }
    }
}

/// A struct type mapped onto a region at a byte offset
#[derive(Clone, Copy)]
pub struct View<'a> {
    ty: &'a StructType,
    region: &'a Region,
    mem: &'a WindowCache,
    offset: usize,
}

impl<'a> View<'a> {
    pub(crate) fn new(
        ty: &'a StructType,
        region: &'a Region,
        mem: &'a WindowCache,
        offset: usize,
    ) -> Self {
        Self {
            ty,
            region,
            mem,
            offset,
        }
    }

    /// The viewed struct type
    pub fn ty(&self) -> &'a StructType {
        self.ty
    }

    /// The aliased region
    pub fn region(&self) -> &'a Region {
        self.region
    }

    /// The region's shared window cache
    pub fn windows(&self) -> &'a WindowCache {
        self.mem
    }

    /// Absolute byte offset within the region
    pub fn byte_offset(&self) -> usize {
        self.offset
    }

    /// Size of the viewed type
    pub fn byte_length(&self) -> usize {
        self.ty.size()
    }

    /// Read a numeric field
    pub fn get(&self, name: &str) -> Result<Value> {
        let field = self.ty.lookup(name)?;
        match field.access() {
            FieldAccess::Scalar(acc) => Ok(acc.read(self.mem, self.offset + field.offset())),
            FieldAccess::Struct(inner) => Err(ViewError::type_mismatch(name, "number", inner.name())),
        }
    }

    /// Write a numeric field, applying its kind's truncation rule
    pub fn set(&self, name: &str, value: impl Into<Number>) -> Result<()> {
        let field = self.ty.lookup(name)?;
        match field.access() {
            FieldAccess::Scalar(acc) => {
                acc.write(self.mem, self.offset + field.offset(), value.into());
                Ok(())
            }
            FieldAccess::Struct(inner) => Err(ViewError::type_mismatch(name, inner.name(), "number")),
        }
    }

    /// View of a nested struct field, sharing this view's region
    pub fn field(&self, name: &str) -> Result<View<'a>> {
        let field = self.ty.lookup(name)?;
        self.child(field)
            .ok_or_else(|| ViewError::type_mismatch(name, "struct", field.ty().name()))
    }

    /// Read any field
    pub fn get_field(&self, name: &str) -> Result<FieldValue<'a>> {
        let field = self.ty.lookup(name)?;
        Ok(self.read(field))
    }

    /// Structurally assign `source` into a nested struct field
    pub fn assign_field(&self, name: &str, source: &Update) -> Result<()> {
        let field = self.ty.lookup(name)?;
        match field.access() {
            FieldAccess::Struct(inner) => {
                inner
                    .assign_plan()
                    .apply(self.mem, self.offset + field.offset(), source)?;
                Ok(())
            }
            FieldAccess::Scalar(acc) => Err(ViewError::type_mismatch(name, acc.kind.name(), "record")),
        }
    }

    /// Write any field: numbers go to numeric fields, records are assigned
    /// structurally into struct fields
    pub fn set_value(&self, name: &str, value: impl Into<UpdateValue>) -> Result<()> {
        match value.into() {
            UpdateValue::Scalar(number) => self.set(name, number),
            UpdateValue::Record(update) => self.assign_field(name, &update),
        }
    }

    /// Structurally assign `source` into the whole struct.
    ///
    /// Only fields present in `source` are written. Returns the number of
    /// numeric fields written.
    pub fn assign(&self, source: &Update) -> Result<usize> {
        self.ty.assign_plan().apply(self.mem, self.offset, source)
    }

    /// Copy the fields of `other` that this type shares by name
    pub fn copy_from(&self, other: &View<'_>) -> Result<usize> {
        self.assign(&Update::from_view(other))
    }

    /// Every field in declaration order
    pub fn entries(&self) -> impl Iterator<Item = (&'a str, FieldValue<'a>)> + 'a {
        let this = *self;
        this.ty
            .fields()
            .iter()
            .map(move |field| (field.name(), this.read(field)))
    }

    fn read(&self, field: &'a Field) -> FieldValue<'a> {
        match field.access() {
            FieldAccess::Scalar(acc) => {
                FieldValue::Scalar(acc.read(self.mem, self.offset + field.offset()))
            }
            FieldAccess::Struct(inner) => FieldValue::Struct(View::new(
                inner,
                self.region,
                self.mem,
                self.offset + field.offset(),
            )),
        }
    }

    fn child(&self, field: &'a Field) -> Option<View<'a>> {
        match field.access() {
            FieldAccess::Struct(inner) => Some(View::new(
                inner,
                self.region,
                self.mem,
                self.offset + field.offset(),
            )),
            FieldAccess::Scalar(_) => None,
        }
    }
}

impl fmt::Debug for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.ty.name());
        for (name, value) in self.entries() {
            match value {
                FieldValue::Scalar(v) => out.field(name, &v),
                FieldValue::Struct(child) => out.field(name, &child),
            };
        }
        out.finish()
    }
}
