//! Laid-out struct types and their fields

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::assign::AssignPlan;
use crate::error::{Result, ViewError};
use crate::memory::Region;
use crate::types::TypeDescriptor;
use crate::view::View;

use super::accessors::ScalarAccessor;
use super::engine::Layout;

/// How a field is read and written, resolved once at layout time
#[derive(Clone)]
pub enum FieldAccess {
    /// Numeric field: direct window access through the accessor table
    Scalar(&'static ScalarAccessor),
    /// Nested struct: reads produce a child view, writes assign structurally
    Struct(Arc<StructType>),
}

impl fmt::Debug for FieldAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldAccess::Scalar(acc) => write!(f, "Scalar({})", acc.kind),
            FieldAccess::Struct(ty) => write!(f, "Struct({})", ty.name()),
        }
    }
}

/// A named field at a fixed byte offset
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    ty: TypeDescriptor,
    offset: usize,
    access: FieldAccess,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// Byte offset from the start of the enclosing struct
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn access(&self) -> &FieldAccess {
        &self.access
    }
}

/// An immutable, laid-out composite type
pub struct StructType {
    name: String,
    fields: Vec<Field>,
    by_name: HashMap<String, usize>,
    size: usize,
    align: usize,
    plan: AssignPlan,
}

impl StructType {
    /// Bind accessors and the assignment plan to a computed layout
    pub(crate) fn build(
        name: String,
        declared: Vec<(String, TypeDescriptor)>,
        layout: Layout,
    ) -> Result<Self> {
        let mut fields = Vec::with_capacity(declared.len());
        for ((field_name, ty), offset) in declared.into_iter().zip(layout.offsets) {
            let access = match &ty {
                TypeDescriptor::Numeric(kind) => FieldAccess::Scalar(ScalarAccessor::for_kind(*kind)),
                TypeDescriptor::Struct(inner) => FieldAccess::Struct(Arc::clone(inner)),
                TypeDescriptor::Opaque(kind) => {
                    return Err(ViewError::opaque_field(field_name, kind.name()))
                }
            };
            fields.push(Field {
                name: field_name,
                ty,
                offset,
                access,
            });
        }

        let by_name = fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name.clone(), i))
            .collect();
        let plan = AssignPlan::compile(&fields)?;

        Ok(Self {
            name,
            fields,
            by_name,
            size: layout.size,
            align: layout.align,
            plan,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes, a multiple of `align()`
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn align(&self) -> usize {
        self.align
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    pub(crate) fn lookup(&self, name: &str) -> Result<&Field> {
        self.field(name)
            .ok_or_else(|| ViewError::field_not_found(name))
    }

    /// Flattened structural-assignment routine for this type
    pub fn assign_plan(&self) -> &AssignPlan {
        &self.plan
    }

    /// Map a view of this type onto `region` at byte `offset`.
    ///
    /// `offset` must be a multiple of the type's alignment, and the view's
    /// end must be addressable. The region's length is not checked.
    pub fn view<'a>(&'a self, region: &'a Region, offset: usize) -> Result<View<'a>> {
        if offset & (self.align - 1) != 0 || offset.checked_add(self.size).is_none() {
            return Err(ViewError::invalid_offset(offset, self.align));
        }
        Ok(View::new(self, region, region.windows(), offset))
    }

    /// Fixed-length arrays of this struct
    pub fn array(&self, _len: usize) -> Result<TypeDescriptor> {
        Err(ViewError::unsupported("struct arrays"))
    }

    /// A self-allocated instance not backed by a region
    pub fn instantiate(&self) -> Result<View<'static>> {
        Err(ViewError::unsupported(
            "instantiation other than onto a pre-existing region",
        ))
    }
}

impl fmt::Debug for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructType")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("align", &self.align)
            .field("fields", &self.fields)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{define_struct, StructOptions};
    use crate::types::{FLOAT32, INT32, UINT8};

    fn point() -> TypeDescriptor {
        define_struct(
            [("x", INT32), ("y", INT32)],
            StructOptions::transparent().with_name("Point"),
        )
        .unwrap()
    }

    #[test]
    fn test_point_layout() {
        let ty = point();
        let point = ty.as_struct().unwrap();
        assert_eq!(point.name(), "Point");
        assert_eq!(point.size(), 8);
        assert_eq!(point.align(), 4);
        assert_eq!(point.field("y").unwrap().offset(), 4);
        assert!(point.field("z").is_none());
    }

    #[test]
    fn test_field_access_resolution() {
        let ty = define_struct(
            [("flag", UINT8), ("pos", point()), ("w", FLOAT32)],
            StructOptions::transparent(),
        )
        .unwrap();
        let st = ty.as_struct().unwrap();
        assert!(matches!(st.field("flag").unwrap().access(), FieldAccess::Scalar(_)));
        assert!(matches!(st.field("pos").unwrap().access(), FieldAccess::Struct(_)));
        assert_eq!(st.field("pos").unwrap().offset(), 4);
        assert_eq!(st.field("w").unwrap().offset(), 12);
        assert_eq!(st.size(), 16);
    }

    #[test]
    fn test_view_offset_must_be_aligned() {
        let ty = point();
        let region = Region::heap(64).unwrap();
        let err = ty.view(&region, 6).unwrap_err();
        assert!(matches!(err, ViewError::InvalidOffset { offset: 6, alignment: 4 }));
        assert!(!region.has_windows());
        assert!(ty.view(&region, 8).is_ok());
        assert!(region.has_windows());
    }

    #[test]
    fn test_view_end_must_not_overflow() {
        let ty = point();
        let region = Region::heap(16).unwrap();
        let last = usize::MAX & !3;
        assert!(matches!(
            ty.view(&region, last),
            Err(ViewError::InvalidOffset { alignment: 4, .. })
        ));
        assert!(ty.view(&region, usize::MAX - 11).is_ok());
    }

    #[test]
    fn test_unsupported_surfaces() {
        let ty = point();
        let st = ty.as_struct().unwrap();
        assert!(st.array(4).unwrap_err().is_unsupported());
        assert!(st.instantiate().unwrap_err().is_unsupported());
    }
}
