//! Layout engine: offsets, size and alignment for a field declaration
//!
//! Fields are placed in declaration order, each at the running offset rounded
//! up to the field's own alignment. The struct's alignment is the largest
//! field alignment (nested structs contribute their own computed alignment),
//! and the size is the final offset rounded up to that alignment. This is the
//! same rule C applies to `#[repr(C)]` records, so a layout computed here can
//! be mirrored by any other implementation that shares the region.

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;

use crate::error::{Result, ViewError};
use crate::types::TypeDescriptor;

use super::config::StructOptions;
use super::struct_type::StructType;

/// Computed placement of a field declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Offset of each field, in declaration order
    pub offsets: Vec<usize>,
    pub size: usize,
    pub align: usize,
}

/// Round `offset` up to a multiple of `align` (a power of two)
#[inline]
pub const fn align_up(offset: usize, align: usize) -> usize {
    (offset + (align - 1)) & !(align - 1)
}

/// Lay out `fields` without building a type
pub fn compute_layout(fields: &[(String, TypeDescriptor)]) -> Result<Layout> {
    let mut seen = HashSet::with_capacity(fields.len());
    let mut offsets = Vec::with_capacity(fields.len());
    let mut offset = 0usize;
    let mut align = 1usize;

    for (name, ty) in fields {
        if !seen.insert(name.as_str()) {
            return Err(ViewError::duplicate_field(name));
        }
        if let TypeDescriptor::Opaque(kind) = ty {
            return Err(ViewError::opaque_field(name, kind.name()));
        }

        let field_align = ty.align();
        offset = align_up(offset, field_align);
        offsets.push(offset);
        offset += ty.size();
        align = align.max(field_align);
    }

    debug_assert!(align <= crate::config::MAX_PRIMITIVE_ALIGN);
    Ok(Layout {
        offsets,
        size: align_up(offset, align),
        align,
    })
}

/// Declare a transparent struct type from an ordered field list.
///
/// Fails if any field is opaque, a name repeats, or the options ask for
/// anything other than a plain transparent struct.
pub fn define_struct<I, N>(fields: I, options: StructOptions) -> Result<TypeDescriptor>
where
    I: IntoIterator<Item = (N, TypeDescriptor)>,
    N: Into<String>,
{
    options.validate()?;

    let declared: Vec<(String, TypeDescriptor)> = fields
        .into_iter()
        .map(|(name, ty)| (name.into(), ty))
        .collect();
    let layout = compute_layout(&declared)?;
    let name = options.name.unwrap_or_else(|| "struct".to_string());

    debug!(
        "laid out struct '{}': {} fields, size {}, align {}",
        name,
        declared.len(),
        layout.size,
        layout.align
    );

    let ty = StructType::build(name, declared, layout)?;
    Ok(TypeDescriptor::Struct(Arc::new(ty)))
}
