//! Constant-time queries about where a view lives

use crate::memory::Region;

use super::View;

/// The region a view aliases
pub fn buffer_of<'a>(view: &View<'a>) -> &'a Region {
    view.region()
}

/// Absolute byte offset of the view within its region
pub fn byte_offset_of(view: &View<'_>) -> usize {
    view.byte_offset()
}

/// Size in bytes of the view's type
pub fn byte_length_of(view: &View<'_>) -> usize {
    view.byte_length()
}
