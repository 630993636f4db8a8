//! # typeview - Structural Layouts and Typed Views over Raw Memory
//!
//! typeview declares composite record types from an ordered list of named
//! fields, computes a byte-exact C-style layout for them, and maps
//! lightweight *views* of those types onto regions of raw memory. Every
//! field of a view reads and writes the region's bytes in place.
//!
//! ## Features
//!
//! - **Deterministic layout**: per-field offsets, size and alignment that any
//!   other implementation sharing the region can reproduce
//! - **Zero-copy views**: scalar field access goes straight to the region
//!   through a per-region cache of typed windows
//! - **Nested structs**: nested fields produce child views over the same bytes
//! - **Structural assignment**: sparse, name-keyed copies into a view,
//!   recursing through nested structs
//! - **Backing regions**: heap, file-backed and memfd (Linux) memory
//! - **Layout schemas**: serializable descriptions for cross-process agreement
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────┐      ┌─────────────────────────────┐
//! │ define_struct(fields, opts)   │      │ Region (heap / file / memfd)│
//! │  - layout engine (offsets)    │      │  └─ WindowCache (lazy)      │
//! │  - accessor table binding     │      │      int8 … float64 windows │
//! │  - assignment plan compile    │      └──────────────┬──────────────┘
//! └───────────────┬───────────────┘                     │
//!                 │ TypeDescriptor::view(&region, off)  │
//!                 ▼                                     ▼
//!        ┌─────────────────────────────────────────────────────┐
//!        │ View { type, window cache, byte offset }            │
//!        │  get / set / field / assign / entries               │
//!        └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use typeview::{define_struct, Region, StructOptions, Update, Value, INT32};
//!
//! let point = define_struct([("x", INT32), ("y", INT32)], StructOptions::transparent())?;
//! let region = Region::heap(128)?;
//! region.windows().int32().set(8, 37);
//!
//! let pt = point.view(&region, 32)?;
//! assert_eq!(pt.get("x")?, Value::Int32(37));
//! pt.assign(&Update::new().set("y", 88))?;
//! assert_eq!(region.windows().int32().get(9), Some(88));
//! # Ok::<(), typeview::ViewError>(())
//! ```

pub mod assign;
pub mod error;
pub mod layout;
pub mod memory;
pub mod schema;
pub mod types;
pub mod view;

// Main API re-exports
pub use assign::{AssignPlan, Update, UpdateValue};
pub use error::{Result, ViewError};
pub use layout::{compute_layout, define_struct, Field, FieldAccess, Layout, StructOptions, StructType};
pub use memory::{BackingType, Region, RegionConfig, RegionMetadata, Window, WindowCache};
pub use schema::{FieldKind, FieldSchema, LayoutSchema};
pub use types::{
    coerce_float32, coerce_float64, coerce_int16, coerce_int32, coerce_int8, coerce_uint16,
    coerce_uint32, coerce_uint8, Number, NumericKind, OpaqueKind, TypeDescriptor, Value, ANY,
    FLOAT32, FLOAT64, INT16, INT32, INT8, OBJECT, STRING, UINT16, UINT32, UINT8,
};
pub use view::{buffer_of, byte_length_of, byte_offset_of, FieldValue, View};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration constants
pub mod config {
    /// Widest primitive alignment; heap regions are aligned at least this much
    pub const MAX_PRIMITIVE_ALIGN: usize = 8;

    /// Alignment of every heap region's base address
    pub const HEAP_REGION_ALIGN: usize = 8;

    /// Region name used by `Region::heap`
    pub const DEFAULT_HEAP_REGION_NAME: &str = "heap";
}
