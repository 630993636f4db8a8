//! Struct declaration: layout computation and accessor binding

pub mod accessors;
pub mod config;
pub mod engine;
pub mod struct_type;

pub use accessors::ScalarAccessor;
pub use config::StructOptions;
pub use engine::{align_up, compute_layout, define_struct, Layout};
pub use struct_type::{Field, FieldAccess, StructType};
