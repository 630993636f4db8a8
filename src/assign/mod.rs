//! Structural (field-by-field) assignment into aliased memory

pub mod plan;
pub mod update;

pub use plan::{AssignPlan, AssignStep};
pub use update::{Update, UpdateValue};
