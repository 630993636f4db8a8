//! Backing regions and their typed window caches

pub mod config;
pub mod regions;
pub mod windows;

pub use config::{BackingType, RegionConfig};
pub use regions::{Region, RegionMetadata};
pub use windows::{Element, Window, WindowCache};
