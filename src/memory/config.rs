//! Configuration types for backing regions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a region's bytes live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackingType {
    /// Zero-initialized process heap memory
    #[default]
    Heap,
    /// File mapped read/write
    FileBacked,
    /// Anonymous memfd mapping (Linux only)
    #[cfg(target_os = "linux")]
    MemFd,
}

impl BackingType {
    /// Whether this platform can create the backing
    pub fn is_supported(&self) -> bool {
        match self {
            BackingType::Heap | BackingType::FileBacked => true,
            #[cfg(target_os = "linux")]
            BackingType::MemFd => true,
        }
    }

    /// Short name used in logs and CLI output
    pub fn name(&self) -> &'static str {
        match self {
            BackingType::Heap => "heap",
            BackingType::FileBacked => "file-backed",
            #[cfg(target_os = "linux")]
            BackingType::MemFd => "memfd",
        }
    }

    /// Whether the bytes come from a memory mapping
    pub fn is_mapped(&self) -> bool {
        !matches!(self, BackingType::Heap)
    }
}

/// Configuration for creating regions
#[derive(Debug, Clone)]
pub struct RegionConfig {
    /// Name of the region
    pub name: String,
    /// Bytes addressable through views
    pub size: usize,
    /// Backing storage
    pub backing_type: BackingType,
    /// Backing file; defaults to `/tmp/typeview_{name}`
    pub file_path: Option<PathBuf>,
    /// Whether to create the backing file if it doesn't exist
    pub create: bool,
    /// Permissions for a created file (Unix permissions)
    pub permissions: u32,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            size: 0,
            backing_type: BackingType::default(),
            file_path: None,
            create: true,
            permissions: 0o644,
        }
    }
}

impl RegionConfig {
    /// Heap-backed configuration of `size` bytes
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
            ..Default::default()
        }
    }

    /// Builder: backing storage
    pub fn with_backing_type(mut self, backing_type: BackingType) -> Self {
        self.backing_type = backing_type;
        self
    }

    /// Builder: explicit backing file
    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Set whether to create the backing file if it doesn't exist
    pub fn with_create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    /// Set the permissions for a created file
    pub fn with_permissions(mut self, permissions: u32) -> Self {
        self.permissions = permissions;
        self
    }

    /// Reject configurations `Region::new` cannot satisfy
    pub fn validate(&self) -> crate::Result<()> {
        use crate::error::ViewError;

        if self.name.is_empty() {
            return Err(ViewError::invalid_parameter(
                "name",
                "a region needs a non-empty name",
            ));
        }

        if self.size == 0 {
            return Err(ViewError::invalid_parameter(
                "size",
                "a region must span at least one byte",
            ));
        }

        if !self.backing_type.is_supported() {
            return Err(ViewError::invalid_parameter(
                "backing_type",
                format!(
                    "{} regions are unavailable on this platform",
                    self.backing_type.name()
                ),
            ));
        }

        if self.backing_type == BackingType::FileBacked && !self.create && self.file_path.is_none()
        {
            return Err(ViewError::invalid_parameter(
                "file_path",
                "opening an existing file-backed region requires an explicit path",
            ));
        }

        Ok(())
    }

    /// Get the file path used for a file-backed region
    pub fn default_file_path(&self) -> PathBuf {
        self.file_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("/tmp/typeview_{}", self.name)))
    }
}
