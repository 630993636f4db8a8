//! Regions: contiguous blocks of bytes that views alias

use std::{
    cell::{OnceCell, UnsafeCell},
    ffi::CString,
    fmt,
    fs::{File, OpenOptions},
    os::fd::OwnedFd,
    os::unix::fs::OpenOptionsExt,
    ptr::NonNull,
    time::SystemTime,
};

use log::debug;
use memmap2::{MmapMut, MmapOptions};
use nix::{
    sys::memfd::{memfd_create, MemFdCreateFlag},
    unistd::ftruncate,
};
use serde::{Deserialize, Serialize};

use crate::config::HEAP_REGION_ALIGN;
use crate::error::{Result, ViewError};

use super::config::{BackingType, RegionConfig};
use super::windows::WindowCache;

// Heap storage is a slice of u64 cells, which fixes the base alignment.
const _: () = assert!(std::mem::align_of::<u64>() == HEAP_REGION_ALIGN);

/// Descriptive metadata for a region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionMetadata {
    pub name: String,
    pub size: usize,
    pub backing_type: BackingType,
    pub created_at: SystemTime,
}

enum Storage {
    Heap {
        _cells: Box<[UnsafeCell<u64>]>,
    },
    Mapped {
        mmap: MmapMut,
        _file: Option<File>,
        _owned_fd: Option<OwnedFd>,
    },
}

/// A contiguous block of bytes, plus the window cache shared by its views.
///
/// Views borrow the region, so the region (and the cache it owns) always
/// outlives them. The region is `Send` but not `Sync`: aliasing views write
/// through shared references, so cross-thread use needs external locking.
pub struct Region {
    metadata: RegionMetadata,
    storage: Storage,
    base: NonNull<u8>,
    windows: OnceCell<WindowCache>,
}

impl Region {
    /// Create or open a region
    pub fn new(config: RegionConfig) -> Result<Self> {
        config.validate()?;

        let (storage, base) = match config.backing_type {
            BackingType::Heap => Self::create_heap(config.size),
            BackingType::FileBacked => Self::create_file_backing(&config)?,
            #[cfg(target_os = "linux")]
            BackingType::MemFd => Self::create_memfd_backing(&config)?,
        };

        debug!(
            "created {} region '{}' ({} bytes)",
            config.backing_type.name(),
            config.name,
            config.size
        );

        Ok(Self {
            metadata: RegionMetadata {
                name: config.name,
                size: config.size,
                backing_type: config.backing_type,
                created_at: SystemTime::now(),
            },
            storage,
            base,
            windows: OnceCell::new(),
        })
    }

    /// Zero-filled heap region of `len` bytes
    pub fn heap(len: usize) -> Result<Self> {
        Self::new(RegionConfig::new(crate::config::DEFAULT_HEAP_REGION_NAME, len))
    }

    /// Heap region holding a copy of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let region = Self::heap(bytes.len())?;
        region.write_bytes(0, bytes);
        Ok(region)
    }

    fn create_heap(size: usize) -> (Storage, NonNull<u8>) {
        let words = size.div_ceil(HEAP_REGION_ALIGN);
        let cells: Box<[UnsafeCell<u64>]> = (0..words).map(|_| UnsafeCell::new(0)).collect();
        let base = NonNull::new(UnsafeCell::raw_get(cells.as_ptr()).cast::<u8>())
            .unwrap_or_else(NonNull::dangling);
        (Storage::Heap { _cells: cells }, base)
    }

    fn create_file_backing(config: &RegionConfig) -> Result<(Storage, NonNull<u8>)> {
        let path = config.default_file_path();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(config.create)
            .truncate(false)
            .mode(config.permissions)
            .open(&path)
            .map_err(|e| ViewError::from_io(e, "Failed to open backing file"))?;

        let current = file
            .metadata()
            .map_err(|e| ViewError::from_io(e, "Failed to stat backing file"))?
            .len();
        if current < config.size as u64 {
            file.set_len(config.size as u64)
                .map_err(|e| ViewError::from_io(e, "Failed to set file size"))?;
        }

        // SAFETY: the file stays open for the mapping's lifetime.
        let mut mmap = unsafe {
            MmapOptions::new()
                .len(config.size)
                .map_mut(&file)
                .map_err(|e| ViewError::from_io(e, "Failed to create memory mapping"))?
        };
        let base = Self::mapping_base(&mut mmap)?;

        Ok((
            Storage::Mapped {
                mmap,
                _file: Some(file),
                _owned_fd: None,
            },
            base,
        ))
    }

    #[cfg(target_os = "linux")]
    fn create_memfd_backing(config: &RegionConfig) -> Result<(Storage, NonNull<u8>)> {
        let name_cstr = CString::new(config.name.clone())
            .map_err(|_| ViewError::invalid_parameter("name", "Name contains null bytes"))?;

        let owned_fd = memfd_create(name_cstr.as_c_str(), MemFdCreateFlag::MFD_CLOEXEC)
            .map_err(|e| ViewError::platform(format!("Failed to create memfd: {}", e)))?;

        ftruncate(&owned_fd, config.size as i64)
            .map_err(|e| ViewError::platform(format!("Failed to set memfd size: {}", e)))?;

        // SAFETY: the descriptor is owned by the region alongside the mapping.
        let mut mmap = unsafe {
            MmapOptions::new()
                .len(config.size)
                .map_mut(&owned_fd)
                .map_err(|e| ViewError::from_io(e, "Failed to create memory mapping"))?
        };
        let base = Self::mapping_base(&mut mmap)?;

        Ok((
            Storage::Mapped {
                mmap,
                _file: None,
                _owned_fd: Some(owned_fd),
            },
            base,
        ))
    }

    fn mapping_base(mmap: &mut MmapMut) -> Result<NonNull<u8>> {
        NonNull::new(mmap.as_mut_ptr())
            .ok_or_else(|| ViewError::platform("Memory mapping returned a null address"))
    }

    /// The window cache for this region, materialized on first use
    pub fn windows(&self) -> &WindowCache {
        self.windows.get_or_init(|| {
            debug!(
                "materializing window cache for region '{}' ({} bytes)",
                self.metadata.name, self.metadata.size
            );
            // SAFETY: `base` is 8-aligned (u64 cells or a page-aligned mapping)
            // and valid for `size` bytes until `self` is dropped, which cannot
            // happen while the returned borrow is alive.
            unsafe { WindowCache::new(self.base, self.metadata.size) }
        })
    }

    /// Whether the window cache has been materialized yet
    pub fn has_windows(&self) -> bool {
        self.windows.get().is_some()
    }

    /// Get the region metadata
    pub fn metadata(&self) -> &RegionMetadata {
        &self.metadata
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.metadata.size
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.size == 0
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn backing_type(&self) -> BackingType {
        self.metadata.backing_type
    }

    /// Copy bytes starting at `offset` into `buf`, clamped to the region end.
    /// Returns the number of bytes copied.
    pub fn read_bytes(&self, offset: usize, buf: &mut [u8]) -> usize {
        let count = self.len().saturating_sub(offset).min(buf.len());
        if count > 0 {
            // SAFETY: `offset + count <= len`; `buf` is a distinct allocation.
            unsafe {
                std::ptr::copy_nonoverlapping(
                    self.base.as_ptr().add(offset),
                    buf.as_mut_ptr(),
                    count,
                )
            };
        }
        count
    }

    /// Copy `data` into the region at `offset`, clamped to the region end.
    /// Returns the number of bytes written.
    pub fn write_bytes(&self, offset: usize, data: &[u8]) -> usize {
        let count = self.len().saturating_sub(offset).min(data.len());
        if count > 0 {
            // SAFETY: as in `read_bytes`.
            unsafe {
                std::ptr::copy_nonoverlapping(data.as_ptr(), self.base.as_ptr().add(offset), count)
            };
        }
        count
    }

    /// Copy the whole region out
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.len()];
        self.read_bytes(0, &mut out);
        out
    }

    /// Flush changes to persistent storage (mapped regions only)
    pub fn flush(&self) -> Result<()> {
        match &self.storage {
            Storage::Heap { .. } => Ok(()),
            Storage::Mapped { mmap, .. } => mmap
                .flush()
                .map_err(|e| ViewError::from_io(e, "Failed to flush memory mapping")),
        }
    }

    /// True when `self` and `other` are the same region
    pub fn same_region(&self, other: &Region) -> bool {
        std::ptr::eq(self, other)
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("name", &self.metadata.name)
            .field("size", &self.metadata.size)
            .field("backing_type", &self.metadata.backing_type)
            .field("windows", &self.has_windows())
            .finish()
    }
}

// SAFETY: the region exclusively owns its storage; moving it to another
// thread moves every borrow-free handle with it.
unsafe impl Send for Region {}
