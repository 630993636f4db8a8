//! Typed reinterpretation windows over a region's bytes
//!
//! A [`WindowCache`] holds one [`Window`] per numeric kind, each spanning the
//! whole region. Every view over a region shares the region's single cache,
//! so a write through any window is immediately visible through every other
//! window that covers the same bytes.

use std::fmt;
use std::marker::PhantomData;
use std::mem::size_of;
use std::ptr::NonNull;

use crate::types::NumericKind;

mod sealed {
    pub trait Sealed {}
}

/// Element types a window can be instantiated with
pub trait Element: Copy + Default + fmt::Debug + sealed::Sealed {
    const KIND: NumericKind;
}

macro_rules! element {
    ($($t:ty => $kind:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $t {}
            impl Element for $t {
                const KIND: NumericKind = NumericKind::$kind;
            }
        )*
    };
}

element!(
    i8 => Int8,
    u8 => Uint8,
    i16 => Int16,
    u16 => Uint16,
    i32 => Int32,
    u32 => Uint32,
    f32 => Float32,
    f64 => Float64,
);

/// A region reinterpreted as `[T; len]`.
///
/// Indices past the end never trap: reads yield `None`, writes are dropped.
pub struct Window<T: Element> {
    ptr: NonNull<T>,
    len: usize,
    // Shared, mutable through `&self`: same variance and auto traits as `Cell<T>`.
    _marker: PhantomData<std::cell::Cell<T>>,
}

impl<T: Element> Window<T> {
    /// # Safety
    /// `base` must be aligned to 8 and valid for reads and writes of
    /// `byte_len` bytes for as long as the window is alive.
    unsafe fn new(base: NonNull<u8>, byte_len: usize) -> Self {
        Self {
            ptr: base.cast::<T>(),
            len: byte_len / size_of::<T>(),
            _marker: PhantomData,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The kind this window reinterprets bytes as
    pub fn kind(&self) -> NumericKind {
        T::KIND
    }

    /// Right shift turning a byte offset into an element index
    pub fn shift(&self) -> u32 {
        T::KIND.shift()
    }

    /// Read element `index`
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        // SAFETY: in bounds and aligned; the cache's owner keeps the memory alive.
        Some(unsafe { self.ptr.as_ptr().add(index).read() })
    }

    /// Write element `index`, returning whether the write landed
    pub fn set(&self, index: usize, value: T) -> bool {
        if index >= self.len {
            return false;
        }
        // SAFETY: as in `get`; windows are !Sync so no concurrent writer exists.
        unsafe { self.ptr.as_ptr().add(index).write(value) };
        true
    }

    /// Copy every element out
    pub fn to_vec(&self) -> Vec<T> {
        (0..self.len).filter_map(|i| self.get(i)).collect()
    }
}

impl<T: Element> fmt::Debug for Window<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("kind", &T::KIND)
            .field("len", &self.len)
            .finish()
    }
}

/// One window per numeric kind over a single region
pub struct WindowCache {
    byte_len: usize,
    int8: Window<i8>,
    uint8: Window<u8>,
    int16: Window<i16>,
    uint16: Window<u16>,
    int32: Window<i32>,
    uint32: Window<u32>,
    float32: Window<f32>,
    float64: Window<f64>,
}

impl WindowCache {
    /// # Safety
    /// Same contract as [`Window::new`] for every window created here.
    pub(crate) unsafe fn new(base: NonNull<u8>, byte_len: usize) -> Self {
        Self {
            byte_len,
            int8: Window::new(base, byte_len),
            uint8: Window::new(base, byte_len),
            int16: Window::new(base, byte_len),
            uint16: Window::new(base, byte_len),
            int32: Window::new(base, byte_len),
            uint32: Window::new(base, byte_len),
            float32: Window::new(base, byte_len),
            float64: Window::new(base, byte_len),
        }
    }

    /// Length in bytes of the underlying region
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Element count of the window for `kind`
    pub fn len_of(&self, kind: NumericKind) -> usize {
        match kind {
            NumericKind::Int8 => self.int8.len(),
            NumericKind::Uint8 => self.uint8.len(),
            NumericKind::Int16 => self.int16.len(),
            NumericKind::Uint16 => self.uint16.len(),
            NumericKind::Int32 => self.int32.len(),
            NumericKind::Uint32 => self.uint32.len(),
            NumericKind::Float32 => self.float32.len(),
            NumericKind::Float64 => self.float64.len(),
        }
    }

    pub fn int8(&self) -> &Window<i8> {
        &self.int8
    }

    pub fn uint8(&self) -> &Window<u8> {
        &self.uint8
    }

    pub fn int16(&self) -> &Window<i16> {
        &self.int16
    }

    pub fn uint16(&self) -> &Window<u16> {
        &self.uint16
    }

    pub fn int32(&self) -> &Window<i32> {
        &self.int32
    }

    pub fn uint32(&self) -> &Window<u32> {
        &self.uint32
    }

    pub fn float32(&self) -> &Window<f32> {
        &self.float32
    }

    pub fn float64(&self) -> &Window<f64> {
        &self.float64
    }
}

impl fmt::Debug for WindowCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowCache")
            .field("byte_len", &self.byte_len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::memory::Region;
    use crate::types::NumericKind;

    #[test]
    fn test_window_lengths_floor() {
        let region = Region::heap(13).unwrap();
        let mem = region.windows();
        assert_eq!(mem.byte_len(), 13);
        assert_eq!(mem.int8().len(), 13);
        assert_eq!(mem.uint16().len(), 6);
        assert_eq!(mem.int32().len(), 3);
        assert_eq!(mem.float64().len(), 1);
        assert_eq!(mem.len_of(NumericKind::Float32), 3);
    }

    #[test]
    fn test_windows_alias_the_same_bytes() {
        let region = Region::heap(16).unwrap();
        let mem = region.windows();
        assert!(mem.int32().set(1, -1));
        assert_eq!(mem.uint32().get(1), Some(u32::MAX));
        assert_eq!(mem.uint8().get(4), Some(0xff));
        assert_eq!(mem.int16().get(3), Some(-1));
        assert_eq!(mem.int8().get(3), Some(0));
    }

    #[cfg(target_endian = "little")]
    #[test]
    fn test_float_bits_visible_through_integer_window() {
        let region = Region::heap(16).unwrap();
        let mem = region.windows();
        assert!(mem.float64().set(1, 1.0));
        assert_eq!(mem.uint32().get(2), Some(0));
        assert_eq!(mem.uint32().get(3), Some(0x3ff0_0000));
    }

    #[test]
    fn test_out_of_range_is_silent() {
        let region = Region::heap(8).unwrap();
        let mem = region.windows();
        assert_eq!(mem.int32().get(2), None);
        assert!(!mem.int32().set(2, 7));
        assert_eq!(mem.int32().to_vec(), vec![0, 0]);
    }
}
