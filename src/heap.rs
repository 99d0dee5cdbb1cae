//! Heap-growth providers.
//!
//! The allocator never looks at the heap as a whole; it only asks a
//! [`HeapGrower`] for more bytes whenever the free list cannot satisfy a
//! request. Two providers are available:
//!
//! - [`SbrkHeap`] moves the program break with `sbrk(2)` (unix only).
//! - [`FixedHeap`] bumps through a bounded arena taken once from the system
//!   allocator.

use std::{
  alloc::{self, Layout},
  ptr::NonNull,
};

use crate::{block::HEADER_ALIGN, error::GrowError};

/// Source of fresh memory for a [`FreeListAllocator`](crate::FreeListAllocator).
///
/// # Safety
///
/// Implementors must return regions that:
///
/// - are valid for reads and writes of `extra` bytes,
/// - are aligned to the alignment of a block header (the machine word),
/// - do not overlap any region returned before, and
/// - stay valid and untouched by anyone else for as long as the grower lives.
///
/// Growth is monotonic: a grower never reclaims memory it handed out.
pub unsafe trait HeapGrower {
  /// Extends the heap by `extra` bytes and returns the start of the new
  /// region.
  fn grow(
    &mut self,
    extra: usize,
  ) -> Result<NonNull<u8>, GrowError>;
}

/// Grows the process heap by moving the program break.
///
/// The break is shared with anything else in the process that calls `brk` or
/// `sbrk`, so consecutive regions are only contiguous when nobody else moves it
/// in between.
#[cfg(unix)]
#[derive(Debug, Default)]
pub struct SbrkHeap {
  _private: (),
}

#[cfg(unix)]
impl SbrkHeap {
  #[must_use]
  pub const fn new() -> Self {
    Self { _private: () }
  }

  /// Current program break, as reported by `sbrk(0)`.
  #[must_use]
  pub fn program_break() -> *mut u8 {
    unsafe { libc::sbrk(0) }.cast()
  }
}

#[cfg(unix)]
unsafe impl HeapGrower for SbrkHeap {
  fn grow(
    &mut self,
    extra: usize,
  ) -> Result<NonNull<u8>, GrowError> {
    let err = GrowError { requested: extra };

    let brk = Self::program_break();
    if brk.addr() == usize::MAX {
      return Err(err);
    }

    // Someone else may have left the break unaligned.
    let padding = brk.align_offset(HEADER_ALIGN);
    let increment = extra
      .checked_add(padding)
      .and_then(|total| libc::intptr_t::try_from(total).ok())
      .ok_or(err)?;

    let address = unsafe { libc::sbrk(increment) };
    if address == usize::MAX as *mut libc::c_void {
      return Err(err);
    }

    let start = unsafe { address.cast::<u8>().add(padding) };
    NonNull::new(start).ok_or(err)
  }
}

/// Bounded heap carved out of a single arena.
///
/// Each growth request bumps an offset through the arena; once the arena is
/// exhausted every further request fails. The arena is returned to the system
/// allocator when the heap is dropped, so a [`FreeListAllocator`] built on it
/// must not outlive it (ownership makes that automatic).
///
/// [`FreeListAllocator`]: crate::FreeListAllocator
#[derive(Debug)]
pub struct FixedHeap {
  start: NonNull<u8>,
  layout: Layout,
  used: usize,
}

unsafe impl Send for FixedHeap {}

impl FixedHeap {
  /// Reserves an arena of `capacity` bytes.
  ///
  /// # Panics
  ///
  /// Panics if `capacity` rounded up to the header alignment exceeds
  /// `isize::MAX`. Aborts through [`alloc::handle_alloc_error`] if the system
  /// allocator cannot provide the arena.
  #[must_use]
  pub fn with_capacity(capacity: usize) -> Self {
    let Ok(layout) = Layout::from_size_align(capacity.max(1), HEADER_ALIGN) else {
      panic!("fixed heap capacity overflow: {capacity} bytes");
    };

    let start = unsafe { alloc::alloc(layout) };
    let Some(start) = NonNull::new(start) else {
      alloc::handle_alloc_error(layout);
    };

    Self {
      start,
      layout,
      used: 0,
    }
  }

  #[must_use]
  pub const fn capacity(&self) -> usize {
    self.layout.size()
  }

  /// Bytes handed out so far.
  #[must_use]
  pub const fn used(&self) -> usize {
    self.used
  }

  #[must_use]
  pub const fn remaining(&self) -> usize {
    self.capacity() - self.used
  }

  /// Returns `true` if `ptr` lies inside the part of the arena handed out so
  /// far.
  #[must_use]
  pub fn owns(
    &self,
    ptr: *const u8,
  ) -> bool {
    let start = self.start.as_ptr().addr();
    (start..start + self.used).contains(&ptr.addr())
  }
}

unsafe impl HeapGrower for FixedHeap {
  fn grow(
    &mut self,
    extra: usize,
  ) -> Result<NonNull<u8>, GrowError> {
    let err = GrowError { requested: extra };

    // Keep the next region header-aligned.
    let padding = self.used.next_multiple_of(HEADER_ALIGN) - self.used;
    let begin = self.used + padding;
    let end = begin.checked_add(extra).ok_or(err)?;
    if end > self.capacity() {
      return Err(err);
    }

    self.used = end;
    Ok(unsafe { self.start.add(begin) })
  }
}

impl Drop for FixedHeap {
  fn drop(&mut self) {
    unsafe { alloc::dealloc(self.start.as_ptr(), self.layout) };
  }
}

#[cfg(test)]
mod tests {
  use test_env_log::test;

  use super::*;

  #[test]
  fn test_fixed_heap_grows_contiguously() {
    let mut heap = FixedHeap::with_capacity(256);
    assert_eq!(heap.capacity(), 256);
    assert_eq!(heap.used(), 0);

    let first = heap.grow(64).unwrap();
    let second = heap.grow(32).unwrap();

    assert!(first.as_ptr().addr().is_multiple_of(HEADER_ALIGN));
    assert_eq!(unsafe { first.add(64) }, second);
    assert_eq!(heap.used(), 96);
    assert_eq!(heap.remaining(), 160);
    assert!(heap.owns(first.as_ptr()));
    assert!(heap.owns(unsafe { second.add(31) }.as_ptr()));
    assert!(!heap.owns(unsafe { second.add(32) }.as_ptr()));
  }

  #[test]
  fn test_fixed_heap_keeps_regions_aligned() {
    let mut heap = FixedHeap::with_capacity(256);

    heap.grow(3).unwrap();
    let next = heap.grow(8).unwrap();

    assert!(next.as_ptr().addr().is_multiple_of(HEADER_ALIGN));
    assert_eq!(heap.used(), HEADER_ALIGN + 8);
  }

  #[test]
  fn test_fixed_heap_exhaustion() {
    let mut heap = FixedHeap::with_capacity(64);

    heap.grow(64).unwrap();
    assert_eq!(heap.grow(1), Err(GrowError { requested: 1 }));
    assert_eq!(heap.grow(usize::MAX), Err(GrowError { requested: usize::MAX }));
    assert_eq!(heap.used(), 64);
  }

  #[test]
  fn test_fixed_heap_rejects_oversized_request() {
    let mut heap = FixedHeap::with_capacity(64);

    assert_eq!(heap.grow(65), Err(GrowError { requested: 65 }));
    assert_eq!(heap.used(), 0);
    assert!(heap.grow(64).is_ok());
  }

  #[cfg(unix)]
  #[test]
  fn test_sbrk_heap_returns_aligned_writable_region() {
    let mut heap = SbrkHeap::new();

    let region = heap.grow(64).unwrap();
    assert!(region.as_ptr().addr().is_multiple_of(HEADER_ALIGN));
    assert!(SbrkHeap::program_break() >= unsafe { region.add(64) }.as_ptr());

    unsafe {
      region.write_bytes(0x5A, 64);
      assert_eq!(region.add(63).read(), 0x5A);
    }
  }

  #[cfg(unix)]
  #[test]
  fn test_sbrk_heap_rejects_unrepresentable_increment() {
    let mut heap = SbrkHeap::new();
    assert_eq!(heap.grow(usize::MAX), Err(GrowError { requested: usize::MAX }));
  }
}
