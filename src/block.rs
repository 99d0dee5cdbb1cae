//! Inline block headers and the pointer arithmetic around them.
//!
//! Every block, free or allocated, starts with a [`BlockHeader`]. The pointer
//! handed to callers is the first byte after it:
//!
//! ```text
//!   ┌─────────────────────────────────┬──────────────────────┐
//!   │ length | prev_free | next_free  │ `length` usable bytes │
//!   └─────────────────────────────────┴──────────────────────┘
//!   ▲                                 ▲
//!   header                            memory (returned to the caller)
//! ```
//!
//! The link fields only carry meaning while the block sits on the free list.
//! All conversions between header and memory addresses live in this module.

use std::{mem, ptr::NonNull};

/// Bytes of metadata in front of every block.
pub const HEADER_SIZE: usize = mem::size_of::<BlockHeader>();

/// Alignment the start of every header must satisfy.
pub(crate) const HEADER_ALIGN: usize = mem::align_of::<BlockHeader>();

const _: () = assert!(HEADER_SIZE.is_multiple_of(HEADER_ALIGN));
const _: () = assert!(HEADER_ALIGN <= crate::align::WORD);

#[repr(C)]
#[derive(Debug)]
pub(crate) struct BlockHeader {
  /// Usable bytes following the header.
  pub length: usize,
  pub prev_free: Option<NonNull<BlockHeader>>,
  pub next_free: Option<NonNull<BlockHeader>>,
}

impl BlockHeader {
  pub const fn unlinked(length: usize) -> Self {
    Self {
      length,
      prev_free: None,
      next_free: None,
    }
  }

  /// Writes an unlinked header describing `length` usable bytes at `addr`.
  ///
  /// # Safety
  ///
  /// `addr` must be aligned to [`HEADER_ALIGN`] and valid for writes of
  /// `HEADER_SIZE + length` bytes that nothing else uses.
  pub unsafe fn write(
    addr: NonNull<u8>,
    length: usize,
  ) -> NonNull<Self> {
    let header = addr.cast::<Self>();
    debug_assert!(header.is_aligned());
    unsafe { header.write(Self::unlinked(length)) };
    header
  }

  /// Returns the first usable byte of the block owned by `header`.
  ///
  /// # Safety
  ///
  /// `header` must point to a header written by this module.
  pub unsafe fn memory(header: NonNull<Self>) -> NonNull<u8> {
    unsafe { header.cast::<u8>().add(HEADER_SIZE) }
  }

  /// Recovers the header sitting right in front of `memory`.
  ///
  /// # Safety
  ///
  /// `memory` must be a pointer previously produced by [`Self::memory`].
  pub unsafe fn from_memory(memory: NonNull<u8>) -> NonNull<Self> {
    unsafe { memory.sub(HEADER_SIZE).cast() }
  }

  /// Shrinks the block to `size` usable bytes and writes an unlinked header
  /// for the tail right after them. Returns the tail header.
  ///
  /// The tail describes `length - size - HEADER_SIZE` bytes. The links of
  /// `header` are left as they are so the caller can hand them over to the
  /// tail.
  ///
  /// # Safety
  ///
  /// `header` must be a valid header with `length > size + HEADER_SIZE`, and
  /// `size` must be a multiple of the word size.
  pub unsafe fn split(
    mut header: NonNull<Self>,
    size: usize,
  ) -> NonNull<Self> {
    unsafe {
      let length = header.as_ref().length;
      debug_assert!(length > size + HEADER_SIZE);

      let tail_addr = Self::memory(header).add(size);
      let tail = Self::write(tail_addr, length - size - HEADER_SIZE);
      header.as_mut().length = size;
      tail
    }
  }
}
