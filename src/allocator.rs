use std::ptr::NonNull;

use log::{debug, trace, warn};

#[cfg(unix)]
use crate::heap::SbrkHeap;
use crate::{
  align,
  block::{BlockHeader, HEADER_SIZE},
  error::AllocError,
  free_list::FreeList,
  heap::HeapGrower,
};

/// A free block as seen from outside the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeBlock {
  /// First usable byte, the pointer `allocate` would hand out for it.
  pub ptr: NonNull<u8>,
  /// Usable bytes, header excluded.
  pub length: usize,
}

/// First-fit allocator keeping its free blocks in an intrusive, unordered
/// free list and growing the heap through `G` when nothing fits.
///
/// Released blocks are never merged with their neighbours and memory is
/// never given back to the grower.
pub struct FreeListAllocator<G: HeapGrower> {
  free_list: FreeList,
  grower: G,
}

unsafe impl<G: HeapGrower + Send> Send for FreeListAllocator<G> {}

impl<G: HeapGrower + Default> Default for FreeListAllocator<G> {
  fn default() -> Self {
    Self::new(G::default())
  }
}

#[cfg(unix)]
impl FreeListAllocator<SbrkHeap> {
  /// Allocator backed by the process program break.
  #[must_use]
  pub const fn with_sbrk() -> Self {
    Self::new(SbrkHeap::new())
  }
}

impl<G: HeapGrower> FreeListAllocator<G> {
  #[must_use]
  pub const fn new(grower: G) -> Self {
    Self {
      free_list: FreeList::new(),
      grower,
    }
  }

  pub const fn grower(&self) -> &G {
    &self.grower
  }

  /// Allocates at least `size` uninitialized bytes.
  ///
  /// The free list is searched first-fit from its head. A fitting block with
  /// room for another header plus at least one word is split, and its tail
  /// takes its place in the list; a tighter fit is handed out whole. When no
  /// block fits, the heap grows by exactly `size + HEADER_SIZE` bytes (with
  /// `size` rounded up to the word).
  ///
  /// `size == 0` is accepted and yields a distinct pointer that can be
  /// released like any other.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    let overflow = AllocError::SizeOverflow { size };
    let length = align::checked_align(size).ok_or(overflow)?;
    let threshold = length.checked_add(HEADER_SIZE).ok_or(overflow)?;

    let memory = match self.free_list.first_fit(length) {
      Some(candidate) => unsafe { self.take_free_block(candidate, length, threshold) },
      None => self
        .grow_block(length, threshold)
        .inspect_err(|err| warn!("allocate({size}) failed: {err}"))?,
    };

    trace!("allocate({size}) -> {memory:p}");
    Ok(memory)
  }

  /// Returns the block at `ptr` to the head of the free list.
  ///
  /// Releasing null does nothing. The block is not merged with neighbouring
  /// free blocks.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or a pointer returned by [`allocate`](Self::allocate)
  /// on this allocator that has not been released since. The memory must not
  /// be used after this call.
  pub unsafe fn release(
    &mut self,
    ptr: *mut u8,
  ) {
    let Some(memory) = NonNull::new(ptr) else {
      return;
    };

    unsafe {
      let header = BlockHeader::from_memory(memory);
      self.free_list.insert_at_head(header);
      trace!("release({memory:p}) length={}", header.as_ref().length);
    }
  }

  /// Free blocks in the order the next allocation will examine them.
  pub fn free_blocks(&self) -> impl Iterator<Item = FreeBlock> + '_ {
    self.free_list.iter().map(|header| unsafe {
      FreeBlock {
        ptr: BlockHeader::memory(header),
        length: header.as_ref().length,
      }
    })
  }

  pub fn free_block_count(&self) -> usize {
    self.free_list.len()
  }

  /// Returns `true` if `ptr` is the memory of a block currently on the free
  /// list.
  pub fn is_free(
    &self,
    ptr: NonNull<u8>,
  ) -> bool {
    self
      .free_list
      .iter()
      .any(|header| unsafe { BlockHeader::memory(header) } == ptr)
  }

  /// Hands out `candidate`, splitting it when the remainder can hold another
  /// header.
  ///
  /// # Safety
  ///
  /// `candidate` must be on the free list with `length >= size`, and
  /// `threshold` must equal `size + HEADER_SIZE`.
  unsafe fn take_free_block(
    &mut self,
    candidate: NonNull<BlockHeader>,
    size: usize,
    threshold: usize,
  ) -> NonNull<u8> {
    unsafe {
      let length = candidate.as_ref().length;
      if length > threshold {
        let tail = BlockHeader::split(candidate, size);
        self.free_list.replace(candidate, tail);
        trace!(
          "split {:p}: {length} -> {size} + {} at {tail:p}",
          candidate,
          tail.as_ref().length
        );
      } else {
        self.free_list.remove(candidate);
        trace!("reuse {candidate:p} whole: {length} for {size}");
      }
      BlockHeader::memory(candidate)
    }
  }

  fn grow_block(
    &mut self,
    size: usize,
    total: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    let region = self.grower.grow(total)?;
    debug!("grew heap by {total} bytes at {region:p}");

    // The grower hands out fresh, aligned memory of `total` bytes.
    unsafe {
      let header = BlockHeader::write(region, size);
      Ok(BlockHeader::memory(header))
    }
  }
}
