//! Doubly-linked list of free blocks, threaded through the block headers.
//!
//! The list is unordered: released blocks are pushed at the head and searches
//! walk from the head, so the first fitting block is the most recently
//! released one that is large enough.

use std::{marker::PhantomData, ptr::NonNull};

use crate::block::BlockHeader;

#[derive(Debug, Default)]
pub(crate) struct FreeList {
  head: Option<NonNull<BlockHeader>>,
}

impl FreeList {
  pub const fn new() -> Self {
    Self { head: None }
  }

  pub fn len(&self) -> usize {
    self.iter().count()
  }

  pub fn iter(&self) -> Iter<'_> {
    Iter {
      next: self.head,
      _list: PhantomData,
    }
  }

  /// Returns the first node in list order that holds at least `size` bytes.
  pub fn first_fit(
    &self,
    size: usize,
  ) -> Option<NonNull<BlockHeader>> {
    self
      .iter()
      .find(|node| unsafe { node.as_ref().length } >= size)
  }

  /// Makes `node` the new head.
  ///
  /// # Safety
  ///
  /// `node` must be a valid header that is not on any free list.
  pub unsafe fn insert_at_head(
    &mut self,
    mut node: NonNull<BlockHeader>,
  ) {
    unsafe {
      {
        let node = node.as_mut();
        node.prev_free = None;
        node.next_free = self.head;
      }
      if let Some(mut head) = self.head {
        head.as_mut().prev_free = Some(node);
      }
    }
    self.head = Some(node);
  }

  /// Splices `node` out of the list and clears its links.
  ///
  /// # Safety
  ///
  /// `node` must currently be a member of this list.
  pub unsafe fn remove(
    &mut self,
    mut node: NonNull<BlockHeader>,
  ) {
    unsafe {
      let (prev, next) = {
        let node = node.as_ref();
        (node.prev_free, node.next_free)
      };

      match prev {
        Some(mut prev) => prev.as_mut().next_free = next,
        None => self.head = next,
      }
      if let Some(mut next) = next {
        next.as_mut().prev_free = prev;
      }

      let node = node.as_mut();
      node.prev_free = None;
      node.next_free = None;
    }
  }

  /// Puts `new` in the slot `old` occupies. `old` may be the head.
  ///
  /// # Safety
  ///
  /// `old` must currently be a member of this list and `new` must be a valid
  /// header distinct from every member.
  pub unsafe fn replace(
    &mut self,
    old: NonNull<BlockHeader>,
    mut new: NonNull<BlockHeader>,
  ) {
    unsafe {
      let (prev, next) = {
        let old = old.as_ref();
        (old.prev_free, old.next_free)
      };

      {
        let new = new.as_mut();
        new.prev_free = prev;
        new.next_free = next;
      }

      match prev {
        Some(mut prev) => prev.as_mut().next_free = Some(new),
        None => self.head = Some(new),
      }
      if let Some(mut next) = next {
        next.as_mut().prev_free = Some(new);
      }
    }
  }
}

/// Walks the list from the head.
pub(crate) struct Iter<'a> {
  next: Option<NonNull<BlockHeader>>,
  _list: PhantomData<&'a FreeList>,
}

impl Iterator for Iter<'_> {
  type Item = NonNull<BlockHeader>;

  fn next(&mut self) -> Option<Self::Item> {
    let node = self.next?;
    self.next = unsafe { node.as_ref().next_free };
    Some(node)
  }
}
