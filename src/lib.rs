//! # rfreelist - A First-Fit Free-List Allocator
//!
//! This crate provides a small general-purpose allocator that keeps released
//! blocks in an intrusive, doubly-linked **free list** and grows the heap on
//! demand, by default with the `sbrk` system call.
//!
//! ## Overview
//!
//! ```text
//!   Free-List Allocator Concept:
//!
//!   ┌───────────────────────────────────────────────────────────────────────┐
//!   │                             HEAP MEMORY                               │
//!   │                                                                       │
//!   │   ┌────┬──────┬────┬──────┬────┬──────┬────┬──────┐                   │
//!   │   │ H  │ used │ H  │ free │ H  │ used │ H  │ free │                   │
//!   │   └────┴──────┴────┴──────┴────┴──────┴────┴──────┘                   │
//!   │                ▲                       ▲           ▲                  │
//!   │                │                       │           │                  │
//!   │                └──── next_free ────────┘       Program                │
//!   │   head ──────────────────────────────▶          Break                 │
//!   │                                                                       │
//!   └───────────────────────────────────────────────────────────────────────┘
//!
//!   Released blocks are pushed at the head of the free list.
//!   Allocation scans the list first-fit, and grows the heap on a miss.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rfreelist
//!   ├── align      - Word rounding for block lengths
//!   ├── allocator  - FreeListAllocator (allocate / release)
//!   ├── block      - Inline block header (internal)
//!   ├── error      - AllocError, GrowError
//!   ├── free_list  - Intrusive doubly-linked free list (internal)
//!   └── heap       - HeapGrower trait, SbrkHeap, FixedHeap
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rfreelist::{FixedHeap, FreeListAllocator};
//!
//! let mut allocator = FreeListAllocator::new(FixedHeap::with_capacity(4096));
//!
//! let ptr = allocator.allocate(64).unwrap();
//! unsafe {
//!     ptr.write_bytes(0xAB, 64);
//!     allocator.release(ptr.as_ptr());
//! }
//!
//! // The released block is reused by the next allocation that fits.
//! assert_eq!(allocator.allocate(32).unwrap(), ptr);
//! ```
//!
//! ## How It Works
//!
//! Every block carries a header right in front of the memory handed to the
//! caller:
//!
//! ```text
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │         User Data              │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ length: N       │  │  ┌──────────────────────────┐  │
//!   │  │ prev_free       │  │  │                          │  │
//!   │  │ next_free       │  │  │     N bytes usable       │  │
//!   │  └─────────────────┘  │  │                          │  │
//!   │      24 bytes         │  └──────────────────────────┘  │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Pointer returned to user
//! ```
//!
//! On `allocate(size)`:
//!
//! 1. The free list is scanned from the head for the first block with
//!    `length >= size`.
//! 2. If that block has room for another header and at least a word after
//!    `size` bytes, it is split. The tail gets its own header and takes the
//!    block's place in the list.
//! 3. Otherwise the block is unlinked and handed out whole.
//! 4. If no block fits, the heap grows by `size + HEADER_SIZE` bytes.
//!
//! On `release(ptr)` the block is pushed on the head of the free list.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: No synchronization primitives
//! - **No coalescing**: Neighbouring free blocks are never merged
//! - **No shrinking**: Memory is never returned to the OS
//! - **Word alignment only**: Returned pointers are aligned to `usize`
//!
//! ## Safety
//!
//! `release` is `unsafe`: releasing a foreign pointer, releasing twice, or
//! using memory after release is undetected and corrupts the free list.

pub mod align;
mod allocator;
mod block;
mod error;
mod free_list;
mod heap;

pub use allocator::{FreeBlock, FreeListAllocator};
pub use block::HEADER_SIZE;
pub use error::{AllocError, GrowError};
#[cfg(unix)]
pub use heap::SbrkHeap;
pub use heap::{FixedHeap, HeapGrower};
