use derive_more::{Display, Error};

/// Failure reported by a [`HeapGrower`](crate::HeapGrower) when it cannot
/// extend the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("heap cannot grow by {requested} bytes")]
pub struct GrowError {
  pub requested: usize,
}

/// Reasons an allocation request can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum AllocError {
  /// The growth provider could not supply a fresh block.
  #[display("out of memory: heap cannot grow by {requested} bytes")]
  OutOfMemory { requested: usize },
  /// The request plus its header does not fit in the address space.
  #[display("allocation of {size} bytes overflows the address space")]
  SizeOverflow { size: usize },
}

impl From<GrowError> for AllocError {
  fn from(err: GrowError) -> Self {
    Self::OutOfMemory {
      requested: err.requested,
    }
  }
}
