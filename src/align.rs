/// Size of a machine word, the alignment every block header is kept on.
pub const WORD: usize = size_of::<usize>();

/// Rounds `value` up to the machine word, returning `None` when the rounded
/// value does not fit in a `usize`.
///
/// Usable lengths are kept word multiples so that the header written after a
/// block (by a split or by the next heap growth) lands on a word boundary.
///
/// # Examples
///
/// ```rust
/// use rfreelist::align::{checked_align, WORD};
///
/// match WORD {
///     8 => assert_eq!(checked_align(13), Some(16)), // 64 bit machine.
///     4 => assert_eq!(checked_align(11), Some(12)), // 32 bit machine.
///     _ => {},
/// };
/// assert_eq!(checked_align(usize::MAX), None);
/// ```
#[must_use]
pub const fn checked_align(value: usize) -> Option<usize> {
  match value.checked_add(WORD - 1) {
    Some(padded) => Some(padded & !(WORD - 1)),
    None => None,
  }
}
