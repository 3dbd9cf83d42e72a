//! Bounds policy shared by every buffer-backed memory.

use crate::AccessViolation;

/// Validates a single-byte access at `index` against a buffer of `size` bytes.
///
/// # Errors
///
/// Returns an [`AccessViolation`] of one byte at `index` when `index >= size`.
pub const fn check_index(index: u64, size: u64, was_read: bool) -> Result<(), AccessViolation> {
    if index < size {
        Ok(())
    } else {
        Err(AccessViolation {
            location: index,
            num_bytes: 1,
            was_read,
        })
    }
}

/// Validates the range `[start, start + num_bytes)` against a buffer of
/// `size` bytes and returns the exclusive end address.
///
/// A range is rejected when it ends past `size` or when the end address
/// wraps the 64-bit address space. Both cases report the request exactly as
/// made.
///
/// # Errors
///
/// Returns an [`AccessViolation`] carrying `start`, `num_bytes`, and
/// `was_read` when the range is not fully addressable.
pub const fn check_range(
    start: u64,
    num_bytes: u64,
    size: u64,
    was_read: bool,
) -> Result<u64, AccessViolation> {
    match start.checked_add(num_bytes) {
        Some(end) if end <= size => Ok(end),
        _ => Err(AccessViolation {
            location: start,
            num_bytes,
            was_read,
        }),
    }
}
