//! Typed access composed from raw reads and writes.
//!
//! Every helper forwards the underlying [`AccessViolation`] unchanged. Float
//! helpers move bit patterns; they never convert numerically.

use crate::{AccessViolation, ByteOrder, FloatWord, Memory, Word};

/// Reads one `W`-sized word at `index` using `order`.
///
/// # Errors
///
/// Returns the [`AccessViolation`] reported by [`Memory::read_raw`], or a
/// read violation for the whole word when the returned view is not exactly
/// `W::BYTES` long.
pub fn read_word<W: Word, M: Memory + ?Sized>(
    memory: &mut M,
    order: ByteOrder,
    index: u64,
) -> Result<W, AccessViolation> {
    let num_bytes = W::BYTES as u64;
    let raw = memory.read_raw(index, num_bytes)?;
    let mut bytes = W::Bytes::default();
    let dst = bytes.as_mut();
    if raw.len() != dst.len() {
        return Err(AccessViolation::read(index, num_bytes));
    }
    dst.copy_from_slice(&raw);
    Ok(W::from_bytes(bytes, order))
}

/// Writes one `W`-sized word at `index` using `order`.
///
/// # Errors
///
/// Returns the [`AccessViolation`] reported by [`Memory::write_raw`].
pub fn write_word<W: Word, M: Memory + ?Sized>(
    memory: &mut M,
    order: ByteOrder,
    value: W,
    index: u64,
) -> Result<(), AccessViolation> {
    memory.write_raw(value.to_bytes(order).as_ref(), index)
}

/// Reads a `u16` at `index`.
///
/// # Errors
///
/// Propagates the raw read fault.
pub fn read_u16<M: Memory + ?Sized>(
    memory: &mut M,
    order: ByteOrder,
    index: u64,
) -> Result<u16, AccessViolation> {
    read_word(memory, order, index)
}

/// Reads a `u32` at `index`.
///
/// # Errors
///
/// Propagates the raw read fault.
pub fn read_u32<M: Memory + ?Sized>(
    memory: &mut M,
    order: ByteOrder,
    index: u64,
) -> Result<u32, AccessViolation> {
    read_word(memory, order, index)
}

/// Reads a `u64` at `index`.
///
/// # Errors
///
/// Propagates the raw read fault.
pub fn read_u64<M: Memory + ?Sized>(
    memory: &mut M,
    order: ByteOrder,
    index: u64,
) -> Result<u64, AccessViolation> {
    read_word(memory, order, index)
}

/// Reads the bit pattern of an `f32` at `index`.
///
/// # Errors
///
/// Propagates the raw read fault.
pub fn read_f32<M: Memory + ?Sized>(
    memory: &mut M,
    order: ByteOrder,
    index: u64,
) -> Result<f32, AccessViolation> {
    read_word::<u32, M>(memory, order, index).map(FloatWord::to_float)
}

/// Reads the bit pattern of an `f64` at `index`.
///
/// # Errors
///
/// Propagates the raw read fault.
pub fn read_f64<M: Memory + ?Sized>(
    memory: &mut M,
    order: ByteOrder,
    index: u64,
) -> Result<f64, AccessViolation> {
    read_word::<u64, M>(memory, order, index).map(FloatWord::to_float)
}

/// Writes a `u16` at `index`.
///
/// # Errors
///
/// Propagates the raw write fault.
pub fn write_u16<M: Memory + ?Sized>(
    memory: &mut M,
    order: ByteOrder,
    value: u16,
    index: u64,
) -> Result<(), AccessViolation> {
    write_word(memory, order, value, index)
}

/// Writes a `u32` at `index`.
///
/// # Errors
///
/// Propagates the raw write fault.
pub fn write_u32<M: Memory + ?Sized>(
    memory: &mut M,
    order: ByteOrder,
    value: u32,
    index: u64,
) -> Result<(), AccessViolation> {
    write_word(memory, order, value, index)
}

/// Writes a `u64` at `index`.
///
/// # Errors
///
/// Propagates the raw write fault.
pub fn write_u64<M: Memory + ?Sized>(
    memory: &mut M,
    order: ByteOrder,
    value: u64,
    index: u64,
) -> Result<(), AccessViolation> {
    write_word(memory, order, value, index)
}

/// Writes the bit pattern of an `f32` at `index`.
///
/// # Errors
///
/// Propagates the raw write fault.
pub fn write_f32<M: Memory + ?Sized>(
    memory: &mut M,
    order: ByteOrder,
    value: f32,
    index: u64,
) -> Result<(), AccessViolation> {
    write_word(memory, order, value.to_bits(), index)
}

/// Writes the bit pattern of an `f64` at `index`.
///
/// # Errors
///
/// Propagates the raw write fault.
pub fn write_f64<M: Memory + ?Sized>(
    memory: &mut M,
    order: ByteOrder,
    value: f64,
    index: u64,
) -> Result<(), AccessViolation> {
    write_word(memory, order, value.to_bits(), index)
}
