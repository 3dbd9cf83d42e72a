//! Addressable byte storage with fault-checked raw and typed access.

/// Bounds policy shared by buffer-backed memories.
pub mod access;
/// Byte-order aware integer and float helpers over raw access.
pub mod typed;

use std::ops::{Deref, DerefMut};

pub use access::{check_index, check_range};
pub use typed::{
    read_f32, read_f64, read_u16, read_u32, read_u64, read_word, write_f32, write_f64,
    write_u16, write_u32, write_u64, write_word,
};

use crate::AccessViolation;

/// Policy mapping multi-byte values onto sequential memory bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ByteOrder {
    /// Most significant byte at the lowest address.
    Big,
    /// Least significant byte at the lowest address.
    #[default]
    Little,
}

/// Bytes returned by [`Memory::read_raw`].
///
/// A [`RawView::Backed`] view aliases live storage: writes through it are
/// observed by later reads of the same memory. A [`RawView::Detached`] view
/// is a private copy.
#[derive(Debug, PartialEq, Eq)]
pub enum RawView<'a> {
    /// Zero-copy view into the memory's own buffer.
    Backed(&'a mut [u8]),
    /// Copy of the requested bytes.
    Detached(Vec<u8>),
}

impl RawView<'_> {
    /// Returns `true` when the view aliases the memory's internal buffer.
    #[must_use]
    pub const fn is_backed(&self) -> bool {
        matches!(self, Self::Backed(_))
    }

    /// Copies the viewed bytes into an owned buffer.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        match self {
            Self::Backed(bytes) => bytes.to_vec(),
            Self::Detached(bytes) => bytes,
        }
    }
}

impl Deref for RawView<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Self::Backed(bytes) => bytes,
            Self::Detached(bytes) => bytes,
        }
    }
}

impl DerefMut for RawView<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        match self {
            Self::Backed(bytes) => bytes,
            Self::Detached(bytes) => bytes,
        }
    }
}

/// Random access memory or a memory-mapped I/O window.
///
/// Every access is checked against [`Memory::size`]; a rejected access
/// reports the exact request as an [`AccessViolation`]. Implementations are
/// not synchronized and must only be touched by the stepping thread.
pub trait Memory {
    /// Number of addressable bytes.
    fn size(&self) -> u64;

    /// Reads the byte at `index`.
    ///
    /// # Errors
    ///
    /// Returns a one-byte read [`AccessViolation`] when `index` is outside
    /// the memory.
    fn read_one_byte(&self, index: u64) -> Result<u8, AccessViolation>;

    /// Writes `value` at `index`.
    ///
    /// # Errors
    ///
    /// Returns a one-byte write [`AccessViolation`] when `index` is outside
    /// the memory.
    fn write_one_byte(&mut self, value: u8, index: u64) -> Result<(), AccessViolation>;

    /// Reads `num_bytes` bytes starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns a read [`AccessViolation`] for `start`/`num_bytes` when the
    /// range ends past the memory or overflows the address width.
    fn read_raw(&mut self, start: u64, num_bytes: u64) -> Result<RawView<'_>, AccessViolation>;

    /// Writes `data` starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns a write [`AccessViolation`] for `start`/`data.len()` when the
    /// range ends past the memory or overflows the address width. Nothing is
    /// written in that case.
    fn write_raw(&mut self, data: &[u8], start: u64) -> Result<(), AccessViolation>;
}

impl<M: Memory + ?Sized> Memory for &mut M {
    fn size(&self) -> u64 {
        (**self).size()
    }

    fn read_one_byte(&self, index: u64) -> Result<u8, AccessViolation> {
        (**self).read_one_byte(index)
    }

    fn write_one_byte(&mut self, value: u8, index: u64) -> Result<(), AccessViolation> {
        (**self).write_one_byte(value, index)
    }

    fn read_raw(&mut self, start: u64, num_bytes: u64) -> Result<RawView<'_>, AccessViolation> {
        (**self).read_raw(start, num_bytes)
    }

    fn write_raw(&mut self, data: &[u8], start: u64) -> Result<(), AccessViolation> {
        (**self).write_raw(data, start)
    }
}

/// Converts an address already validated against a `usize`-sized buffer.
#[allow(clippy::cast_possible_truncation)]
const fn to_offset(addr: u64) -> usize {
    addr as usize
}

const fn buffer_size(buffer: &[u8]) -> u64 {
    buffer.len() as u64
}

fn buffer_read_one(buffer: &[u8], index: u64) -> Result<u8, AccessViolation> {
    check_index(index, buffer_size(buffer), true)?;
    Ok(buffer[to_offset(index)])
}

fn buffer_write_one(buffer: &mut [u8], value: u8, index: u64) -> Result<(), AccessViolation> {
    check_index(index, buffer_size(buffer), false)?;
    buffer[to_offset(index)] = value;
    Ok(())
}

fn buffer_read_raw(
    buffer: &mut [u8],
    start: u64,
    num_bytes: u64,
) -> Result<RawView<'_>, AccessViolation> {
    let end = check_range(start, num_bytes, buffer_size(buffer), true)?;
    Ok(RawView::Backed(
        &mut buffer[to_offset(start)..to_offset(end)],
    ))
}

fn buffer_write_raw(buffer: &mut [u8], data: &[u8], start: u64) -> Result<(), AccessViolation> {
    let end = check_range(start, data.len() as u64, buffer_size(buffer), false)?;
    buffer[to_offset(start)..to_offset(end)].copy_from_slice(data);
    Ok(())
}

/// Memory that owns a fixed-size, zero-initialized byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicMemory {
    data: Box<[u8]>,
}

impl BasicMemory {
    /// Allocates `size` zeroed bytes.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size].into_boxed_slice(),
        }
    }

    /// Takes ownership of an existing memory image.
    #[must_use]
    pub fn from_bytes(data: impl Into<Box<[u8]>>) -> Self {
        Self { data: data.into() }
    }

    /// Borrows the full memory image.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Borrows the full memory image for mutation, e.g. to load a program.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Releases the memory image.
    #[must_use]
    pub fn into_bytes(self) -> Box<[u8]> {
        self.data
    }
}

impl Memory for BasicMemory {
    fn size(&self) -> u64 {
        buffer_size(&self.data)
    }

    fn read_one_byte(&self, index: u64) -> Result<u8, AccessViolation> {
        buffer_read_one(&self.data, index)
    }

    fn write_one_byte(&mut self, value: u8, index: u64) -> Result<(), AccessViolation> {
        buffer_write_one(&mut self.data, value, index)
    }

    fn read_raw(&mut self, start: u64, num_bytes: u64) -> Result<RawView<'_>, AccessViolation> {
        buffer_read_raw(&mut self.data, start, num_bytes)
    }

    fn write_raw(&mut self, data: &[u8], start: u64) -> Result<(), AccessViolation> {
        buffer_write_raw(&mut self.data, data, start)
    }
}

/// Zero-copy memory view over a caller-owned buffer.
#[derive(Debug, PartialEq, Eq)]
pub struct SliceMemory<'a> {
    data: &'a mut [u8],
}

impl<'a> SliceMemory<'a> {
    /// Wraps `data`; the memory size is `data.len()`.
    #[must_use]
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data }
    }

    /// Borrows the viewed buffer.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &*self.data
    }
}

impl Memory for SliceMemory<'_> {
    fn size(&self) -> u64 {
        buffer_size(&*self.data)
    }

    fn read_one_byte(&self, index: u64) -> Result<u8, AccessViolation> {
        buffer_read_one(&*self.data, index)
    }

    fn write_one_byte(&mut self, value: u8, index: u64) -> Result<(), AccessViolation> {
        buffer_write_one(self.data, value, index)
    }

    fn read_raw(&mut self, start: u64, num_bytes: u64) -> Result<RawView<'_>, AccessViolation> {
        buffer_read_raw(self.data, start, num_bytes)
    }

    fn write_raw(&mut self, data: &[u8], start: u64) -> Result<(), AccessViolation> {
        buffer_write_raw(self.data, data, start)
    }
}
