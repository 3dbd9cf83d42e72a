//! Fixed-width word kinds shared by registers and typed memory access.

use std::fmt::Debug;
use std::hash::Hash;
use std::ops::{Add, Sub};

use half::f16;

use crate::ByteOrder;

mod sealed {
    pub trait Sealed {}
}

/// Unsigned integer storage width usable as a register or instruction word.
///
/// Implemented for `u8`, `u16`, `u32`, and `u64` only.
pub trait Word:
    sealed::Sealed + Copy + Eq + Ord + Hash + Default + Debug + Send + Sync + 'static
{
    /// Width of the word in bytes.
    const BYTES: usize;
    /// The all-zero bit pattern.
    const ZERO: Self;
    /// The integer value one.
    const ONE: Self;

    /// Fixed-size byte buffer holding one encoded word.
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default;

    /// Zero-extends the word to a 64-bit value.
    fn to_u64(self) -> u64;

    /// Keeps the low `BYTES * 8` bits of `value`.
    fn truncate_from_u64(value: u64) -> Self;

    /// Modular addition at this width.
    #[must_use]
    fn wrapping_add(self, rhs: Self) -> Self;

    /// Modular subtraction at this width.
    #[must_use]
    fn wrapping_sub(self, rhs: Self) -> Self;

    /// Encodes the word using `order`.
    fn to_bytes(self, order: ByteOrder) -> Self::Bytes;

    /// Decodes a word previously laid out in memory using `order`.
    fn from_bytes(bytes: Self::Bytes, order: ByteOrder) -> Self;
}

/// Word width that also has an IEEE-754 floating-point view of equal size.
///
/// Conversions between the views move the bit pattern unchanged; they are
/// never numeric casts.
pub trait FloatWord: Word {
    /// Floating-point type with the same bit width as the word.
    type Float: Copy
        + PartialEq
        + PartialOrd
        + Default
        + Debug
        + Add<Output = Self::Float>
        + Sub<Output = Self::Float>;

    /// The float value one.
    const FLOAT_ONE: Self::Float;

    /// Reinterprets the word's bits as a float.
    fn to_float(self) -> Self::Float;

    /// Reinterprets a float's bits as a word.
    fn from_float(value: Self::Float) -> Self;
}

macro_rules! impl_word {
    ($($ty:ty),+ $(,)?) => {$(
        impl sealed::Sealed for $ty {}

        impl Word for $ty {
            const BYTES: usize = std::mem::size_of::<$ty>();
            const ZERO: Self = 0;
            const ONE: Self = 1;

            type Bytes = [u8; std::mem::size_of::<$ty>()];

            #[allow(clippy::useless_conversion)]
            fn to_u64(self) -> u64 {
                u64::from(self)
            }

            #[allow(clippy::cast_possible_truncation, clippy::unnecessary_cast)]
            fn truncate_from_u64(value: u64) -> Self {
                value as $ty
            }

            fn wrapping_add(self, rhs: Self) -> Self {
                <$ty>::wrapping_add(self, rhs)
            }

            fn wrapping_sub(self, rhs: Self) -> Self {
                <$ty>::wrapping_sub(self, rhs)
            }

            fn to_bytes(self, order: ByteOrder) -> Self::Bytes {
                match order {
                    ByteOrder::Big => self.to_be_bytes(),
                    ByteOrder::Little => self.to_le_bytes(),
                }
            }

            fn from_bytes(bytes: Self::Bytes, order: ByteOrder) -> Self {
                match order {
                    ByteOrder::Big => <$ty>::from_be_bytes(bytes),
                    ByteOrder::Little => <$ty>::from_le_bytes(bytes),
                }
            }
        }
    )+};
}

impl_word!(u8, u16, u32, u64);

macro_rules! impl_float_word {
    ($($ty:ty => $float:ty, $one:expr);+ $(;)?) => {$(
        impl FloatWord for $ty {
            type Float = $float;

            const FLOAT_ONE: Self::Float = $one;

            fn to_float(self) -> Self::Float {
                <$float>::from_bits(self)
            }

            fn from_float(value: Self::Float) -> Self {
                value.to_bits()
            }
        }
    )+};
}

impl_float_word! {
    u16 => f16, f16::ONE;
    u32 => f32, 1.0;
    u64 => f64, 1.0;
}
