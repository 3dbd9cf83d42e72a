//! Fixed-width register cells with integer and floating-point views.

/// Index-addressed register bank with a designated program counter.
pub mod bank;
/// Word widths and bit-exact float reinterpretation.
pub mod word;

pub use bank::RegisterBank;
pub use word::{FloatWord, Word};

/// A fixed-width register cell.
///
/// The integer view and the float view (for widths implementing
/// [`FloatWord`]) share the same storage: switching views moves the bit
/// pattern unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Register<W: Word> {
    /// Ordinary register holding a word of state.
    Storage(W),
    /// Hardwired zero register: reads yield zero and writes are discarded.
    Zero,
}

impl<W: Word> Default for Register<W> {
    fn default() -> Self {
        Self::Storage(W::ZERO)
    }
}

impl<W: Word> Register<W> {
    /// Creates a writable register holding `value`.
    #[must_use]
    pub const fn new(value: W) -> Self {
        Self::Storage(value)
    }

    /// Creates a hardwired zero register.
    #[must_use]
    pub const fn zero() -> Self {
        Self::Zero
    }

    /// Returns `true` when writes are stored, `false` for the zero register.
    #[must_use]
    pub const fn can_write(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Reads the integer view.
    #[must_use]
    pub const fn value(&self) -> W {
        match self {
            Self::Storage(value) => *value,
            Self::Zero => W::ZERO,
        }
    }

    /// Writes the integer view. Ignored by the zero register.
    pub fn set_value(&mut self, value: W) {
        if let Self::Storage(slot) = self {
            *slot = value;
        }
    }

    /// Adds one to the integer view, wrapping at the register width.
    pub fn increment(&mut self) {
        self.set_value(self.value().wrapping_add(W::ONE));
    }

    /// Subtracts one from the integer view, wrapping at the register width.
    pub fn decrement(&mut self) {
        self.set_value(self.value().wrapping_sub(W::ONE));
    }

    /// Advances a program counter by `byte_delta` bytes.
    ///
    /// The delta is reduced modulo the register width before the add.
    pub fn increment_as_pc(&mut self, byte_delta: u64) {
        self.set_value(self.value().wrapping_add(W::truncate_from_u64(byte_delta)));
    }

    /// Moves a program counter back by `byte_delta` bytes.
    pub fn decrement_as_pc(&mut self, byte_delta: u64) {
        self.set_value(self.value().wrapping_sub(W::truncate_from_u64(byte_delta)));
    }

    /// Widens the integer view to a 64-bit memory address.
    #[must_use]
    pub fn read_as_pc(&self) -> u64 {
        self.value().to_u64()
    }
}

impl<W: FloatWord> Register<W> {
    /// Reads the float view (bit reinterpretation of the stored word).
    #[must_use]
    pub fn float_value(&self) -> W::Float {
        self.value().to_float()
    }

    /// Writes the float view by storing the float's bit pattern.
    pub fn set_from_float(&mut self, value: W::Float) {
        self.set_value(W::from_float(value));
    }

    /// Adds `1.0` through the float view.
    pub fn increment_float(&mut self) {
        self.set_from_float(self.float_value() + W::FLOAT_ONE);
    }

    /// Subtracts `1.0` through the float view.
    pub fn decrement_float(&mut self) {
        self.set_from_float(self.float_value() - W::FLOAT_ONE);
    }
}
