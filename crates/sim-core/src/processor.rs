//! Shared processor state: byte order, memory, and register bank.

use crate::memory::{read_word, write_word};
use crate::{AccessViolation, BasicMemory, ByteOrder, CoreConfig, Memory, RegisterBank, Word};

/// Processor state shared by every execution strategy.
///
/// `W` is the register width; `M` is the memory implementation. The program
/// counter is the register designated by the bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorCore<W: Word, M: Memory = BasicMemory> {
    byte_order: ByteOrder,
    memory: M,
    registers: RegisterBank<W>,
}

impl<W: Word> ProcessorCore<W, BasicMemory> {
    /// Builds a core with a zeroed [`BasicMemory`] sized by `config`.
    #[must_use]
    pub fn with_config(config: &CoreConfig, registers: RegisterBank<W>) -> Self {
        Self::new(
            config.byte_order,
            BasicMemory::new(config.memory_size),
            registers,
        )
    }
}

impl<W: Word, M: Memory> ProcessorCore<W, M> {
    /// Composes a core from its parts.
    #[must_use]
    pub const fn new(byte_order: ByteOrder, memory: M, registers: RegisterBank<W>) -> Self {
        Self {
            byte_order,
            memory,
            registers,
        }
    }

    /// Byte order used for every multi-byte memory access.
    #[must_use]
    pub const fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Borrows the memory.
    #[must_use]
    pub const fn memory(&self) -> &M {
        &self.memory
    }

    /// Borrows the memory for mutation.
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Borrows the register bank.
    #[must_use]
    pub const fn registers(&self) -> &RegisterBank<W> {
        &self.registers
    }

    /// Borrows the register bank for mutation.
    pub fn registers_mut(&mut self) -> &mut RegisterBank<W> {
        &mut self.registers
    }

    /// Current program counter as a 64-bit address.
    #[must_use]
    pub fn pc(&self) -> u64 {
        self.registers.pc().read_as_pc()
    }

    /// Sets the program counter, truncating `addr` to the register width.
    pub fn set_pc(&mut self, addr: u64) {
        self.registers.pc_mut().set_value(W::truncate_from_u64(addr));
    }

    /// Advances the program counter by `byte_delta`.
    pub fn advance_pc(&mut self, byte_delta: u64) {
        self.registers.pc_mut().increment_as_pc(byte_delta);
    }

    /// Moves the program counter back by `byte_delta`.
    pub fn rewind_pc(&mut self, byte_delta: u64) {
        self.registers.pc_mut().decrement_as_pc(byte_delta);
    }

    /// Reads a `T`-sized word at `addr` using the core byte order.
    ///
    /// # Errors
    ///
    /// Returns the memory's [`AccessViolation`] unchanged.
    pub fn read_word<T: Word>(&mut self, addr: u64) -> Result<T, AccessViolation> {
        read_word(&mut self.memory, self.byte_order, addr)
    }

    /// Writes a `T`-sized word at `addr` using the core byte order.
    ///
    /// # Errors
    ///
    /// Returns the memory's [`AccessViolation`] unchanged.
    pub fn write_word<T: Word>(&mut self, value: T, addr: u64) -> Result<(), AccessViolation> {
        write_word(&mut self.memory, self.byte_order, value, addr)
    }

    /// Reads the `T`-sized word at the program counter without advancing it.
    ///
    /// # Errors
    ///
    /// Returns the memory's [`AccessViolation`] unchanged.
    pub fn fetch<T: Word>(&mut self) -> Result<T, AccessViolation> {
        let pc = self.pc();
        self.read_word(pc)
    }

    /// Releases the memory and register bank.
    #[must_use]
    pub fn into_parts(self) -> (M, RegisterBank<W>) {
        (self.memory, self.registers)
    }
}
