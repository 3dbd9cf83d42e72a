//! Reusable building blocks for instruction-set simulators.
//!
//! A concrete machine supplies only its instruction semantics through
//! [`InstructionRunner`]; memory, registers, the fetch/execute cycle, and the
//! delayed-action scheduler come from this crate.

/// Memory fault and step error types.
pub mod fault;
pub use fault::{AccessViolation, ConfigError, StepError};

/// Byte-addressable memory contract, implementations, and typed access.
pub mod memory;
pub use memory::{
    check_index, check_range, read_f32, read_f64, read_u16, read_u32, read_u64, read_word,
    write_f32, write_f64, write_u16, write_u32, write_u64, write_word, BasicMemory, ByteOrder,
    Memory, RawView, SliceMemory,
};

/// Fixed-width registers with integer and float views.
pub mod registers;
pub use registers::{FloatWord, Register, RegisterBank, Word};

/// Host-facing configuration, stepping contract, and trace hooks.
pub mod api;
pub use api::{
    CoreConfig, Processor, TraceEvent, TraceSink, DEFAULT_INTERRUPT_QUEUE_CAPACITY,
    DEFAULT_MEMORY_BYTES,
};

/// Shared processor state.
pub mod processor;
pub use processor::ProcessorCore;

/// Fixed-length fetch/execute cycle.
pub mod cycle;
pub use cycle::{FaultHandler, FixedLengthCycle, InstructionRunner};

/// Delayed interrupt actions over any processor.
pub mod interrupt;
pub use interrupt::{InterruptAction, InterruptScheduler, InterruptSender, SubmitError};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use serde_json as _;
