//! Host-facing configuration, stepping contract, and trace hooks.

use crate::{AccessViolation, ByteOrder, ConfigError};

/// Default memory size in bytes (64 KiB).
pub const DEFAULT_MEMORY_BYTES: usize = 0x1_0000;

/// Default capacity of the interrupt submission queue.
pub const DEFAULT_INTERRUPT_QUEUE_CAPACITY: usize = 16;

/// Top-level immutable configuration for a simulated processor.
///
/// Register bank contents, the program-counter designation, and the
/// instruction width are supplied separately as typed values.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreConfig {
    /// Size of the owned memory image in bytes.
    pub memory_size: usize,
    /// Byte order applied to every multi-byte memory access.
    pub byte_order: ByteOrder,
    /// Capacity of the bounded interrupt submission queue.
    pub interrupt_queue_capacity: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_BYTES,
            byte_order: ByteOrder::Little,
            interrupt_queue_capacity: DEFAULT_INTERRUPT_QUEUE_CAPACITY,
        }
    }
}

impl CoreConfig {
    /// Checks parameters that cannot be expressed through the types alone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroQueueCapacity`] when the interrupt queue
    /// capacity is zero.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.interrupt_queue_capacity == 0 {
            Err(ConfigError::ZeroQueueCapacity)
        } else {
            Ok(())
        }
    }
}

/// A simulated processor that advances one instruction per step.
pub trait Processor {
    /// Error returned when a step cannot complete.
    type Error;

    /// Runs the next instruction.
    ///
    /// # Errors
    ///
    /// Returns an implementation-defined error for any unhandled fault.
    fn step(&mut self) -> Result<(), Self::Error>;

    /// Runs `count` steps, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first step error unchanged.
    fn run_steps(&mut self, count: u64) -> Result<(), Self::Error> {
        for _ in 0..count {
            self.step()?;
        }
        Ok(())
    }
}

impl<P: Processor + ?Sized> Processor for &mut P {
    type Error = P::Error;

    fn step(&mut self) -> Result<(), Self::Error> {
        (**self).step()
    }
}

impl<P: Processor + ?Sized> Processor for Box<P> {
    type Error = P::Error;

    fn step(&mut self) -> Result<(), Self::Error> {
        (**self).step()
    }
}

/// Deterministic trace events emitted in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent<'a> {
    /// An instruction word was fetched and is about to be dispatched.
    InstructionFetched {
        /// Program counter used for the fetch.
        pc: u64,
        /// Fetched word, zero-extended.
        bits: u64,
    },
    /// An instruction fetch faulted.
    FetchFault {
        /// The raw fault, before any fault handler ran.
        fault: AccessViolation,
    },
    /// A delayed interrupt action fired.
    ActionFired {
        /// Tag supplied when the action was created.
        description: &'a str,
    },
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent<'_>);
}
