use thiserror::Error;

/// Memory fault describing the exact access request that was rejected.
///
/// Produced by [`crate::Memory`] implementations when an access range runs
/// past the end of the buffer or when `location + num_bytes` overflows the
/// 64-bit address width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[error("cannot access memory location {location:#x} ({num_bytes} bytes, was_read: {was_read})")]
pub struct AccessViolation {
    /// First address of the rejected request.
    pub location: u64,
    /// Length in bytes of the rejected request.
    pub num_bytes: u64,
    /// `true` for reads, `false` for writes.
    pub was_read: bool,
}

impl AccessViolation {
    /// Builds a fault for a rejected read.
    #[must_use]
    pub const fn read(location: u64, num_bytes: u64) -> Self {
        Self {
            location,
            num_bytes,
            was_read: true,
        }
    }

    /// Builds a fault for a rejected write.
    #[must_use]
    pub const fn write(location: u64, num_bytes: u64) -> Self {
        Self {
            location,
            num_bytes,
            was_read: false,
        }
    }
}

/// Error surfaced by a single processor step.
///
/// `E` is the integrator-defined error type of the instruction runner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError<E> {
    /// Instruction fetch hit a memory fault that no fault handler absorbed.
    #[error(transparent)]
    AccessViolation(#[from] AccessViolation),
    /// The instruction runner rejected or failed to execute the fetched word.
    #[error("instruction runner failed: {0}")]
    Runner(E),
}

impl<E> StepError<E> {
    /// Returns the memory fault carried by this error, if any.
    #[must_use]
    pub const fn access_violation(&self) -> Option<&AccessViolation> {
        match self {
            Self::AccessViolation(fault) => Some(fault),
            Self::Runner(_) => None,
        }
    }

    /// Returns the runner error carried by this error, if any.
    #[must_use]
    pub const fn runner_error(&self) -> Option<&E> {
        match self {
            Self::AccessViolation(_) => None,
            Self::Runner(err) => Some(err),
        }
    }
}

/// Rejected construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ConfigError {
    /// The program-counter designation points outside the register bank.
    #[error("program counter index {index} is outside a bank of {len} registers")]
    PcIndexOutOfRange {
        /// Requested program-counter index.
        index: usize,
        /// Number of registers in the bank.
        len: usize,
    },
    /// The zero register discards writes and cannot hold a program counter.
    #[error("register {index} is a zero register and cannot be the program counter")]
    ZeroRegisterAsPc {
        /// Requested program-counter index.
        index: usize,
    },
    /// A bounded submission queue needs room for at least one action.
    #[error("interrupt queue capacity must be non-zero")]
    ZeroQueueCapacity,
}

#[cfg(test)]
mod tests {
    use super::{AccessViolation, ConfigError, StepError};

    #[test]
    fn constructors_record_access_direction() {
        assert_eq!(
            AccessViolation::read(0x10, 4),
            AccessViolation {
                location: 0x10,
                num_bytes: 4,
                was_read: true
            }
        );
        assert!(!AccessViolation::write(0x10, 4).was_read);
    }

    #[test]
    fn access_violation_message_names_location_and_length() {
        let message = AccessViolation::write(0x400, 8).to_string();
        assert_eq!(
            message,
            "cannot access memory location 0x400 (8 bytes, was_read: false)"
        );
    }

    #[test]
    fn step_error_is_transparent_over_memory_faults() {
        let fault = AccessViolation::read(0xFFFF, 2);
        let err: StepError<&str> = fault.into();

        assert_eq!(err.to_string(), fault.to_string());
        assert_eq!(err.access_violation(), Some(&fault));
        assert_eq!(err.runner_error(), None);
    }

    #[test]
    fn step_error_wraps_runner_errors_verbatim() {
        let err: StepError<&str> = StepError::Runner("illegal opcode");

        assert_eq!(err.runner_error(), Some(&"illegal opcode"));
        assert!(err.access_violation().is_none());
        assert_eq!(err.to_string(), "instruction runner failed: illegal opcode");
    }

    #[test]
    fn config_errors_render_offending_values() {
        assert_eq!(
            ConfigError::PcIndexOutOfRange { index: 9, len: 4 }.to_string(),
            "program counter index 9 is outside a bank of 4 registers"
        );
        assert_eq!(
            ConfigError::ZeroQueueCapacity.to_string(),
            "interrupt queue capacity must be non-zero"
        );
    }
}
