//! Fixed-length fetch/execute cycle driven by an injected instruction runner.
//!
//! One step:
//! 1. Read the program counter as a 64-bit address
//! 2. Fetch one `I`-sized word with the core byte order
//! 3. On a fetch fault, hand the fault to the fault handler (if any) and stop
//! 4. Otherwise advance the program counter by the instruction width
//! 5. Dispatch the word to the runner and return its result
//!
//! The program counter advances before dispatch regardless of the runner's
//! outcome. A failing runner keeps whatever side effects it already made.

use std::fmt;
use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::{
    AccessViolation, BasicMemory, Memory, Processor, ProcessorCore, StepError, TraceEvent,
    TraceSink, Word,
};

/// Executes one fetched instruction word against processor state.
///
/// `W` is the register width, `I` the instruction width, and `M` the memory
/// type. Implementations own all instruction-set semantics, including any
/// further program-counter changes such as branches.
pub trait InstructionRunner<W: Word, I: Word, M: Memory = BasicMemory> {
    /// Error reported for instructions that cannot execute.
    type Error;

    /// Runs one instruction. The program counter already points past it.
    ///
    /// # Errors
    ///
    /// Returns an implementation-defined error for illegal or failing
    /// instructions.
    fn run(&mut self, core: &mut ProcessorCore<W, M>, instruction: I) -> Result<(), Self::Error>;
}

impl<W, I, M, E, F> InstructionRunner<W, I, M> for F
where
    W: Word,
    I: Word,
    M: Memory,
    F: FnMut(&mut ProcessorCore<W, M>, I) -> Result<(), E>,
{
    type Error = E;

    fn run(&mut self, core: &mut ProcessorCore<W, M>, instruction: I) -> Result<(), E> {
        self(core, instruction)
    }
}

/// Callback consulted when an instruction fetch faults.
///
/// Returning `Ok(())` suppresses the fault; returning an error replaces it.
pub type FaultHandler<E> = Box<dyn FnMut(AccessViolation) -> Result<(), StepError<E>> + Send>;

/// Fetches one fixed-width instruction per step and dispatches it to `R`.
pub struct FixedLengthCycle<W, I, R, M = BasicMemory>
where
    W: Word,
    I: Word,
    M: Memory,
    R: InstructionRunner<W, I, M>,
{
    core: ProcessorCore<W, M>,
    runner: R,
    fault_handler: Option<FaultHandler<R::Error>>,
    trace_sink: Option<Box<dyn TraceSink + Send>>,
    instruction: PhantomData<fn() -> I>,
}

impl<W, I, R, M> FixedLengthCycle<W, I, R, M>
where
    W: Word,
    I: Word,
    M: Memory,
    R: InstructionRunner<W, I, M>,
{
    /// Width of one instruction in bytes.
    pub const INSTRUCTION_BYTES: u64 = I::BYTES as u64;

    /// Creates a cycle with no fault handler.
    #[must_use]
    pub fn new(core: ProcessorCore<W, M>, runner: R) -> Self {
        Self {
            core,
            runner,
            fault_handler: None,
            trace_sink: None,
            instruction: PhantomData,
        }
    }

    /// Installs a fetch-fault handler.
    #[must_use]
    pub fn with_fault_handler(
        mut self,
        handler: impl FnMut(AccessViolation) -> Result<(), StepError<R::Error>> + Send + 'static,
    ) -> Self {
        self.fault_handler = Some(Box::new(handler));
        self
    }

    /// Installs a deterministic trace sink.
    #[must_use]
    pub fn with_trace_sink(mut self, sink: impl TraceSink + Send + 'static) -> Self {
        self.trace_sink = Some(Box::new(sink));
        self
    }

    /// Borrows the processor state.
    #[must_use]
    pub const fn core(&self) -> &ProcessorCore<W, M> {
        &self.core
    }

    /// Borrows the processor state for mutation.
    pub fn core_mut(&mut self) -> &mut ProcessorCore<W, M> {
        &mut self.core
    }

    /// Borrows the instruction runner.
    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Borrows the instruction runner for mutation.
    pub fn runner_mut(&mut self) -> &mut R {
        &mut self.runner
    }

    /// Releases the processor state and runner.
    #[must_use]
    pub fn into_parts(self) -> (ProcessorCore<W, M>, R) {
        (self.core, self.runner)
    }

    fn emit(&mut self, event: TraceEvent<'_>) {
        if let Some(sink) = self.trace_sink.as_mut() {
            sink.on_event(event);
        }
    }

    fn fetch_fault(&mut self, pc: u64, fault: AccessViolation) -> Result<(), StepError<R::Error>> {
        debug!(pc, %fault, "instruction fetch faulted");
        self.emit(TraceEvent::FetchFault { fault });

        let Some(handler) = self.fault_handler.as_mut() else {
            return Err(StepError::AccessViolation(fault));
        };
        let outcome = handler(fault);
        if outcome.is_ok() {
            debug!(pc, "fetch fault suppressed by handler");
        }
        outcome
    }
}

impl<W, I, R, M> Processor for FixedLengthCycle<W, I, R, M>
where
    W: Word,
    I: Word,
    M: Memory,
    R: InstructionRunner<W, I, M>,
{
    type Error = StepError<R::Error>;

    fn step(&mut self) -> Result<(), Self::Error> {
        let pc = self.core.pc();
        let instruction = match self.core.read_word::<I>(pc) {
            Ok(instruction) => instruction,
            Err(fault) => return self.fetch_fault(pc, fault),
        };

        trace!(pc, bits = instruction.to_u64(), "fetched instruction");
        self.emit(TraceEvent::InstructionFetched {
            pc,
            bits: instruction.to_u64(),
        });

        self.core.advance_pc(Self::INSTRUCTION_BYTES);
        self.runner
            .run(&mut self.core, instruction)
            .map_err(StepError::Runner)
    }
}

impl<W, I, R, M> fmt::Debug for FixedLengthCycle<W, I, R, M>
where
    W: Word,
    I: Word,
    M: Memory + fmt::Debug,
    R: InstructionRunner<W, I, M> + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedLengthCycle")
            .field("core", &self.core)
            .field("runner", &self.runner)
            .field("instruction_bytes", &Self::INSTRUCTION_BYTES)
            .field("fault_handler", &self.fault_handler.is_some())
            .field("trace_sink", &self.trace_sink.is_some())
            .finish()
    }
}
