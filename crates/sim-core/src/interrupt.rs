//! Delayed actions layered over any [`Processor`].
//!
//! Producers hand [`InterruptAction`]s to a bounded queue. After every
//! successful inner step the scheduler drains the queue into its pending list,
//! fires each action whose delay reached zero, and ages the rest by one.
//! A failed inner step neither drains, fires, nor ages anything.

use std::borrow::Cow;
use std::fmt;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use thiserror::Error;
use tracing::debug;

use crate::{ConfigError, CoreConfig, Processor, TraceEvent, TraceSink};

type ActionFn = Box<dyn FnOnce() + Send>;

/// A callback scheduled to run a number of successful steps from now.
///
/// A delay of `d` fires on the `(d + 1)`-th successful step counting from the
/// step that drained the action from the queue.
pub struct InterruptAction {
    action: ActionFn,
    delay: u64,
    description: Cow<'static, str>,
}

impl InterruptAction {
    /// Wraps `action` with the given delay and an empty description.
    #[must_use]
    pub fn new(delay: u64, action: impl FnOnce() + Send + 'static) -> Self {
        Self {
            action: Box::new(action),
            delay,
            description: Cow::Borrowed(""),
        }
    }

    /// Attaches a tag used in logs and trace events.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = description.into();
        self
    }

    /// Steps remaining before the action fires.
    #[must_use]
    pub const fn delay(&self) -> u64 {
        self.delay
    }

    /// Tag supplied at creation.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    fn fire(self) {
        (self.action)();
    }
}

impl fmt::Debug for InterruptAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterruptAction")
            .field("delay", &self.delay)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Submission failures. Both variants hand the action back to the caller.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The bounded queue has no free slot.
    #[error("interrupt queue is full")]
    QueueFull(InterruptAction),
    /// The scheduler that owned the queue has been dropped.
    #[error("interrupt scheduler is gone")]
    Disconnected(InterruptAction),
}

impl SubmitError {
    /// Recovers the rejected action.
    #[must_use]
    pub fn into_action(self) -> InterruptAction {
        match self {
            Self::QueueFull(action) | Self::Disconnected(action) => action,
        }
    }
}

impl From<TrySendError<InterruptAction>> for SubmitError {
    fn from(err: TrySendError<InterruptAction>) -> Self {
        match err {
            TrySendError::Full(action) => Self::QueueFull(action),
            TrySendError::Disconnected(action) => Self::Disconnected(action),
        }
    }
}

/// Cloneable producer handle for an [`InterruptScheduler`].
///
/// Safe to move to other threads. Code running inside a firing action runs on
/// the stepping thread and must use [`InterruptSender::try_submit`]; a
/// blocking submit there can never be drained.
#[derive(Debug, Clone)]
pub struct InterruptSender {
    queue: SyncSender<InterruptAction>,
}

impl InterruptSender {
    /// Enqueues `action`, blocking while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Disconnected`] once the scheduler is dropped.
    pub fn submit(&self, action: InterruptAction) -> Result<(), SubmitError> {
        self.queue
            .send(action)
            .map_err(|err| SubmitError::Disconnected(err.0))
    }

    /// Enqueues `action` without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::QueueFull`] when no slot is free and
    /// [`SubmitError::Disconnected`] once the scheduler is dropped.
    pub fn try_submit(&self, action: InterruptAction) -> Result<(), SubmitError> {
        self.queue.try_send(action).map_err(SubmitError::from)
    }
}

/// Wraps a processor and runs delayed actions between its steps.
pub struct InterruptScheduler<P: Processor> {
    inner: P,
    sender: InterruptSender,
    queue: Receiver<InterruptAction>,
    pending: Vec<InterruptAction>,
    capacity: usize,
    trace_sink: Option<Box<dyn TraceSink + Send>>,
}

impl<P: Processor> InterruptScheduler<P> {
    /// Wraps `inner` with a submission queue holding up to `capacity` actions.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroQueueCapacity`] when `capacity` is zero.
    pub fn new(inner: P, capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        let (queue_tx, queue_rx) = mpsc::sync_channel(capacity);
        Ok(Self {
            inner,
            sender: InterruptSender { queue: queue_tx },
            queue: queue_rx,
            pending: Vec::new(),
            capacity,
            trace_sink: None,
        })
    }

    /// Wraps `inner` using the queue capacity from `config`.
    ///
    /// # Errors
    ///
    /// Returns the error from [`CoreConfig::validate`].
    pub fn with_config(inner: P, config: &CoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(inner, config.interrupt_queue_capacity)
    }

    /// Installs a trace sink that is told about every fired action.
    #[must_use]
    pub fn with_trace_sink(mut self, sink: impl TraceSink + Send + 'static) -> Self {
        self.trace_sink = Some(Box::new(sink));
        self
    }

    /// Returns a new producer handle.
    #[must_use]
    pub fn sender(&self) -> InterruptSender {
        self.sender.clone()
    }

    /// Enqueues `action` from the stepping thread without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::QueueFull`] when no slot is free.
    pub fn try_submit(&self, action: InterruptAction) -> Result<(), SubmitError> {
        self.sender.try_submit(action)
    }

    /// Number of drained actions still waiting to fire.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drained actions in firing order.
    #[must_use]
    pub fn pending(&self) -> &[InterruptAction] {
        &self.pending
    }

    /// Capacity of the submission queue.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Borrows the wrapped processor.
    #[must_use]
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    /// Borrows the wrapped processor for mutation.
    pub fn inner_mut(&mut self) -> &mut P {
        &mut self.inner
    }

    /// Drops the scheduler and returns the wrapped processor.
    ///
    /// Queued and pending actions are discarded without running.
    #[must_use]
    pub fn into_inner(self) -> P {
        self.inner
    }

    fn drain_queue(&mut self) {
        let before = self.pending.len();
        while let Ok(action) = self.queue.try_recv() {
            self.pending.push(action);
        }
        let drained = self.pending.len() - before;
        if drained > 0 {
            debug!(drained, pending = self.pending.len(), "drained interrupt actions");
        }
    }

    fn fire_ready(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        let mut survivors = Vec::with_capacity(pending.len());
        for mut action in pending {
            if action.delay == 0 {
                debug!(description = %action.description, "firing interrupt action");
                if let Some(sink) = self.trace_sink.as_mut() {
                    sink.on_event(TraceEvent::ActionFired {
                        description: &action.description,
                    });
                }
                action.fire();
            } else {
                action.delay -= 1;
                survivors.push(action);
            }
        }
        self.pending = survivors;
    }
}

impl<P: Processor> Processor for InterruptScheduler<P> {
    type Error = P::Error;

    fn step(&mut self) -> Result<(), Self::Error> {
        self.inner.step()?;
        self.drain_queue();
        self.fire_ready();
        Ok(())
    }
}

impl<P: Processor + fmt::Debug> fmt::Debug for InterruptScheduler<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterruptScheduler")
            .field("inner", &self.inner)
            .field("pending", &self.pending)
            .field("capacity", &self.capacity)
            .field("trace_sink", &self.trace_sink.is_some())
            .finish_non_exhaustive()
    }
}
