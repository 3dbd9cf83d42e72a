//! Firing-order guarantees of the interrupt scheduler over real and stub processors.

#![allow(clippy::pedantic, clippy::nursery)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use half as _;
use proptest::prelude::*;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use serde_json as _;
use sim_core::{
    BasicMemory, ByteOrder, CoreConfig, FixedLengthCycle, InterruptAction, InterruptScheduler,
    InterruptSender, Processor, ProcessorCore, RegisterBank, StepError, SubmitError,
};
use thiserror as _;
use tracing as _;

/// Counts steps and fails exactly on the listed step numbers (1-based).
#[derive(Debug, Default)]
struct Scripted {
    attempts: u64,
    failing: Vec<u64>,
}

impl Processor for Scripted {
    type Error = u64;

    fn step(&mut self) -> Result<(), u64> {
        self.attempts += 1;
        if self.failing.contains(&self.attempts) {
            Err(self.attempts)
        } else {
            Ok(())
        }
    }
}

type Log = Arc<Mutex<Vec<String>>>;

fn recorder(log: &Log, delay: u64, name: &str) -> InterruptAction {
    let log = Arc::clone(log);
    let entry = name.to_owned();
    InterruptAction::new(delay, move || log.lock().expect("log lock").push(entry))
        .with_description(name.to_owned())
}

fn snapshot(log: &Log) -> Vec<String> {
    log.lock().expect("log lock").clone()
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(5)]
fn delay_fires_on_step_delay_plus_one(#[case] delay: u64) {
    let log = Log::default();
    let mut scheduler = InterruptScheduler::new(Scripted::default(), 4).expect("capacity");
    scheduler.try_submit(recorder(&log, delay, "x")).expect("room");

    for _ in 0..delay {
        scheduler.step().expect("step");
        assert!(snapshot(&log).is_empty());
    }
    scheduler.step().expect("firing step");
    assert_eq!(snapshot(&log), ["x"]);
    assert_eq!(scheduler.pending_len(), 0);
}

#[test]
fn failed_steps_consume_no_delay() {
    let log = Log::default();
    let inner = Scripted {
        failing: vec![2, 3],
        ..Scripted::default()
    };
    let mut scheduler = InterruptScheduler::new(inner, 4).expect("capacity");
    scheduler.try_submit(recorder(&log, 1, "late")).expect("room");

    scheduler.step().expect("attempt 1");
    assert_eq!(scheduler.step(), Err(2));
    assert_eq!(scheduler.step(), Err(3));
    assert!(snapshot(&log).is_empty());
    assert_eq!(scheduler.pending()[0].delay(), 0);

    scheduler.step().expect("attempt 4");
    assert_eq!(snapshot(&log), ["late"]);
}

#[test]
fn ready_actions_fire_in_submission_order() {
    let log = Log::default();
    let mut scheduler = InterruptScheduler::new(Scripted::default(), 8).expect("capacity");
    for name in ["a", "b", "c"] {
        scheduler.try_submit(recorder(&log, 0, name)).expect("room");
    }
    scheduler.try_submit(recorder(&log, 1, "d")).expect("room");
    scheduler.try_submit(recorder(&log, 1, "e")).expect("room");

    scheduler.step().expect("step 1");
    assert_eq!(snapshot(&log), ["a", "b", "c"]);
    scheduler.step().expect("step 2");
    assert_eq!(snapshot(&log), ["a", "b", "c", "d", "e"]);
}

#[test]
fn actions_submitted_by_a_firing_action_wait_for_the_next_step() {
    let log = Log::default();
    let mut scheduler = InterruptScheduler::new(Scripted::default(), 4).expect("capacity");
    let sender = scheduler.sender();
    let chained = recorder(&log, 0, "second");
    let first_log = Arc::clone(&log);
    scheduler
        .try_submit(InterruptAction::new(0, move || {
            first_log.lock().expect("log lock").push("first".to_owned());
            sender.try_submit(chained).expect("room");
        }))
        .expect("room");

    scheduler.step().expect("step 1");
    assert_eq!(snapshot(&log), ["first"]);
    scheduler.step().expect("step 2");
    assert_eq!(snapshot(&log), ["first", "second"]);
}

/// Inner processor that submits an action while it is stepping.
struct Submitting {
    sender: Option<InterruptSender>,
    log: Log,
}

impl Processor for Submitting {
    type Error = ();

    fn step(&mut self) -> Result<(), ()> {
        if let Some(sender) = self.sender.take() {
            sender
                .try_submit(recorder(&self.log, 0, "from-step"))
                .map_err(|_| ())?;
        }
        Ok(())
    }
}

#[test]
fn actions_submitted_during_the_inner_step_fire_in_that_step() {
    let log = Log::default();
    let inner = Submitting {
        sender: None,
        log: Arc::clone(&log),
    };
    let mut scheduler = InterruptScheduler::new(inner, 2).expect("capacity");
    scheduler.inner_mut().sender = Some(scheduler.sender());

    scheduler.step().expect("step");
    assert_eq!(snapshot(&log), ["from-step"]);
}

#[test]
fn producers_on_other_threads_are_drained_in_arrival_order() {
    let log = Log::default();
    let mut scheduler = InterruptScheduler::new(Scripted::default(), 2).expect("capacity");
    let sender = scheduler.sender();
    let producer_log = Arc::clone(&log);

    let producer = thread::spawn(move || {
        for index in 0..6 {
            sender
                .submit(recorder(&producer_log, 0, &format!("job-{index}")))
                .expect("scheduler alive");
        }
    });

    while snapshot(&log).len() < 6 {
        scheduler.step().expect("step");
        thread::yield_now();
    }
    producer.join().expect("producer finished");

    let expected: Vec<String> = (0..6).map(|index| format!("job-{index}")).collect();
    assert_eq!(snapshot(&log), expected);
}

#[test]
fn full_queue_rejects_without_losing_the_action() {
    let mut scheduler = InterruptScheduler::new(Scripted::default(), 1).expect("capacity");
    let sender = scheduler.sender();
    sender
        .try_submit(InterruptAction::new(0, || {}))
        .expect("room");

    match sender.try_submit(InterruptAction::new(2, || {}).with_description("spill")) {
        Err(SubmitError::QueueFull(action)) => {
            assert_eq!(action.description(), "spill");
            scheduler.step().expect("drains the queue");
            sender.try_submit(action).expect("room after drain");
        }
        other => panic!("expected QueueFull, got {other:?}"),
    }
    scheduler.step().expect("drains the retried action");
    assert_eq!(scheduler.pending_len(), 1);
}

#[test]
fn scheduler_drives_a_fetch_execute_cycle() {
    let config = CoreConfig {
        memory_size: 64,
        byte_order: ByteOrder::Big,
        interrupt_queue_capacity: 4,
    };
    let bank = RegisterBank::<u32>::zeroed(2, 1).expect("valid bank");
    let core = ProcessorCore::new(config.byte_order, BasicMemory::new(config.memory_size), bank);
    let executed = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&executed);
    let cycle = FixedLengthCycle::new(core, move |_: &mut ProcessorCore<u32>, _: u32| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok::<(), ()>(())
    });

    let mut scheduler = InterruptScheduler::with_config(cycle, &config).expect("valid config");
    let seen_at = Arc::new(AtomicU32::new(0));
    let observer = Arc::clone(&seen_at);
    let at_fire = Arc::clone(&executed);
    scheduler
        .try_submit(InterruptAction::new(2, move || {
            observer.store(at_fire.load(Ordering::SeqCst), Ordering::SeqCst);
        }))
        .expect("room");

    scheduler.run_steps(16).expect("all fetches in range");
    assert_eq!(seen_at.load(Ordering::SeqCst), 3);
    assert_eq!(
        scheduler.step(),
        Err(StepError::AccessViolation(sim_core::AccessViolation::read(
            64, 4
        )))
    );
    assert_eq!(scheduler.inner().core().pc(), 64);
}

proptest! {
    #[test]
    fn every_action_fires_exactly_once(delays in proptest::collection::vec(0_u64..6, 1..8)) {
        let log = Log::default();
        let mut scheduler = InterruptScheduler::new(Scripted::default(), 8).expect("capacity");
        for (index, delay) in delays.iter().enumerate() {
            scheduler
                .try_submit(recorder(&log, *delay, &index.to_string()))
                .expect("room");
        }

        for step in 0..6_u64 {
            scheduler.step().expect("step");
            let fired = snapshot(&log);
            let expected: Vec<String> = delays
                .iter()
                .enumerate()
                .filter(|(_, delay)| **delay <= step)
                .map(|(index, _)| index.to_string())
                .collect();
            let mut sorted = fired.clone();
            sorted.sort();
            let mut wanted = expected.clone();
            wanted.sort();
            prop_assert_eq!(sorted, wanted);
        }
        prop_assert_eq!(scheduler.pending_len(), 0);
    }
}
