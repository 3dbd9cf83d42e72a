//! Counts a register down to zero while a timer interrupt raises a flag.
//!
//! Run with `cargo run -p sim-core --example countdown`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use half as _;
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use serde_json as _;
use sim_core::{
    CoreConfig, FixedLengthCycle, InterruptAction, InterruptScheduler, Processor, ProcessorCore,
    Register, RegisterBank, StepError,
};
use thiserror as _;
use tracing as _;

const PC: usize = 3;
const COUNTER: usize = 1;

/// `0x01`: decrement the counter, `0x02`: jump back two instructions unless
/// the counter is zero, `0xFF`: halt.
fn run(core: &mut ProcessorCore<u16>, instruction: u8) -> Result<(), &'static str> {
    let counter = core
        .registers_mut()
        .get_mut(COUNTER)
        .ok_or("missing counter")?;
    match instruction {
        0x01 => counter.decrement(),
        0x02 => {
            if counter.value() != 0 {
                core.rewind_pc(2);
            }
        }
        0xFF => return Err("halt"),
        _ => return Err("illegal instruction"),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CoreConfig {
        memory_size: 16,
        ..CoreConfig::default()
    };
    let bank = RegisterBank::new(
        [
            Register::zero(),
            Register::new(10),
            Register::new(0),
            Register::new(0),
        ],
        PC,
    )?;
    let mut core = ProcessorCore::with_config(&config, bank);
    core.memory_mut().as_bytes_mut()[..3].copy_from_slice(&[0x01, 0x02, 0xFF]);

    let cycle = FixedLengthCycle::new(core, run);
    let mut machine = InterruptScheduler::with_config(cycle, &config)?;

    let timer_fired = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&timer_fired);
    machine.sender().submit(
        InterruptAction::new(5, move || flag.store(true, Ordering::SeqCst))
            .with_description("timer"),
    )?;

    let mut steps = 0_u32;
    let outcome = loop {
        match machine.step() {
            Ok(()) => steps += 1,
            Err(err) => break err,
        }
    };

    let core = machine.inner().core();
    println!(
        "stopped after {steps} steps at pc={:#x}: {outcome}",
        core.pc()
    );
    println!(
        "counter={} timer_fired={}",
        core.registers().get(COUNTER).map_or(0, Register::value),
        timer_fired.load(Ordering::SeqCst)
    );
    assert!(matches!(outcome, StepError::Runner("halt")));
    Ok(())
}
