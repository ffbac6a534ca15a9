//! Runtime substrate for the morphpull indicator engine.
//!
//! A deliberately small, single-threaded cooperative scheduler: explicit
//! millisecond clock, cancellable one-shot/repeating timers, and per-frame
//! callbacks. Everything above this crate (animations, the gesture state
//! machine, the morph sequencer) suspends only by parking work here.

mod scheduler;

pub use scheduler::{Scheduler, TaskHandle};
