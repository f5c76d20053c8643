//! Breathing exercise pacing
//!
//! A fixed three-phase cycle (Inhale -> Hold -> Exhale, 4 seconds each)
//! driven by a pure timer state machine and a tokio interval task that
//! publishes snapshots for whoever is rendering the exercise.

mod pacer;
mod timer;

pub use pacer::BreathingPacer;
pub use timer::{BreathingState, Phase, PhaseTimer, PHASE_SECONDS};
