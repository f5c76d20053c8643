use serde::{Deserialize, Serialize};

/// Seconds spent in each breathing phase
pub const PHASE_SECONDS: u32 = 4;

/// One phase of the breathing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Inhale,
    Hold,
    Exhale,
}

impl Phase {
    /// Next phase in cyclic order.
    pub fn next(self) -> Self {
        match self {
            Phase::Inhale => Phase::Hold,
            Phase::Hold => Phase::Exhale,
            Phase::Exhale => Phase::Inhale,
        }
    }
}

/// Snapshot of the exercise state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathingState {
    pub phase: Phase,
    pub seconds_remaining: u32,
    pub active: bool,
}

impl Default for BreathingState {
    fn default() -> Self {
        Self {
            phase: Phase::Inhale,
            seconds_remaining: PHASE_SECONDS,
            active: false,
        }
    }
}

/// The breathing cycle state machine.
///
/// Transitions are time-triggered only: each `tick` burns one second and
/// rolls into the next phase when the current one is spent. `stop` leaves
/// phase and countdown untouched so the last state stays displayable.
#[derive(Debug, Clone, Default)]
pub struct PhaseTimer {
    state: BreathingState,
}

impl PhaseTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BreathingState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Reset to the start of the cycle and mark the timer active.
    pub fn start(&mut self) -> BreathingState {
        self.state = BreathingState {
            phase: Phase::Inhale,
            seconds_remaining: PHASE_SECONDS,
            active: true,
        };
        self.state
    }

    /// Deactivate without clearing phase or countdown.
    pub fn stop(&mut self) -> BreathingState {
        self.state.active = false;
        self.state
    }

    /// Burn one second; advance to the next phase when this one is spent.
    ///
    /// A no-op while inactive.
    pub fn tick(&mut self) -> BreathingState {
        if !self.state.active {
            return self.state;
        }

        if self.state.seconds_remaining <= 1 {
            self.state.phase = self.state.phase.next();
            self.state.seconds_remaining = PHASE_SECONDS;
        } else {
            self.state.seconds_remaining -= 1;
        }

        self.state
    }
}
