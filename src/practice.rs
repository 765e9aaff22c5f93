use chrono::{DateTime, Local};

use crate::session::{SessionSnapshot, SessionStore};
use crate::setup::SessionType;
use crate::shot::Shot;

/// On-screen play/pause toggle for the practice screen. Distinct from the
/// session store's backgrounded lifecycle: halting recording keeps the
/// session in the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Running,
    Halted,
}

/// One tee / soft-toss practice session while its screen is visible.
/// Accumulates swing metrics and settles the end-or-minimize decision into
/// the session store.
#[derive(Debug)]
pub struct PracticeSession {
    pub session_type: SessionType,
    pub recording: RecordingState,
    started_at: DateTime<Local>,
    /// Metrics carried over when resuming a minimized session.
    base: Option<SessionSnapshot>,
    shots: Vec<Shot>,
}

impl PracticeSession {
    pub fn new(session_type: SessionType, store: &mut SessionStore) -> Self {
        store.start();
        Self {
            session_type,
            recording: RecordingState::Running,
            started_at: Local::now(),
            base: None,
            shots: Vec::new(),
        }
    }

    /// Continue a minimized session from its snapshot.
    pub fn resume(session_type: SessionType, store: &mut SessionStore) -> Self {
        let base = store.backgrounded().cloned();
        store.resume();
        Self {
            session_type,
            recording: RecordingState::Running,
            started_at: Local::now(),
            base,
            shots: Vec::new(),
        }
    }

    pub fn toggle_recording(&mut self) {
        self.recording = match self.recording {
            RecordingState::Running => RecordingState::Halted,
            RecordingState::Halted => RecordingState::Running,
        };
    }

    /// Record a swing; refused while recording is halted.
    pub fn record_swing(&mut self, shot: Shot) -> bool {
        if self.recording != RecordingState::Running {
            return false;
        }
        self.shots.push(shot);
        true
    }

    pub fn swing_count(&self) -> u32 {
        let carried = self.base.as_ref().map(|b| b.swing_count).unwrap_or(0);
        carried + self.shots.len() as u32
    }

    pub fn avg_exit_velocity(&self) -> f64 {
        let (carried_count, carried_avg) = self
            .base
            .as_ref()
            .map(|b| (b.swing_count, b.avg_exit_velocity))
            .unwrap_or((0, 0.0));

        let total = carried_count as usize + self.shots.len();
        if total == 0 {
            return 0.0;
        }

        let sum: f64 = carried_avg * carried_count as f64
            + self.shots.iter().map(|s| s.exit_velocity_mph).sum::<f64>();
        sum / total as f64
    }

    pub fn top_exit_velocity(&self) -> f64 {
        let carried = self
            .base
            .as_ref()
            .map(|b| b.top_exit_velocity)
            .unwrap_or(0.0);
        self.shots
            .iter()
            .map(|s| s.exit_velocity_mph)
            .fold(carried, f64::max)
    }

    pub fn duration_mins(&self) -> f64 {
        let carried = self.base.as_ref().map(|b| b.duration_mins).unwrap_or(0.0);
        let elapsed = Local::now()
            .signed_duration_since(self.started_at)
            .num_milliseconds() as f64
            / 60_000.0;
        carried + elapsed.max(0.0)
    }

    pub fn latest_shot(&self) -> Option<&Shot> {
        self.shots.last()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            duration_mins: self.duration_mins(),
            swing_count: self.swing_count(),
            avg_exit_velocity: self.avg_exit_velocity(),
            top_exit_velocity: self.top_exit_velocity(),
        }
    }

    /// Leave the screen but keep the session resumable.
    pub fn minimize(self, store: &mut SessionStore) {
        store.background(self.snapshot());
    }

    /// Full termination; the snapshot is discarded.
    pub fn end(self, store: &mut SessionStore) {
        store.end();
    }
}
