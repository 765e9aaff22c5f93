/// Last-known metrics of a practice session, captured when the user
/// minimizes the session screen. Values are recorded as handed in; nothing
/// is validated here.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub duration_mins: f64,
    pub swing_count: u32,
    pub avg_exit_velocity: f64,
    pub top_exit_velocity: f64,
}

/// Where the one practice session stands from the rest of the app's point
/// of view. `Backgrounded` means "user left the screen intending to come
/// back"; the screen's own play/pause toggle is a separate concept
/// (`practice::RecordingState`) and never lands here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionLifecycle {
    #[default]
    Idle,
    Active,
    Backgrounded,
}

/// Process-wide holder of the practice-session lifecycle, constructed once
/// at app start and handed to the screens that need it. Single writer at a
/// time; everything runs on the UI thread.
#[derive(Debug, Default)]
pub struct SessionStore {
    lifecycle: SessionLifecycle,
    snapshot: Option<SessionSnapshot>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lifecycle(&self) -> SessionLifecycle {
        self.lifecycle
    }

    /// The snapshot of a minimized session, if there is one to resume.
    pub fn backgrounded(&self) -> Option<&SessionSnapshot> {
        match self.lifecycle {
            SessionLifecycle::Backgrounded => self.snapshot.as_ref(),
            _ => None,
        }
    }

    /// User opens the practice screen with no session pending.
    pub fn start(&mut self) {
        self.lifecycle = SessionLifecycle::Active;
    }

    /// User minimizes an active session. Last write wins on repeat calls.
    pub fn background(&mut self, snapshot: SessionSnapshot) {
        self.snapshot = Some(snapshot);
        self.lifecycle = SessionLifecycle::Backgrounded;
    }

    /// User returns to a minimized session. The snapshot is retained until
    /// the session actually ends.
    pub fn resume(&mut self) {
        if self.lifecycle == SessionLifecycle::Backgrounded {
            self.lifecycle = SessionLifecycle::Active;
        }
    }

    /// Explicit end, from the screen or the resume banner. Discards the
    /// snapshot for good.
    pub fn end(&mut self) {
        self.lifecycle = SessionLifecycle::Idle;
        self.snapshot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn snapshot(swings: u32) -> SessionSnapshot {
        SessionSnapshot {
            duration_mins: 12.5,
            swing_count: swings,
            avg_exit_velocity: 84.0,
            top_exit_velocity: 97.0,
        }
    }

    #[test]
    fn test_starts_idle_with_no_snapshot() {
        let store = SessionStore::new();
        assert_eq!(store.lifecycle(), SessionLifecycle::Idle);
        assert_matches!(store.backgrounded(), None);
    }

    #[test]
    fn test_background_then_end_clears_everything() {
        let mut store = SessionStore::new();
        store.start();
        store.background(snapshot(10));
        assert_eq!(store.lifecycle(), SessionLifecycle::Backgrounded);
        assert_matches!(store.backgrounded(), Some(s) if s.swing_count == 10);

        store.end();
        assert_eq!(store.lifecycle(), SessionLifecycle::Idle);
        assert_matches!(store.backgrounded(), None);
    }

    #[test]
    fn test_repeated_background_keeps_last_snapshot() {
        let mut store = SessionStore::new();
        store.background(snapshot(5));
        store.background(snapshot(20));
        assert_matches!(store.backgrounded(), Some(s) if s.swing_count == 20);
    }

    #[test]
    fn test_resume_keeps_snapshot_until_end() {
        let mut store = SessionStore::new();
        store.background(snapshot(7));
        store.resume();
        assert_eq!(store.lifecycle(), SessionLifecycle::Active);

        // Active again: nothing to resume from the dashboard's view, but the
        // metrics are still held so a re-minimize can update them.
        assert_matches!(store.backgrounded(), None);

        store.background(snapshot(9));
        assert_matches!(store.backgrounded(), Some(s) if s.swing_count == 9);
    }

    #[test]
    fn test_resume_without_backgrounded_session_is_noop() {
        let mut store = SessionStore::new();
        store.resume();
        assert_eq!(store.lifecycle(), SessionLifecycle::Idle);
    }

    #[test]
    fn test_end_from_active() {
        let mut store = SessionStore::new();
        store.start();
        store.end();
        assert_eq!(store.lifecycle(), SessionLifecycle::Idle);
    }

    #[test]
    fn test_snapshot_values_not_validated() {
        // Top below average is accepted as-is; the store records what it is
        // handed.
        let mut store = SessionStore::new();
        store.background(SessionSnapshot {
            duration_mins: 0.0,
            swing_count: 0,
            avg_exit_velocity: 90.0,
            top_exit_velocity: 80.0,
        });
        assert_matches!(store.backgrounded(), Some(s) if s.top_exit_velocity == 80.0);
    }
}
