use std::time::Duration;

use chrono::Local;

use crate::clock::Clock;
use crate::history::GameSummary;
use crate::setup::DerbyConfig;
use crate::shot::{Player, Shot};
use crate::sources::ShotSource;
use crate::stats::{award_achievements, standings, AchievementAward, PlayerStats};

/// Dwell before the revealed metrics settle after a swing.
pub const SWING_REVEAL: Duration = Duration::from_millis(1200);
/// How long the verdict stays up once a player's rack is empty.
pub const VERDICT_HOLD: Duration = Duration::from_millis(1500);
/// "Next up" card duration between players.
pub const PLAYER_INTRO: Duration = Duration::from_millis(2500);

/// Choreography of one player's turn. Exactly one phase is active at a
/// time; swings are only accepted in `PreSwing` and `PostMetric`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    PreSwing,
    SwingDetected,
    PostMetric,
    PlayerChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    InProgress,
    Results,
}

/// Timed transitions as (state, dwell, next-state) triples. Entering a
/// state listed here arms a single pending transition; ticks fire it once
/// the clock passes the dwell.
const TIMED_TRANSITIONS: &[(GamePhase, Duration, GamePhase)] = &[
    (GamePhase::SwingDetected, SWING_REVEAL, GamePhase::PostMetric),
    (GamePhase::PostMetric, VERDICT_HOLD, GamePhase::PlayerChange),
    (GamePhase::PlayerChange, PLAYER_INTRO, GamePhase::PreSwing),
];

#[derive(Debug, Clone, Copy)]
struct PendingTransition {
    to: GamePhase,
    fire_at: Duration,
}

/// Runs one multi-player derby match: turn order, ball counts, phase
/// choreography, and the final summary. Swing results come from the
/// injected `ShotSource`; time comes from the injected `Clock`, so tests
/// drive both.
pub struct DerbyGame {
    config: DerbyConfig,
    players: Vec<Player>,
    current_player_index: usize,
    ball_count: u32,
    latest_shot: Option<Shot>,
    phase: GamePhase,
    state: MatchState,
    pending: Option<PendingTransition>,
    source: Box<dyn ShotSource>,
    clock: Box<dyn Clock>,
    started_at: Duration,
    summary: Option<GameSummary>,
}

impl DerbyGame {
    pub fn new(config: DerbyConfig, source: Box<dyn ShotSource>, clock: Box<dyn Clock>) -> Self {
        let players = config
            .players
            .iter()
            .map(|entry| Player::new(&entry.id, &entry.name))
            .collect();
        let started_at = clock.now();

        Self {
            config,
            players,
            current_player_index: 0,
            ball_count: 0,
            latest_shot: None,
            phase: GamePhase::PreSwing,
            state: MatchState::InProgress,
            pending: None,
            source,
            clock,
            started_at,
            summary: None,
        }
    }

    pub fn config(&self) -> &DerbyConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player_index]
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn ball_count(&self) -> u32 {
        self.ball_count
    }

    pub fn max_balls(&self) -> u32 {
        self.config.max_balls
    }

    pub fn latest_shot(&self) -> Option<&Shot> {
        self.latest_shot.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.state == MatchState::Results
    }

    /// Swings are locked out mid-animation and once the rack is empty.
    pub fn can_swing(&self) -> bool {
        self.state == MatchState::InProgress
            && matches!(self.phase, GamePhase::PreSwing | GamePhase::PostMetric)
            && self.ball_count < self.config.max_balls
    }

    /// Take a swing for the current player. Returns the recorded shot, or
    /// None when swinging is locked out or the source has nothing yet
    /// (a device between readings).
    pub fn swing(&mut self) -> Option<&Shot> {
        if !self.can_swing() {
            return None;
        }
        let shot = self.source.next_shot()?;

        self.ball_count += 1;
        self.players[self.current_player_index].shots.push(shot.clone());
        self.latest_shot = Some(shot);
        self.enter_phase(GamePhase::SwingDetected);
        self.latest_shot.as_ref()
    }

    /// Drive pending timed transitions. Called from the app tick.
    pub fn on_tick(&mut self) {
        if self.state != MatchState::InProgress {
            return;
        }
        let Some(pending) = self.pending else {
            return;
        };
        if self.clock.now() < pending.fire_at {
            return;
        }
        self.pending = None;
        self.enter_phase(pending.to);
    }

    fn enter_phase(&mut self, phase: GamePhase) {
        self.pending = None;

        if phase == GamePhase::PlayerChange {
            if self.current_player_index + 1 >= self.players.len() {
                // Last rack emptied: the match is over instead.
                self.finish();
                return;
            }
            self.current_player_index += 1;
            self.ball_count = 0;
            self.latest_shot = None;
        }

        self.phase = phase;

        for &(from, dwell, to) in TIMED_TRANSITIONS {
            if from != phase {
                continue;
            }
            // The verdict only gives way to a player change once the rack
            // is empty; otherwise the next swing moves things along.
            if from == GamePhase::PostMetric && self.ball_count < self.config.max_balls {
                continue;
            }
            self.pending = Some(PendingTransition {
                to,
                fire_at: self.clock.now() + dwell,
            });
        }
    }

    /// Early exit: cancel any pending choreography and settle the match
    /// with whatever has been hit so far.
    pub fn abort(&mut self) {
        if self.state == MatchState::InProgress {
            self.pending = None;
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.state = MatchState::Results;
        self.phase = GamePhase::PreSwing;
        self.pending = None;

        let ranked = standings(&self.players);
        let duration_mins =
            (self.clock.now() - self.started_at).as_secs_f64() / 60.0;

        self.summary = Some(GameSummary {
            winner_name: ranked.first().map(|s| s.name.clone()).unwrap_or_default(),
            total_score: ranked.iter().map(|s| s.total_score).sum(),
            total_home_runs: ranked.iter().map(|s| s.home_runs).sum(),
            max_exit_velocity: self
                .players
                .iter()
                .map(Player::max_exit_velocity)
                .fold(0.0, f64::max),
            duration_mins,
            players: ranked,
            stadium_id: self.config.stadium.id.clone(),
            stadium_name: self.config.stadium.name.clone(),
            finished_at: Local::now(),
        });
    }

    /// Ranked standings. Empty until the match is over.
    pub fn final_standings(&self) -> Vec<PlayerStats> {
        self.summary
            .as_ref()
            .map(|s| s.players.clone())
            .unwrap_or_default()
    }

    pub fn achievements(&self) -> Vec<AchievementAward> {
        self.summary
            .as_ref()
            .map(|s| award_achievements(&s.players))
            .unwrap_or_default()
    }

    /// Hand off the write-once summary. Some exactly once, after the match
    /// settles.
    pub fn take_summary(&mut self) -> Option<GameSummary> {
        self.summary.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;
    use crate::setup::{SetupWizard, DEFAULT_MAX_BALLS};
    use crate::shot::test_shot;
    use crate::sources::{ScriptedSource, SimulatedSource};
    use crate::device::ManualDeviceLink;

    fn config(players: &[&str], max_balls: u32) -> DerbyConfig {
        let names: Vec<String> = players.iter().map(|p| p.to_string()).collect();
        let mut wizard = SetupWizard::new(&names, max_balls);
        let device = ManualDeviceLink::connected();
        while wizard.advance(&device) {}
        wizard.finish(&device).unwrap()
    }

    fn scripted(count: usize) -> Box<ScriptedSource> {
        let shots = (0..count).map(|i| test_shot(i as u64 + 1)).collect();
        Box::new(ScriptedSource::new(shots))
    }

    fn game(players: &[&str], max_balls: u32) -> (DerbyGame, VirtualClock) {
        let clock = VirtualClock::new();
        let game = DerbyGame::new(
            config(players, max_balls),
            scripted(players.len() * max_balls as usize),
            Box::new(clock.clone()),
        );
        (game, clock)
    }

    fn settle(game: &mut DerbyGame, clock: &VirtualClock) {
        // Longest dwell in the table; one tick per hop is enough.
        for _ in 0..3 {
            clock.advance(PLAYER_INTRO);
            game.on_tick();
        }
    }

    #[test]
    fn test_opens_ready_for_first_player() {
        let (game, _clock) = game(&["Ace", "Bo"], 3);
        assert_eq!(game.phase(), GamePhase::PreSwing);
        assert_eq!(game.state(), MatchState::InProgress);
        assert_eq!(game.current_player().name, "Ace");
        assert_eq!(game.ball_count(), 0);
        assert!(game.can_swing());
    }

    #[test]
    fn test_swing_locks_until_metrics_settle() {
        let (mut game, clock) = game(&["Ace"], 3);

        assert!(game.swing().is_some());
        assert_eq!(game.phase(), GamePhase::SwingDetected);
        assert!(!game.can_swing());
        assert!(game.swing().is_none());

        // Not yet.
        clock.advance(SWING_REVEAL - Duration::from_millis(1));
        game.on_tick();
        assert_eq!(game.phase(), GamePhase::SwingDetected);

        clock.advance(Duration::from_millis(1));
        game.on_tick();
        assert_eq!(game.phase(), GamePhase::PostMetric);
        assert!(game.can_swing());
    }

    #[test]
    fn test_verdict_holds_between_swings_mid_rack() {
        let (mut game, clock) = game(&["Ace", "Bo"], 3);
        game.swing();
        clock.advance(SWING_REVEAL);
        game.on_tick();
        assert_eq!(game.phase(), GamePhase::PostMetric);

        // Rack not empty: no auto player change no matter how long we idle.
        clock.advance(Duration::from_secs(60));
        game.on_tick();
        assert_eq!(game.phase(), GamePhase::PostMetric);
        assert_eq!(game.current_player_index(), 0);
    }

    #[test]
    fn test_rack_empty_rotates_to_next_player() {
        let (mut game, clock) = game(&["Ace", "Bo"], 2);

        for _ in 0..2 {
            assert!(game.swing().is_some());
            clock.advance(SWING_REVEAL);
            game.on_tick();
        }
        assert_eq!(game.phase(), GamePhase::PostMetric);
        assert_eq!(game.ball_count(), 2);
        assert!(!game.can_swing());

        clock.advance(VERDICT_HOLD);
        game.on_tick();
        assert_eq!(game.phase(), GamePhase::PlayerChange);
        assert_eq!(game.current_player().name, "Bo");
        assert_eq!(game.ball_count(), 0);
        assert!(game.latest_shot().is_none());

        clock.advance(PLAYER_INTRO);
        game.on_tick();
        assert_eq!(game.phase(), GamePhase::PreSwing);
        assert!(game.can_swing());
    }

    #[test]
    fn test_match_ends_after_n_times_b_shots() {
        let players = ["Ace", "Bo", "Cy"];
        let max_balls = 3;
        let (mut game, clock) = game(&players, max_balls);

        let mut recorded = 0;
        while !game.is_over() {
            if game.can_swing() {
                assert!(game.swing().is_some());
                recorded += 1;
            }
            settle(&mut game, &clock);
        }

        assert_eq!(recorded, players.len() * max_balls as usize);
        let total: usize = game.players().iter().map(|p| p.shots.len()).sum();
        assert_eq!(total, recorded);

        let summary = game.take_summary().expect("summary after results");
        assert_eq!(summary.players.len(), players.len());
        assert!(game.take_summary().is_none());
    }

    #[test]
    fn test_shot_order_is_chronological_per_player() {
        let (mut game, clock) = game(&["Ace"], 3);
        while !game.is_over() {
            if game.can_swing() {
                game.swing();
            }
            settle(&mut game, &clock);
        }
        let ids: Vec<u64> = game.players()[0].shots.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_abort_settles_with_partial_shots() {
        let (mut game, clock) = game(&["Ace", "Bo"], DEFAULT_MAX_BALLS);
        game.swing();
        clock.advance(SWING_REVEAL);
        game.on_tick();

        game.abort();
        assert!(game.is_over());
        let summary = game.take_summary().unwrap();
        assert_eq!(summary.players.len(), 2);
        assert_eq!(summary.players.iter().map(|p| p.swings).sum::<u32>(), 1);
        // Second player never swung; their line is all zeros.
        let bo = summary.players.iter().find(|p| p.name == "Bo").unwrap();
        assert_eq!(bo.avg_distance_ft, 0.0);
    }

    #[test]
    fn test_abort_after_results_is_noop() {
        let (mut game, clock) = game(&["Ace"], 1);
        game.swing();
        while !game.is_over() {
            settle(&mut game, &clock);
        }
        let summary = game.take_summary();
        game.abort();
        assert!(summary.is_some());
        assert!(game.take_summary().is_none());
    }

    #[test]
    fn test_ticks_without_pending_are_harmless() {
        let (mut game, clock) = game(&["Ace"], 2);
        clock.advance(Duration::from_secs(120));
        game.on_tick();
        assert_eq!(game.phase(), GamePhase::PreSwing);
        assert!(game.can_swing());
    }

    #[test]
    fn test_dry_source_leaves_state_untouched() {
        // A device between readings: swing is accepted but yields nothing.
        let clock = VirtualClock::new();
        let mut game = DerbyGame::new(
            config(&["Ace"], 3),
            Box::new(ScriptedSource::new(Vec::new())),
            Box::new(clock.clone()),
        );
        assert!(game.swing().is_none());
        assert_eq!(game.phase(), GamePhase::PreSwing);
        assert_eq!(game.ball_count(), 0);
    }

    #[test]
    fn test_simulated_match_smoke() {
        let clock = VirtualClock::new();
        let mut game = DerbyGame::new(
            config(&["Ace", "Bo"], 5),
            Box::new(SimulatedSource::new()),
            Box::new(clock.clone()),
        );
        while !game.is_over() {
            if game.can_swing() {
                game.swing();
            }
            clock.advance(PLAYER_INTRO);
            game.on_tick();
        }
        let summary = game.take_summary().unwrap();
        assert!(!summary.winner_name.is_empty());
        assert_eq!(summary.players.iter().map(|p| p.swings).sum::<u32>(), 10);
    }
}
