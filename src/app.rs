use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::celebration::HomerCelebration;
use crate::clock::SystemClock;
use crate::config::Config;
use crate::derby::DerbyGame;
use crate::device::{DeviceLink, ManualDeviceLink};
use crate::history::{GameSummary, HistorySink, MemoryHistory, SqliteHistory};
use crate::practice::PracticeSession;
use crate::session::SessionStore;
use crate::setup::{DerbyConfig, SessionType, SetupWizard};
use crate::sources::{DeviceSource, ShotSource, SimulatedSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Dashboard,
    Setup,
    Derby,
    Results,
    Practice,
    History,
}

/// Top-level application state: which screen is up, the shared session
/// store, and the controllers for whichever flow is active.
pub struct App {
    pub config: Config,
    pub state: AppState,
    pub store: SessionStore,
    pub device: ManualDeviceLink,
    pub history: Box<dyn HistorySink>,
    pub wizard: Option<SetupWizard>,
    pub derby: Option<DerbyGame>,
    pub practice: Option<PracticeSession>,
    pub last_summary: Option<GameSummary>,
    pub celebration: HomerCelebration,
    pub terminal_size: (u16, u16),
    pub should_quit: bool,
    practice_source: Box<dyn ShotSource>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let history: Box<dyn HistorySink> = match SqliteHistory::new() {
            Ok(db) => Box::new(db),
            Err(_) => Box::new(MemoryHistory::new()),
        };
        Self::with_history(config, history)
    }

    pub fn with_history(config: Config, history: Box<dyn HistorySink>) -> Self {
        let practice_source = Self::make_source(&config, &ManualDeviceLink::connected());
        Self {
            config,
            state: AppState::Dashboard,
            store: SessionStore::new(),
            device: ManualDeviceLink::new(),
            history,
            wizard: None,
            derby: None,
            practice: None,
            last_summary: None,
            celebration: HomerCelebration::new(),
            terminal_size: (80, 24),
            should_quit: false,
            practice_source,
        }
    }

    fn make_source(config: &Config, device: &ManualDeviceLink) -> Box<dyn ShotSource> {
        if config.simulate {
            Box::new(SimulatedSource::new())
        } else {
            Box::new(DeviceSource::new(device.clone()))
        }
    }

    /// Advance timed state: derby choreography and the celebration overlay.
    pub fn on_tick(&mut self) {
        if let Some(game) = self.derby.as_mut() {
            game.on_tick();
            if game.is_over() {
                self.settle_derby();
            }
        }
        self.celebration.update();
    }

    fn settle_derby(&mut self) {
        if let Some(mut game) = self.derby.take() {
            if let Some(summary) = game.take_summary() {
                // History is best-effort; a failed write never blocks the
                // results screen.
                let _ = self.history.record(&summary);
                self.last_summary = Some(summary);
            }
        }
        self.state = AppState::Results;
    }

    fn start_setup(&mut self) {
        let mut wizard =
            SetupWizard::new(&self.config.default_players, self.config.balls_per_player);
        if let Some(index) = wizard
            .stadiums()
            .iter()
            .position(|s| s.id == self.config.stadium)
        {
            wizard.select_stadium(index);
        }
        self.wizard = Some(wizard);
        self.state = AppState::Setup;
    }

    fn start_derby(&mut self, config: DerbyConfig) {
        let source = Self::make_source(&self.config, &self.device);
        self.derby = Some(DerbyGame::new(
            config,
            source,
            Box::new(SystemClock::new()),
        ));
        self.state = AppState::Derby;
    }

    fn start_practice(&mut self) {
        self.practice = Some(PracticeSession::new(SessionType::Tee, &mut self.store));
        self.state = AppState::Practice;
    }

    fn resume_practice(&mut self) {
        if self.store.backgrounded().is_some() {
            self.practice = Some(PracticeSession::resume(SessionType::Tee, &mut self.store));
            self.state = AppState::Practice;
        }
    }

    fn derby_swing(&mut self) {
        let homered = self
            .derby
            .as_mut()
            .and_then(|game| game.swing())
            .map(|shot| shot.is_home_run)
            .unwrap_or(false);
        if homered {
            let (w, h) = self.terminal_size;
            self.celebration.start(w, h);
        }
    }

    fn practice_swing(&mut self) {
        let Some(session) = self.practice.as_mut() else {
            return;
        };
        if let Some(shot) = self.practice_source.next_shot() {
            let homered = shot.is_home_run;
            if session.record_swing(shot) && homered {
                let (w, h) = self.terminal_size;
                self.celebration.start(w, h);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.state {
            AppState::Dashboard => self.handle_dashboard_key(key),
            AppState::Setup => self.handle_setup_key(key),
            AppState::Derby => self.handle_derby_key(key),
            AppState::Results => self.handle_results_key(key),
            AppState::Practice => self.handle_practice_key(key),
            AppState::History => self.handle_history_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('d') => self.start_setup(),
            KeyCode::Char('p') => self.start_practice(),
            KeyCode::Char('r') => self.resume_practice(),
            KeyCode::Char('e') => self.store.end(),
            KeyCode::Char('h') => self.state = AppState::History,
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_setup_key(&mut self, key: KeyEvent) {
        let Some(wizard) = self.wizard.as_mut() else {
            self.state = AppState::Dashboard;
            return;
        };

        match key.code {
            KeyCode::Esc => {
                self.wizard = None;
                self.state = AppState::Dashboard;
            }
            KeyCode::Enter => {
                if wizard.step() < crate::setup::LAST_STEP {
                    wizard.advance(&self.device);
                } else if let Some(config) = wizard.finish(&self.device) {
                    self.wizard = None;
                    self.start_derby(config);
                }
            }
            KeyCode::Backspace | KeyCode::Left => {
                wizard.back();
            }
            KeyCode::Up => {
                wizard.roster_cursor = wizard.roster_cursor.saturating_sub(1);
            }
            KeyCode::Down => {
                if wizard.roster_cursor + 1 < wizard.players.len() {
                    wizard.roster_cursor += 1;
                }
            }
            KeyCode::Char(c) => match (wizard.step(), c) {
                (0, 't') => wizard.toggle_session_type(),
                (0, 'l') => wizard.toggle_location(),
                (1, 'a') => wizard.add_player(None),
                (1, 'x') => {
                    let cursor = wizard.roster_cursor;
                    wizard.remove_player(cursor);
                }
                (1, 'k') => {
                    let cursor = wizard.roster_cursor;
                    if wizard.move_player_up(cursor) {
                        wizard.roster_cursor -= 1;
                    }
                }
                (1, 'j') => {
                    let cursor = wizard.roster_cursor;
                    if wizard.move_player_down(cursor) {
                        wizard.roster_cursor += 1;
                    }
                }
                (2, 's') => wizard.cycle_stadium(),
                (2, 'w') => wizard.cycle_weather(),
                (2, 'o') => wizard.cycle_time_of_day(),
                (3, 'c') => self.device.begin_pairing(),
                _ => {}
            },
            _ => {}
        }
    }

    fn handle_derby_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ') => self.derby_swing(),
            KeyCode::Esc => {
                if let Some(game) = self.derby.as_mut() {
                    game.abort();
                }
                self.settle_derby();
            }
            _ => {}
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('n') => self.start_setup(),
            KeyCode::Char('h') => self.state = AppState::History,
            KeyCode::Enter | KeyCode::Esc => self.state = AppState::Dashboard,
            _ => {}
        }
    }

    fn handle_practice_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ') => self.practice_swing(),
            KeyCode::Char('p') => {
                if let Some(session) = self.practice.as_mut() {
                    session.toggle_recording();
                }
            }
            KeyCode::Char('m') | KeyCode::Esc => {
                if let Some(session) = self.practice.take() {
                    session.minimize(&mut self.store);
                }
                self.state = AppState::Dashboard;
            }
            KeyCode::Char('e') => {
                if let Some(session) = self.practice.take() {
                    session.end(&mut self.store);
                }
                self.state = AppState::Dashboard;
            }
            _ => {}
        }
    }

    fn handle_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('b') | KeyCode::Esc => self.state = AppState::Dashboard,
            _ => {}
        }
    }
}
