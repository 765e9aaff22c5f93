use crate::device::DeviceLink;

pub const DEFAULT_MAX_BALLS: u32 = 10;

/// How balls are delivered during the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionType {
    #[strum(to_string = "tee")]
    Tee,
    #[strum(to_string = "soft toss")]
    SoftToss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum LocationType {
    #[strum(to_string = "indoor")]
    Indoor,
    #[strum(to_string = "outdoor")]
    Outdoor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Weather {
    Clear,
    Cloudy,
    Windy,
    Rain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TimeOfDay {
    Day,
    Sunset,
    Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum StadiumSize {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stadium {
    pub id: String,
    pub name: String,
    pub size: StadiumSize,
    pub unlocked: bool,
}

/// The built-in park catalog. Locked parks show in the picker but cannot be
/// selected until owned.
pub fn stadium_catalog() -> Vec<Stadium> {
    let park = |id: &str, name: &str, size, unlocked| Stadium {
        id: id.to_string(),
        name: name.to_string(),
        size,
        unlocked,
    };
    vec![
        park("sandlot", "The Sandlot", StadiumSize::Small, true),
        park("riverside", "Riverside Yard", StadiumSize::Medium, true),
        park("cannery", "Cannery Field", StadiumSize::Medium, true),
        park("green-wall", "Green Wall Park", StadiumSize::Large, false),
        park("the-dome", "The Dome", StadiumSize::Large, false),
    ]
}

/// A roster slot; ids stay unique within the wizard even as players are
/// removed and re-added.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub id: String,
    pub name: String,
}

/// Everything the derby controller needs to run a match.
#[derive(Debug, Clone, PartialEq)]
pub struct DerbyConfig {
    pub session_type: SessionType,
    pub location: LocationType,
    pub players: Vec<RosterEntry>,
    pub stadium: Stadium,
    pub weather: Weather,
    pub time_of_day: TimeOfDay,
    pub max_balls: u32,
}

/// Linear 4-step configuration flow for a derby match. Forward navigation
/// advances only when the current step validates; backward navigation is
/// unconditional. The final step gates on device connectivity.
#[derive(Debug)]
pub struct SetupWizard {
    step: usize,
    pub session_type: SessionType,
    pub location: LocationType,
    pub players: Vec<RosterEntry>,
    next_player_id: u32,
    catalog: Vec<Stadium>,
    pub stadium_index: usize,
    pub weather: Weather,
    pub time_of_day: TimeOfDay,
    pub max_balls: u32,
    /// Roster row highlighted in the UI.
    pub roster_cursor: usize,
}

pub const LAST_STEP: usize = 3;

impl SetupWizard {
    pub fn new(default_players: &[String], max_balls: u32) -> Self {
        let mut wizard = Self {
            step: 0,
            session_type: SessionType::Tee,
            location: LocationType::Outdoor,
            players: Vec::new(),
            next_player_id: 0,
            catalog: stadium_catalog(),
            stadium_index: 0,
            weather: Weather::Clear,
            time_of_day: TimeOfDay::Day,
            max_balls: max_balls.max(1),
            roster_cursor: 0,
        };
        for name in default_players {
            wizard.add_player(Some(name.clone()));
        }
        if wizard.players.is_empty() {
            wizard.add_player(None);
        }
        wizard
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn step_title(&self) -> &'static str {
        match self.step {
            0 => "Mode",
            1 => "Roster",
            2 => "Stadium",
            _ => "Device check",
        }
    }

    pub fn stadiums(&self) -> &[Stadium] {
        &self.catalog
    }

    pub fn stadium(&self) -> &Stadium {
        &self.catalog[self.stadium_index]
    }

    pub fn toggle_session_type(&mut self) {
        self.session_type = match self.session_type {
            SessionType::Tee => SessionType::SoftToss,
            SessionType::SoftToss => SessionType::Tee,
        };
    }

    pub fn toggle_location(&mut self) {
        self.location = match self.location {
            LocationType::Indoor => LocationType::Outdoor,
            LocationType::Outdoor => LocationType::Indoor,
        };
    }

    pub fn cycle_weather(&mut self) {
        self.weather = match self.weather {
            Weather::Clear => Weather::Cloudy,
            Weather::Cloudy => Weather::Windy,
            Weather::Windy => Weather::Rain,
            Weather::Rain => Weather::Clear,
        };
    }

    pub fn cycle_time_of_day(&mut self) {
        self.time_of_day = match self.time_of_day {
            TimeOfDay::Day => TimeOfDay::Sunset,
            TimeOfDay::Sunset => TimeOfDay::Night,
            TimeOfDay::Night => TimeOfDay::Day,
        };
    }

    pub fn add_player(&mut self, name: Option<String>) {
        self.next_player_id += 1;
        let name = name.unwrap_or_else(|| format!("Player {}", self.players.len() + 1));
        self.players.push(RosterEntry {
            id: format!("p{}", self.next_player_id),
            name,
        });
    }

    /// Removing the last remaining player is rejected, mirroring the UI
    /// hiding the remove control at one player.
    pub fn remove_player(&mut self, index: usize) -> bool {
        if self.players.len() <= 1 || index >= self.players.len() {
            return false;
        }
        self.players.remove(index);
        self.roster_cursor = self.roster_cursor.min(self.players.len() - 1);
        true
    }

    pub fn move_player_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.players.len() {
            return false;
        }
        self.players.swap(index - 1, index);
        true
    }

    pub fn move_player_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.players.len() {
            return false;
        }
        self.players.swap(index, index + 1);
        true
    }

    /// Jump the selection to the next unlocked park, wrapping around.
    pub fn cycle_stadium(&mut self) {
        let len = self.catalog.len();
        for offset in 1..=len {
            let candidate = (self.stadium_index + offset) % len;
            if self.catalog[candidate].unlocked {
                self.stadium_index = candidate;
                return;
            }
        }
    }

    /// Direct selection; locked parks are refused.
    pub fn select_stadium(&mut self, index: usize) -> bool {
        match self.catalog.get(index) {
            Some(s) if s.unlocked => {
                self.stadium_index = index;
                true
            }
            _ => false,
        }
    }

    pub fn can_advance(&self, device: &dyn DeviceLink) -> bool {
        match self.step {
            0 => true,
            1 => !self.players.is_empty(),
            2 => self.stadium().unlocked,
            _ => device.is_connected(),
        }
    }

    pub fn advance(&mut self, device: &dyn DeviceLink) -> bool {
        if self.step < LAST_STEP && self.can_advance(device) {
            self.step += 1;
            true
        } else {
            false
        }
    }

    pub fn back(&mut self) -> bool {
        if self.step > 0 {
            self.step -= 1;
            true
        } else {
            false
        }
    }

    /// Completes the wizard. Only valid on the device-check step with a
    /// connected device; otherwise the bundle is withheld.
    pub fn finish(&self, device: &dyn DeviceLink) -> Option<DerbyConfig> {
        if self.step != LAST_STEP || !device.is_connected() {
            return None;
        }
        Some(DerbyConfig {
            session_type: self.session_type,
            location: self.location,
            players: self.players.clone(),
            stadium: self.stadium().clone(),
            weather: self.weather,
            time_of_day: self.time_of_day,
            max_balls: self.max_balls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::ManualDeviceLink;

    fn wizard() -> SetupWizard {
        SetupWizard::new(&["Ace".to_string()], DEFAULT_MAX_BALLS)
    }

    #[test]
    fn test_starts_on_first_step_with_one_player() {
        let w = wizard();
        assert_eq!(w.step(), 0);
        assert_eq!(w.players.len(), 1);
        assert_eq!(w.players[0].name, "Ace");
    }

    #[test]
    fn test_empty_defaults_seed_a_player() {
        let w = SetupWizard::new(&[], DEFAULT_MAX_BALLS);
        assert_eq!(w.players.len(), 1);
        assert_eq!(w.players[0].name, "Player 1");
    }

    #[test]
    fn test_step_index_never_leaves_bounds() {
        let mut w = wizard();
        let device = ManualDeviceLink::connected();

        assert!(!w.back());
        assert_eq!(w.step(), 0);

        for _ in 0..10 {
            w.advance(&device);
        }
        assert_eq!(w.step(), LAST_STEP);

        for _ in 0..10 {
            w.back();
        }
        assert_eq!(w.step(), 0);
    }

    #[test]
    fn test_device_gate_on_final_step() {
        let mut w = wizard();
        let mut device = ManualDeviceLink::new();

        w.advance(&device);
        w.advance(&device);
        w.advance(&device);
        assert_eq!(w.step(), LAST_STEP);

        assert!(!w.can_advance(&device));
        assert!(w.finish(&device).is_none());

        device.begin_pairing();
        let config = w.finish(&device).expect("connected device completes setup");
        assert_eq!(config.players.len(), 1);
        assert_eq!(config.max_balls, DEFAULT_MAX_BALLS);
    }

    #[test]
    fn test_finish_rejected_before_final_step() {
        let w = wizard();
        let device = ManualDeviceLink::connected();
        assert!(w.finish(&device).is_none());
    }

    #[test]
    fn test_roster_minimum_of_one() {
        let mut w = wizard();
        assert!(!w.remove_player(0));

        w.add_player(Some("Bo".to_string()));
        assert!(w.remove_player(0));
        assert_eq!(w.players.len(), 1);
        assert_eq!(w.players[0].name, "Bo");
        assert!(!w.remove_player(0));
    }

    #[test]
    fn test_roster_reorder() {
        let mut w = wizard();
        w.add_player(Some("Bo".to_string()));
        w.add_player(Some("Cy".to_string()));

        assert!(w.move_player_up(2));
        let names: Vec<&str> = w.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ace", "Cy", "Bo"]);

        assert!(w.move_player_down(0));
        let names: Vec<&str> = w.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Cy", "Ace", "Bo"]);

        assert!(!w.move_player_up(0));
        assert!(!w.move_player_down(2));
    }

    #[test]
    fn test_player_ids_stay_unique_after_removal() {
        let mut w = wizard();
        w.add_player(None);
        w.remove_player(1);
        w.add_player(None);
        assert_ne!(w.players[0].id, w.players[1].id);
    }

    #[test]
    fn test_locked_stadium_cannot_be_selected() {
        let mut w = wizard();
        let locked = w
            .stadiums()
            .iter()
            .position(|s| !s.unlocked)
            .expect("catalog carries a locked park");

        assert!(!w.select_stadium(locked));
        assert_ne!(w.stadium_index, locked);
        assert!(w.select_stadium(1));
        assert_eq!(w.stadium_index, 1);
    }

    #[test]
    fn test_cycle_stadium_skips_locked_parks() {
        let mut w = wizard();
        for _ in 0..w.stadiums().len() * 2 {
            w.cycle_stadium();
            assert!(w.stadium().unlocked);
        }
    }

    #[test]
    fn test_enum_cycles_return_home() {
        let mut w = wizard();
        let start = w.weather;
        for _ in 0..4 {
            w.cycle_weather();
        }
        assert_eq!(w.weather, start);

        let start = w.time_of_day;
        for _ in 0..3 {
            w.cycle_time_of_day();
        }
        assert_eq!(w.time_of_day, start);

        w.toggle_session_type();
        assert_eq!(w.session_type, SessionType::SoftToss);
        w.toggle_session_type();
        assert_eq!(w.session_type, SessionType::Tee);
    }
}
