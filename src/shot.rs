use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Verdict for a single swing, shown once the metric animation settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum ShotOutcome {
    #[strum(to_string = "home run")]
    HomeRun,
    #[strum(to_string = "ground ball")]
    GroundBall,
    #[strum(to_string = "pop up")]
    PopUp,
    #[strum(to_string = "foul ball")]
    FoulBall,
    #[strum(to_string = "short fly")]
    ShortFly,
    #[strum(to_string = "fly out")]
    FlyOut,
}

/// One swing result, as reported by a launch monitor (or the simulator).
/// Immutable once created; appended to a player's history in swing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub id: u64,
    pub distance_ft: u32,
    pub exit_velocity_mph: f64,
    pub launch_angle_deg: f64,
    pub launch_direction_deg: f64,
    pub bat_speed_mph: f64,
    pub score: u32,
    pub is_home_run: bool,
    pub timestamp: DateTime<Local>,
}

impl Shot {
    pub fn outcome(&self) -> ShotOutcome {
        classify_outcome(
            self.launch_angle_deg,
            self.launch_direction_deg,
            self.distance_ft,
            self.is_home_run,
        )
    }
}

/// Classify a ball in play. Pure function of the four inputs; the branch
/// order is the verdict precedence, not a physical model.
pub fn classify_outcome(
    launch_angle_deg: f64,
    launch_direction_deg: f64,
    distance_ft: u32,
    is_home_run: bool,
) -> ShotOutcome {
    if is_home_run {
        ShotOutcome::HomeRun
    } else if launch_angle_deg < 0.0 {
        ShotOutcome::GroundBall
    } else if launch_angle_deg > 35.0 {
        ShotOutcome::PopUp
    } else if launch_direction_deg.abs() > 20.0 {
        ShotOutcome::FoulBall
    } else if distance_ft < 200 {
        ShotOutcome::ShortFly
    } else {
        ShotOutcome::FlyOut
    }
}

/// A derby participant and their swing history for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub shots: Vec<Shot>,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            shots: Vec::new(),
        }
    }

    pub fn home_run_count(&self) -> u32 {
        self.shots.iter().filter(|s| s.is_home_run).count() as u32
    }

    pub fn total_score(&self) -> u32 {
        self.shots.iter().map(|s| s.score).sum()
    }

    pub fn max_exit_velocity(&self) -> f64 {
        self.shots
            .iter()
            .map(|s| s.exit_velocity_mph)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
pub fn test_shot(id: u64) -> Shot {
    Shot {
        id,
        distance_ft: 300,
        exit_velocity_mph: 88.0,
        launch_angle_deg: 15.0,
        launch_direction_deg: 0.0,
        bat_speed_mph: 70.0,
        score: 50,
        is_home_run: false,
        timestamp: Local::now(),
    }
}
