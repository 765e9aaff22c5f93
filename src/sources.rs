use chrono::Local;
use rand::Rng;

use crate::device::{DeviceLink, ShotReading};
use crate::shot::Shot;

/// Where swing results come from. The derby and practice controllers only
/// see this trait; simulation and the real device are interchangeable.
pub trait ShotSource {
    /// The next swing result, if one is available right now.
    fn next_shot(&mut self) -> Option<Shot>;
}

/// Random shot generator standing in for real sensor input. Ranges mirror
/// the values a recreational launch monitor reports; the home-run flag is
/// drawn independently of the other fields.
#[derive(Debug, Default)]
pub struct SimulatedSource {
    next_id: u64,
}

impl SimulatedSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShotSource for SimulatedSource {
    fn next_shot(&mut self) -> Option<Shot> {
        let mut rng = rand::thread_rng();
        self.next_id += 1;

        Some(Shot {
            id: self.next_id,
            distance_ft: rng.gen_range(100..500),
            exit_velocity_mph: rng.gen_range(70..100) as f64,
            launch_angle_deg: rng.gen_range(-5..35) as f64,
            launch_direction_deg: rng.gen_range(-30..30) as f64,
            bat_speed_mph: rng.gen_range(60..80) as f64,
            score: rng.gen_range(0..100),
            is_home_run: rng.gen_bool(0.3),
            timestamp: Local::now(),
        })
    }
}

/// Shot source fed by a paired launch monitor. Yields a shot only when the
/// device has reported a reading since the last poll.
pub struct DeviceSource<L: DeviceLink> {
    link: L,
    next_id: u64,
}

impl<L: DeviceLink> DeviceSource<L> {
    /// Fence distance above which a device reading counts as a home run.
    const FENCE_FT: u32 = 400;

    pub fn new(link: L) -> Self {
        Self { link, next_id: 0 }
    }

    fn score_reading(reading: &ShotReading) -> u32 {
        // Distance carries the derby score; capped to the same 0..100 band
        // the simulator produces.
        (reading.distance_ft / 5).min(99)
    }
}

impl<L: DeviceLink> ShotSource for DeviceSource<L> {
    fn next_shot(&mut self) -> Option<Shot> {
        let reading = self.link.poll_reading()?;
        self.next_id += 1;

        Some(Shot {
            id: self.next_id,
            distance_ft: reading.distance_ft,
            exit_velocity_mph: reading.exit_velocity_mph,
            launch_angle_deg: reading.launch_angle_deg,
            launch_direction_deg: reading.launch_direction_deg,
            bat_speed_mph: reading.bat_speed_mph,
            score: Self::score_reading(&reading),
            is_home_run: reading.distance_ft >= Self::FENCE_FT,
            timestamp: Local::now(),
        })
    }
}

/// Replays a fixed list of shots in order, then runs dry. Used by tests
/// and headless demos that need deterministic swings.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    shots: std::collections::VecDeque<Shot>,
}

impl ScriptedSource {
    pub fn new(shots: Vec<Shot>) -> Self {
        Self {
            shots: shots.into(),
        }
    }
}

impl ShotSource for ScriptedSource {
    fn next_shot(&mut self) -> Option<Shot> {
        self.shots.pop_front()
    }
}
