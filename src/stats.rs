use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::shot::Player;
use crate::util::{mean, std_dev};

/// Aggregate line for one player, computed over their shot history.
/// Every field defaults to 0 for a player with no shots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player_id: String,
    pub name: String,
    pub swings: u32,
    pub home_runs: u32,
    pub total_score: u32,
    pub avg_distance_ft: f64,
    pub avg_exit_velocity_mph: f64,
    pub avg_launch_angle_deg: f64,
    pub longest_home_run_ft: u32,
    /// Exit-velocity spread (population std-dev); lower is steadier.
    pub exit_velocity_spread: f64,
}

pub fn player_stats(player: &Player) -> PlayerStats {
    let distances: Vec<f64> = player.shots.iter().map(|s| s.distance_ft as f64).collect();
    let velos: Vec<f64> = player.shots.iter().map(|s| s.exit_velocity_mph).collect();
    let angles: Vec<f64> = player.shots.iter().map(|s| s.launch_angle_deg).collect();

    PlayerStats {
        player_id: player.id.clone(),
        name: player.name.clone(),
        swings: player.shots.len() as u32,
        home_runs: player.home_run_count(),
        total_score: player.total_score(),
        avg_distance_ft: mean(&distances).unwrap_or(0.0),
        avg_exit_velocity_mph: mean(&velos).unwrap_or(0.0),
        avg_launch_angle_deg: mean(&angles).unwrap_or(0.0),
        longest_home_run_ft: player
            .shots
            .iter()
            .filter(|s| s.is_home_run)
            .map(|s| s.distance_ft)
            .max()
            .unwrap_or(0),
        exit_velocity_spread: std_dev(&velos).unwrap_or(0.0),
    }
}

/// Final standings: home runs descending, ties broken by total score
/// descending. The sort is stable, so ranking an already-ranked list leaves
/// it untouched.
pub fn standings(players: &[Player]) -> Vec<PlayerStats> {
    players
        .iter()
        .map(player_stats)
        .sorted_by(|a, b| {
            b.home_runs
                .cmp(&a.home_runs)
                .then(b.total_score.cmp(&a.total_score))
        })
        .collect()
}

pub fn rank(stats: &mut [PlayerStats]) {
    stats.sort_by(|a, b| {
        b.home_runs
            .cmp(&a.home_runs)
            .then(b.total_score.cmp(&a.total_score))
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum Achievement {
    #[strum(to_string = "Longest home run")]
    LongestHomeRun,
    #[strum(to_string = "Most home runs")]
    MostHomeRuns,
    #[strum(to_string = "Best average exit velo")]
    BestAverageExitVelo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementAward {
    pub achievement: Achievement,
    pub player_name: String,
    pub value: f64,
}

/// One badge per category, to whichever player maximizes it. Ties go to the
/// first maximum found, in standings order.
pub fn award_achievements(stats: &[PlayerStats]) -> Vec<AchievementAward> {
    if stats.is_empty() {
        return Vec::new();
    }

    let best_by = |key: &dyn Fn(&PlayerStats) -> f64| {
        let mut best = &stats[0];
        for line in &stats[1..] {
            if key(line) > key(best) {
                best = line;
            }
        }
        best
    };

    let longest = best_by(&|s: &PlayerStats| s.longest_home_run_ft as f64);
    let most = best_by(&|s: &PlayerStats| s.home_runs as f64);
    let velo = best_by(&|s: &PlayerStats| s.avg_exit_velocity_mph);

    vec![
        AchievementAward {
            achievement: Achievement::LongestHomeRun,
            player_name: longest.name.clone(),
            value: longest.longest_home_run_ft as f64,
        },
        AchievementAward {
            achievement: Achievement::MostHomeRuns,
            player_name: most.name.clone(),
            value: most.home_runs as f64,
        },
        AchievementAward {
            achievement: Achievement::BestAverageExitVelo,
            player_name: velo.name.clone(),
            value: velo.avg_exit_velocity_mph,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shot::{test_shot, Player};

    fn player_with_shots(id: &str, rows: &[(u32, u32, bool, f64)]) -> Player {
        let mut player = Player::new(id, id.to_uppercase());
        for (i, &(distance, score, hr, velo)) in rows.iter().enumerate() {
            let mut shot = test_shot(i as u64 + 1);
            shot.distance_ft = distance;
            shot.score = score;
            shot.is_home_run = hr;
            shot.exit_velocity_mph = velo;
            player.shots.push(shot);
        }
        player
    }

    #[test]
    fn test_zero_shot_player_aggregates_are_zero() {
        let stats = player_stats(&Player::new("p1", "Ace"));
        assert_eq!(stats.swings, 0);
        assert_eq!(stats.home_runs, 0);
        assert_eq!(stats.total_score, 0);
        assert_eq!(stats.avg_distance_ft, 0.0);
        assert_eq!(stats.avg_exit_velocity_mph, 0.0);
        assert_eq!(stats.avg_launch_angle_deg, 0.0);
        assert_eq!(stats.longest_home_run_ft, 0);
        assert_eq!(stats.exit_velocity_spread, 0.0);
    }

    #[test]
    fn test_aggregates_over_shots() {
        let player = player_with_shots(
            "p1",
            &[
                (420, 80, true, 100.0),
                (380, 60, true, 90.0),
                (150, 10, false, 80.0),
            ],
        );
        let stats = player_stats(&player);
        assert_eq!(stats.swings, 3);
        assert_eq!(stats.home_runs, 2);
        assert_eq!(stats.total_score, 150);
        assert!((stats.avg_distance_ft - 316.6666).abs() < 0.001);
        assert_eq!(stats.avg_exit_velocity_mph, 90.0);
        assert_eq!(stats.longest_home_run_ft, 420);
        assert!(stats.exit_velocity_spread > 0.0);
    }

    #[test]
    fn test_longest_home_run_ignores_outs() {
        // The longest ball was an out; the badge tracks homers only.
        let player = player_with_shots("p1", &[(450, 50, false, 95.0), (350, 40, true, 92.0)]);
        assert_eq!(player_stats(&player).longest_home_run_ft, 350);
    }

    #[test]
    fn test_standings_order() {
        let players = vec![
            player_with_shots("p1", &[(300, 90, false, 85.0)]),
            player_with_shots("p2", &[(410, 20, true, 95.0)]),
            player_with_shots("p3", &[(405, 50, true, 93.0)]),
        ];
        let ranked = standings(&players);
        // p2 and p3 tie on homers; p3's score breaks the tie.
        assert_eq!(ranked[0].player_id, "p3");
        assert_eq!(ranked[1].player_id, "p2");
        assert_eq!(ranked[2].player_id, "p1");
    }

    #[test]
    fn test_ranking_is_idempotent() {
        let players = vec![
            player_with_shots("p1", &[(410, 40, true, 90.0)]),
            player_with_shots("p2", &[(400, 40, true, 91.0)]),
            player_with_shots("p3", &[(200, 10, false, 80.0)]),
        ];
        let once = standings(&players);
        let mut twice = once.clone();
        rank(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_achievements_to_maximizers() {
        let ranked = standings(&[
            player_with_shots("p1", &[(420, 30, true, 88.0)]),
            player_with_shots("p2", &[(390, 80, true, 99.0), (395, 70, true, 97.0)]),
        ]);
        let awards = award_achievements(&ranked);
        assert_eq!(awards.len(), 3);

        let by_kind = |kind| {
            awards
                .iter()
                .find(|a| a.achievement == kind)
                .unwrap()
                .player_name
                .clone()
        };
        assert_eq!(by_kind(Achievement::LongestHomeRun), "P1");
        assert_eq!(by_kind(Achievement::MostHomeRuns), "P2");
        assert_eq!(by_kind(Achievement::BestAverageExitVelo), "P2");
    }

    #[test]
    fn test_achievement_ties_go_to_first_found() {
        let ranked = standings(&[
            player_with_shots("p1", &[(400, 50, true, 90.0)]),
            player_with_shots("p2", &[(400, 50, true, 90.0)]),
        ]);
        let awards = award_achievements(&ranked);
        for award in awards {
            assert_eq!(award.player_name, ranked[0].name);
        }
    }

    #[test]
    fn test_no_players_no_awards() {
        assert!(award_achievements(&[]).is_empty());
    }
}
