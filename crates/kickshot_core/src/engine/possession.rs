//! Possession arbitration
//!
//! Pure helpers: who may touch the ball, who wins it, and where a carried
//! ball sits. The stateful side (locks, notifications) lives in
//! [`crate::engine::ball_controller`].

use crate::engine::config::BallConfig;
use crate::engine::types::{planar_distance, yaw_to_direction, PlayerSnapshot, Vec3};

/// Reach added per unit of player scale
const SCALE_REACH: f32 = 0.35;
/// Lowest carry height regardless of scale
const MIN_CARRY_HEIGHT: f32 = 0.55;

/// Height above the player origin where a carried ball sits.
pub fn carry_height(player: &PlayerSnapshot, cfg: &BallConfig) -> f32 {
    player.position.y + MIN_CARRY_HEIGHT.max(player.scale * cfg.follow_height_multiplier)
}

pub fn reach(player: &PlayerSnapshot, cfg: &BallConfig) -> f32 {
    cfg.touch_radius + player.scale * SCALE_REACH
}

/// Planar distance to the ball when the player can touch it.
pub fn eligible_distance(ball: &Vec3, player: &PlayerSnapshot, cfg: &BallConfig) -> Option<f32> {
    let distance = planar_distance(ball, &player.position);
    if !distance.is_finite() || distance > reach(player, cfg) {
        return None;
    }
    if (ball.y - carry_height(player, cfg)).abs() > cfg.height_tolerance {
        return None;
    }
    Some(distance)
}

/// Picks the controlling player.
///
/// The incumbent keeps the ball while still eligible, even if someone else
/// is closer. Otherwise the nearest eligible player wins; ties go to the
/// first one in roster order.
pub fn arbitrate<'a>(
    ball: &Vec3,
    roster: &'a [PlayerSnapshot],
    incumbent: Option<&str>,
    cfg: &BallConfig,
) -> Option<&'a PlayerSnapshot> {
    if let Some(id) = incumbent {
        if let Some(player) = roster.iter().find(|p| p.id == id) {
            if eligible_distance(ball, player, cfg).is_some() {
                return Some(player);
            }
        }
    }

    let mut best: Option<(&PlayerSnapshot, f32)> = None;
    for player in roster {
        let Some(distance) = eligible_distance(ball, player, cfg) else {
            continue;
        };
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((player, distance)),
        }
    }
    best.map(|(player, _)| player)
}

/// Where the ball is pinned while `player` carries it.
pub fn follow_position(player: &PlayerSnapshot, cfg: &BallConfig) -> Vec3 {
    let facing = yaw_to_direction(player.yaw);
    let distance = cfg.follow_distance + player.scale * SCALE_REACH;
    Vec3::new(
        player.position.x + facing.x * distance,
        carry_height(player, cfg),
        player.position.z + facing.z * distance,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide_cfg() -> BallConfig {
        BallConfig { touch_radius: 8.0, ..BallConfig::default() }
    }

    fn player(id: &str, x: f32) -> PlayerSnapshot {
        PlayerSnapshot::new(id, "home", Vec3::new(x, 0.0, 0.0), 0.0)
    }

    fn ball() -> Vec3 {
        Vec3::new(0.0, 0.55, 0.0)
    }

    #[test]
    fn test_nearest_player_wins() {
        let cfg = wide_cfg();
        let roster = vec![player("far", 7.0), player("near", -3.0)];
        let winner = arbitrate(&ball(), &roster, None, &cfg).unwrap();
        assert_eq!(winner.id, "near");
    }

    #[test]
    fn test_incumbent_is_sticky() {
        let cfg = wide_cfg();
        let roster = vec![player("challenger", 1.0), player("incumbent", -3.0)];
        let winner = arbitrate(&ball(), &roster, Some("incumbent"), &cfg).unwrap();
        assert_eq!(winner.id, "incumbent");
    }

    #[test]
    fn test_tie_goes_to_roster_order() {
        let cfg = wide_cfg();
        let roster = vec![player("first", 2.0), player("second", -2.0)];
        assert_eq!(arbitrate(&ball(), &roster, None, &cfg).unwrap().id, "first");
    }

    #[test]
    fn test_height_tolerance() {
        let cfg = BallConfig::default();
        let p = player("p", 0.5);
        assert!(eligible_distance(&Vec3::new(0.0, 0.55, 0.0), &p, &cfg).is_some());
        assert!(eligible_distance(&Vec3::new(0.0, 3.0, 0.0), &p, &cfg).is_none());
    }

    #[test]
    fn test_scale_widens_reach() {
        let cfg = BallConfig::default();
        let mut big = player("big", 1.6);
        assert!(eligible_distance(&ball(), &big, &cfg).is_none());
        big.scale = 2.0;
        assert!(eligible_distance(&ball(), &big, &cfg).is_some());
    }

    #[test]
    fn test_nobody_in_range() {
        let roster = vec![player("a", 10.0)];
        assert!(arbitrate(&ball(), &roster, None, &BallConfig::default()).is_none());
    }

    #[test]
    fn test_follow_position_in_front() {
        let cfg = BallConfig::default();
        let p = PlayerSnapshot::new("p", "home", Vec3::new(2.0, 0.0, 2.0), 0.0);
        let pos = follow_position(&p, &cfg);
        assert!(pos.z > 2.0);
        assert!((pos.x - 2.0).abs() < 1e-5);
        assert!((pos.y - 0.55).abs() < 1e-5);
    }
}
