//! Goal contract
//!
//! ## Ownership
//! - Home goal (z = +half_length) is defended by Home
//! - Away goal (z = -half_length) is defended by Away
//! - Home attacks the away goal, Away attacks the home goal

use crate::engine::config::FieldConfig;
use crate::engine::types::{TeamSide, Vec3};

/// Whole ball past the line: ball radius plus tolerance
const GOAL_LINE_EPSILON: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Goal {
    /// Side defending this goal
    pub owner: TeamSide,
    pub line_z: f32,
    pub half_width: f32,
    /// Crossbar height
    pub height: f32,
}

impl Goal {
    pub fn home_goal(field: &FieldConfig) -> Self {
        Self::for_owner(TeamSide::Home, field)
    }

    pub fn away_goal(field: &FieldConfig) -> Self {
        Self::for_owner(TeamSide::Away, field)
    }

    fn for_owner(owner: TeamSide, field: &FieldConfig) -> Self {
        Self {
            owner,
            line_z: owner.defended_goal_sign() * field.half_length,
            half_width: field.goal_half_width,
            height: field.goal_height,
        }
    }

    pub fn center(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.line_z)
    }

    /// Ball fully over the line, between the posts and under the bar.
    pub fn contains(&self, ball: &Vec3) -> bool {
        let between_posts = ball.x.abs() <= self.half_width;
        let under_bar = ball.y >= 0.0 && ball.y <= self.height;
        let crossed_line = match self.owner {
            TeamSide::Home => ball.z > self.line_z + GOAL_LINE_EPSILON,
            TeamSide::Away => ball.z < self.line_z - GOAL_LINE_EPSILON,
        };
        crossed_line && between_posts && under_bar
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Goals {
    pub home: Goal,
    pub away: Goal,
}

impl Goals {
    pub fn new(field: &FieldConfig) -> Self {
        Self { home: Goal::home_goal(field), away: Goal::away_goal(field) }
    }

    pub fn attacking_goal(&self, team: TeamSide) -> &Goal {
        match team {
            TeamSide::Home => &self.away,
            TeamSide::Away => &self.home,
        }
    }

    /// Side that scored, if the ball is in either goal.
    pub fn check_goal(&self, ball: &Vec3) -> Option<TeamSide> {
        if self.home.contains(ball) {
            return Some(TeamSide::Away);
        }
        if self.away.contains(ball) {
            return Some(TeamSide::Home);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goals() -> Goals {
        Goals::new(&FieldConfig::default())
    }

    #[test]
    fn test_goal_positions() {
        let g = goals();
        assert_eq!(g.home.line_z, 30.0);
        assert_eq!(g.away.line_z, -30.0);
        assert_eq!(g.attacking_goal(TeamSide::Home).owner, TeamSide::Away);
    }

    #[test]
    fn test_goal_check() {
        let g = goals();
        assert_eq!(g.check_goal(&Vec3::new(0.0, 1.0, -31.0)), Some(TeamSide::Home));
        assert_eq!(g.check_goal(&Vec3::new(1.0, 0.5, 31.0)), Some(TeamSide::Away));
        // wide
        assert_eq!(g.check_goal(&Vec3::new(6.0, 1.0, -31.0)), None);
        // over the bar
        assert_eq!(g.check_goal(&Vec3::new(0.0, 3.0, -31.0)), None);
        assert_eq!(g.check_goal(&Vec3::new(0.0, 0.5, 0.0)), None);
    }

    #[test]
    fn test_goal_line_epsilon() {
        let g = goals();
        assert_eq!(g.check_goal(&Vec3::new(0.0, 1.0, -30.15)), None);
        assert_eq!(g.check_goal(&Vec3::new(0.0, 1.0, -30.16)), Some(TeamSide::Home));
    }
}
