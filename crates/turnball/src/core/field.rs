//! Field geometry in centred coordinates.
//!
//! ```text
//!        -half_w                    0                    +half_w
//!  -half_h +-------------------------------------------------+
//!          |                        |                        |
//!     +----+  goal A                |               goal B   +----+
//!     |net |  (Team A defends)      o                        |net |
//!     +----+                        |                        +----+
//!          |                        |                        |
//!  +half_h +-------------------------------------------------+
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::Side;
use crate::config::MatchConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub half_width: f32,
    pub half_height: f32,
    /// Half the goal mouth opening.
    pub goal_half: f32,
    pub goal_depth: f32,
}

impl Field {
    pub fn new(width: f32, height: f32, goal_width: f32, goal_depth: f32) -> Self {
        Self {
            half_width: width * 0.5,
            half_height: height * 0.5,
            goal_half: goal_width * 0.5,
            goal_depth,
        }
    }

    pub fn from_config(config: &MatchConfig) -> Self {
        Self::new(
            config.field_width,
            config.field_height,
            config.goal_width,
            config.goal_depth,
        )
    }

    pub fn width(&self) -> f32 {
        self.half_width * 2.0
    }

    pub fn height(&self) -> f32 {
        self.half_height * 2.0
    }

    /// x of the goal line `side` defends.
    pub fn goal_line_x(&self, side: Side) -> f32 {
        -side.attack_sign() * self.half_width
    }

    /// Whether a y coordinate lies within the goal mouth.
    pub fn in_mouth(&self, y: f32) -> bool {
        y.abs() <= self.goal_half
    }

    /// Centre of the goal `side` defends, on the goal line.
    pub fn goal_center(&self, side: Side) -> Vec2 {
        Vec2::new(self.goal_line_x(side), 0.0)
    }

    /// Two aim points inside the net `side` defends, just off each post.
    pub fn goal_targets(&self, side: Side, post_margin: f32) -> [Vec2; 2] {
        let x = self.goal_line_x(side) - side.attack_sign() * (self.goal_depth * 0.5);
        let y = (self.goal_half - post_margin).max(0.0);
        [Vec2::new(x, -y), Vec2::new(x, y)]
    }

    /// Whether `x` lies in `side`'s half.
    pub fn in_half(&self, side: Side, x: f32) -> bool {
        match side {
            Side::A => x < 0.0,
            Side::B => x > 0.0,
        }
    }

    /// Convert a formation offset into field coordinates.
    ///
    /// `offset.x` is the fraction of the field length measured from the team's
    /// own goal line, `offset.y` the fraction of the width from the top line.
    pub fn formation_point(&self, side: Side, offset: Vec2) -> Vec2 {
        let from_own_line = offset.x * self.width();
        let x = self.goal_line_x(side) + side.attack_sign() * from_own_line;
        let y = -self.half_height + offset.y * self.height();
        Vec2::new(x, y)
    }

    /// Kickoff ball spot: the centre, shifted toward the conceding team's half.
    pub fn kickoff_spot(&self, conceding: Option<Side>, offset: f32) -> Vec2 {
        match conceding {
            Some(side) => Vec2::new(-side.attack_sign() * offset, 0.0),
            None => Vec2::ZERO,
        }
    }

    /// The side whose goal the ball has completely crossed, if any.
    pub fn goal_crossed(&self, pos: Vec2, radius: f32) -> Option<Side> {
        if !self.in_mouth(pos.y) {
            return None;
        }
        if pos.x + radius < -self.half_width {
            Some(Side::A)
        } else if pos.x - radius > self.half_width {
            Some(Side::B)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Field {
        Field::new(1100.0, 670.0, 160.0, 50.0)
    }

    #[test]
    fn formation_points_mirror() {
        let f = field();
        let a = f.formation_point(Side::A, Vec2::new(0.1, 0.5));
        let b = f.formation_point(Side::B, Vec2::new(0.1, 0.5));
        assert!((a - Vec2::new(-440.0, 0.0)).length() < 1e-3);
        assert!((b - Vec2::new(440.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn goal_needs_full_crossing() {
        let f = field();
        // Half over the line: no goal yet
        assert_eq!(f.goal_crossed(Vec2::new(-550.0, 0.0), 12.0), None);
        assert_eq!(f.goal_crossed(Vec2::new(-563.0, 0.0), 12.0), Some(Side::A));
        assert_eq!(f.goal_crossed(Vec2::new(563.0, 10.0), 12.0), Some(Side::B));
        // Wide of the posts never scores
        assert_eq!(f.goal_crossed(Vec2::new(-563.0, 200.0), 12.0), None);
    }

    #[test]
    fn kickoff_spot_favours_conceding_half() {
        let f = field();
        assert_eq!(f.kickoff_spot(Some(Side::A), 80.0), Vec2::new(-80.0, 0.0));
        assert_eq!(f.kickoff_spot(Some(Side::B), 80.0), Vec2::new(80.0, 0.0));
        assert_eq!(f.kickoff_spot(None, 80.0), Vec2::ZERO);
    }

    #[test]
    fn goal_targets_sit_inside_the_net() {
        let f = field();
        let [top, bottom] = f.goal_targets(Side::B, 15.0);
        assert!(top.x > f.half_width && bottom.x > f.half_width);
        assert!(f.in_mouth(top.y) && f.in_mouth(bottom.y));
    }
}
