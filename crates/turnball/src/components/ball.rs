use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::PlayerId;
use crate::components::body::Body;

/// Short window after a kick during which the ball ignores contact impulses
/// from the kicker, so the kicker's own body does not swallow the shot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KickImmunity {
    pub player: PlayerId,
    pub steps_left: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub body: Body,
    /// Nearest player to a slow ball. Informational, never read by the solver.
    pub possessed_by: Option<PlayerId>,
    pub immunity: Option<KickImmunity>,
}

impl Ball {
    pub fn new(radius: f32, mass: f32) -> Self {
        Self {
            body: Body::new(radius, mass),
            possessed_by: None,
            immunity: None,
        }
    }

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.body.pos = pos;
        self
    }

    /// Set the ball moving and shield it from its kicker for `immunity_steps`.
    pub fn kick(&mut self, vel: Vec2, kicker: PlayerId, immunity_steps: u32) {
        self.body.vel = vel;
        self.possessed_by = None;
        self.immunity = (immunity_steps > 0).then_some(KickImmunity {
            player: kicker,
            steps_left: immunity_steps,
        });
    }

    pub fn is_immune_to(&self, player: PlayerId) -> bool {
        matches!(self.immunity, Some(imm) if imm.player == player && imm.steps_left > 0)
    }

    /// Count the immunity window down by one step.
    pub fn tick_immunity(&mut self) {
        if let Some(imm) = &mut self.immunity {
            imm.steps_left = imm.steps_left.saturating_sub(1);
            if imm.steps_left == 0 {
                self.immunity = None;
            }
        }
    }

    /// Place the ball at rest, clearing possession and immunity.
    pub fn place(&mut self, pos: Vec2) {
        self.body.pos = pos;
        self.body.stop();
        self.possessed_by = None;
        self.immunity = None;
    }
}
