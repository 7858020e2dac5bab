use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A circular rigid body: the part of a ball or player the solver touches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Centre in field coordinates.
    pub pos: Vec2,
    /// Velocity in world units per second.
    pub vel: Vec2,
    pub radius: f32,
    pub mass: f32,
}

impl Body {
    pub fn new(radius: f32, mass: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius,
            mass,
        }
    }

    // -- Builder pattern --

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_vel(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    pub fn is_moving(&self) -> bool {
        self.vel != Vec2::ZERO
    }

    /// Zero for immovable bodies (mass <= 0).
    pub fn inv_mass(&self) -> f32 {
        if self.mass > 0.0 {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    pub fn momentum(&self) -> Vec2 {
        self.vel * self.mass
    }

    /// Positive when the two circles interpenetrate.
    pub fn overlap(&self, other: &Body) -> f32 {
        self.radius + other.radius - self.pos.distance(other.pos)
    }

    pub fn stop(&mut self) {
        self.vel = Vec2::ZERO;
    }
}
