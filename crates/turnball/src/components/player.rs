use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::PlayerId;
use crate::components::body::Body;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerStatus {
    #[default]
    Idle,
    Selected,
    /// Launched this turn and still in motion.
    Kicking,
    /// Cannot be selected. Set by hosts (e.g. after a foul); the core only honours it.
    Stunned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub body: Body,
    pub selected: bool,
    pub status: PlayerStatus,
}

impl Player {
    pub fn new(id: PlayerId, radius: f32, mass: f32) -> Self {
        Self {
            id,
            body: Body::new(radius, mass),
            selected: false,
            status: PlayerStatus::Idle,
        }
    }

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.body.pos = pos;
        self
    }

    pub fn can_be_selected(&self) -> bool {
        self.status != PlayerStatus::Stunned
    }

    pub fn select(&mut self) {
        self.selected = true;
        self.status = PlayerStatus::Selected;
    }

    pub fn deselect(&mut self) {
        self.selected = false;
        if self.status != PlayerStatus::Stunned {
            self.status = PlayerStatus::Idle;
        }
    }

    /// Put the player on its kickoff spot, at rest and idle.
    pub fn place(&mut self, pos: Vec2) {
        self.body.pos = pos;
        self.body.stop();
        self.deselect();
    }

    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.body.pos.distance(point)
    }
}
