use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::action::Action;
use crate::api::types::Side;
use crate::core::geometry::is_finite;
use crate::error::CoreError;

/// Input events the match core understands.
/// Device mapping (keys, mouse, gamepad) is the host's job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Pick player `index` (1..=5) of `side`.
    SelectPlayer { side: Side, index: u8 },
    /// New aim for the selected player. Need not be normalised.
    SetAimDirection(Vec2),
    /// Fix the shot power; clamped to `[0, 1]`.
    SetPower(f32),
    /// Lock the aim, or fire once power is set.
    ConfirmAction,
    /// Flip the global pause gate.
    PauseToggle,
}

impl InputEvent {
    /// Map the event onto a turn action, rejecting malformed payloads.
    ///
    /// `PauseToggle` has no action counterpart and yields `Ok(None)`.
    pub fn to_action(self) -> Result<Option<Action>, CoreError> {
        match self {
            InputEvent::SelectPlayer { index, .. } => {
                if !(1..=5).contains(&index) {
                    return Err(CoreError::invalid_input(format!(
                        "player index {index} out of range"
                    )));
                }
                Ok(Some(Action::Select(index)))
            }
            InputEvent::SetAimDirection(v) => {
                if !is_finite(v) {
                    return Err(CoreError::invalid_input(format!("non-finite aim {v}")));
                }
                Ok(Some(Action::Aim(v)))
            }
            InputEvent::SetPower(p) => {
                if p.is_nan() {
                    return Err(CoreError::invalid_input("power is NaN"));
                }
                Ok(Some(Action::Power(p)))
            }
            InputEvent::ConfirmAction => Ok(Some(Action::Confirm)),
            InputEvent::PauseToggle => Ok(None),
        }
    }

    /// The side an event explicitly names, if any.
    pub fn side(&self) -> Option<Side> {
        match self {
            InputEvent::SelectPlayer { side, .. } => Some(*side),
            _ => None,
        }
    }
}

/// A queue of input events.
/// The host pushes events whenever they arrive; the manager drains them at
/// the next tick boundary.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
