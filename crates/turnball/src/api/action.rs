use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ai::AiPlayer;
use crate::core::state::MatchState;

/// One step of building a shot. Humans and the AI speak the same language.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Pick a player by 1-based index.
    Select(u8),
    /// Point the shot. Any finite non-zero vector; it is normalised.
    Aim(Vec2),
    /// Fix the power instead of using the meter. Clamped to `[0, 1]`.
    Power(f32),
    /// Lock the aim, or fire once power is set.
    Confirm,
}

/// Source of actions for the side whose turn it is.
///
/// Polled once per fixed step while that side's turn accepts input.
pub trait ActionProvider {
    fn next_action(&mut self, state: &MatchState) -> Option<Action>;

    /// Drop anything queued for a turn that has ended.
    fn reset(&mut self) {}
}

/// Actions a human queued through input events, replayed in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HumanInput {
    pending: VecDeque<Action>,
}

impl HumanInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action) {
        self.pending.push_back(action);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl ActionProvider for HumanInput {
    fn next_action(&mut self, _state: &MatchState) -> Option<Action> {
        self.pending.pop_front()
    }

    fn reset(&mut self) {
        self.pending.clear();
    }
}

/// Whoever drives one side of the match.
#[derive(Debug, Clone)]
pub enum Controller {
    Human(HumanInput),
    Ai(AiPlayer),
}

impl Controller {
    pub fn as_human_mut(&mut self) -> Option<&mut HumanInput> {
        match self {
            Controller::Human(human) => Some(human),
            Controller::Ai(_) => None,
        }
    }
}

impl ActionProvider for Controller {
    fn next_action(&mut self, state: &MatchState) -> Option<Action> {
        match self {
            Controller::Human(human) => human.next_action(state),
            Controller::Ai(ai) => ai.next_action(state),
        }
    }

    fn reset(&mut self) {
        match self {
            Controller::Human(human) => human.reset(),
            Controller::Ai(ai) => ai.reset(),
        }
    }
}
