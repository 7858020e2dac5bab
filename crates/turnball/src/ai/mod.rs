//! Computer opponent: the board evaluator plus the paced action source that
//! feeds its decisions through the same seam as human input.

pub mod engine;

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use engine::{AiContext, AiEngine, Decision, Intent};

use crate::api::action::{Action, ActionProvider};
use crate::api::types::{Difficulty, Side};
use crate::config::MatchConfig;
use crate::core::state::MatchState;
use crate::core::turn::TurnPhase;

/// Plays one side: decides at the start of its turn, then emits the
/// resulting actions one by one with a think delay between them.
#[derive(Debug, Clone)]
pub struct AiPlayer {
    side: Side,
    difficulty: Difficulty,
    engine: AiEngine,
    rng: ChaCha8Rng,
    think_steps: u32,
    cooldown: u32,
    plan: VecDeque<Action>,
    last_decision: Option<Decision>,
}

impl AiPlayer {
    pub fn new(side: Side, difficulty: Difficulty, config: &MatchConfig, seed: u64) -> Self {
        let think_steps = config.ai.preset(difficulty).think_steps;
        Self {
            side,
            difficulty,
            engine: AiEngine::new(config),
            rng: ChaCha8Rng::seed_from_u64(seed),
            think_steps,
            cooldown: think_steps,
            plan: VecDeque::new(),
            last_decision: None,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// The decision behind the current plan, if any.
    pub fn last_decision(&self) -> Option<&Decision> {
        self.last_decision.as_ref()
    }

    fn plan_turn(&mut self, state: &MatchState) {
        self.plan.clear();
        let Some(decision) = self
            .engine
            .decide(state, self.side, self.difficulty, &mut self.rng)
        else {
            log::warn!("AI for {:?} found no selectable player", self.side);
            return;
        };
        log::debug!(
            "AI {:?} ({:?}): {:?} with player {} at power {:.2}",
            self.side,
            self.difficulty,
            decision.intent,
            decision.player_index,
            decision.power
        );
        self.plan.extend([
            Action::Select(decision.player_index),
            Action::Aim(decision.direction),
            Action::Confirm,
            Action::Power(decision.power),
            Action::Confirm,
        ]);
        self.last_decision = Some(decision);
    }
}

impl ActionProvider for AiPlayer {
    fn next_action(&mut self, state: &MatchState) -> Option<Action> {
        if state.turn.owner != self.side || !state.turn.phase.accepts_input() {
            return None;
        }
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return None;
        }
        // A plan only starts from a fresh turn; anything else is stale
        let fresh = state.turn.phase == TurnPhase::Select;
        if fresh && !matches!(self.plan.front(), Some(Action::Select(_))) {
            self.plan_turn(state);
        }
        let action = self.plan.pop_front()?;
        self.cooldown = self.think_steps;
        Some(action)
    }

    fn reset(&mut self) {
        self.plan.clear();
        self.cooldown = self.think_steps;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{MatchStatus, Mode};
    use crate::components::ball::Ball;
    use crate::components::team::Team;
    use crate::core::field::Field;
    use crate::core::state::MatchClock;
    use crate::core::turn::{Turn, TurnController};
    use crate::tactics::Tactic;

    fn state(config: &MatchConfig, owner: Side) -> MatchState {
        let field = Field::from_config(config);
        MatchState {
            field,
            ball: Ball::new(config.ball_radius, config.ball_mass),
            teams: [
                Team::new(Side::A, Tactic::balanced(), &field, config),
                Team::new(Side::B, Tactic::balanced(), &field, config),
            ],
            turn: Turn::new(owner, config),
            clock: MatchClock::new(config.max_rounds),
            difficulty: Difficulty::Easy,
            mode: Mode::default(),
            paused: false,
            status: MatchStatus::Playing,
        }
    }

    #[test]
    fn waits_think_steps_between_actions() {
        let config = MatchConfig::default();
        let think = config.ai.preset(Difficulty::Easy).think_steps;
        let s = state(&config, Side::B);
        let mut ai = AiPlayer::new(Side::B, Difficulty::Easy, &config, 42);

        for _ in 0..think {
            assert_eq!(ai.next_action(&s), None);
        }
        assert!(matches!(ai.next_action(&s), Some(Action::Select(_))));
        assert_eq!(ai.next_action(&s), None);
    }

    #[test]
    fn idle_on_opponent_turn() {
        let config = MatchConfig::default();
        let s = state(&config, Side::A);
        let mut ai = AiPlayer::new(Side::B, Difficulty::Hard, &config, 1);
        for _ in 0..200 {
            assert_eq!(ai.next_action(&s), None);
        }
    }

    #[test]
    fn plan_ends_with_confirm() {
        let config = MatchConfig {
            ai: crate::config::AiTuning {
                hard: crate::config::DifficultyPreset {
                    think_steps: 0,
                    ..MatchConfig::default().ai.hard
                },
                ..MatchConfig::default().ai
            },
            ..MatchConfig::default()
        };
        let mut s = state(&config, Side::B);
        let mut ai = AiPlayer::new(Side::B, Difficulty::Hard, &config, 9);
        let mut actions = Vec::new();
        while let Some(action) = ai.next_action(&s) {
            actions.push(action);
            let ball = s.ball.body.pos;
            let MatchState { turn, teams, .. } = &mut s;
            TurnController
                .apply(turn, &mut teams[Side::B.index()], ball, action)
                .unwrap();
            assert!(actions.len() <= 5);
        }
        assert_eq!(actions.len(), 5);
        assert!(matches!(actions[0], Action::Select(_)));
        assert!(matches!(actions[3], Action::Power(p) if (0.0..=1.0).contains(&p)));
        assert_eq!(actions[4], Action::Confirm);
        assert_eq!(s.turn.phase, TurnPhase::Simulate);
    }
}
