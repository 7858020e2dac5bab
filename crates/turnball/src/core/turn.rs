//! The per-turn state machine: `Select -> Aim -> Power -> Simulate -> Settled`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::action::Action;
use crate::api::types::{PlayerId, Side};
use crate::components::team::Team;
use crate::config::MatchConfig;
use crate::core::geometry::direction;
use crate::core::physics::StepOutcome;
use crate::error::CoreError;
use crate::tactics::PLAYERS_PER_TEAM;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TurnPhase {
    #[default]
    Select,
    Aim,
    Power,
    Simulate,
    Settled,
}

impl TurnPhase {
    /// Whether the owner may still change the shot.
    pub fn accepts_input(self) -> bool {
        matches!(self, TurnPhase::Select | TurnPhase::Aim | TurnPhase::Power)
    }
}

/// Held-input power gauge that sweeps between `min` and 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerMeter {
    pub value: f32,
    rising: bool,
    min: f32,
    rate: f32,
}

impl PowerMeter {
    pub fn new(min: f32, rate: f32) -> Self {
        let min = min.clamp(0.0, 1.0);
        Self {
            value: min,
            rising: true,
            min,
            rate,
        }
    }

    /// Advance one fixed step, bouncing off both ends.
    pub fn tick(&mut self) {
        if self.rising {
            self.value += self.rate;
            if self.value >= 1.0 {
                self.value = 1.0;
                self.rising = false;
            }
        } else {
            self.value -= self.rate;
            if self.value <= self.min {
                self.value = self.min;
                self.rising = true;
            }
        }
    }

    pub fn reset(&mut self) {
        self.value = self.min;
        self.rising = true;
    }
}

/// The confirmed shot, ready for the solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub kicker: PlayerId,
    pub dir: Vec2,
    pub power: f32,
}

/// The active turn. Reset when the field settles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub owner: Side,
    /// 1-based index of the selected player.
    pub selected: Option<u8>,
    pub phase: TurnPhase,
    /// Unit aim direction; zero until a player is selected.
    pub aim: Vec2,
    /// Power fixed by an explicit `Power` action.
    pub power: Option<f32>,
    pub meter: PowerMeter,
    /// Side that owns the next turn, known once the turn has settled.
    pub next_owner: Option<Side>,
}

impl Turn {
    pub fn new(owner: Side, config: &MatchConfig) -> Self {
        Self {
            owner,
            selected: None,
            phase: TurnPhase::Select,
            aim: Vec2::ZERO,
            power: None,
            meter: PowerMeter::new(config.min_power, config.meter_rate),
            next_owner: None,
        }
    }

    /// Explicit power if one was set, otherwise the meter reading.
    pub fn current_power(&self) -> f32 {
        self.power.unwrap_or(self.meter.value)
    }

    pub fn kicker(&self) -> Option<PlayerId> {
        self.selected.map(|index| PlayerId::new(self.owner, index))
    }
}

/// Drives a [`Turn`] through its phases.
///
/// Holds no state of its own. The turn lives in the match state so snapshots
/// and the AI can read it.
#[derive(Debug, Clone, Copy)]
pub struct TurnController;

impl TurnController {
    /// Apply one owner action. Rejected actions leave the turn untouched.
    ///
    /// Returns the launch when `Confirm` ends the power phase.
    pub fn apply(
        &self,
        turn: &mut Turn,
        team: &mut Team,
        ball_pos: Vec2,
        action: Action,
    ) -> Result<Option<Launch>, CoreError> {
        if !turn.phase.accepts_input() {
            return Err(CoreError::invalid_input(format!(
                "{action:?} ignored during {:?}",
                turn.phase
            )));
        }

        match action {
            Action::Select(index) => {
                self.select(turn, team, ball_pos, index)?;
                Ok(None)
            }
            Action::Aim(v) => {
                if turn.phase != TurnPhase::Aim {
                    return Err(CoreError::invalid_input(format!("aim during {:?}", turn.phase)));
                }
                turn.aim = direction(v)
                    .ok_or_else(|| CoreError::invalid_input(format!("degenerate aim {v}")))?;
                Ok(None)
            }
            Action::Power(p) => {
                if turn.phase != TurnPhase::Power {
                    return Err(CoreError::invalid_input(format!("power during {:?}", turn.phase)));
                }
                if p.is_nan() {
                    return Err(CoreError::invalid_input("power is NaN"));
                }
                turn.power = Some(p.clamp(0.0, 1.0));
                Ok(None)
            }
            Action::Confirm => match turn.phase {
                TurnPhase::Aim => {
                    turn.phase = TurnPhase::Power;
                    Ok(None)
                }
                TurnPhase::Power => {
                    let kicker = turn
                        .kicker()
                        .ok_or_else(|| CoreError::invalid_input("confirm without a selection"))?;
                    turn.phase = TurnPhase::Simulate;
                    Ok(Some(Launch {
                        kicker,
                        dir: turn.aim,
                        power: turn.current_power(),
                    }))
                }
                _ => Err(CoreError::invalid_input("nothing to confirm")),
            },
        }
    }

    fn select(
        &self,
        turn: &mut Turn,
        team: &mut Team,
        ball_pos: Vec2,
        index: u8,
    ) -> Result<(), CoreError> {
        if index == 0 || index as usize > PLAYERS_PER_TEAM {
            return Err(CoreError::invalid_input(format!("player index {index} out of range")));
        }
        let player = team
            .player(index)
            .ok_or_else(|| CoreError::invalid_input(format!("no player {index}")))?;
        if !player.can_be_selected() {
            return Err(CoreError::invalid_input(format!("player {index} cannot be selected")));
        }
        let toward_ball = direction(ball_pos - player.body.pos);

        team.select_only(index);
        turn.selected = Some(index);
        turn.aim = toward_ball.unwrap_or(Vec2::new(turn.owner.attack_sign(), 0.0));
        turn.power = None;
        turn.meter.reset();
        turn.phase = TurnPhase::Aim;
        Ok(())
    }

    /// Per-step upkeep: charges the meter while the owner holds power.
    pub fn tick(&self, turn: &mut Turn) {
        if turn.phase == TurnPhase::Power && turn.power.is_none() {
            turn.meter.tick();
        }
    }

    /// Close the simulate phase. Returns the side that owns the next turn.
    ///
    /// After a goal the conceding team kicks off; otherwise ownership flips.
    pub fn settle(&self, turn: &mut Turn, outcome: StepOutcome) -> Side {
        let next = match outcome {
            StepOutcome::Goal { scorer } => scorer.other(),
            _ => turn.owner.other(),
        };
        turn.phase = TurnPhase::Settled;
        turn.next_owner = Some(next);
        next
    }

    /// Start a fresh turn for `owner`, clearing the previous selection.
    pub fn begin(&self, turn: &mut Turn, teams: &mut [Team; 2], owner: Side, config: &MatchConfig) {
        for team in teams.iter_mut() {
            team.clear_selection();
        }
        *turn = Turn::new(owner, config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::Field;
    use crate::tactics::Tactic;

    fn setup() -> (Turn, Team, MatchConfig) {
        let config = MatchConfig::default();
        let field = Field::from_config(&config);
        let team = Team::new(Side::A, Tactic::balanced(), &field, &config);
        (Turn::new(Side::A, &config), team, config)
    }

    #[test]
    fn full_cycle_yields_launch() {
        let (mut turn, mut team, _) = setup();
        let tc = TurnController;
        tc.apply(&mut turn, &mut team, Vec2::ZERO, Action::Select(4)).unwrap();
        assert_eq!(turn.phase, TurnPhase::Aim);
        tc.apply(&mut turn, &mut team, Vec2::ZERO, Action::Aim(Vec2::new(0.0, 3.0))).unwrap();
        tc.apply(&mut turn, &mut team, Vec2::ZERO, Action::Confirm).unwrap();
        assert_eq!(turn.phase, TurnPhase::Power);
        tc.apply(&mut turn, &mut team, Vec2::ZERO, Action::Power(1.7)).unwrap();
        let launch = tc
            .apply(&mut turn, &mut team, Vec2::ZERO, Action::Confirm)
            .unwrap()
            .unwrap();
        assert_eq!(launch.kicker, PlayerId::new(Side::A, 4));
        assert_eq!(launch.dir, Vec2::Y);
        assert_eq!(launch.power, 1.0);
        assert_eq!(turn.phase, TurnPhase::Simulate);
    }

    #[test]
    fn select_seeds_aim_toward_ball() {
        let (mut turn, mut team, _) = setup();
        let ball = team.players[0].body.pos + Vec2::new(0.0, -50.0);
        TurnController
            .apply(&mut turn, &mut team, ball, Action::Select(1))
            .unwrap();
        assert!((turn.aim - Vec2::new(0.0, -1.0)).length() < 1e-5);
        assert!(team.players[0].selected);
    }

    #[test]
    fn bad_input_leaves_turn_unchanged() {
        let (mut turn, mut team, _) = setup();
        let tc = TurnController;
        assert!(tc.apply(&mut turn, &mut team, Vec2::ZERO, Action::Select(6)).is_err());
        assert!(tc.apply(&mut turn, &mut team, Vec2::ZERO, Action::Select(0)).is_err());
        assert!(tc.apply(&mut turn, &mut team, Vec2::ZERO, Action::Confirm).is_err());
        assert_eq!(turn.phase, TurnPhase::Select);

        tc.apply(&mut turn, &mut team, Vec2::ZERO, Action::Select(2)).unwrap();
        let before = turn.clone();
        assert!(tc.apply(&mut turn, &mut team, Vec2::ZERO, Action::Aim(Vec2::ZERO)).is_err());
        assert!(tc
            .apply(&mut turn, &mut team, Vec2::ZERO, Action::Aim(Vec2::new(f32::NAN, 1.0)))
            .is_err());
        assert_eq!(turn, before);
    }

    #[test]
    fn reselect_returns_to_aim() {
        let (mut turn, mut team, _) = setup();
        let tc = TurnController;
        tc.apply(&mut turn, &mut team, Vec2::ZERO, Action::Select(2)).unwrap();
        tc.apply(&mut turn, &mut team, Vec2::ZERO, Action::Confirm).unwrap();
        tc.tick(&mut turn);
        tc.apply(&mut turn, &mut team, Vec2::ZERO, Action::Select(5)).unwrap();
        assert_eq!(turn.phase, TurnPhase::Aim);
        assert_eq!(turn.selected, Some(5));
        assert_eq!(team.players.iter().filter(|p| p.selected).count(), 1);
    }

    #[test]
    fn simulate_rejects_owner_input() {
        let (mut turn, mut team, _) = setup();
        turn.phase = TurnPhase::Simulate;
        assert!(TurnController
            .apply(&mut turn, &mut team, Vec2::ZERO, Action::Select(1))
            .is_err());
    }

    #[test]
    fn meter_sweeps_between_bounds() {
        let mut meter = PowerMeter::new(0.5, 0.2);
        let mut seen_top = false;
        for _ in 0..20 {
            meter.tick();
            assert!(meter.value >= 0.5 && meter.value <= 1.0);
            seen_top |= meter.value == 1.0;
        }
        assert!(seen_top);
    }

    #[test]
    fn settle_picks_next_owner() {
        let (mut turn, _, _) = setup();
        let tc = TurnController;
        assert_eq!(tc.settle(&mut turn, StepOutcome::Settled), Side::B);
        assert_eq!(turn.phase, TurnPhase::Settled);
        // Own goal by A: B scores, A (conceding) goes again
        assert_eq!(tc.settle(&mut turn, StepOutcome::Goal { scorer: Side::B }), Side::A);
    }
}
