//! Board evaluation for the computer-controlled side.
//!
//! Every candidate (player, target) pair gets a score from a handful of
//! named weights; the best one becomes a [`Decision`]. All randomness comes
//! from the RNG the caller passes in, so a seed replays a match exactly.

use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::api::types::{Difficulty, Side};
use crate::components::player::Player;
use crate::config::{DifficultyPreset, MatchConfig};
use crate::core::geometry::{direction, segment_point_distance};
use crate::core::state::MatchState;

/// Opponents must be this much closer to the ball before we drop back.
const DEFEND_MARGIN: f32 = 12.0;
/// Aim points sit this far inside each post.
const POST_MARGIN: f32 = 15.0;
/// Share of the ball-to-goal line at which a defender sets up.
const BLOCK_RATIO: f32 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    Shoot,
    Attack,
    Defend,
}

/// What the AI wants to do this turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// 1-based index of the player to move.
    pub player_index: u8,
    /// Unit aim direction.
    pub direction: Vec2,
    /// Launch power in `[min_power, 1]`.
    pub power: f32,
    pub intent: Intent,
    /// Point the shot was planned toward, before jitter.
    pub target: Vec2,
}

/// Score, time and risk as seen by one side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiContext {
    pub goal_difference: i32,
    pub rounds_left: u32,
    pub endgame: bool,
    /// Appetite for risk in `[0, 1]`.
    pub risk: f32,
}

impl AiContext {
    pub fn leading(&self) -> bool {
        self.goal_difference > 0
    }

    pub fn trailing(&self) -> bool {
        self.goal_difference < 0
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: u8,
    target: Vec2,
    score: f32,
    /// The launch hits the ball directly rather than moving the player.
    kicks: bool,
}

#[derive(Debug, Clone)]
pub struct AiEngine {
    config: MatchConfig,
}

impl AiEngine {
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Read the match from `side`'s point of view.
    pub fn context(&self, state: &MatchState, side: Side, difficulty: Difficulty) -> AiContext {
        let preset = self.config.ai.preset(difficulty);
        let w = &self.config.ai.weights;
        let goal_difference = state.goal_difference(side);
        let rounds_left = state.clock.rounds_remaining();
        let aggression = state.team(side).tactic.weights.aggression;

        let deficit = (-goal_difference).max(0) as f32;
        let risk = preset.base_risk
            + (aggression - 0.5) * w.aggression_risk
            + deficit * w.trailing_risk_per_goal;

        AiContext {
            goal_difference,
            rounds_left,
            endgame: rounds_left <= self.config.ai.endgame_rounds,
            risk: risk.clamp(0.0, 1.0),
        }
    }

    /// Decide whether to shoot, attack or fall back.
    pub fn intent(&self, state: &MatchState, side: Side) -> Intent {
        let ball = state.ball.body.pos;
        let reach = self.config.kick_reach();
        let mine = movable(state, side);

        if mine.iter().any(|p| p.distance_to(ball) <= reach) {
            return Intent::Shoot;
        }
        let my_nearest = mine.iter().map(|p| p.distance_to(ball)).fold(f32::INFINITY, f32::min);
        let opp_nearest = state
            .team(side.other())
            .players
            .iter()
            .map(|p| p.distance_to(ball))
            .fold(f32::INFINITY, f32::min);

        if state.field.in_half(side, ball.x) && opp_nearest + DEFEND_MARGIN < my_nearest {
            Intent::Defend
        } else {
            Intent::Attack
        }
    }

    /// Pick a player, direction and power for `side`.
    ///
    /// Returns `None` only when no player of `side` can be selected.
    pub fn decide(
        &self,
        state: &MatchState,
        side: Side,
        difficulty: Difficulty,
        rng: &mut ChaCha8Rng,
    ) -> Option<Decision> {
        let preset = *self.config.ai.preset(difficulty);
        let ctx = self.context(state, side, difficulty);
        let intent = self.intent(state, side);

        let mut jitter = preset.aim_jitter;
        if ctx.endgame && ctx.trailing() {
            jitter *= self.config.ai.weights.endgame_jitter_scale;
        }

        let mut best: Option<Candidate> = None;
        for candidate in self.candidates(state, side, intent, &ctx, &preset) {
            let score = candidate.score + uniform(rng, jitter);
            if best.map_or(true, |b| score > b.score) {
                best = Some(Candidate { score, ..candidate });
            }
        }
        let best = best?;

        let player = state.team(side).player(best.index)?;
        // A kick leaves from the ball, a run from the player
        let origin = if best.kicks { state.ball.body.pos } else { player.body.pos };
        let aimed = best.target + Vec2::new(uniform(rng, jitter), uniform(rng, jitter));
        let direction = direction(aimed - origin)
            .or_else(|| direction(best.target - origin))
            .unwrap_or(Vec2::new(side.attack_sign(), 0.0));

        let power = self.power(state, player, &best, intent, &ctx, &preset, rng);

        Some(Decision {
            player_index: best.index,
            direction,
            power,
            intent,
            target: best.target,
        })
    }

    fn candidates(
        &self,
        state: &MatchState,
        side: Side,
        intent: Intent,
        ctx: &AiContext,
        preset: &DifficultyPreset,
    ) -> Vec<Candidate> {
        let w = &self.config.ai.weights;
        let field = &state.field;
        let ball = &state.ball.body;
        let reach = self.config.kick_reach();
        let opponents: Vec<Vec2> = state
            .team(side.other())
            .players
            .iter()
            .map(|p| p.body.pos)
            .collect();

        let spacing = state.team(side).tactic.weights.spacing;
        let lane = (w.lane_base - ctx.risk * w.lane_risk_shrink) * (0.5 + spacing);
        let goal_targets = field.goal_targets(side.other(), POST_MARGIN);
        let opp_goal = field.goal_center(side.other());
        let own_goal = field.goal_center(side);

        let mut out = Vec::new();
        for player in movable(state, side) {
            let pos = player.body.pos;
            let d_ball = player.distance_to(ball.pos).max(1.0);
            let can_kick = d_ball <= reach;
            let base = if player.id.index == 1 { -w.keeper_penalty } else { 0.0 };
            let push = |out: &mut Vec<Candidate>, target: Vec2, score: f32, kicks: bool| {
                out.push(Candidate {
                    index: player.id.index,
                    target,
                    score: base + score,
                    kicks,
                })
            };

            match intent {
                Intent::Shoot if can_kick => {
                    let shot_lane = w.shoot_lane_base + (1.0 - ctx.risk) * w.shoot_lane_risk;
                    let proximity = w.kick_bonus + w.shoot_ball_proximity / d_ball;
                    for target in goal_targets {
                        let blockers = line_pressure(ball.pos, target, &opponents, lane);
                        push(&mut out, target, proximity - blockers as f32 * shot_lane, true);
                    }
                    // Passes to teammates further up the pitch
                    for mate in &state.team(side).players {
                        let ahead = (mate.body.pos.x - pos.x) * side.attack_sign();
                        if mate.id == player.id || ahead <= 0.0 {
                            continue;
                        }
                        let blockers = line_pressure(ball.pos, mate.body.pos, &opponents, lane);
                        let score = proximity
                            - blockers as f32 * shot_lane
                            - w.pass_discount * (1.0 - ctx.risk);
                        push(&mut out, mate.body.pos, score, true);
                    }
                }
                Intent::Shoot => {
                    // Someone else can kick; still rate the rest by their shot lanes
                    let shot_lane = w.shoot_lane_base + (1.0 - ctx.risk) * w.shoot_lane_risk;
                    let blockers = line_pressure(ball.pos, opp_goal, &opponents, lane);
                    let score = w.shoot_ball_proximity / d_ball - blockers as f32 * shot_lane
                        + w.shoot_goal_proximity / (pos.distance(opp_goal) + 1.0);
                    push(&mut out, self.lead_point(state, preset), score, false);
                }
                Intent::Defend => {
                    let block = ball.pos.lerp(own_goal, BLOCK_RATIO);
                    let d_block = pos.distance(block);
                    let def_weight = if ctx.endgame && ctx.leading() {
                        w.defend_weight_leading
                    } else if ctx.trailing() {
                        w.defend_weight_trailing
                    } else {
                        1.0
                    };
                    let quarter =
                        field.goal_line_x(side) + side.attack_sign() * field.width() * 0.25;
                    let depth = (quarter - pos.x) * side.attack_sign();
                    let score = def_weight * w.defend_block_proximity / (d_block + 1.0)
                        + w.defend_ball_proximity / d_ball
                        + depth * w.defend_depth;
                    push(&mut out, block, score, false);
                }
                Intent::Attack => {
                    let target = self.lead_point(state, preset);
                    let mut lane_penalty = w.attack_lane_penalty;
                    if ctx.endgame && ctx.trailing() {
                        lane_penalty *= w.attack_lane_trailing_scale;
                    }
                    let blockers = line_pressure(pos, target, &opponents, lane);
                    let score = w.attack_ball_proximity / d_ball - blockers as f32 * lane_penalty
                        + w.attack_goal_proximity / (pos.distance(opp_goal) + 1.0);
                    push(&mut out, target, score, false);
                }
            }
        }
        out
    }

    /// Where the ball will be, leading by the tier's look-ahead.
    fn lead_point(&self, state: &MatchState, preset: &DifficultyPreset) -> Vec2 {
        let ball = &state.ball.body;
        ball.pos + ball.vel * preset.ball_lead
    }

    #[allow(clippy::too_many_arguments)]
    fn power(
        &self,
        state: &MatchState,
        player: &Player,
        best: &Candidate,
        intent: Intent,
        ctx: &AiContext,
        preset: &DifficultyPreset,
        rng: &mut ChaCha8Rng,
    ) -> f32 {
        let w = &self.config.ai.weights;
        let (from, max_speed, decay) = if best.kicks {
            (state.ball.body.pos, self.config.max_kick_speed, self.config.ball_friction)
        } else {
            (player.body.pos, self.config.max_player_speed, self.config.player_friction)
        };
        // Launch speed that coasts exactly `dist` under per-step decay
        let dist = from.distance(best.target);
        let needed = dist * (1.0 - decay) / self.config.fixed_dt;

        let mult = match intent {
            Intent::Shoot => w.shoot_power_base + ctx.risk * w.shoot_power_risk,
            Intent::Defend if ctx.endgame && ctx.leading() => w.defend_power_leading,
            Intent::Defend if ctx.trailing() => w.defend_power_trailing,
            Intent::Defend => w.defend_power,
            Intent::Attack if ctx.endgame && ctx.trailing() => w.attack_power_trailing,
            Intent::Attack => w.attack_power,
        };
        let noise = 1.0 + uniform(rng, preset.power_noise);
        let power = needed / max_speed.max(f32::EPSILON) * mult * noise;
        power.clamp(self.config.min_power.min(1.0), 1.0)
    }
}

/// The side's players that may be selected this turn, in index order.
fn movable(state: &MatchState, side: Side) -> Vec<&Player> {
    state
        .team(side)
        .players
        .iter()
        .filter(|p| p.can_be_selected())
        .collect()
}

/// Opponents within `thresh` of the segment `a`-`b`.
pub fn line_pressure(a: Vec2, b: Vec2, opponents: &[Vec2], thresh: f32) -> usize {
    if a.distance_squared(b) <= 1e-6 {
        return 0;
    }
    opponents
        .iter()
        .filter(|&&op| segment_point_distance(a, b, op) <= thresh)
        .count()
}

/// Uniform sample in `[-amount, amount]`; zero without touching the RNG when
/// `amount` is not positive.
fn uniform(rng: &mut ChaCha8Rng, amount: f32) -> f32 {
    if amount > 0.0 && amount.is_finite() {
        rng.gen_range(-amount..=amount)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::api::types::{MatchStatus, Mode};
    use crate::components::ball::Ball;
    use crate::components::team::Team;
    use crate::core::field::Field;
    use crate::core::state::MatchClock;
    use crate::core::turn::Turn;
    use crate::tactics::Tactic;

    fn state(config: &MatchConfig) -> MatchState {
        let field = Field::from_config(config);
        MatchState {
            field,
            ball: Ball::new(config.ball_radius, config.ball_mass),
            teams: [
                Team::new(Side::A, Tactic::balanced(), &field, config),
                Team::new(Side::B, Tactic::balanced(), &field, config),
            ],
            turn: Turn::new(Side::B, config),
            clock: MatchClock::new(config.max_rounds),
            difficulty: Difficulty::Hard,
            mode: Mode::default(),
            paused: false,
            status: MatchStatus::Playing,
        }
    }

    #[test]
    fn same_seed_same_decision() {
        let config = MatchConfig::default();
        let engine = AiEngine::new(&config);
        let s = state(&config);
        for difficulty in Difficulty::ALL {
            let a = engine.decide(&s, Side::B, difficulty, &mut ChaCha8Rng::seed_from_u64(7));
            let b = engine.decide(&s, Side::B, difficulty, &mut ChaCha8Rng::seed_from_u64(7));
            assert_eq!(a, b);
        }
    }

    #[test]
    fn shoots_when_ball_in_reach() {
        let config = MatchConfig::default();
        let engine = AiEngine::new(&config);
        let mut s = state(&config);
        let striker = s.teams[1].players[3].body.pos;
        s.ball.place(striker + Vec2::new(-40.0, 0.0));

        let decision = engine
            .decide(&s, Side::B, Difficulty::Extreme, &mut ChaCha8Rng::seed_from_u64(1))
            .unwrap();
        assert_eq!(decision.intent, Intent::Shoot);
        // Team B attacks toward -x
        assert!(decision.direction.x < 0.0);
        assert!(decision.power >= config.min_power && decision.power <= 1.0);
    }

    #[test]
    fn falls_back_when_opponents_are_closer() {
        let config = MatchConfig::default();
        let engine = AiEngine::new(&config);
        let mut s = state(&config);
        // Ball deep in B's half, right next to an A attacker
        s.teams[0].players[4].body.pos = Vec2::new(300.0, 0.0);
        s.ball.place(Vec2::new(300.0, 70.0));
        assert_eq!(engine.intent(&s, Side::B), Intent::Defend);
        let decision = engine
            .decide(&s, Side::B, Difficulty::Medium, &mut ChaCha8Rng::seed_from_u64(3))
            .unwrap();
        assert_eq!(decision.intent, Intent::Defend);
        // Block point lies between the ball and B's goal
        assert!(decision.target.x > 300.0);
    }

    #[test]
    fn trailing_raises_risk() {
        let config = MatchConfig::default();
        let engine = AiEngine::new(&config);
        let mut s = state(&config);
        let level = engine.context(&s, Side::B, Difficulty::Medium).risk;
        s.teams[0].score = 2;
        let behind = engine.context(&s, Side::B, Difficulty::Medium);
        assert!(behind.trailing());
        assert!(behind.risk > level);
    }

    #[test]
    fn stunned_team_has_no_decision() {
        let config = MatchConfig::default();
        let engine = AiEngine::new(&config);
        let mut s = state(&config);
        for p in &mut s.teams[1].players {
            p.status = crate::components::player::PlayerStatus::Stunned;
        }
        assert!(engine
            .decide(&s, Side::B, Difficulty::Easy, &mut ChaCha8Rng::seed_from_u64(0))
            .is_none());
    }

    #[test]
    fn lane_counts_blockers() {
        let opponents = [Vec2::new(5.0, 1.0), Vec2::new(5.0, 30.0), Vec2::new(-20.0, 0.0)];
        assert_eq!(line_pressure(Vec2::ZERO, Vec2::new(10.0, 0.0), &opponents, 10.0), 1);
        assert_eq!(line_pressure(Vec2::ZERO, Vec2::ZERO, &opponents, 10.0), 0);
    }
}
