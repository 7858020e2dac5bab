//! Match configuration: every tunable number the core reads.
//!
//! Values are supplied by the host's settings layer once, at match start, and
//! are read-only afterwards. Defaults reproduce the feel of the original
//! pygame build at 60 Hz, converted to units per second.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::types::Difficulty;
use crate::error::CoreError;

/// Physics, rules and AI parameters for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Fixed simulation step in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Catch-up cap: fixed steps run at most per `tick` (default: 10).
    pub max_steps_per_tick: u32,

    /// Field length along x, goal line to goal line.
    pub field_width: f32,
    /// Field width along y, touch line to touch line.
    pub field_height: f32,
    /// Opening of each goal mouth, measured along the goal line.
    pub goal_width: f32,
    /// How far the net extends behind the goal line.
    pub goal_depth: f32,

    pub player_radius: f32,
    pub player_mass: f32,
    pub ball_radius: f32,
    pub ball_mass: f32,

    /// Velocity retained per step by a moving player.
    pub player_friction: f32,
    /// Velocity retained per step by the ball.
    pub ball_friction: f32,
    /// Speeds below this are floored to zero.
    pub rest_speed: f32,

    /// Restitution for entity-entity impacts.
    pub restitution: f32,
    /// Restitution for wall, post and net impacts.
    pub wall_restitution: f32,
    /// Extra velocity scale applied to both bodies after an impact.
    pub collision_damping: f32,
    /// Fraction of the overlap removed by positional correction.
    pub correction_percent: f32,
    /// Overlap tolerated before correction kicks in.
    pub correction_slop: f32,
    /// Contact passes per step.
    pub solver_iterations: u32,

    /// Dash speed of a player at full power.
    pub max_player_speed: f32,
    /// Ball speed of a direct kick at full power.
    pub max_kick_speed: f32,
    /// Hard cap on ball speed.
    pub max_ball_speed: f32,

    /// Extra reach beyond touching distance within which a player can kick.
    pub kick_range_bonus: f32,
    /// Steps during which a freshly kicked ball ignores impulses from its kicker.
    pub kick_immunity_steps: u32,
    /// Kick speed, relative to a direct kick, when a dashing player stops at the ball.
    pub follow_through_ratio: f32,

    /// Centre distance under which a slow ball counts as possessed.
    pub possession_range: f32,
    /// Ball speed under which possession is tracked.
    pub possession_speed: f32,

    /// Lowest value of the oscillating power meter.
    pub min_power: f32,
    /// Meter change per fixed step while charging.
    pub meter_rate: f32,

    /// First team to reach this many goals wins.
    pub score_to_win: u32,
    /// Rounds (one turn per team) before the match ends on time.
    pub max_rounds: u32,
    /// Kickoff ball offset from the centre spot toward the conceding half.
    pub kickoff_offset: f32,
    /// Safety cap on steps spent in one simulate phase.
    pub max_sim_steps: u32,

    pub ai: AiTuning,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_steps_per_tick: 10,
            field_width: 1100.0,
            field_height: 670.0,
            goal_width: 160.0,
            goal_depth: 50.0,
            player_radius: 24.0,
            player_mass: 2.0,
            ball_radius: 12.0,
            ball_mass: 0.5,
            player_friction: 0.955,
            ball_friction: 0.955,
            rest_speed: 60.0,
            restitution: 0.68,
            wall_restitution: 0.7,
            collision_damping: 0.985,
            correction_percent: 1.0,
            correction_slop: 0.0,
            solver_iterations: 8,
            max_player_speed: 2940.0,
            max_kick_speed: 1500.0,
            max_ball_speed: 2400.0,
            kick_range_bonus: 20.0,
            kick_immunity_steps: 6,
            follow_through_ratio: 0.35,
            possession_range: 56.0,
            possession_speed: 120.0,
            min_power: 0.07,
            meter_rate: 0.015,
            score_to_win: 5,
            max_rounds: 50,
            kickoff_offset: 80.0,
            max_sim_steps: 1800,
            ai: AiTuning::default(),
        }
    }
}

impl MatchConfig {
    /// Parse a config from JSON. Absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Build a config from a flat mapping of named numeric parameters.
    ///
    /// Every absent or non-finite entry falls back to its default and is
    /// reported as `ConfigurationMissing` (also logged at warn level).
    /// AI tier parameters use keys like `ai.hard.aim_jitter`.
    pub fn from_params(params: &HashMap<String, f32>) -> (Self, Vec<CoreError>) {
        let d = Self::default();
        let mut reader = ParamReader::new(params);

        let config = Self {
            fixed_dt: reader.f32("fixed_dt", d.fixed_dt),
            max_steps_per_tick: reader.u32("max_steps_per_tick", d.max_steps_per_tick),
            field_width: reader.f32("field_width", d.field_width),
            field_height: reader.f32("field_height", d.field_height),
            goal_width: reader.f32("goal_width", d.goal_width),
            goal_depth: reader.f32("goal_depth", d.goal_depth),
            player_radius: reader.f32("player_radius", d.player_radius),
            player_mass: reader.f32("player_mass", d.player_mass),
            ball_radius: reader.f32("ball_radius", d.ball_radius),
            ball_mass: reader.f32("ball_mass", d.ball_mass),
            player_friction: reader.f32("player_friction", d.player_friction),
            ball_friction: reader.f32("ball_friction", d.ball_friction),
            rest_speed: reader.f32("rest_speed", d.rest_speed),
            restitution: reader.f32("restitution", d.restitution),
            wall_restitution: reader.f32("wall_restitution", d.wall_restitution),
            collision_damping: reader.f32("collision_damping", d.collision_damping),
            correction_percent: reader.f32("correction_percent", d.correction_percent),
            correction_slop: reader.f32("correction_slop", d.correction_slop),
            solver_iterations: reader.u32("solver_iterations", d.solver_iterations),
            max_player_speed: reader.f32("max_player_speed", d.max_player_speed),
            max_kick_speed: reader.f32("max_kick_speed", d.max_kick_speed),
            max_ball_speed: reader.f32("max_ball_speed", d.max_ball_speed),
            kick_range_bonus: reader.f32("kick_range_bonus", d.kick_range_bonus),
            kick_immunity_steps: reader.u32("kick_immunity_steps", d.kick_immunity_steps),
            follow_through_ratio: reader.f32("follow_through_ratio", d.follow_through_ratio),
            possession_range: reader.f32("possession_range", d.possession_range),
            possession_speed: reader.f32("possession_speed", d.possession_speed),
            min_power: reader.f32("min_power", d.min_power),
            meter_rate: reader.f32("meter_rate", d.meter_rate),
            score_to_win: reader.u32("score_to_win", d.score_to_win),
            max_rounds: reader.u32("max_rounds", d.max_rounds),
            kickoff_offset: reader.f32("kickoff_offset", d.kickoff_offset),
            max_sim_steps: reader.u32("max_sim_steps", d.max_sim_steps),
            ai: AiTuning::read(&mut reader, &d.ai),
        };

        for err in &reader.missing {
            log::warn!("{err}");
        }
        (config, reader.missing)
    }

    /// Reject configurations a match cannot be built from.
    pub fn validate(&self) -> Result<(), CoreError> {
        let positive = [
            ("fixed_dt", self.fixed_dt),
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("goal_width", self.goal_width),
            ("goal_depth", self.goal_depth),
            ("player_radius", self.player_radius),
            ("player_mass", self.player_mass),
            ("ball_radius", self.ball_radius),
            ("ball_mass", self.ball_mass),
            ("max_ball_speed", self.max_ball_speed),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CoreError::MatchSetup(format!("{name} must be positive, got {value}")));
            }
        }
        if self.goal_width >= self.field_height {
            return Err(CoreError::MatchSetup(format!(
                "goal width {} does not fit a field {} high",
                self.goal_width, self.field_height
            )));
        }
        if self.ball_radius * 2.0 >= self.goal_width {
            return Err(CoreError::MatchSetup("ball does not fit through the goal mouth".into()));
        }
        for (name, decay) in [
            ("player_friction", self.player_friction),
            ("ball_friction", self.ball_friction),
        ] {
            if !(0.0..=1.0).contains(&decay) {
                return Err(CoreError::MatchSetup(format!(
                    "{name} must be within [0, 1], got {decay}"
                )));
            }
        }
        if self.max_sim_steps == 0 || self.max_steps_per_tick == 0 {
            return Err(CoreError::MatchSetup("step caps must be non-zero".into()));
        }
        Ok(())
    }

    /// Touching distance plus the kick bonus.
    pub fn kick_reach(&self) -> f32 {
        self.player_radius + self.ball_radius + self.kick_range_bonus
    }
}

/// Per-tier randomness and risk appetite for the AI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyPreset {
    /// Uniform aim error in world units (applied to the target point).
    pub aim_jitter: f32,
    /// Multiplicative power noise ratio (+/-).
    pub power_noise: f32,
    /// Baseline appetite for risk, 0 = safe, 1 = reckless.
    pub base_risk: f32,
    /// Fixed steps the AI waits between its actions.
    pub think_steps: u32,
    /// Seconds of ball travel the AI leads its run by.
    pub ball_lead: f32,
}

impl DifficultyPreset {
    const fn new(
        aim_jitter: f32,
        power_noise: f32,
        base_risk: f32,
        think_steps: u32,
        ball_lead: f32,
    ) -> Self {
        Self {
            aim_jitter,
            power_noise,
            base_risk,
            think_steps,
            ball_lead,
        }
    }
}

/// Scoring weights for the AI's candidate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiWeights {
    /// Score removed from the goalkeeper (slot 1) so it rarely leaves goal.
    pub keeper_penalty: f32,
    /// Bonus for a candidate that can kick the ball right now.
    pub kick_bonus: f32,
    pub shoot_ball_proximity: f32,
    pub shoot_goal_proximity: f32,
    /// Lane penalty per blocking opponent on a shot: base + (1 - risk) * scale.
    pub shoot_lane_base: f32,
    pub shoot_lane_risk: f32,
    /// Score lost by a pass, scaled by risk appetite.
    pub pass_discount: f32,
    pub attack_ball_proximity: f32,
    pub attack_goal_proximity: f32,
    pub attack_lane_penalty: f32,
    pub defend_block_proximity: f32,
    pub defend_ball_proximity: f32,
    /// Preference for players deep in their own half when defending.
    pub defend_depth: f32,
    /// Lane half-width before risk shrinks it.
    pub lane_base: f32,
    pub lane_risk_shrink: f32,
    /// Jitter scale when trailing in the endgame.
    pub endgame_jitter_scale: f32,
    pub defend_weight_leading: f32,
    pub defend_weight_trailing: f32,
    /// Lane penalty scale when trailing in the endgame.
    pub attack_lane_trailing_scale: f32,
    /// Risk added per goal of deficit.
    pub trailing_risk_per_goal: f32,
    /// Risk added per unit of tactic aggression above 0.5.
    pub aggression_risk: f32,
    /// Shot power multiplier: base + risk * scale.
    pub shoot_power_base: f32,
    pub shoot_power_risk: f32,
    pub defend_power: f32,
    pub defend_power_leading: f32,
    pub defend_power_trailing: f32,
    pub attack_power: f32,
    pub attack_power_trailing: f32,
}

impl Default for AiWeights {
    fn default() -> Self {
        Self {
            keeper_penalty: 25.0,
            kick_bonus: 1500.0,
            shoot_ball_proximity: 400.0,
            shoot_goal_proximity: 120.0,
            shoot_lane_base: 28.0,
            shoot_lane_risk: 20.0,
            pass_discount: 90.0,
            attack_ball_proximity: 520.0,
            attack_goal_proximity: 100.0,
            attack_lane_penalty: 35.0,
            defend_block_proximity: 520.0,
            defend_ball_proximity: 220.0,
            defend_depth: 0.05,
            lane_base: 56.0,
            lane_risk_shrink: 18.0,
            endgame_jitter_scale: 0.6,
            defend_weight_leading: 1.25,
            defend_weight_trailing: 0.9,
            attack_lane_trailing_scale: 0.6,
            trailing_risk_per_goal: 0.05,
            aggression_risk: 0.2,
            shoot_power_base: 0.9,
            shoot_power_risk: 0.4,
            defend_power: 0.95,
            defend_power_leading: 0.8,
            defend_power_trailing: 1.1,
            attack_power: 1.05,
            attack_power_trailing: 1.25,
        }
    }
}

/// All AI tuning: one preset per tier plus shared weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    pub easy: DifficultyPreset,
    pub medium: DifficultyPreset,
    pub hard: DifficultyPreset,
    pub insane: DifficultyPreset,
    pub extreme: DifficultyPreset,
    pub weights: AiWeights,
    /// Rounds left at which endgame behaviour starts.
    pub endgame_rounds: u32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            easy: DifficultyPreset::new(15.0, 0.20, 0.30, 48, 0.0),
            medium: DifficultyPreset::new(10.0, 0.15, 0.55, 30, 0.05),
            hard: DifficultyPreset::new(5.0, 0.10, 0.80, 21, 0.10),
            insane: DifficultyPreset::new(2.0, 0.05, 0.90, 15, 0.12),
            extreme: DifficultyPreset::new(0.5, 0.01, 0.99, 9, 0.15),
            weights: AiWeights::default(),
            endgame_rounds: 8,
        }
    }
}

impl AiTuning {
    pub fn preset(&self, difficulty: Difficulty) -> &DifficultyPreset {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
            Difficulty::Insane => &self.insane,
            Difficulty::Extreme => &self.extreme,
        }
    }

    fn preset_mut(&mut self, difficulty: Difficulty) -> &mut DifficultyPreset {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
            Difficulty::Insane => &mut self.insane,
            Difficulty::Extreme => &mut self.extreme,
        }
    }

    fn read(reader: &mut ParamReader<'_>, defaults: &AiTuning) -> Self {
        let mut tuning = *defaults;
        for difficulty in Difficulty::ALL {
            let tier = tier_key(difficulty);
            let d = *defaults.preset(difficulty);
            let preset = tuning.preset_mut(difficulty);
            preset.aim_jitter = reader.f32(&format!("ai.{tier}.aim_jitter"), d.aim_jitter);
            preset.power_noise = reader.f32(&format!("ai.{tier}.power_noise"), d.power_noise);
            preset.base_risk = reader.f32(&format!("ai.{tier}.base_risk"), d.base_risk);
            preset.think_steps = reader.u32(&format!("ai.{tier}.think_steps"), d.think_steps);
            preset.ball_lead = reader.f32(&format!("ai.{tier}.ball_lead"), d.ball_lead);
        }
        tuning.endgame_rounds = reader.u32("ai.endgame_rounds", defaults.endgame_rounds);
        tuning
    }
}

fn tier_key(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "easy",
        Difficulty::Medium => "medium",
        Difficulty::Hard => "hard",
        Difficulty::Insane => "insane",
        Difficulty::Extreme => "extreme",
    }
}

/// Reads named values out of a flat parameter map, recording what was absent.
struct ParamReader<'a> {
    params: &'a HashMap<String, f32>,
    missing: Vec<CoreError>,
}

impl<'a> ParamReader<'a> {
    fn new(params: &'a HashMap<String, f32>) -> Self {
        Self {
            params,
            missing: Vec::new(),
        }
    }

    fn f32(&mut self, name: &str, default: f32) -> f32 {
        match self.params.get(name) {
            Some(value) if value.is_finite() => *value,
            _ => {
                self.missing.push(CoreError::ConfigurationMissing(name.to_string()));
                default
            }
        }
    }

    fn u32(&mut self, name: &str, default: u32) -> u32 {
        match self.params.get(name) {
            Some(value) if value.is_finite() && *value >= 0.0 => value.round() as u32,
            _ => {
                self.missing.push(CoreError::ConfigurationMissing(name.to_string()));
                default
            }
        }
    }
}
