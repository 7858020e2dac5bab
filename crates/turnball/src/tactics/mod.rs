//! Formations: five kickoff spots plus behaviour weights.
//!
//! Tactics arrive from the host's persistence layer as data (usually JSON).
//! The core validates them at match start and swaps in the balanced preset
//! when they are unusable, so a bad file never prevents a kickoff.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::Side;
use crate::config::MatchConfig;
use crate::core::field::Field;
use crate::error::CoreError;

pub const PLAYERS_PER_TEAM: usize = 5;

/// Extra clearance kept between a kickoff spot and the ball zones.
const BALL_ZONE_MARGIN: f32 = 10.0;

/// How a team behaves with this formation, both in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehaviorWeights {
    /// Appetite for risky, forward play. Feeds the AI's risk level.
    pub aggression: f32,
    /// How wide the AI reads its passing and shooting lanes.
    pub spacing: f32,
}

impl Default for BehaviorWeights {
    fn default() -> Self {
        Self {
            aggression: 0.5,
            spacing: 0.5,
        }
    }
}

/// A named formation.
///
/// Offsets are field fractions: `x` from the team's own goal line, `y` from the
/// top touch line. The same tactic mirrors for the away side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tactic {
    pub name: String,
    pub offsets: Vec<Vec2>,
    #[serde(default)]
    pub weights: BehaviorWeights,
}

/// Where a team's tactic comes from at match start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TacticSource {
    /// One of the built-in formations, by key.
    Preset(String),
    /// Data handed over by the host (e.g. a custom slot).
    Custom(Tactic),
}

impl Default for TacticSource {
    fn default() -> Self {
        TacticSource::Preset("balanced".into())
    }
}

impl Tactic {
    pub fn new(name: impl Into<String>, offsets: Vec<Vec2>, weights: BehaviorWeights) -> Self {
        Self {
            name: name.into(),
            offsets,
            weights,
        }
    }

    /// Parse a tactic from a JSON string. Offsets are `[x, y]` pairs.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The fallback formation: keeper, two backs, two midfielders.
    pub fn balanced() -> Self {
        Self::new(
            "Balanced",
            vec![
                Vec2::new(0.1, 0.5),
                Vec2::new(0.25, 0.25),
                Vec2::new(0.25, 0.75),
                Vec2::new(0.4, 0.35),
                Vec2::new(0.4, 0.65),
            ],
            BehaviorWeights::default(),
        )
    }

    pub fn defensive() -> Self {
        Self::new(
            "Defensive",
            vec![
                Vec2::new(0.08, 0.5),
                Vec2::new(0.22, 0.2),
                Vec2::new(0.22, 0.5),
                Vec2::new(0.22, 0.8),
                Vec2::new(0.35, 0.5),
            ],
            BehaviorWeights {
                aggression: 0.3,
                spacing: 0.4,
            },
        )
    }

    pub fn offensive() -> Self {
        Self::new(
            "Offensive",
            vec![
                Vec2::new(0.1, 0.5),
                Vec2::new(0.25, 0.3),
                Vec2::new(0.25, 0.7),
                Vec2::new(0.425, 0.25),
                Vec2::new(0.425, 0.75),
            ],
            BehaviorWeights {
                aggression: 0.75,
                spacing: 0.6,
            },
        )
    }

    pub fn wide() -> Self {
        Self::new(
            "Wide",
            vec![
                Vec2::new(0.1, 0.5),
                Vec2::new(0.3, 0.3),
                Vec2::new(0.45, 0.15),
                Vec2::new(0.45, 0.85),
                Vec2::new(0.3, 0.7),
            ],
            BehaviorWeights {
                aggression: 0.55,
                spacing: 0.8,
            },
        )
    }

    /// Look up a built-in formation by key.
    pub fn preset(key: &str) -> Option<Self> {
        match key {
            "balanced" => Some(Self::balanced()),
            "defensive" => Some(Self::defensive()),
            "offensive" => Some(Self::offensive()),
            "wide" => Some(Self::wide()),
            _ => None,
        }
    }

    pub fn preset_keys() -> [&'static str; 4] {
        ["defensive", "offensive", "balanced", "wide"]
    }

    /// Field positions of the five players for `side`.
    ///
    /// Only meaningful on a validated tactic; missing slots fall back to the
    /// balanced spots.
    pub fn kickoff_positions(&self, side: Side, field: &Field) -> [Vec2; PLAYERS_PER_TEAM] {
        let fallback = Self::balanced();
        std::array::from_fn(|i| {
            let offset = self.offsets.get(i).copied().unwrap_or(fallback.offsets[i]);
            field.formation_point(side, offset)
        })
    }

    /// Check the formation against the field and kickoff rules.
    pub fn validate(&self, field: &Field, config: &MatchConfig) -> Result<(), CoreError> {
        let fail = |reason: String| Err(CoreError::malformed_tactic(&self.name, reason));

        if self.offsets.len() != PLAYERS_PER_TEAM {
            return fail(format!(
                "expected {PLAYERS_PER_TEAM} offsets, got {}",
                self.offsets.len()
            ));
        }
        for (i, offset) in self.offsets.iter().enumerate() {
            let in_unit = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);
            if !in_unit(offset.x) || !in_unit(offset.y) {
                return fail(format!("player {} offset {offset} outside [0, 1]", i + 1));
            }
        }
        let weights = [self.weights.aggression, self.weights.spacing];
        if weights.iter().any(|w| !(w.is_finite() && (0.0..=1.0).contains(w))) {
            return fail("behaviour weights outside [0, 1]".into());
        }

        let r = config.player_radius;
        let zone = config.ball_radius + r + BALL_ZONE_MARGIN;
        let ball_spots = [
            field.kickoff_spot(None, config.kickoff_offset),
            field.kickoff_spot(Some(Side::A), config.kickoff_offset),
            field.kickoff_spot(Some(Side::B), config.kickoff_offset),
        ];

        for side in Side::BOTH {
            let spots = self.kickoff_positions(side, field);
            for (i, p) in spots.iter().enumerate() {
                if p.x.abs() > field.half_width - r || p.y.abs() > field.half_height - r {
                    return fail(format!("player {} out of bounds", i + 1));
                }
                if ball_spots.iter().any(|b| p.distance(*b) < r + zone) {
                    return fail(format!("player {} overlaps the kickoff ball zone", i + 1));
                }
                for (j, q) in spots.iter().enumerate().skip(i + 1) {
                    if p.distance(*q) < 2.0 * r {
                        return fail(format!("players {} and {} collide", i + 1, j + 1));
                    }
                }
            }
        }
        Ok(())
    }
}

impl TacticSource {
    /// Turn a source into a usable tactic.
    ///
    /// Unknown presets and invalid data yield the balanced formation together
    /// with the error explaining why.
    pub fn resolve(&self, field: &Field, config: &MatchConfig) -> (Tactic, Option<CoreError>) {
        let candidate = match self {
            TacticSource::Preset(key) => match Tactic::preset(key) {
                Some(tactic) => tactic,
                None => {
                    let err = CoreError::malformed_tactic(key, "unknown preset");
                    return (Tactic::balanced(), Some(err));
                }
            },
            TacticSource::Custom(tactic) => tactic.clone(),
        };
        match candidate.validate(field, config) {
            Ok(()) => (candidate, None),
            Err(err) => (Tactic::balanced(), Some(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Field, MatchConfig) {
        let config = MatchConfig::default();
        (Field::from_config(&config), config)
    }

    #[test]
    fn presets_are_valid() {
        let (field, config) = setup();
        for key in Tactic::preset_keys() {
            let tactic = Tactic::preset(key).unwrap();
            assert!(tactic.validate(&field, &config).is_ok(), "{key} should validate");
        }
    }

    #[test]
    fn four_offsets_fall_back_to_default() {
        let (field, config) = setup();
        let mut short = Tactic::offensive();
        short.name = "custom1".into();
        short.offsets.pop();
        let (tactic, err) = TacticSource::Custom(short).resolve(&field, &config);
        assert_eq!(tactic, Tactic::balanced());
        assert!(matches!(err, Some(CoreError::MalformedTacticData { .. })));
    }

    #[test]
    fn overlapping_players_rejected() {
        let (field, config) = setup();
        let mut tactic = Tactic::balanced();
        tactic.offsets[2] = tactic.offsets[1];
        assert!(tactic.validate(&field, &config).is_err());
    }

    #[test]
    fn ball_zone_rejected() {
        let (field, config) = setup();
        let mut tactic = Tactic::balanced();
        tactic.offsets[4] = Vec2::new(0.49, 0.5);
        assert!(tactic.validate(&field, &config).is_err());
    }

    #[test]
    fn unknown_preset_falls_back() {
        let (field, config) = setup();
        let (tactic, err) = TacticSource::Preset("catenaccio".into()).resolve(&field, &config);
        assert_eq!(tactic.name, "Balanced");
        assert!(err.is_some());
    }

    #[test]
    fn parses_json() {
        let json = r#"{
            "name": "Diamond",
            "offsets": [[0.1, 0.5], [0.25, 0.5], [0.33, 0.25], [0.33, 0.75], [0.42, 0.3]],
            "weights": { "aggression": 0.6, "spacing": 0.5 }
        }"#;
        let tactic = Tactic::from_json(json).unwrap();
        assert_eq!(tactic.offsets.len(), 5);
        assert_eq!(tactic.weights.aggression, 0.6);
        let (field, config) = setup();
        assert!(tactic.validate(&field, &config).is_ok());
    }

    #[test]
    fn kickoff_positions_mirror() {
        let (field, _) = setup();
        let tactic = Tactic::wide();
        let a = tactic.kickoff_positions(Side::A, &field);
        let b = tactic.kickoff_positions(Side::B, &field);
        for (pa, pb) in a.iter().zip(b.iter()) {
            assert!((pa.x + pb.x).abs() < 1e-3);
            assert!((pa.y - pb.y).abs() < 1e-3);
        }
    }
}
