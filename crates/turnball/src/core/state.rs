use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::{Difficulty, MatchStatus, Mode, PlayerId, Side};
use crate::components::ball::Ball;
use crate::components::player::PlayerStatus;
use crate::components::team::Team;
use crate::core::field::Field;
use crate::core::turn::{Turn, TurnPhase};
use crate::tactics::PLAYERS_PER_TEAM;

/// Counts rounds. A round is one turn per team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchClock {
    /// Current round, starting at 1.
    pub round: u32,
    pub max_rounds: u32,
    /// Turns completed in the current round (0 or 1).
    turns_in_round: u32,
}

impl MatchClock {
    pub fn new(max_rounds: u32) -> Self {
        Self {
            round: 1,
            max_rounds,
            turns_in_round: 0,
        }
    }

    /// Record a finished turn.
    pub fn complete_turn(&mut self) {
        self.turns_in_round += 1;
        if self.turns_in_round >= 2 {
            self.turns_in_round = 0;
            self.round += 1;
        }
    }

    /// Start the current round over. A goal does this: the conceding team
    /// kicks off a fresh round instead of finishing the old one.
    pub fn restart_round(&mut self) {
        self.turns_in_round = 0;
    }

    /// Rounds left, counting the current one. Zero once the limit has passed.
    pub fn rounds_remaining(&self) -> u32 {
        (self.max_rounds + 1).saturating_sub(self.round)
    }

    pub fn expired(&self) -> bool {
        self.round > self.max_rounds
    }
}

/// Everything that changes during a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub field: Field,
    pub ball: Ball,
    /// Indexed by `Side::index`.
    pub teams: [Team; 2],
    pub turn: Turn,
    pub clock: MatchClock,
    pub difficulty: Difficulty,
    pub mode: Mode,
    pub paused: bool,
    pub status: MatchStatus,
}

impl MatchState {
    pub fn team(&self, side: Side) -> &Team {
        &self.teams[side.index()]
    }

    pub fn team_mut(&mut self, side: Side) -> &mut Team {
        &mut self.teams[side.index()]
    }

    /// `side`'s score minus the opponent's.
    pub fn goal_difference(&self, side: Side) -> i32 {
        self.team(side).score as i32 - self.team(side.other()).score as i32
    }

    pub fn is_over(&self) -> bool {
        matches!(self.status, MatchStatus::Over { .. })
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        let ball = EntitySnapshot {
            pos: self.ball.body.pos,
            vel: self.ball.body.vel,
            radius: self.ball.body.radius,
        };
        let players = std::array::from_fn(|i| {
            let p = &self.teams[i / PLAYERS_PER_TEAM].players[i % PLAYERS_PER_TEAM];
            PlayerSnapshot {
                id: p.id,
                body: EntitySnapshot {
                    pos: p.body.pos,
                    vel: p.body.vel,
                    radius: p.body.radius,
                },
                selected: p.selected,
                status: p.status,
            }
        });
        MatchSnapshot {
            ball,
            possessed_by: self.ball.possessed_by,
            players,
            scores: [self.teams[0].score, self.teams[1].score],
            turn_owner: self.turn.owner,
            phase: self.turn.phase,
            aim: self.turn.aim,
            power: self.turn.current_power(),
            round: self.clock.round,
            rounds_remaining: self.clock.rounds_remaining(),
            paused: self.paused,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub body: EntitySnapshot,
    pub selected: bool,
    pub status: PlayerStatus,
}

/// Read-only copy of the match for renderers and UI. Owns all its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub ball: EntitySnapshot,
    pub possessed_by: Option<PlayerId>,
    /// Team A's five, then Team B's.
    pub players: [PlayerSnapshot; 2 * PLAYERS_PER_TEAM],
    pub scores: [u32; 2],
    pub turn_owner: Side,
    pub phase: TurnPhase,
    pub aim: Vec2,
    pub power: f32,
    pub round: u32,
    pub rounds_remaining: u32,
    pub paused: bool,
    pub status: MatchStatus,
}

impl MatchSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
