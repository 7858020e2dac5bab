//! Flat snapshot layout for host renderers.
//!
//! Layout (all values in f32 / 4 bytes):
//! ```text
//! [Header: 16 floats]
//! [Entities: 11 × 8 floats]   ball first, then Team A 1..=5, then Team B 1..=5
//! ```
//!
//! Enumerations are written as small integer codes, `None` as -1.

use bytemuck::{Pod, Zeroable};

use crate::api::types::{MatchStatus, Side};
use crate::components::player::PlayerStatus;
use crate::core::state::{EntitySnapshot, MatchSnapshot};
use crate::core::turn::TurnPhase;
use crate::tactics::PLAYERS_PER_TEAM;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_SCORE_A: usize = 1;
pub const HEADER_SCORE_B: usize = 2;
pub const HEADER_TURN_OWNER: usize = 3;
pub const HEADER_PHASE: usize = 4;
pub const HEADER_AIM_X: usize = 5;
pub const HEADER_AIM_Y: usize = 6;
pub const HEADER_POWER: usize = 7;
pub const HEADER_ROUND: usize = 8;
pub const HEADER_ROUNDS_REMAINING: usize = 9;
pub const HEADER_PAUSED: usize = 10;
pub const HEADER_STATUS: usize = 11;
pub const HEADER_POSSESSOR: usize = 12;
pub const HEADER_ENTITY_COUNT: usize = 13;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per entity record: x, y, vx, vy, radius, team, status, selected.
pub const ENTITY_FLOATS: usize = 8;

/// Ball plus both teams.
pub const ENTITY_COUNT: usize = 1 + 2 * PLAYERS_PER_TEAM;

/// Offset (in floats) where entity records begin.
pub const ENTITY_DATA_OFFSET: usize = HEADER_FLOATS;

/// Total buffer size in floats.
pub const BUFFER_TOTAL_FLOATS: usize = ENTITY_DATA_OFFSET + ENTITY_COUNT * ENTITY_FLOATS;

/// `status` code for the match.
pub const STATUS_PLAYING: f32 = 0.0;
pub const STATUS_WON_A: f32 = 1.0;
pub const STATUS_WON_B: f32 = 2.0;
pub const STATUS_DRAW: f32 = 3.0;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct SnapshotHeader {
    pub version: f32,
    pub score_a: f32,
    pub score_b: f32,
    pub turn_owner: f32,
    pub phase: f32,
    pub aim_x: f32,
    pub aim_y: f32,
    pub power: f32,
    pub round: f32,
    pub rounds_remaining: f32,
    pub paused: f32,
    pub status: f32,
    /// Entity slot (1..=10) of the player holding the ball, or -1.
    pub possessor: f32,
    pub entity_count: f32,
    pub _pad: [f32; 2],
}

/// One body on the pitch. `team` is -1 for the ball.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct EntityRecord {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub team: f32,
    pub status: f32,
    pub selected: f32,
}

impl EntityRecord {
    fn new(body: &EntitySnapshot, team: f32, status: f32, selected: bool) -> Self {
        Self {
            x: body.pos.x,
            y: body.pos.y,
            vx: body.vel.x,
            vy: body.vel.y,
            radius: body.radius,
            team,
            status,
            selected: flag(selected),
        }
    }
}

fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn side_code(side: Side) -> f32 {
    side.index() as f32
}

fn phase_code(phase: TurnPhase) -> f32 {
    match phase {
        TurnPhase::Select => 0.0,
        TurnPhase::Aim => 1.0,
        TurnPhase::Power => 2.0,
        TurnPhase::Simulate => 3.0,
        TurnPhase::Settled => 4.0,
    }
}

fn player_status_code(status: PlayerStatus) -> f32 {
    match status {
        PlayerStatus::Idle => 0.0,
        PlayerStatus::Selected => 1.0,
        PlayerStatus::Kicking => 2.0,
        PlayerStatus::Stunned => 3.0,
    }
}

fn status_code(status: MatchStatus) -> f32 {
    match status {
        MatchStatus::Playing => STATUS_PLAYING,
        MatchStatus::Over { winner: Some(Side::A) } => STATUS_WON_A,
        MatchStatus::Over { winner: Some(Side::B) } => STATUS_WON_B,
        MatchStatus::Over { winner: None } => STATUS_DRAW,
    }
}

pub fn encode_header(snapshot: &MatchSnapshot) -> SnapshotHeader {
    let possessor = snapshot
        .possessed_by
        .map(|id| (1 + id.side.index() * PLAYERS_PER_TEAM + id.slot()) as f32)
        .unwrap_or(-1.0);
    SnapshotHeader {
        version: PROTOCOL_VERSION,
        score_a: snapshot.scores[0] as f32,
        score_b: snapshot.scores[1] as f32,
        turn_owner: side_code(snapshot.turn_owner),
        phase: phase_code(snapshot.phase),
        aim_x: snapshot.aim.x,
        aim_y: snapshot.aim.y,
        power: snapshot.power,
        round: snapshot.round as f32,
        rounds_remaining: snapshot.rounds_remaining as f32,
        paused: flag(snapshot.paused),
        status: status_code(snapshot.status),
        possessor,
        entity_count: ENTITY_COUNT as f32,
        _pad: [0.0; 2],
    }
}

pub fn encode_entities(snapshot: &MatchSnapshot) -> [EntityRecord; ENTITY_COUNT] {
    let mut records = [EntityRecord::default(); ENTITY_COUNT];
    records[0] = EntityRecord::new(&snapshot.ball, -1.0, 0.0, false);
    for (record, player) in records[1..].iter_mut().zip(&snapshot.players) {
        *record = EntityRecord::new(
            &player.body,
            side_code(player.id.side),
            player_status_code(player.status),
            player.selected,
        );
    }
    records
}

/// Flatten a snapshot into `out`, replacing its contents.
pub fn write_snapshot(snapshot: &MatchSnapshot, out: &mut Vec<f32>) {
    let header = encode_header(snapshot);
    let entities = encode_entities(snapshot);
    out.clear();
    out.reserve(BUFFER_TOTAL_FLOATS);
    out.extend_from_slice(bytemuck::cast_slice(std::slice::from_ref(&header)));
    out.extend_from_slice(bytemuck::cast_slice(&entities));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::game::{MatchManager, MatchSetup};
    use crate::api::types::Mode;

    fn snapshot() -> MatchSnapshot {
        let mut mgr = MatchManager::new();
        mgr.start_match(MatchSetup {
            mode: Mode::Multiplayer,
            first_turn: Some(Side::B),
            ..MatchSetup::default()
        })
        .unwrap();
        mgr.current_snapshot().unwrap()
    }

    #[test]
    fn record_sizes_match_wire_format() {
        assert_eq!(std::mem::size_of::<SnapshotHeader>(), HEADER_FLOATS * 4);
        assert_eq!(std::mem::size_of::<EntityRecord>(), ENTITY_FLOATS * 4);
    }

    #[test]
    fn writes_header_and_entities() {
        let snap = snapshot();
        let mut buf = vec![9.0; 3];
        write_snapshot(&snap, &mut buf);

        assert_eq!(buf.len(), BUFFER_TOTAL_FLOATS);
        assert_eq!(buf[HEADER_PROTOCOL_VERSION], PROTOCOL_VERSION);
        assert_eq!(buf[HEADER_TURN_OWNER], 1.0);
        assert_eq!(buf[HEADER_PHASE], 0.0);
        assert_eq!(buf[HEADER_STATUS], STATUS_PLAYING);
        assert_eq!(buf[HEADER_POSSESSOR], -1.0);
        assert_eq!(buf[HEADER_ENTITY_COUNT], ENTITY_COUNT as f32);

        // Ball sits on the centre spot
        let ball = &buf[ENTITY_DATA_OFFSET..ENTITY_DATA_OFFSET + ENTITY_FLOATS];
        assert_eq!(&ball[..2], &[0.0, 0.0]);
        assert_eq!(ball[5], -1.0);

        let last = ENTITY_DATA_OFFSET + (ENTITY_COUNT - 1) * ENTITY_FLOATS;
        assert_eq!(buf[last], snap.players[9].body.pos.x);
        assert_eq!(buf[last + 5], 1.0);
    }

    #[test]
    fn draw_and_wins_have_distinct_codes() {
        assert_eq!(status_code(MatchStatus::Over { winner: None }), STATUS_DRAW);
        assert_eq!(status_code(MatchStatus::Over { winner: Some(Side::B) }), STATUS_WON_B);
    }
}
