use serde::{Deserialize, Serialize};

/// One of the two teams.
///
/// Team A defends the left goal and attacks toward +x; Team B is mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Array index (A = 0, B = 1).
    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    /// +1.0 if this side attacks toward +x, -1.0 otherwise.
    pub fn attack_sign(self) -> f32 {
        match self {
            Side::A => 1.0,
            Side::B => -1.0,
        }
    }
}

/// Identifies a player: team plus 1-based shirt index (1..=5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId {
    pub side: Side,
    pub index: u8,
}

impl PlayerId {
    pub fn new(side: Side, index: u8) -> Self {
        Self { side, index }
    }

    /// Zero-based slot within the team array.
    pub fn slot(self) -> usize {
        self.index as usize - 1
    }
}

/// Anything that can take part in a collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Ball,
    Player(PlayerId),
}

/// AI skill tier. Higher tiers aim tighter, add less noise and take more risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Insane,
    Extreme,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Insane,
        Difficulty::Extreme,
    ];
}

/// Who controls which side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// One human against the AI playing `ai_side`.
    Singleplayer { ai_side: Side },
    /// Two humans sharing the input stream.
    Multiplayer,
    /// AI against AI (attract mode, soak tests).
    Autoplay,
}

impl Mode {
    pub fn is_ai(self, side: Side) -> bool {
        match self {
            Mode::Singleplayer { ai_side } => ai_side == side,
            Mode::Multiplayer => false,
            Mode::Autoplay => true,
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Singleplayer { ai_side: Side::B }
    }
}

/// Match lifecycle outside the turn state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Playing,
    /// `winner` is `None` for a draw at the round limit.
    Over { winner: Option<Side> },
}

/// Fire-and-forget notification for audio / VFX / UI collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    GoalScored { scorer: Side },
    /// Emitted once when a contact begins. `intensity` is the closing speed.
    Collision { a: EntityRef, b: EntityRef, intensity: f32 },
    /// The simulate phase ended; `next` owns the coming turn.
    TurnSettled { next: Side, timed_out: bool },
    MatchEnded { winner: Option<Side> },
    PauseChanged { paused: bool },
}
