pub mod api;
pub mod ai;
pub mod core;
pub mod components;
pub mod bridge;
pub mod input;
pub mod config;
pub mod error;
pub mod tactics;

// Re-export key types at crate root for convenience
pub use api::action::{Action, ActionProvider, Controller, HumanInput};
pub use api::game::{MatchManager, MatchSetup};
pub use api::types::{Difficulty, EntityRef, MatchEvent, MatchStatus, Mode, PlayerId, Side};
pub use ai::{AiEngine, AiPlayer, Decision, Intent};
pub use components::ball::Ball;
pub use components::body::Body;
pub use components::player::{Player, PlayerStatus};
pub use components::team::Team;
pub use config::MatchConfig;
pub use crate::core::field::Field;
pub use crate::core::physics::{LaunchKind, PhysicsSolver, StepOutcome};
pub use crate::core::state::{MatchClock, MatchSnapshot, MatchState};
pub use crate::core::time::FixedTimestep;
pub use crate::core::turn::{Turn, TurnController, TurnPhase};
pub use error::CoreError;
pub use input::queue::{InputEvent, InputQueue};
pub use tactics::{Tactic, TacticSource};
