pub mod field;
pub mod geometry;
pub mod physics;
pub mod state;
pub mod time;
pub mod turn;
