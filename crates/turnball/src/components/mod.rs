pub mod body;
pub mod ball;
pub mod player;
pub mod team;
