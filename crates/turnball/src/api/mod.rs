pub mod action;
pub mod game;
pub mod types;
