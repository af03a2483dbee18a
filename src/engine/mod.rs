pub mod arena;
pub mod config;
pub mod error;
pub mod models;
pub mod moderator;
pub mod simulator;
