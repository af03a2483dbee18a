pub mod engine;
pub mod grimoire;
