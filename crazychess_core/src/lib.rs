pub mod engine;
pub mod logic;
