//! Engine driver implementations.

pub mod scripted;

pub use scripted::{scripted_observation, ScriptedEngine};
