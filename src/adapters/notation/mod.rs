//! Notation service implementations.

pub mod movetext;

pub use movetext::{MovetextNotation, START_FEN};
