//! Notation service port - PGN/FEN conversion lives outside this crate.

use crate::domain::errors::DomainResult;
use crate::domain::models::Position;

/// Converts move text or position strings into a [`Position`].
pub trait NotationService: Send + Sync {
    /// Build the position reached at the end of a PGN game text.
    fn position_from_pgn(&self, pgn: &str) -> DomainResult<Position>;

    /// Build a position from a FEN string.
    fn position_from_fen(&self, fen: &str) -> DomainResult<Position>;
}
