//! Chess position as produced by the notation service.

use serde::{Deserialize, Serialize};

/// An immutable chess position.
///
/// Only the notation service creates positions; the pipeline never parses
/// PGN or FEN text itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub pgn: String,
    pub fen: String,
    pub last_ply: u32,
    pub white_to_move: bool,
}

impl Position {
    pub fn new(pgn: impl Into<String>, fen: impl Into<String>, last_ply: u32, white_to_move: bool) -> Self {
        Self {
            pgn: pgn.into(),
            fen: fen.into(),
            last_ply,
            white_to_move,
        }
    }

    /// Canonical notation used when comparing requests: the PGN when the
    /// position came from a game, otherwise the FEN.
    pub fn notation(&self) -> &str {
        if self.pgn.is_empty() {
            &self.fen
        } else {
            &self.pgn
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notation_prefers_pgn() {
        let from_game = Position::new("1. e4", "fen-after-e4", 1, false);
        assert_eq!(from_game.notation(), "1. e4");

        let from_fen = Position::new("", "8/8/8/8/8/8/8/K1k5 w - - 0 1", 0, true);
        assert_eq!(from_fen.notation(), "8/8/8/8/8/8/8/K1k5 w - - 0 1");
    }
}
