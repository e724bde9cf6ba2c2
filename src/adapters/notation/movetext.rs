//! Board-less notation service.
//!
//! Validates FEN strings field by field and walks PGN movetext to count the
//! plies played. It never replays moves on a board, so a PGN position keeps an
//! empty FEN unless no move was played.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Position;
use crate::domain::ports::NotationService;

/// FEN of the standard starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Notation service that only needs the text itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovetextNotation;

impl MovetextNotation {
    pub fn new() -> Self {
        Self
    }
}

impl NotationService for MovetextNotation {
    fn position_from_pgn(&self, pgn: &str) -> DomainResult<Position> {
        let pgn = pgn.trim();
        let base_fen = tag_value(pgn, "FEN").unwrap_or_else(|| START_FEN.to_string());
        let base = parse_fen(&base_fen)?;
        let plies = count_plies(pgn)?;

        let last_ply = base.last_ply + plies;
        let white_to_move = base.white_to_move == (plies % 2 == 0);
        let fen = if plies == 0 { base_fen } else { String::new() };
        Ok(Position::new(pgn, fen, last_ply, white_to_move))
    }

    fn position_from_fen(&self, fen: &str) -> DomainResult<Position> {
        parse_fen(fen.trim())
    }
}

fn parse_fen(fen: &str) -> DomainResult<Position> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() < 4 || fields.len() > 6 {
        return Err(DomainError::Notation(format!("FEN needs 4 to 6 fields: {fen}")));
    }

    let ranks: Vec<&str> = fields[0].split('/').collect();
    if ranks.len() != 8 {
        return Err(DomainError::Notation(format!("FEN placement needs 8 ranks: {fen}")));
    }
    for rank in ranks {
        let mut squares = 0u32;
        for symbol in rank.chars() {
            match symbol {
                '1'..='8' => squares += symbol.to_digit(10).unwrap_or(0),
                'p' | 'n' | 'b' | 'r' | 'q' | 'k' | 'P' | 'N' | 'B' | 'R' | 'Q' | 'K' => squares += 1,
                other => {
                    return Err(DomainError::Notation(format!("unexpected '{other}' in FEN placement")));
                }
            }
        }
        if squares != 8 {
            return Err(DomainError::Notation(format!("FEN rank '{rank}' does not cover 8 squares")));
        }
    }

    let white_to_move = match fields[1] {
        "w" => true,
        "b" => false,
        other => return Err(DomainError::Notation(format!("unknown side to move '{other}'"))),
    };

    let full_move: u32 = match fields.get(5) {
        Some(number) => number
            .parse()
            .map_err(|_| DomainError::Notation(format!("bad fullmove number '{number}'")))?,
        None => 1,
    };
    let last_ply = full_move.saturating_sub(1) * 2 + u32::from(!white_to_move);

    Ok(Position::new("", fen, last_ply, white_to_move))
}

fn tag_value(pgn: &str, tag: &str) -> Option<String> {
    pgn.lines()
        .map(str::trim)
        .filter(|line| line.starts_with('[') && line.ends_with(']'))
        .find_map(|line| {
            let inner = &line[1..line.len() - 1];
            let (name, value) = inner.split_once(char::is_whitespace)?;
            (name == tag).then(|| value.trim().trim_matches('"').to_string())
        })
}

fn count_plies(pgn: &str) -> DomainResult<u32> {
    let movetext: String = pgn
        .lines()
        .filter(|line| !line.trim_start().starts_with('['))
        .map(|line| line.split(';').next().unwrap_or(""))
        .collect::<Vec<_>>()
        .join(" ");

    let mut main_line = String::with_capacity(movetext.len());
    let mut comment = false;
    let mut variation_depth = 0usize;
    for symbol in movetext.chars() {
        match symbol {
            '{' if !comment => comment = true,
            '}' if comment => comment = false,
            '(' if !comment => variation_depth += 1,
            ')' if !comment => variation_depth = variation_depth.saturating_sub(1),
            _ if comment || variation_depth > 0 => {}
            _ => main_line.push(symbol),
        }
    }

    let mut plies = 0u32;
    for token in main_line.split_whitespace() {
        if matches!(token, "1-0" | "0-1" | "1/2-1/2" | "*") || token.starts_with('$') {
            continue;
        }
        let san = token.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.');
        if san.is_empty() {
            continue;
        }
        if !san.starts_with(|c: char| matches!(c, 'K' | 'Q' | 'R' | 'B' | 'N' | 'O' | 'a'..='h')) {
            return Err(DomainError::Notation(format!("unexpected token '{token}' in movetext")));
        }
        plies += 1;
    }
    Ok(plies)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fen_side_and_ply() {
        let notation = MovetextNotation::new();
        let start = notation.position_from_fen(START_FEN).unwrap();
        assert!(start.white_to_move);
        assert_eq!(start.last_ply, 0);

        let black = notation
            .position_from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1")
            .unwrap();
        assert!(!black.white_to_move);
        assert_eq!(black.last_ply, 1);
        assert!(black.pgn.is_empty());
    }

    #[test]
    fn test_bad_fen_rejected() {
        let notation = MovetextNotation::new();
        assert!(notation.position_from_fen("8/8/8 w - -").is_err());
        assert!(notation.position_from_fen("9/8/8/8/8/8/8/8 w - -").is_err());
        assert!(notation.position_from_fen("8/8/8/8/8/8/8/8 x - -").is_err());
    }

    #[test]
    fn test_pgn_ply_count_skips_comments_and_variations() {
        let notation = MovetextNotation::new();
        let pgn = "[Event \"Casual\"]\n\n1. e4 {best by test} e5 (1... c5 2. Nf3) 2. Nf3 $1 Nc6 3. Bb5 1-0";
        let position = notation.position_from_pgn(pgn).unwrap();
        assert_eq!(position.last_ply, 5);
        assert!(!position.white_to_move);
        assert!(position.fen.is_empty());
        assert_eq!(position.notation(), pgn);
    }

    #[test]
    fn test_pgn_with_fen_tag_starts_from_it() {
        let notation = MovetextNotation::new();
        let pgn = "[FEN \"4k3/8/8/8/8/8/8/4K2R b K - 0 10\"]\n\n10... Kd7 11. O-O";
        let position = notation.position_from_pgn(pgn).unwrap();
        assert_eq!(position.last_ply, 21);
        assert!(!position.white_to_move);
    }

    #[test]
    fn test_empty_movetext_keeps_start_fen() {
        let position = MovetextNotation::new().position_from_pgn("*").unwrap();
        assert_eq!(position.fen, START_FEN);
        assert_eq!(position.last_ply, 0);
    }
}
