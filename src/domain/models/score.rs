//! Engine score from White's perspective.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Numeric value a mate score is mapped to before the distance is subtracted.
const MATE_VALUE: i32 = 100_000;

/// A signed evaluation: centipawns or a forced mate in N moves.
///
/// Positive values favour White regardless of who is to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Score {
    Centipawns(i32),
    /// Mate in N; negative N means Black mates.
    Mate(i32),
}

impl Score {
    /// Value used for numeric comparison. Shorter mates rank further from zero.
    pub fn value(&self) -> i32 {
        match *self {
            Self::Centipawns(cp) => cp,
            Self::Mate(n) if n >= 0 => MATE_VALUE - n,
            Self::Mate(n) => -MATE_VALUE - n,
        }
    }

    pub fn is_mate(&self) -> bool {
        matches!(self, Self::Mate(_))
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::Centipawns(0)
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value().cmp(&other.value())
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Centipawns(cp) => {
                let sign = match cp.cmp(&0) {
                    Ordering::Greater => "+",
                    Ordering::Less => "-",
                    Ordering::Equal => "",
                };
                let abs = cp.unsigned_abs();
                write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
            }
            Self::Mate(n) => write!(f, "#{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Score::Centipawns(35).to_string(), "+0.35");
        assert_eq!(Score::Centipawns(-120).to_string(), "-1.20");
        assert_eq!(Score::Centipawns(0).to_string(), "0.00");
        assert_eq!(Score::Centipawns(1005).to_string(), "+10.05");
        assert_eq!(Score::Mate(3).to_string(), "#3");
        assert_eq!(Score::Mate(-2).to_string(), "#-2");
    }

    #[test]
    fn test_ordering() {
        assert!(Score::Centipawns(50) > Score::Centipawns(-50));
        assert!(Score::Mate(1) > Score::Mate(5));
        assert!(Score::Mate(5) > Score::Centipawns(2000));
        assert!(Score::Mate(-1) < Score::Mate(-5));
        assert!(Score::Mate(-5) < Score::Centipawns(-2000));
    }
}
