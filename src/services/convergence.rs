//! Convergence checks over principal variations.
//!
//! Pure functions, no I/O. Scores are always from White's perspective, so
//! "better" flips direction with the side to move, and the cutoff is a band
//! around the best line rather than an absolute threshold.

use crate::domain::models::{DynamicPv, Evaluation, Variation};

/// Count the variations whose score lies within `cut_off_centi_pawns` of the best one.
///
/// The side to move is read from the position the variations start from.
pub fn determine_number_of_good_pv<'a, I>(variations: I, cut_off_centi_pawns: i32) -> usize
where
    I: IntoIterator<Item = &'a Variation>,
{
    let variations: Vec<&Variation> = variations.into_iter().collect();
    let Some(first) = variations.first() else {
        return 0;
    };
    let white_to_move = first.position.white_to_move;
    let scores: Vec<i64> = variations.iter().map(|v| i64::from(v.score.value())).collect();
    let cut_off = i64::from(cut_off_centi_pawns);

    if white_to_move {
        let best = scores.iter().copied().max().unwrap_or_default();
        scores.iter().filter(|&&score| score >= best - cut_off).count()
    } else {
        let best = scores.iter().copied().min().unwrap_or_default();
        scores.iter().filter(|&&score| score <= best + cut_off).count()
    }
}

/// Variations at most one depth behind the deepest one.
pub fn current_variations(evaluation: &Evaluation) -> Vec<&Variation> {
    let max_depth = evaluation.max_depth();
    evaluation
        .variations
        .iter()
        .filter(|v| v.depth + 1 >= max_depth)
        .collect()
}

/// True iff every current variation sits at the same depth.
pub fn all_variations_having_same_depth(evaluation: &Evaluation) -> bool {
    let current = current_variations(evaluation);
    current.windows(2).all(|pair| pair[0].depth == pair[1].depth)
}

/// True when a snapshot is worth saving: all `expected_pv` lines are present
/// and the current lines agree on depth.
pub fn is_stable_snapshot(evaluation: &Evaluation, expected_pv: u32) -> bool {
    let present = u32::try_from(evaluation.variations.len()).unwrap_or(u32::MAX);
    present > 0 && present >= expected_pv && all_variations_having_same_depth(evaluation)
}

/// Dynamic-PV stop predicate.
///
/// Holds once the search reached `required_depth`, at most `keep_min_pv`
/// current lines stay within the cutoff band of the best one, and the current
/// lines agree on depth.
pub fn should_stop_early(evaluation: &Evaluation, policy: &DynamicPv) -> bool {
    if evaluation.variations.is_empty() || evaluation.max_depth() < policy.required_depth {
        return false;
    }
    let good = determine_number_of_good_pv(current_variations(evaluation), policy.cut_off_centi_pawns);
    let keep = usize::try_from(policy.keep_min_pv).unwrap_or(usize::MAX);
    good <= keep && all_variations_having_same_depth(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Position, Score, TaskId, UciState};
    use chrono::Utc;
    use std::time::Duration;

    fn variations(white_to_move: bool, scores: &[i32]) -> Vec<Variation> {
        scores
            .iter()
            .zip(1..)
            .map(|(&cp, pv_id)| Variation {
                pv_id,
                moves: String::new(),
                score: Score::Centipawns(cp),
                depth: 20,
                time: Duration::ZERO,
                position: Position::new("", "fen", 0, white_to_move),
            })
            .collect()
    }

    fn evaluation_with_depths(depths: &[u32]) -> Evaluation {
        let mut lines = variations(true, &vec![0; depths.len()]);
        for (line, &depth) in lines.iter_mut().zip(depths) {
            line.depth = depth;
        }
        Evaluation {
            task_id: TaskId::new("t"),
            created: Utc::now(),
            variations: lines,
            uci_state: UciState::default(),
        }
    }

    #[test]
    fn test_good_pv_white_to_move() {
        assert_eq!(determine_number_of_good_pv(&variations(true, &[100, 50, -50]), 20), 1);
        assert_eq!(determine_number_of_good_pv(&variations(true, &[-50, -50, -100]), 20), 2);
        assert_eq!(determine_number_of_good_pv(&variations(true, &[100, 100, 100]), 20), 3);
    }

    #[test]
    fn test_good_pv_black_to_move() {
        assert_eq!(determine_number_of_good_pv(&variations(false, &[-100, -50, 100]), 20), 1);
        assert_eq!(determine_number_of_good_pv(&variations(false, &[-50, -50, 50]), 20), 2);
    }

    #[test]
    fn test_good_pv_band_is_inclusive() {
        assert_eq!(determine_number_of_good_pv(&variations(true, &[100, 80, 79]), 20), 2);
        assert_eq!(determine_number_of_good_pv(&variations(false, &[-100, -80, -79]), 20), 2);
    }

    #[test]
    fn test_good_pv_empty() {
        assert_eq!(determine_number_of_good_pv(&Vec::new(), 20), 0);
    }

    #[test]
    fn test_same_depth_window() {
        assert!(all_variations_having_same_depth(&evaluation_with_depths(&[25, 25, 25])));
        assert!(!all_variations_having_same_depth(&evaluation_with_depths(&[25, 25, 24])));
        assert!(all_variations_having_same_depth(&evaluation_with_depths(&[25, 25, 23])));
        assert!(!all_variations_having_same_depth(&evaluation_with_depths(&[25, 24, 23])));
    }

    #[test]
    fn test_current_variations_excludes_lagging_lines() {
        let evaluation = evaluation_with_depths(&[25, 24, 23]);
        let depths: Vec<u32> = current_variations(&evaluation).iter().map(|v| v.depth).collect();
        assert_eq!(depths, vec![25, 24]);
    }

    #[test]
    fn test_stable_snapshot_requires_all_lines() {
        let evaluation = evaluation_with_depths(&[20, 20]);
        assert!(is_stable_snapshot(&evaluation, 2));
        assert!(!is_stable_snapshot(&evaluation, 3));
        assert!(!is_stable_snapshot(&evaluation_with_depths(&[]), 0));
    }

    #[test]
    fn test_should_stop_early() {
        let policy = DynamicPv {
            required_depth: 20,
            cut_off_centi_pawns: 20,
            keep_min_pv: 1,
        };
        let mut evaluation = Evaluation {
            task_id: TaskId::new("t"),
            created: Utc::now(),
            variations: variations(true, &[100, 50, -50]),
            uci_state: UciState::default(),
        };
        assert!(should_stop_early(&evaluation, &policy));

        evaluation.variations = variations(true, &[100, 90, -50]);
        assert!(!should_stop_early(&evaluation, &policy));

        evaluation.variations = variations(true, &[100, 50, -50]);
        for line in &mut evaluation.variations {
            line.depth = 19;
        }
        assert!(!should_stop_early(&evaluation, &policy));

        evaluation.variations = variations(true, &[100, 50, -50]);
        evaluation.variations[1].depth = 21;
        assert!(!should_stop_early(&evaluation, &policy));
    }
}
