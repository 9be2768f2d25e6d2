//! Match results and the winner tie-break.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use mathrace_protocol::{MatchResult, Player};

/// Orders players by score, then by name with the earlier name ranking
/// higher. Names are unique within a match, so this is a total order.
pub fn rank(a: &Player, b: &Player) -> Ordering {
    a.score.cmp(&b.score).then_with(|| b.name.cmp(&a.name))
}

/// Computes the result over every participant.
///
/// The winner has the strictly highest score; equal top scores go to the
/// alphabetically first name. `final_scores` lists everyone, zeros
/// included. Returns `None` only when `players` is empty.
pub fn compute_result(players: &BTreeMap<String, Player>) -> Option<MatchResult> {
    let winner = players.values().max_by(|a, b| rank(a, b))?.clone();
    let final_scores = players
        .values()
        .map(|p| (p.name.clone(), p.score))
        .collect();

    Some(MatchResult {
        winner,
        final_scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(scores: &[(&str, u32)]) -> BTreeMap<String, Player> {
        scores
            .iter()
            .map(|(name, score)| {
                let mut p = Player::new(*name);
                p.score = *score;
                (name.to_string(), p)
            })
            .collect()
    }

    #[test]
    fn test_highest_score_wins() {
        let result =
            compute_result(&roster(&[("Alice", 10), ("Bob", 20), ("Charlie", 15)])).unwrap();
        assert_eq!(result.winner.name, "Bob");
        assert_eq!(result.winner.score, 20);
        assert_eq!(
            result.final_scores,
            BTreeMap::from([
                ("Alice".to_string(), 10),
                ("Bob".to_string(), 20),
                ("Charlie".to_string(), 15),
            ])
        );
    }

    #[test]
    fn test_tie_goes_to_earlier_name() {
        for _ in 0..10 {
            let result = compute_result(&roster(&[("zoe", 3), ("amy", 3), ("max", 1)])).unwrap();
            assert_eq!(result.winner.name, "amy");
        }
    }

    #[test]
    fn test_all_zero_scores_still_produce_a_winner() {
        let result = compute_result(&roster(&[("bob", 0), ("alice", 0)])).unwrap();
        assert_eq!(result.winner.name, "alice");
        assert_eq!(result.final_scores.get("bob"), Some(&0));
    }

    #[test]
    fn test_empty_roster_has_no_result() {
        assert!(compute_result(&BTreeMap::new()).is_none());
    }
}
