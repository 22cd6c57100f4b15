//! # Leaderboard
//!
//! Cumulative per-participant statistics. Entries are created lazily on a
//! participant's first join; `total_predictions` counts every join, while
//! points and correct predictions only move through an award.

use crate::types::{EventId, Identity};
use crate::{error::Result, PredictionError};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Cumulative statistics for one participant.
///
/// Invariant: `correct_predictions <= total_predictions`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UserStats {
    pub total_points: u64,
    pub correct_predictions: u64,
    pub total_predictions: u64,
}

/// Result of an award call
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AwardReceipt {
    pub awarded: bool,
    pub points: u64,
}

impl AwardReceipt {
    /// Receipt for an incorrect prediction
    pub fn missed() -> Self {
        Self {
            awarded: false,
            points: 0,
        }
    }
}

/// One ranked leaderboard row
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Standing {
    pub rank: usize,
    pub participant: Identity,
    pub stats: UserStats,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Leaderboard {
    entries: BTreeMap<Identity, UserStats>,
    /// (event, participant) pairs already evaluated by an award call
    awarded: BTreeMap<EventId, BTreeSet<Identity>>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stats for a participant, all zeros if they never joined
    pub fn stats(&self, participant: &Identity) -> UserStats {
        self.entries.get(participant).copied().unwrap_or_default()
    }

    pub fn has_entry(&self, participant: &Identity) -> bool {
        self.entries.contains_key(participant)
    }

    /// Count a join attempt, creating the entry if needed.
    pub fn record_join(&mut self, participant: &Identity) -> Result<()> {
        let mut stats = self.stats(participant);
        stats.total_predictions = stats
            .total_predictions
            .checked_add(1)
            .ok_or_else(|| PredictionError::Overflow("total predictions".to_string()))?;

        self.entries.insert(participant.clone(), stats);
        Ok(())
    }

    /// Apply the outcome of an award evaluation exactly once per pair.
    ///
    /// A correct prediction adds `points` and one correct prediction; an
    /// incorrect one leaves the stats unchanged. Either way the pair is marked
    /// so a repeat call fails with `AlreadyAwarded`.
    pub fn record_award(
        &mut self,
        event_id: EventId,
        participant: &Identity,
        correct: bool,
        points: u64,
    ) -> Result<AwardReceipt> {
        if self.is_awarded(event_id, participant) {
            return Err(PredictionError::AlreadyAwarded);
        }

        let receipt = if correct {
            let mut stats = self.stats(participant);
            stats.total_points = stats
                .total_points
                .checked_add(points)
                .ok_or_else(|| PredictionError::Overflow("total points".to_string()))?;
            stats.correct_predictions = stats
                .correct_predictions
                .checked_add(1)
                .ok_or_else(|| PredictionError::Overflow("correct predictions".to_string()))?;

            self.entries.insert(participant.clone(), stats);
            AwardReceipt {
                awarded: true,
                points,
            }
        } else {
            AwardReceipt::missed()
        };

        self.awarded
            .entry(event_id)
            .or_default()
            .insert(participant.clone());
        Ok(receipt)
    }

    /// Every (event, participant) pair already evaluated
    pub fn awarded_pairs(&self) -> impl Iterator<Item = (EventId, &Identity)> {
        self.awarded
            .iter()
            .flat_map(|(event_id, done)| done.iter().map(move |p| (*event_id, p)))
    }

    /// Check restored stats: no one has more correct predictions than joins.
    pub fn validate(&self) -> Result<()> {
        for (participant, stats) in &self.entries {
            if stats.correct_predictions > stats.total_predictions {
                return Err(PredictionError::Snapshot(format!(
                    "{participant} has {} correct of {} predictions",
                    stats.correct_predictions, stats.total_predictions
                )));
            }
        }
        Ok(())
    }

    pub fn is_awarded(&self, event_id: EventId, participant: &Identity) -> bool {
        self.awarded
            .get(&event_id)
            .is_some_and(|done| done.contains(participant))
    }

    /// Ranked rows: most points first, then most correct predictions, then
    /// identity for a stable order. Equal stats share a rank.
    pub fn standings(&self, limit: Option<usize>) -> Vec<Standing> {
        let mut rows: Vec<(&Identity, &UserStats)> = self.entries.iter().collect();
        rows.sort_by_key(|(participant, stats)| {
            (
                Reverse(stats.total_points),
                Reverse(stats.correct_predictions),
                *participant,
            )
        });

        let mut standings: Vec<Standing> = Vec::with_capacity(rows.len());
        for (position, (participant, stats)) in rows.into_iter().enumerate() {
            let rank = match standings.last() {
                Some(prev)
                    if prev.stats.total_points == stats.total_points
                        && prev.stats.correct_predictions == stats.correct_predictions =>
                {
                    prev.rank
                }
                _ => position + 1,
            };
            standings.push(Standing {
                rank,
                participant: participant.clone(),
                stats: *stats,
            });
        }

        if let Some(limit) = limit {
            standings.truncate(limit);
        }
        debug!("Built leaderboard with {} rows", standings.len());
        standings
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_participant_has_zero_stats() {
        let board = Leaderboard::new();
        assert_eq!(board.stats(&Identity::from("nobody")), UserStats::default());
        assert!(!board.has_entry(&Identity::from("nobody")));
    }

    #[test]
    fn test_record_join_counts_attempts() {
        let mut board = Leaderboard::new();
        let alice = Identity::from("alice");

        board.record_join(&alice).unwrap();
        board.record_join(&alice).unwrap();

        assert_eq!(
            board.stats(&alice),
            UserStats {
                total_points: 0,
                correct_predictions: 0,
                total_predictions: 2,
            }
        );
    }

    #[test]
    fn test_record_award() {
        let mut board = Leaderboard::new();
        let alice = Identity::from("alice");
        let bob = Identity::from("bob");
        board.record_join(&alice).unwrap();
        board.record_join(&bob).unwrap();

        let receipt = board.record_award(EventId(1), &alice, true, 10).unwrap();
        assert_eq!(receipt, AwardReceipt { awarded: true, points: 10 });
        assert_eq!(board.stats(&alice).total_points, 10);
        assert_eq!(board.stats(&alice).correct_predictions, 1);

        let receipt = board.record_award(EventId(1), &bob, false, 10).unwrap();
        assert_eq!(receipt, AwardReceipt::missed());
        assert_eq!(board.stats(&bob).total_points, 0);
        assert_eq!(board.stats(&bob).total_predictions, 1);
    }

    #[test]
    fn test_record_award_once_per_pair() {
        let mut board = Leaderboard::new();
        let alice = Identity::from("alice");
        board.record_join(&alice).unwrap();

        board.record_award(EventId(1), &alice, true, 10).unwrap();
        let err = board.record_award(EventId(1), &alice, true, 10).unwrap_err();

        assert!(matches!(err, PredictionError::AlreadyAwarded));
        assert_eq!(board.stats(&alice).total_points, 10);
        assert!(board.is_awarded(EventId(1), &alice));
        assert!(!board.is_awarded(EventId(2), &alice));
    }

    #[test]
    fn test_overflow_leaves_stats_untouched() {
        let mut board = Leaderboard::new();
        let alice = Identity::from("alice");
        board.record_join(&alice).unwrap();
        board.record_award(EventId(1), &alice, true, u64::MAX).unwrap();

        let err = board.record_award(EventId(2), &alice, true, 1).unwrap_err();
        assert!(matches!(err, PredictionError::Overflow(_)));
        assert_eq!(board.stats(&alice).correct_predictions, 1);
        assert!(!board.is_awarded(EventId(2), &alice));
    }

    #[test]
    fn test_standings_order_and_ties() {
        let mut board = Leaderboard::new();
        let (alice, bob, carol) = (
            Identity::from("alice"),
            Identity::from("bob"),
            Identity::from("carol"),
        );
        for p in [&alice, &bob, &carol] {
            board.record_join(p).unwrap();
        }
        board.record_award(EventId(1), &carol, true, 10).unwrap();
        board.record_award(EventId(1), &bob, false, 10).unwrap();

        let standings = board.standings(None);
        let order: Vec<&str> = standings.iter().map(|s| s.participant.as_str()).collect();
        assert_eq!(order, vec!["carol", "alice", "bob"]);
        assert_eq!(standings[0].rank, 1);
        assert_eq!(standings[1].rank, 2);
        assert_eq!(standings[2].rank, 2);

        assert_eq!(board.standings(Some(1)).len(), 1);
    }

    #[test]
    fn test_validate_correct_within_total() {
        let mut board = Leaderboard::new();
        let alice = Identity::from("alice");
        board.record_join(&alice).unwrap();
        board.record_award(EventId(1), &alice, true, 10).unwrap();
        assert!(board.validate().is_ok());

        board.entries.get_mut(&alice).unwrap().correct_predictions = 2;
        assert!(matches!(board.validate(), Err(PredictionError::Snapshot(_))));
    }

    #[test]
    fn test_awarded_pairs() {
        let mut board = Leaderboard::new();
        let alice = Identity::from("alice");
        board.record_join(&alice).unwrap();
        board.record_award(EventId(2), &alice, false, 10).unwrap();

        let pairs: Vec<(EventId, &Identity)> = board.awarded_pairs().collect();
        assert_eq!(pairs, vec![(EventId(2), &alice)]);
    }
}
