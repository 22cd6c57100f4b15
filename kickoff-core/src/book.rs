//! # Prediction Book
//!
//! The store object tying the event registry, the prediction ledger and the
//! leaderboard together. Every mutating call takes a [`CallContext`] and is
//! applied as one transition: all checks run before the first write, so a
//! failed call leaves the book exactly as it was.
//!
//! Mutations take `&mut self`, which gives the single-writer ordering the
//! state machine relies on. Callers sharing a book across threads wrap it in
//! a lock of their choosing.

use crate::auth::{self, Action};
use crate::config::RegistryConfig;
use crate::event::{Event, EventRegistry, NewEvent};
use crate::leaderboard::{AwardReceipt, Leaderboard, Standing, UserStats};
use crate::prediction::{Prediction, PredictionLedger};
use crate::types::{CallContext, EventId, EventStatus, Identity, Outcome};
use crate::{error::Result, PredictionError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PredictionBook {
    config: RegistryConfig,
    events: EventRegistry,
    predictions: PredictionLedger,
    leaderboard: Leaderboard,
}

impl PredictionBook {
    /// Create an empty book with the given rules.
    pub fn new(config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Restore a book from its JSON snapshot, rejecting state that breaks
    /// the book's invariants.
    pub fn from_json(json: &str) -> Result<Self> {
        let book: Self = serde_json::from_str(json)?;
        book.validate()?;
        Ok(book)
    }

    /// Cross-check the config, each component, and the links between them.
    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;
        self.events.validate()?;
        self.predictions.validate()?;
        self.leaderboard.validate()?;

        for (participant, prediction) in self.predictions.iter() {
            if self.events.get(prediction.event_id).is_none() {
                return Err(PredictionError::Snapshot(format!(
                    "prediction by {participant} refers to unknown event {}",
                    prediction.event_id
                )));
            }
        }

        for (event_id, participant) in self.leaderboard.awarded_pairs() {
            if !self.predictions.contains(event_id, participant) {
                return Err(PredictionError::Snapshot(format!(
                    "award for {participant} on event {event_id} has no prediction"
                )));
            }
        }

        Ok(())
    }

    /// Serialize the whole book for the caller's durable storage
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // -- Event Registry ----------------------------------------------------

    pub fn create_event(&mut self, params: NewEvent, ctx: &CallContext) -> Result<EventId> {
        self.events.create_event(params, ctx, &self.config)
    }

    pub fn close_event(&mut self, event_id: EventId, ctx: &CallContext) -> Result<()> {
        self.events.close_event(event_id, ctx)
    }

    pub fn update_oracle(
        &mut self,
        event_id: EventId,
        new_oracle: Identity,
        ctx: &CallContext,
    ) -> Result<()> {
        self.events.update_oracle(event_id, new_oracle, ctx)
    }

    pub fn submit_result(
        &mut self,
        event_id: EventId,
        outcome: Outcome,
        ctx: &CallContext,
    ) -> Result<()> {
        self.events.submit_result(event_id, outcome, ctx)
    }

    pub fn get_event(&self, event_id: EventId) -> Option<&Event> {
        self.events.get(event_id)
    }

    /// All events in id order
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn events_by_status(&self, status: EventStatus) -> impl Iterator<Item = &Event> {
        self.events.by_status(status)
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn next_event_id(&self) -> EventId {
        self.events.next_id()
    }

    // -- Prediction Ledger -------------------------------------------------

    /// Submit the caller's single guess for an event.
    ///
    /// Checks run in this order, which fixes the error a caller sees when
    /// several apply: event exists, access code matches, event is open,
    /// no earlier prediction.
    pub fn join_event(
        &mut self,
        event_id: EventId,
        access_code: &str,
        outcome: Outcome,
        ctx: &CallContext,
    ) -> Result<()> {
        let event = self.events.require(event_id)?;

        if !event.access_code_matches(access_code) {
            warn!("Rejected join on event {} by {}: wrong access code", event_id, ctx.caller);
            return Err(PredictionError::InvalidAccessCode);
        }

        if !event.is_open() {
            return Err(PredictionError::EventClosed);
        }

        if self.predictions.contains(event_id, &ctx.caller) {
            return Err(PredictionError::AlreadyPredicted);
        }

        let prediction = Prediction {
            event_id,
            event_name: event.name.clone(),
            predicted_outcome: outcome,
            timestamp: ctx.clock,
        };

        // The leaderboard update is the only step that can still fail, so it goes first.
        self.leaderboard.record_join(&ctx.caller)?;
        self.predictions.insert(ctx.caller.clone(), prediction)?;

        info!("{} joined event {} predicting {}", ctx.caller, event_id, outcome);
        Ok(())
    }

    pub fn get_prediction(&self, event_id: EventId, participant: &Identity) -> Option<&Prediction> {
        self.predictions.get(event_id, participant)
    }

    pub fn predictions_for_event(&self, event_id: EventId) -> Vec<(&Identity, &Prediction)> {
        self.predictions.for_event(event_id)
    }

    pub fn predictions_for_participant<'a>(
        &'a self,
        participant: &'a Identity,
    ) -> impl Iterator<Item = &'a Prediction> + 'a {
        self.predictions.for_participant(participant)
    }

    // -- Leaderboard / settlement accounting -------------------------------

    /// Convert a settled prediction into leaderboard points.
    ///
    /// Each (event, participant) pair is evaluated once; later calls fail with
    /// `AlreadyAwarded`.
    pub fn award_points(
        &mut self,
        event_id: EventId,
        participant: &Identity,
        ctx: &CallContext,
    ) -> Result<AwardReceipt> {
        let event = self.events.require(event_id)?;

        if !auth::can(&ctx.caller, event, Action::AwardPoints, self.config.award_policy) {
            warn!("{} is not allowed to award points on event {}", ctx.caller, event_id);
            return Err(PredictionError::Unauthorized(format!(
                "{} may not {} on event {event_id}",
                ctx.caller,
                Action::AwardPoints
            )));
        }

        let result = event.result().ok_or_else(|| {
            PredictionError::NotFound(format!("result for event {event_id}"))
        })?;

        let prediction = self.predictions.get(event_id, participant).ok_or_else(|| {
            PredictionError::NotFound(format!("prediction by {participant} on event {event_id}"))
        })?;

        let correct = prediction.predicted_outcome == result;
        let receipt = self.leaderboard.record_award(
            event_id,
            participant,
            correct,
            self.config.reward_points,
        )?;

        info!(
            "Award on event {} for {}: awarded={} points={}",
            event_id, participant, receipt.awarded, receipt.points
        );
        Ok(receipt)
    }

    /// Stats for a participant; never fails, zeros for unknown participants.
    pub fn get_user_stats(&self, participant: &Identity) -> UserStats {
        self.leaderboard.stats(participant)
    }

    pub fn is_awarded(&self, event_id: EventId, participant: &Identity) -> bool {
        self.leaderboard.is_awarded(event_id, participant)
    }

    pub fn standings(&self, limit: Option<usize>) -> Vec<Standing> {
        self.leaderboard.standings(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AwardPolicy;
    use crate::test_utils::{constants::*, *};

    #[test]
    fn test_join_event_records_prediction() {
        let (mut book, id) = create_book_with_event();

        book.join_event(id, TEST_ACCESS_CODE, Outcome::Draw, &CallContext::new(WALLET_1, 5))
            .unwrap();

        let prediction = book.get_prediction(id, &Identity::from(WALLET_1)).unwrap();
        assert_eq!(prediction.event_name, TEST_EVENT_NAME);
        assert_eq!(prediction.predicted_outcome, Outcome::Draw);
        assert_eq!(prediction.timestamp, 5);
        assert!(book.get_prediction(id, &Identity::from(WALLET_2)).is_none());
    }

    #[test]
    fn test_join_initializes_leaderboard() {
        let (mut book, id) = create_book_with_event();
        join(&mut book, id, WALLET_1, Outcome::HomeWin);

        assert_eq!(
            book.get_user_stats(&Identity::from(WALLET_1)),
            UserStats {
                total_points: 0,
                correct_predictions: 0,
                total_predictions: 1,
            }
        );
    }

    #[test]
    fn test_join_error_precedence() {
        let (mut book, id) = create_book_with_event();
        let wallet = CallContext::new(WALLET_1, 1);

        // Unknown event beats everything
        let err = book
            .join_event(EventId(99), "WRONG", Outcome::HomeWin, &wallet)
            .unwrap_err();
        assert!(err.is_not_found());

        join(&mut book, id, WALLET_1, Outcome::HomeWin);
        close(&mut book, id);

        // Wrong code is reported even on a closed event the caller already joined
        let err = book
            .join_event(id, "WRONG_CODE", Outcome::HomeWin, &wallet)
            .unwrap_err();
        assert!(matches!(err, PredictionError::InvalidAccessCode));

        // Closed beats duplicate
        let err = book
            .join_event(id, TEST_ACCESS_CODE, Outcome::AwayWin, &wallet)
            .unwrap_err();
        assert!(matches!(err, PredictionError::EventClosed));
    }

    #[test]
    fn test_duplicate_join_changes_nothing() {
        let (mut book, id) = create_book_with_event();
        join(&mut book, id, WALLET_1, Outcome::HomeWin);

        let err = book
            .join_event(id, TEST_ACCESS_CODE, Outcome::AwayWin, &CallContext::new(WALLET_1, 9))
            .unwrap_err();

        assert!(matches!(err, PredictionError::AlreadyPredicted));
        let alice = Identity::from(WALLET_1);
        assert_eq!(book.get_user_stats(&alice).total_predictions, 1);
        assert_eq!(
            book.get_prediction(id, &alice).unwrap().predicted_outcome,
            Outcome::HomeWin
        );
    }

    #[test]
    fn test_join_after_settlement_is_closed() {
        let (mut book, id) = create_book_with_event();
        close(&mut book, id);
        settle(&mut book, id, Outcome::Draw);

        let err = book
            .join_event(id, TEST_ACCESS_CODE, Outcome::Draw, &CallContext::new(WALLET_1, 1))
            .unwrap_err();
        assert!(matches!(err, PredictionError::EventClosed));
        assert_eq!(book.get_user_stats(&Identity::from(WALLET_1)), UserStats::default());
    }

    #[test]
    fn test_award_points() {
        let (mut book, id) = create_settled_book(Outcome::HomeWin);
        let creator = CallContext::new(DEPLOYER, 20);

        let receipt = book.award_points(id, &Identity::from(WALLET_1), &creator).unwrap();
        assert_eq!(receipt, AwardReceipt { awarded: true, points: 10 });
        assert_eq!(
            book.get_user_stats(&Identity::from(WALLET_1)),
            UserStats {
                total_points: 10,
                correct_predictions: 1,
                total_predictions: 1,
            }
        );

        let receipt = book.award_points(id, &Identity::from(WALLET_2), &creator).unwrap();
        assert_eq!(receipt, AwardReceipt { awarded: false, points: 0 });
        assert_eq!(
            book.get_user_stats(&Identity::from(WALLET_2)),
            UserStats {
                total_points: 0,
                correct_predictions: 0,
                total_predictions: 1,
            }
        );
    }

    #[test]
    fn test_award_is_not_repeatable() {
        let (mut book, id) = create_settled_book(Outcome::HomeWin);
        let creator = CallContext::new(DEPLOYER, 20);
        let alice = Identity::from(WALLET_1);

        book.award_points(id, &alice, &creator).unwrap();
        let err = book.award_points(id, &alice, &creator).unwrap_err();

        assert!(matches!(err, PredictionError::AlreadyAwarded));
        assert_eq!(book.get_user_stats(&alice).total_points, 10);
        assert!(book.is_awarded(id, &alice));
    }

    #[test]
    fn test_award_authorization() {
        let (mut book, id) = create_settled_book(Outcome::HomeWin);
        let alice = Identity::from(WALLET_1);

        let err = book
            .award_points(id, &alice, &CallContext::new(WALLET_1, 1))
            .unwrap_err();
        assert!(err.is_unauthorized());

        let err = book
            .award_points(id, &alice, &CallContext::new(ORACLE, 1))
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(book.get_user_stats(&alice).total_points, 0);
    }

    #[test]
    fn test_award_by_oracle_when_configured() {
        let config = RegistryConfig {
            award_policy: AwardPolicy::CreatorOrOracle,
            reward_points: 3,
            ..RegistryConfig::default()
        };
        let mut book = PredictionBook::new(config).unwrap();
        let id = create_event(&mut book);
        join(&mut book, id, WALLET_1, Outcome::AwayWin);
        close(&mut book, id);
        settle(&mut book, id, Outcome::AwayWin);

        let receipt = book
            .award_points(id, &Identity::from(WALLET_1), &CallContext::new(ORACLE, 1))
            .unwrap();
        assert_eq!(receipt, AwardReceipt { awarded: true, points: 3 });
    }

    #[test]
    fn test_award_preconditions() {
        let (mut book, id) = create_book_with_event();
        join(&mut book, id, WALLET_1, Outcome::HomeWin);
        let creator = CallContext::new(DEPLOYER, 1);
        let alice = Identity::from(WALLET_1);

        assert!(book.award_points(EventId(5), &alice, &creator).unwrap_err().is_not_found());

        // No result yet, open or closed
        assert!(book.award_points(id, &alice, &creator).unwrap_err().is_not_found());
        close(&mut book, id);
        assert!(book.award_points(id, &alice, &creator).unwrap_err().is_not_found());

        settle(&mut book, id, Outcome::HomeWin);
        let err = book
            .award_points(id, &Identity::from(WALLET_3), &creator)
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(book.get_user_stats(&Identity::from(WALLET_3)), UserStats::default());
    }

    #[test]
    fn test_json_snapshot() {
        let (mut book, id) = create_settled_book(Outcome::HomeWin);
        book.award_points(id, &Identity::from(WALLET_1), &CallContext::new(DEPLOYER, 30))
            .unwrap();

        let json = book.to_json().unwrap();
        let mut restored = PredictionBook::from_json(&json).unwrap();

        assert_eq!(restored.event_count(), 1);
        assert_eq!(restored.next_event_id(), EventId(2));
        assert_eq!(restored.get_event(id), book.get_event(id));
        assert_eq!(
            restored.get_user_stats(&Identity::from(WALLET_1)),
            book.get_user_stats(&Identity::from(WALLET_1))
        );

        // Award guard survives the round trip
        let err = restored
            .award_points(id, &Identity::from(WALLET_1), &CallContext::new(DEPLOYER, 31))
            .unwrap_err();
        assert!(matches!(err, PredictionError::AlreadyAwarded));
        assert!(restored.get_event(id).unwrap().access_code_matches(TEST_ACCESS_CODE));
    }

    fn tamper(book: &PredictionBook, edit: impl FnOnce(&mut serde_json::Value)) -> String {
        let mut value: serde_json::Value = serde_json::from_str(&book.to_json().unwrap()).unwrap();
        edit(&mut value);
        value.to_string()
    }

    #[test]
    fn test_snapshot_with_stale_id_counter_is_rejected() {
        let (book, _) = create_book_with_event();
        let json = tamper(&book, |v| v["events"]["last_id"] = 0.into());

        let err = PredictionBook::from_json(&json).unwrap_err();
        assert!(matches!(err, PredictionError::Snapshot(_)));
        assert_eq!(err.code(), 199);
    }

    #[test]
    fn test_snapshot_settled_without_result_is_rejected() {
        let (book, id) = create_book_with_event();
        let json = tamper(&book, |v| {
            v["events"]["events"][id.to_string()]["status"] = "settled".into()
        });

        assert!(matches!(
            PredictionBook::from_json(&json),
            Err(PredictionError::Snapshot(_))
        ));
    }

    #[test]
    fn test_snapshot_links_are_checked() {
        let (mut book, id) = create_settled_book(Outcome::HomeWin);
        book.award_points(id, &Identity::from(WALLET_1), &CallContext::new(DEPLOYER, 30))
            .unwrap();

        let orphan_award = tamper(&book, |v| {
            v["leaderboard"]["awarded"][id.to_string()] = serde_json::json!([WALLET_3])
        });
        assert!(PredictionBook::from_json(&orphan_award).is_err());

        let inflated = tamper(&book, |v| {
            v["leaderboard"]["entries"][WALLET_1]["correct_predictions"] = 5.into()
        });
        assert!(PredictionBook::from_json(&inflated).is_err());

        let unknown_event = tamper(&book, |v| {
            let mut per_event = v["predictions"]["entries"][id.to_string()].clone();
            if let Some(predictions) = per_event.as_object_mut() {
                for prediction in predictions.values_mut() {
                    prediction["event_id"] = 7.into();
                }
            }
            v["predictions"]["entries"]["7"] = per_event;
        });
        assert!(PredictionBook::from_json(&unknown_event).is_err());

        assert!(PredictionBook::from_json(&book.to_json().unwrap()).is_ok());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = RegistryConfig {
            reward_points: 0,
            ..RegistryConfig::default()
        };
        assert!(PredictionBook::new(config).is_err());
    }
}
