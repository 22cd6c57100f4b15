//! # Prediction Ledger
//!
//! One immutable prediction per (event, participant). Entries are only ever
//! inserted; there is no overwrite and no retraction.

use crate::types::{EventId, Identity, Outcome};
use crate::{error::Result, PredictionError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A participant's guess for one event
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Prediction {
    pub event_id: EventId,
    /// Event name at the time of the prediction
    pub event_name: String,
    pub predicted_outcome: Outcome,
    /// Logical clock at submission
    pub timestamp: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PredictionLedger {
    entries: BTreeMap<EventId, BTreeMap<Identity, Prediction>>,
}

impl PredictionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, event_id: EventId, participant: &Identity) -> Option<&Prediction> {
        self.entries.get(&event_id)?.get(participant)
    }

    pub fn contains(&self, event_id: EventId, participant: &Identity) -> bool {
        self.get(event_id, participant).is_some()
    }

    /// Fails with `AlreadyPredicted` if the pair is taken; nothing is written then.
    pub fn insert(&mut self, participant: Identity, prediction: Prediction) -> Result<()> {
        let per_event = self.entries.entry(prediction.event_id).or_default();
        if per_event.contains_key(&participant) {
            return Err(PredictionError::AlreadyPredicted);
        }
        per_event.insert(participant, prediction);
        Ok(())
    }

    /// All predictions for an event, ordered by participant
    pub fn for_event(&self, event_id: EventId) -> Vec<(&Identity, &Prediction)> {
        self.entries
            .get(&event_id)
            .map(|per_event| per_event.iter().collect())
            .unwrap_or_default()
    }

    /// Every prediction a participant holds, in event order
    pub fn for_participant<'a>(
        &'a self,
        participant: &'a Identity,
    ) -> impl Iterator<Item = &'a Prediction> + 'a {
        self.entries
            .values()
            .filter_map(move |per_event| per_event.get(participant))
    }

    /// Every stored prediction with its owner, in event order
    pub fn iter(&self) -> impl Iterator<Item = (&Identity, &Prediction)> {
        self.entries.values().flat_map(|per_event| per_event.iter())
    }

    /// Check a restored ledger: each prediction sits under its own event id.
    pub fn validate(&self) -> Result<()> {
        for (event_id, per_event) in &self.entries {
            if let Some((participant, _)) = per_event
                .iter()
                .find(|(_, prediction)| prediction.event_id != *event_id)
            {
                return Err(PredictionError::Snapshot(format!(
                    "prediction by {participant} filed under event {event_id}"
                )));
            }
        }
        Ok(())
    }

    /// Total number of predictions across all events
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
