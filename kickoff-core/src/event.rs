//! # Event Registry
//!
//! Owns event records and their lifecycle. Identifiers are assigned
//! sequentially starting at 1 and are never reused.
//!
//! ```text
//! create_event -> Open --close_event--> Closed --submit_result--> Settled
//! ```
//!
//! The oracle may be replaced by the creator while the event is `Open` or
//! `Closed`; once a result is bound the event is frozen.

use crate::auth::{self, Action};
use crate::config::{AwardPolicy, RegistryConfig};
use crate::types::{CallContext, EventId, EventStatus, Identity, Outcome};
use crate::utils::{access_code_digest, validate_text, verify_access_code};
use crate::{error::Result, PredictionError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Parameters for a new event, as validated by the caller's front end.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewEvent {
    pub name: String,
    pub access_code: String,
    pub home_team: String,
    pub away_team: String,
    /// Kickoff time supplied by the caller (Unix timestamp, not checked against wall time)
    pub match_time: u64,
    pub oracle: Identity,
}

/// A single prediction round tied to one match.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub home_team: String,
    pub away_team: String,
    pub match_time: u64,
    pub creator: Identity,
    pub oracle: Identity,
    /// Logical clock at creation
    pub created_at: u64,

    /// Hex SHA-256 of the access code
    access_code_hash: String,
    status: EventStatus,
    result: Option<Outcome>,
    settled_at: Option<u64>,
}

impl Event {
    pub fn status(&self) -> EventStatus {
        self.status
    }

    /// Final outcome; `Some` exactly when the event is settled.
    pub fn result(&self) -> Option<Outcome> {
        self.result
    }

    pub fn settled_at(&self) -> Option<u64> {
        self.settled_at
    }

    pub fn is_open(&self) -> bool {
        self.status == EventStatus::Open
    }

    pub fn access_code_matches(&self, candidate: &str) -> bool {
        verify_access_code(candidate, &self.access_code_hash)
    }

    /// Human-readable fixture, e.g. "Manchester United vs Liverpool"
    pub fn fixture(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}

/// Sequential store of events.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct EventRegistry {
    last_id: u64,
    events: BTreeMap<EventId, Event>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new event. Any caller may create one and becomes its creator.
    pub fn create_event(
        &mut self,
        params: NewEvent,
        ctx: &CallContext,
        config: &RegistryConfig,
    ) -> Result<EventId> {
        validate_text("Event name", &params.name, config.max_text_len)?;
        validate_text("Access code", &params.access_code, config.max_text_len)?;
        validate_text("Home team", &params.home_team, config.max_text_len)?;
        validate_text("Away team", &params.away_team, config.max_text_len)?;

        let next = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| PredictionError::Overflow("event id counter".to_string()))?;
        let id = EventId(next);
        if self.events.contains_key(&id) {
            return Err(PredictionError::Snapshot(format!(
                "event id {id} is already taken"
            )));
        }

        let event = Event {
            id,
            name: params.name,
            home_team: params.home_team,
            away_team: params.away_team,
            match_time: params.match_time,
            creator: ctx.caller.clone(),
            oracle: params.oracle,
            created_at: ctx.clock,
            access_code_hash: access_code_digest(&params.access_code),
            status: EventStatus::Open,
            result: None,
            settled_at: None,
        };

        info!(
            "Created event {} \"{}\" ({}) by {}",
            id,
            event.name,
            event.fixture(),
            event.creator
        );

        self.events.insert(id, event);
        self.last_id = next;
        Ok(id)
    }

    /// Stop accepting predictions. Creator only, from `Open`.
    pub fn close_event(&mut self, event_id: EventId, ctx: &CallContext) -> Result<()> {
        let event = self.require_mut(event_id)?;
        authorize(&ctx.caller, event, Action::CloseEvent)?;

        if event.status != EventStatus::Open {
            return Err(PredictionError::InvalidEventState(format!(
                "event {event_id} is {} and cannot be closed",
                event.status
            )));
        }

        event.status = EventStatus::Closed;
        info!("Closed event {}", event_id);
        Ok(())
    }

    /// Replace the oracle. Creator only, any time before settlement.
    pub fn update_oracle(
        &mut self,
        event_id: EventId,
        new_oracle: Identity,
        ctx: &CallContext,
    ) -> Result<()> {
        let event = self.require_mut(event_id)?;
        authorize(&ctx.caller, event, Action::UpdateOracle)?;

        if event.status == EventStatus::Settled {
            return Err(PredictionError::InvalidEventState(format!(
                "event {event_id} is settled; its oracle is fixed"
            )));
        }

        info!(
            "Oracle for event {} changed from {} to {}",
            event_id, event.oracle, new_oracle
        );
        event.oracle = new_oracle;
        Ok(())
    }

    /// Bind the final outcome. Oracle only, from `Closed`. Irreversible.
    pub fn submit_result(
        &mut self,
        event_id: EventId,
        outcome: Outcome,
        ctx: &CallContext,
    ) -> Result<()> {
        let event = self.require_mut(event_id)?;
        authorize(&ctx.caller, event, Action::SubmitResult)?;

        if event.status != EventStatus::Closed {
            return Err(PredictionError::InvalidEventState(format!(
                "event {event_id} is {}; results are accepted only once it is closed",
                event.status
            )));
        }

        event.result = Some(outcome);
        event.status = EventStatus::Settled;
        event.settled_at = Some(ctx.clock);
        info!("Settled event {} with result: {}", event_id, outcome);
        Ok(())
    }

    pub fn get(&self, event_id: EventId) -> Option<&Event> {
        self.events.get(&event_id)
    }

    /// Look up an event, failing with `NotFound` if it was never created.
    pub fn require(&self, event_id: EventId) -> Result<&Event> {
        self.events
            .get(&event_id)
            .ok_or_else(|| PredictionError::NotFound(format!("event {event_id}")))
    }

    fn require_mut(&mut self, event_id: EventId) -> Result<&mut Event> {
        self.events
            .get_mut(&event_id)
            .ok_or_else(|| PredictionError::NotFound(format!("event {event_id}")))
    }

    /// Events in id order
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    pub fn by_status(&self, status: EventStatus) -> impl Iterator<Item = &Event> {
        self.events.values().filter(move |e| e.status == status)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Id the next successful `create_event` will assign
    pub fn next_id(&self) -> EventId {
        EventId(self.last_id.saturating_add(1))
    }

    /// Check a restored registry: keys match ids, the counter covers every
    /// stored id, and each event's result agrees with its status.
    pub fn validate(&self) -> Result<()> {
        if let Some(highest) = self.events.keys().next_back() {
            if highest.0 > self.last_id {
                return Err(PredictionError::Snapshot(format!(
                    "last id {} is below stored event {highest}",
                    self.last_id
                )));
            }
        }

        for (key, event) in &self.events {
            if *key != event.id {
                return Err(PredictionError::Snapshot(format!(
                    "event stored under {key} carries id {}",
                    event.id
                )));
            }
            if event.result.is_some() != (event.status == EventStatus::Settled) {
                return Err(PredictionError::Snapshot(format!(
                    "event {key} is {} with result {:?}",
                    event.status, event.result
                )));
            }
            if event.settled_at.is_some() != event.result.is_some() {
                return Err(PredictionError::Snapshot(format!(
                    "event {key} settlement time disagrees with its result"
                )));
            }
        }

        Ok(())
    }
}

/// Role check for the lifecycle actions. Awards carry their own policy and are
/// checked by the book.
fn authorize(caller: &Identity, event: &Event, action: Action) -> Result<()> {
    if auth::can(caller, event, action, AwardPolicy::Creator) {
        return Ok(());
    }

    warn!("{} is not allowed to {} on event {}", caller, action, event.id);
    Err(PredictionError::Unauthorized(format!(
        "{caller} may not {action} on event {}",
        event.id
    )))
}
