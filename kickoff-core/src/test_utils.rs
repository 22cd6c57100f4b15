//! Common test utilities for kickoff-core tests.
//!
//! Shared identities, event parameters and lifecycle helpers mirroring the
//! accounts of a local devnet: one deployer, three wallets and an oracle.

use crate::book::PredictionBook;
use crate::config::RegistryConfig;
use crate::event::{Event, EventRegistry, NewEvent};
use crate::types::{CallContext, EventId, Identity, Outcome};
use constants::*;

/// Parameters of the standard test event.
pub fn new_event_params() -> NewEvent {
    NewEvent {
        name: TEST_EVENT_NAME.to_string(),
        access_code: TEST_ACCESS_CODE.to_string(),
        home_team: TEST_HOME_TEAM.to_string(),
        away_team: TEST_AWAY_TEAM.to_string(),
        match_time: TEST_MATCH_TIME,
        oracle: Identity::from(ORACLE),
    }
}

/// A standalone open event created by the deployer.
pub fn create_test_event() -> Event {
    let mut registry = EventRegistry::new();
    let id = registry
        .create_event(
            new_event_params(),
            &CallContext::new(DEPLOYER, 1),
            &RegistryConfig::default(),
        )
        .unwrap();
    registry.get(id).unwrap().clone()
}

/// Create the standard event in `book` as the deployer.
pub fn create_event(book: &mut PredictionBook) -> EventId {
    book.create_event(new_event_params(), &CallContext::new(DEPLOYER, 1))
        .unwrap()
}

/// A default book holding one open event.
pub fn create_book_with_event() -> (PredictionBook, EventId) {
    let mut book = PredictionBook::default();
    let id = create_event(&mut book);
    (book, id)
}

/// Join `event_id` as `who` with the standard access code.
pub fn join(book: &mut PredictionBook, event_id: EventId, who: &str, outcome: Outcome) {
    book.join_event(event_id, TEST_ACCESS_CODE, outcome, &CallContext::new(who, 2))
        .unwrap();
}

pub fn close(book: &mut PredictionBook, event_id: EventId) {
    book.close_event(event_id, &CallContext::new(DEPLOYER, 3))
        .unwrap();
}

pub fn settle(book: &mut PredictionBook, event_id: EventId, outcome: Outcome) {
    book.submit_result(event_id, outcome, &CallContext::new(ORACLE, 4))
        .unwrap();
}

/// A settled event where wallet 1 picked the home win and wallet 2 the away win.
pub fn create_settled_book(result: Outcome) -> (PredictionBook, EventId) {
    let (mut book, id) = create_book_with_event();
    join(&mut book, id, WALLET_1, Outcome::HomeWin);
    join(&mut book, id, WALLET_2, Outcome::AwayWin);
    close(&mut book, id);
    settle(&mut book, id, result);
    (book, id)
}

/// Common test constants
pub mod constants {
    pub const DEPLOYER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
    pub const WALLET_1: &str = "ST1SJ3DTE5DN7X54YDH5D64R3BCB6A2AG2ZQ8YPD5";
    pub const WALLET_2: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";
    pub const WALLET_3: &str = "ST2JHG361ZXG51QTKY2NQCVBPPRRE2KZB1HR05NNC";
    pub const ORACLE: &str = "ST2NEB84ASENDXKYGJPQW86YXQCEFEX2ZQPG87ND";

    pub const TEST_EVENT_NAME: &str = "Premier League Match";
    pub const TEST_ACCESS_CODE: &str = "SECRET123";
    pub const TEST_HOME_TEAM: &str = "Manchester United";
    pub const TEST_AWAY_TEAM: &str = "Liverpool";

    /// Nov 14, 2023
    pub const TEST_MATCH_TIME: u64 = 1700000000;
}
