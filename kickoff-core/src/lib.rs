//! # Kickoff Core
//!
//! Core Rust library for access-coded football prediction events.
//!
//! A creator registers an event tied to a real match, participants each submit
//! one outcome guess behind the event's access code, a designated oracle
//! reports the final result once the event is closed, and correct guesses are
//! converted into points on a global leaderboard.
//!
//! ## Features
//!
//! - **Event Registry**: sequential ids, `Open -> Closed -> Settled` lifecycle
//! - **Prediction Ledger**: one immutable guess per participant and event
//! - **Leaderboard**: attempt counting on join, points on award
//! - **Explicit context**: caller identity and logical clock are parameters,
//!   never ambient state
//!
//! The library performs no I/O. Match data, persistence and transport live on
//! the calling side; [`PredictionBook::to_json`] gives callers a snapshot to store.
//!
//! ## Examples
//!
//! ```rust
//! use kickoff_core::{CallContext, Identity, NewEvent, Outcome, PredictionBook};
//!
//! let mut book = PredictionBook::default();
//! let id = book.create_event(
//!     NewEvent {
//!         name: "Premier League Match".to_string(),
//!         access_code: "SECRET123".to_string(),
//!         home_team: "Manchester United".to_string(),
//!         away_team: "Liverpool".to_string(),
//!         match_time: 1700000000,
//!         oracle: Identity::from("oracle"),
//!     },
//!     &CallContext::new("creator", 1),
//! )?;
//!
//! book.join_event(id, "SECRET123", Outcome::HomeWin, &CallContext::new("alice", 2))?;
//! book.close_event(id, &CallContext::new("creator", 3))?;
//! book.submit_result(id, Outcome::HomeWin, &CallContext::new("oracle", 4))?;
//!
//! let receipt = book.award_points(id, &Identity::from("alice"), &CallContext::new("creator", 5))?;
//! assert!(receipt.awarded);
//! assert_eq!(book.get_user_stats(&Identity::from("alice")).total_points, 10);
//! Ok::<(), kickoff_core::PredictionError>(())
//! ```

pub mod auth;
pub mod book;
pub mod config;
pub mod error;
pub mod event;
pub mod leaderboard;
pub mod prediction;
pub mod types;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

pub use book::PredictionBook;
pub use config::{AwardPolicy, RegistryConfig, DEFAULT_REWARD_POINTS};
pub use error::{PredictionError, Result};
pub use event::{Event, NewEvent};
pub use leaderboard::{AwardReceipt, Standing, UserStats};
pub use prediction::Prediction;
pub use types::{CallContext, EventId, EventStatus, Identity, Outcome};
pub use utils::*;
