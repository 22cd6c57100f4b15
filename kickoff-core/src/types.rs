//! Shared value types: identifiers, outcomes and the per-call context.

use crate::{error::Result, PredictionError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Registry-assigned event identifier. The first event is `1`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EventId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Opaque account identity (a principal or wallet address).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Identity {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Final result of a match, with the wire codes used by the contract.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum Outcome {
    HomeWin = 1,
    Draw = 2,
    AwayWin = 3,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::HomeWin, Outcome::Draw, Outcome::AwayWin];

    /// Wire code (1 = home win, 2 = draw, 3 = away win)
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Outcome {
    type Error = PredictionError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            1 => Ok(Self::HomeWin),
            2 => Ok(Self::Draw),
            3 => Ok(Self::AwayWin),
            _ => Err(PredictionError::Validation(format!(
                "Invalid outcome {code}: expected 1 (home), 2 (draw) or 3 (away)"
            ))),
        }
    }
}

impl TryFrom<u32> for Outcome {
    type Error = PredictionError;

    fn try_from(code: u32) -> Result<Self> {
        let code = u8::try_from(code).map_err(|_| {
            PredictionError::Validation(format!("Invalid outcome {code}: out of range"))
        })?;
        Self::try_from(code)
    }
}

impl From<Outcome> for u8 {
    fn from(outcome: Outcome) -> Self {
        outcome.code()
    }
}

impl FromStr for Outcome {
    type Err = PredictionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "home" | "home-win" | "homewin" => Ok(Self::HomeWin),
            "2" | "draw" => Ok(Self::Draw),
            "3" | "away" | "away-win" | "awaywin" => Ok(Self::AwayWin),
            other => Err(PredictionError::Validation(format!(
                "Invalid outcome '{other}': expected home, draw or away"
            ))),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::HomeWin => "Home win",
            Self::Draw => "Draw",
            Self::AwayWin => "Away win",
        };
        f.write_str(label)
    }
}

/// Lifecycle of an event: `Open -> Closed -> Settled`, never backwards.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Open,
    Closed,
    Settled,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Settled => "settled",
        };
        f.write_str(label)
    }
}

impl FromStr for EventStatus {
    type Err = PredictionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "settled" => Ok(Self::Settled),
            other => Err(PredictionError::Validation(format!(
                "Invalid event status '{other}'"
            ))),
        }
    }
}

/// Execution context supplied by the surrounding runtime on every call:
/// who is calling, and the logical clock (block height) at the time of the call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Identity,
    pub clock: u64,
}

impl CallContext {
    pub fn new(caller: impl Into<Identity>, clock: u64) -> Self {
        Self {
            caller: caller.into(),
            clock,
        }
    }
}
