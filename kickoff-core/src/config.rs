//! Rules a prediction book is created with.

use crate::{error::Result, PredictionError};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Points granted for each correct prediction
pub const DEFAULT_REWARD_POINTS: u64 = 10;

/// Upper bound for event names, access codes and team names
pub const DEFAULT_MAX_TEXT_LEN: usize = 64;

/// Who may convert a settled prediction into leaderboard points.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AwardPolicy {
    /// Only the event creator
    #[default]
    Creator,
    /// The event creator or the event's oracle
    CreatorOrOracle,
}

impl FromStr for AwardPolicy {
    type Err = PredictionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "creator" => Ok(Self::Creator),
            "creator-or-oracle" => Ok(Self::CreatorOrOracle),
            other => Err(PredictionError::Config(format!(
                "Unknown award policy '{other}': expected 'creator' or 'creator-or-oracle'"
            ))),
        }
    }
}

impl fmt::Display for AwardPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Creator => f.write_str("creator"),
            Self::CreatorOrOracle => f.write_str("creator-or-oracle"),
        }
    }
}

/// Registry configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    pub reward_points: u64,
    pub award_policy: AwardPolicy,
    pub max_text_len: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            reward_points: DEFAULT_REWARD_POINTS,
            award_policy: AwardPolicy::default(),
            max_text_len: DEFAULT_MAX_TEXT_LEN,
        }
    }
}

impl RegistryConfig {
    /// Create registry config from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup, falling back to defaults for absent keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let reward_points = match lookup("KICKOFF_REWARD_POINTS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                PredictionError::Config(format!("KICKOFF_REWARD_POINTS is not a number: {raw}"))
            })?,
            None => DEFAULT_REWARD_POINTS,
        };

        let award_policy = match lookup("KICKOFF_AWARD_POLICY") {
            Some(raw) => raw.parse()?,
            None => AwardPolicy::default(),
        };

        let max_text_len = match lookup("KICKOFF_MAX_TEXT_LEN") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                PredictionError::Config(format!("KICKOFF_MAX_TEXT_LEN is not a number: {raw}"))
            })?,
            None => DEFAULT_MAX_TEXT_LEN,
        };

        let config = Self {
            reward_points,
            award_policy,
            max_text_len,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.reward_points == 0 {
            return Err(PredictionError::Config(
                "reward_points must be greater than 0".to_string(),
            ));
        }

        if self.max_text_len == 0 {
            return Err(PredictionError::Config(
                "max_text_len must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
