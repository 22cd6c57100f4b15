//! JSON state file backing the CLI.
//!
//! The file holds the prediction book plus the logical clock the CLI hands to
//! the core. Each mutating command advances the clock by one, playing the part
//! of a block height.

use anyhow::{Context, Result};
use kickoff_core::{CallContext, Identity, PredictionBook, RegistryConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct StateFile {
    pub clock: u64,
    pub book: PredictionBook,
}

impl StateFile {
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let book = PredictionBook::new(config).context("Invalid registry configuration")?;
        Ok(Self { clock: 0, book })
    }

    /// Advance the clock and build the context for one call.
    pub fn tick(&mut self, caller: Identity) -> Result<CallContext> {
        self.clock = self
            .clock
            .checked_add(1)
            .context("Logical clock overflowed")?;
        Ok(CallContext {
            caller,
            clock: self.clock,
        })
    }
}

/// Load the state file, or start a fresh book with `config` if it does not exist yet.
pub fn load(path: &Path, config: impl FnOnce() -> Result<RegistryConfig>) -> Result<StateFile> {
    if !path.exists() {
        debug!("No state file at {}, starting a new book", path.display());
        return StateFile::new(config()?);
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file: {}", path.display()))?;
    let state: StateFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse state file: {}", path.display()))?;
    state
        .book
        .validate()
        .with_context(|| format!("Inconsistent state file: {}", path.display()))?;
    Ok(state)
}

/// Write the state file atomically: a temp file in the same directory is
/// renamed over the target.
pub fn save(path: &Path, state: &StateFile) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let json = serde_json::to_string_pretty(state).context("Failed to serialize state")?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(json.as_bytes())
        .context("Failed to write state")?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace state file: {}", path.display()))?;

    debug!("Saved state at clock {} to {}", state.clock, path.display());
    Ok(())
}
