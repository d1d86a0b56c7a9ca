//! Session state persisted between invocations.
//!
//! The session file holds the ledger snapshot and the session prompt layer.
//! Resetting the session clears both.
//!
//! Two `redraft` processes can finish rounds against the same session. A
//! save therefore re-reads the file under a [`FileLock`] and adds only what
//! this process recorded since it loaded (or last saved), instead of
//! overwriting the other process's costs.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use redraft_core::SessionTotals;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::ledger::SessionLedger;
use crate::persistence::{FileLock, default_session_path, load_or_recover, save_json};

/// On-disk session record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    /// Ledger snapshot.
    pub totals: SessionTotals,
    /// Session prompt layer.
    pub session_prompt: Option<String>,
    /// When the session was last saved.
    pub updated_at: Option<DateTime<Utc>>,
}

/// What this process has changed since the file was last read.
#[derive(Debug, Default)]
struct Unsaved {
    /// Ledger totals as last read from or written to disk.
    baseline: SessionTotals,
    /// The session was reset; the file's totals are discarded on save.
    reset: bool,
    /// The session prompt was set or cleared here.
    prompt_changed: bool,
}

/// Costs recorded locally since `baseline`.
fn recorded_since(baseline: SessionTotals, now: SessionTotals) -> SessionTotals {
    SessionTotals {
        total_cost: (now.total_cost - baseline.total_cost).max(0.0),
        request_count: now.request_count.saturating_sub(baseline.request_count),
    }
}

/// Session ledger and session prompt, backed by a file.
pub struct SessionStore {
    path: PathBuf,
    ledger: Arc<SessionLedger>,
    session_prompt: RwLock<Option<String>>,
    updated_at: RwLock<Option<DateTime<Utc>>>,
    unsaved: Mutex<Unsaved>,
}

impl SessionStore {
    /// Creates an empty session.
    pub fn new(path: PathBuf) -> Self {
        Self::from_state(path, SessionState::default())
    }

    fn from_state(path: PathBuf, state: SessionState) -> Self {
        Self {
            path,
            ledger: Arc::new(SessionLedger::with_totals(state.totals)),
            session_prompt: RwLock::new(state.session_prompt),
            updated_at: RwLock::new(state.updated_at),
            unsaved: Mutex::new(Unsaved {
                baseline: state.totals,
                ..Unsaved::default()
            }),
        }
    }

    fn unsaved(&self) -> std::sync::MutexGuard<'_, Unsaved> {
        self.unsaved.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads the session from the default path.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read.
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(default_session_path()).await
    }

    /// Loads the session from a path; a missing or corrupt file starts a
    /// fresh session.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read.
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let state: SessionState = load_or_recover(&path, "session").await?;
        debug!(
            path = %path.display(),
            total = state.totals.total_cost,
            count = state.totals.request_count,
            "Session ready"
        );
        Ok(Self::from_state(path, state))
    }

    /// Path the store saves to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The shared ledger; hand it to the fan-out as its cost recorder.
    pub fn ledger(&self) -> Arc<SessionLedger> {
        Arc::clone(&self.ledger)
    }

    /// Current totals.
    pub fn totals(&self) -> SessionTotals {
        self.ledger.snapshot()
    }

    /// Gets the session prompt layer.
    pub async fn session_prompt(&self) -> Option<String> {
        self.session_prompt.read().await.clone()
    }

    /// Sets the session prompt layer.
    pub async fn set_session_prompt(&self, prompt: Option<String>) {
        *self.session_prompt.write().await = prompt;
        self.unsaved().prompt_changed = true;
    }

    /// Snapshot of everything persisted; `updated_at` is the last save.
    pub async fn state(&self) -> SessionState {
        SessionState {
            totals: self.ledger.snapshot(),
            session_prompt: self.session_prompt().await,
            updated_at: *self.updated_at.read().await,
        }
    }

    /// Zeroes the ledger and clears the session prompt.
    pub async fn reset(&self) {
        self.ledger.reset();
        self.set_session_prompt(None).await;
        {
            let mut unsaved = self.unsaved();
            unsaved.baseline = SessionTotals::default();
            unsaved.reset = true;
        }
        info!("Session reset");
    }

    /// Merges this process's changes into the session file.
    ///
    /// Costs recorded here since the last load or save are added to the
    /// totals currently on disk. The session prompt is written only if it
    /// was changed here. After saving, the ledger holds the merged totals.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be locked or written.
    pub async fn save(&self) -> Result<(), StoreError> {
        let _lock = FileLock::acquire(&self.path).await?;
        let on_disk: SessionState = load_or_recover(&self.path, "session").await?;

        let current = self.ledger.snapshot();
        let (reset, prompt_changed, added) = {
            let unsaved = self.unsaved();
            (unsaved.reset, unsaved.prompt_changed, recorded_since(unsaved.baseline, current))
        };

        let base = if reset { SessionTotals::default() } else { on_disk.totals };
        let totals = SessionTotals {
            total_cost: base.total_cost + added.total_cost,
            request_count: base.request_count + added.request_count,
        };
        let session_prompt = if prompt_changed {
            self.session_prompt().await
        } else {
            on_disk.session_prompt
        };

        let state = SessionState {
            totals,
            session_prompt: session_prompt.clone(),
            updated_at: Some(Utc::now()),
        };
        save_json(&self.path, &state).await?;

        // Costs recorded while the file was being written stay pending.
        let late = recorded_since(current, self.ledger.snapshot());
        self.ledger.restore(SessionTotals {
            total_cost: totals.total_cost + late.total_cost,
            request_count: totals.request_count + late.request_count,
        });
        *self.session_prompt.write().await = session_prompt;
        *self.updated_at.write().await = state.updated_at;
        *self.unsaved() = Unsaved {
            baseline: totals,
            ..Unsaved::default()
        };

        debug!(
            path = %self.path.display(),
            total = totals.total_cost,
            count = totals.request_count,
            added = added.request_count,
            "Session saved"
        );
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
