// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Redraft Store
//!
//! State management for Redraft.
//!
//! This crate provides:
//!
//! - **SessionLedger**: Running cost and request totals, shared by all rounds
//! - **RevisionStore**: Per-slot revision state with watch channels
//! - **SettingsStore**: User preferences with persistence
//! - **SessionStore**: Ledger snapshot and session prompt between runs
//! - **PromptStore**: The stored prompt layers
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use redraft_store::{RevisionStore, SessionStore, SettingsStore};
//!
//! let settings = SettingsStore::load_default().await?;
//! let session = SessionStore::load_default().await?;
//! let fanout = fanout.with_recorder(session.ledger());
//!
//! let revisions = RevisionStore::new();
//! revisions.set_targets(&targets).await;
//! while let Some(event) = round.next_event().await {
//!     revisions.apply(&event.to_update()).await;
//! }
//! session.save().await?;
//! ```

pub mod error;
pub mod ledger;
pub mod persistence;
pub mod prompt_store;
pub mod revision_store;
pub mod session_store;
pub mod settings_store;

pub use error::StoreError;
pub use ledger::SessionLedger;
pub use persistence::{
    CACHE_DIR_ENV, CONFIG_DIR_ENV, FileLock, default_cache_dir, default_catalog_path,
    default_config_dir, default_session_path, default_settings_path, load_json, load_or_recover,
    save_json, write_private,
};
pub use prompt_store::{EffectivePrompt, PromptStore};
pub use revision_store::{PanelState, RevisionStore};
pub use session_store::{SessionState, SessionStore};
pub use settings_store::{
    DEFAULT_TIMEOUT_SECS, ProviderSettings, SETTINGS_KEYS, Settings, SettingsStore,
};
