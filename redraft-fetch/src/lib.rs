// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Redraft Fetch
//!
//! Transport and orchestration for Redraft.
//!
//! ## Host APIs
//!
//! The [`host`] module provides abstractions for system interactions:
//!
//! - [`host::keychain`] - Secure credential storage (system keychain)
//! - [`host::http`] - HTTP client with tracing and vendor error mapping
//!
//! ## Orchestration
//!
//! - [`adapter::ProviderAdapter`] - Trait implemented once per vendor
//! - [`fanout::FanOut`] - Sends one request to many targets concurrently
//! - [`context::FetchContext`] - Shared access to host APIs and settings
//!
//! ## Example
//!
//! ```ignore
//! use redraft_fetch::{FanOut, FetchContext, RoundEvent};
//!
//! let ctx = Arc::new(FetchContext::new()?);
//! let fanout = FanOut::new(ctx)
//!     .with_adapter(Arc::new(OpenAiAdapter::new()))
//!     .with_recorder(ledger);
//!
//! let mut round = fanout.dispatch(request, targets)?;
//! while let Some(event) = round.next_event().await {
//!     // render progress
//! }
//! let results = round.join().await;
//! ```

// Core modules
pub mod adapter;
pub mod context;
pub mod error;
pub mod fanout;
pub mod host;

// Re-export key types at crate root

// Errors
pub use error::{FetchError, HttpError, KeychainError, ProviderError};

// Host APIs
pub use host::{
    http::{HttpClient, ResponseExt, read_json, vendor_error_message},
    keychain::{KeychainApi, MemoryKeychain, SystemKeychain},
};

// Orchestration
pub use adapter::{ProviderAdapter, RawCompletion};
pub use context::{FetchContext, FetchContextBuilder, FetchSettings, ProviderEndpoint};
pub use fanout::{FanOut, FanOutRound, RoundEvent};
