// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Redraft Providers
//!
//! Vendor-specific implementations for Redraft.
//!
//! Each provider module includes:
//!
//! - **Descriptor**: Static configuration (metadata, API location, CLI names)
//! - **API**: Request and response wire types
//! - **Adapter**: The [`redraft_fetch::ProviderAdapter`] implementation
//!
//! ## Supported Providers
//!
//! | Provider | Endpoint | Auth header | Usage block |
//! |----------|----------|-------------|-------------|
//! | OpenAI | `/v1/chat/completions` | `Authorization: Bearer` | always |
//! | Anthropic | `/v1/messages` | `x-api-key` | always |
//! | Gemini | `/v1beta/models/{model}:generateContent` | `x-goog-api-key` | sometimes |
//!
//! The [`ModelCatalog`] lists the models each provider serves with their
//! prices.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use redraft_core::NormalizedRequest;
//! use redraft_fetch::FetchContext;
//! use redraft_providers::{ModelCatalog, ProviderRegistry};
//!
//! let catalog = ModelCatalog::builtin();
//! let fanout = ProviderRegistry::build_fanout(Arc::new(FetchContext::new()?));
//! let results = fanout
//!     .run(NormalizedRequest::new(text, instruction, 0.7), catalog.default_targets()?)
//!     .await?;
//! ```

pub mod catalog;
pub mod descriptor;
pub mod registry;

// Provider modules (alphabetical)
pub mod anthropic;
pub mod gemini;
pub mod openai;

pub use catalog::{CatalogError, ModelCatalog, target_slot_id};
pub use descriptor::{ApiConfig, CliConfig, ProviderDescriptor, ProviderMetadata};
pub use registry::ProviderRegistry;

pub use anthropic::{AnthropicAdapter, anthropic_descriptor};
pub use gemini::{GeminiAdapter, gemini_descriptor};
pub use openai::{OpenAiAdapter, openai_descriptor};
