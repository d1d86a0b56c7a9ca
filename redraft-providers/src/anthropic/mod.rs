//! Anthropic provider implementation.
//!
//! Talks to the Messages API. The instruction goes in the top-level
//! `system` field and the text as the single user turn. `max_tokens` is
//! required by the API and falls back to 4096.
//!
//! ## Credentials
//!
//! - `ANTHROPIC_API_KEY`
//! - keychain service `redraft:anthropic`, account `api_key`

mod adapter;
mod api;
mod descriptor;

pub use adapter::AnthropicAdapter;
pub use api::{ANTHROPIC_VERSION, DEFAULT_MAX_TOKENS, MessagesRequest, MessagesResponse};
pub use descriptor::anthropic_descriptor;
