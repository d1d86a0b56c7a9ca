//! OpenAI provider implementation.
//!
//! Talks to the chat completions API with a bearer key. GPT models get a
//! system message plus the user text; reasoning models (`o1`, `o3`, `o4`)
//! get a single user message carrying both.
//!
//! ## Credentials
//!
//! - `OPENAI_API_KEY`
//! - keychain service `redraft:openai`, account `api_key`

mod adapter;
mod api;
mod descriptor;

pub use adapter::OpenAiAdapter;
pub use api::{ChatRequest, ChatResponse, is_reasoning_model};
pub use descriptor::openai_descriptor;
