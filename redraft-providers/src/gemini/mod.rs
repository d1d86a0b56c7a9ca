//! Gemini (Google) provider implementation.
//!
//! Sends instruction and text as one concatenated prompt. Usage is taken
//! from `usageMetadata` when the response carries it.
//!
//! ## Credentials
//!
//! - `GEMINI_API_KEY`
//! - keychain service `redraft:gemini`, account `api_key`

mod adapter;
mod api;
mod descriptor;

pub use adapter::GeminiAdapter;
pub use api::{GenerateRequest, GenerateResponse, generate_content_path};
pub use descriptor::gemini_descriptor;
