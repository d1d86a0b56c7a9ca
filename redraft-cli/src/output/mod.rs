//! Output formatting for CLI.

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::{TextFormatter, format_bundle};
#[cfg(test)]
mod tests;
