//! Provider registry for managing all provider descriptors.
//!
//! The registry provides static access to all provider configurations
//! and builds the fan-out with every adapter registered.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use redraft_core::ProviderKind;
use redraft_fetch::{FanOut, FetchContext};

use crate::anthropic::anthropic_descriptor;
use crate::descriptor::ProviderDescriptor;
use crate::gemini::gemini_descriptor;
use crate::openai::openai_descriptor;

// ============================================================================
// Static Registry
// ============================================================================

static DESCRIPTORS: OnceLock<Vec<ProviderDescriptor>> = OnceLock::new();

static CLI_NAME_MAP: OnceLock<HashMap<String, ProviderKind>> = OnceLock::new();

fn init_descriptors() -> Vec<ProviderDescriptor> {
    vec![openai_descriptor(), anthropic_descriptor(), gemini_descriptor()]
}

fn build_cli_name_map(descriptors: &[ProviderDescriptor]) -> HashMap<String, ProviderKind> {
    let mut map = HashMap::new();

    for desc in descriptors {
        map.insert(desc.cli.name.to_string(), desc.id);
        for alias in desc.cli.aliases {
            map.insert((*alias).to_string(), desc.id);
        }
    }

    map
}

// ============================================================================
// Provider Registry
// ============================================================================

/// Global registry of all provider descriptors.
pub struct ProviderRegistry;

impl ProviderRegistry {
    /// Returns all provider descriptors.
    pub fn all() -> &'static [ProviderDescriptor] {
        DESCRIPTORS.get_or_init(init_descriptors)
    }

    /// Gets a provider descriptor by kind.
    pub fn get(id: ProviderKind) -> Option<&'static ProviderDescriptor> {
        Self::all().iter().find(|d| d.id == id)
    }

    /// Returns the CLI name to provider kind mapping.
    pub fn cli_name_map() -> &'static HashMap<String, ProviderKind> {
        CLI_NAME_MAP.get_or_init(|| build_cli_name_map(Self::all()))
    }

    /// Looks up a provider by CLI name or alias (case-insensitive).
    pub fn get_by_cli_name(name: &str) -> Option<&'static ProviderDescriptor> {
        let kind = Self::cli_name_map().get(&name.trim().to_ascii_lowercase())?;
        Self::get(*kind)
    }

    /// Returns the number of registered providers.
    pub fn count() -> usize {
        Self::all().len()
    }

    /// Returns all provider kinds.
    pub fn kinds() -> Vec<ProviderKind> {
        Self::all().iter().map(|d| d.id).collect()
    }

    /// Builds a fan-out with an adapter for every registered provider.
    pub fn build_fanout(ctx: Arc<FetchContext>) -> FanOut {
        Self::all()
            .iter()
            .fold(FanOut::new(ctx), |fanout, desc| fanout.with_adapter(desc.adapter()))
    }
}

// ============================================================================
// Tests
// ============================================================================
