//! Run-scoped synthesis configuration.
//!
//! Passed explicitly into the pipeline entry point; the engine reads no
//! ambient or process-global switches.

use serde::{Deserialize, Serialize};

/// Configuration for one synthesis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Master switch. When false the engine performs no metadata or database
    /// work and returns an empty report.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Quote identifiers in rendered DDL and introspection.
    #[serde(default)]
    pub quote_identifiers: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            quote_identifiers: false,
        }
    }
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
