//! Engine module.
//!
//! Holds the active configuration generation and swaps it atomically on
//! reconfiguration.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::compile::{compile, parse_url, CompiledConfig};
use crate::error::Result;
use crate::parser::parse_config_from_file;
use crate::types::{Action, Policy, RefererConfig};

/// Referer rewriting engine.
///
/// Lookups run against an immutable [`CompiledConfig`] snapshot, so any
/// number of threads can compute referrers while another thread calls
/// [`set_config`](Self::set_config). Each lookup sees exactly one
/// generation of the rule set.
pub struct RefererModEngine {
    current: RwLock<Arc<CompiledConfig>>,
}

impl RefererModEngine {
    /// Create a new engine from a configuration.
    pub fn new(config: &RefererConfig) -> Result<Self> {
        let compiled = compile(config)?;
        Ok(Self {
            current: RwLock::new(Arc::new(compiled)),
        })
    }

    /// Create a new engine from a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = parse_config_from_file(path)?;
        Self::new(&config)
    }

    /// Replace the active configuration.
    ///
    /// The new configuration is compiled completely before it is published.
    /// On error the previous generation stays active.
    pub fn set_config(&self, config: &RefererConfig) -> Result<()> {
        let compiled = match compile(config) {
            Ok(compiled) => compiled,
            Err(e) => {
                log::warn!("rejected referer configuration, keeping previous rules: {}", e);
                return Err(e);
            }
        };

        let rule_count = compiled.rule_count();
        *self.current.write() = Arc::new(compiled);
        log::info!("activated referer configuration with {} rules", rule_count);
        Ok(())
    }

    /// The active configuration generation.
    pub fn snapshot(&self) -> Arc<CompiledConfig> {
        self.current.read().clone()
    }

    /// Resolve the policy for a request to `target` coming from `source`.
    ///
    /// An empty `source` counts as absent.
    pub fn resolve_policy(&self, target: &str, source: Option<&str>) -> Result<Policy> {
        let target = parse_url(target)?;
        let source = match source {
            Some(s) if !s.is_empty() => Some(parse_url(s)?),
            _ => None,
        };
        Ok(self.snapshot().resolve_policy(&target, source.as_ref()))
    }

    /// Compute the referrer to expose for a navigation from `source` to `target`.
    pub fn compute_referrer(&self, target: &str, source: Option<&str>) -> Result<String> {
        self.snapshot().compute_referrer(target, source)
    }

    /// Get the number of rules in the active configuration.
    pub fn rule_count(&self) -> usize {
        self.snapshot().rule_count()
    }
}

impl Default for RefererModEngine {
    /// No domain rules, keep same-host referrers, prune all others.
    fn default() -> Self {
        let compiled = CompiledConfig::new(
            Vec::new(),
            Policy::new(Action::Keep, ""),
            Policy::new(Action::Prune, ""),
        );
        Self {
            current: RwLock::new(Arc::new(compiled)),
        }
    }
}
