use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RefererError, Result};

/// What to send in place of the true referrer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Pass the original referrer through unchanged
    #[default]
    Keep,
    /// Reduce the referrer to its origin, with trailing slash
    Prune,
    /// Use the origin of the destination instead
    Target,
    /// Use a fixed configured string
    Replace,
    /// Send nothing
    Remove,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Keep => "keep",
            Action::Prune => "prune",
            Action::Target => "target",
            Action::Replace => "replace",
            Action::Remove => "remove",
        }
    }

    /// Whether this action produces a referrer even when the request had none
    pub fn synthesizes(&self) -> bool {
        matches!(self, Action::Target | Action::Replace)
    }
}

impl FromStr for Action {
    type Err = RefererError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "keep" => Ok(Action::Keep),
            "prune" => Ok(Action::Prune),
            "target" => Ok(Action::Target),
            "replace" => Ok(Action::Replace),
            "remove" => Ok(Action::Remove),
            other => Err(RefererError::ConfigError(format!(
                "unknown action '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved policy: the action plus the literal referer used by `replace`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Policy {
    pub action: Action,
    pub referer: String,
}

impl Policy {
    pub fn new(action: Action, referer: impl Into<String>) -> Self {
        Self {
            action,
            referer: referer.into(),
        }
    }
}

/// Default policy as stored in configuration, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPolicy {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub referer: String,
}

impl RawPolicy {
    pub fn new(action: impl Into<String>, referer: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            referer: referer.into(),
        }
    }

    /// Validate the action string
    pub fn compile(&self) -> Result<Policy> {
        Ok(Policy {
            action: self.action.parse()?,
            referer: self.referer.clone(),
        })
    }
}

impl From<&Policy> for RawPolicy {
    fn from(policy: &Policy) -> Self {
        Self::new(policy.action.as_str(), policy.referer.clone())
    }
}

/// Domain rule as stored in configuration, before compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRule {
    /// Target domain (matches subdomains too), or an anchored pattern ending in `$`
    #[serde(default)]
    pub domain: String,
    /// Optional source domain constraint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// One of keep, prune, target, replace, remove
    #[serde(default)]
    pub action: String,
    /// Literal referer for `replace`
    #[serde(default)]
    pub referer: String,
}

impl RawRule {
    pub fn new(domain: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            origin: None,
            action: action.into(),
            referer: String::new(),
        }
    }

    /// Restrict the rule to requests coming from `origin`
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Set the literal referer used by `replace`
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = referer.into();
        self
    }
}

/// Complete engine configuration, in its import/export shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefererConfig {
    /// Policy when no domain rule matches otherwise
    #[serde(default = "RefererConfig::default_any")]
    pub any: RawPolicy,
    /// Policy when no domain rule matches and the source host equals the target host
    #[serde(default = "RefererConfig::default_same")]
    pub same: RawPolicy,
    /// Domain rules
    #[serde(default)]
    pub domains: Vec<RawRule>,
}

impl RefererConfig {
    fn default_same() -> RawPolicy {
        RawPolicy::new(Action::Keep.as_str(), "")
    }

    fn default_any() -> RawPolicy {
        RawPolicy::new(Action::Prune.as_str(), "")
    }

    pub fn new(domains: Vec<RawRule>, same: RawPolicy, any: RawPolicy) -> Self {
        Self { any, same, domains }
    }
}

impl Default for RefererConfig {
    fn default() -> Self {
        Self {
            any: Self::default_any(),
            same: Self::default_same(),
            domains: Vec::new(),
        }
    }
}
