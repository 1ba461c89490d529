//! Call-site adapters.
//!
//! Request interception and the page-level `document.referrer` override both
//! call into the engine through these functions. Neither may fail a request:
//! when a URL cannot be parsed the original referrer is left as observed.

use serde::{Deserialize, Serialize};

use crate::compile::{apply_policy, is_network_url, parse_url};
use crate::engine::RefererModEngine;
use crate::error::Result;
use crate::types::Action;

/// Canonical spelling of the header
pub const REFERER_HEADER: &str = "Referer";

/// HTTP request header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    fn is_referer(&self) -> bool {
        self.name.eq_ignore_ascii_case(REFERER_HEADER)
    }
}

/// What happened to the request's `Referer` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderRewrite {
    /// Headers left as they were
    Unchanged,
    /// Existing header dropped
    Removed,
    /// Existing header given a new value
    Replaced(String),
    /// Header added to a request that had none
    Added(String),
}

impl HeaderRewrite {
    pub fn is_changed(&self) -> bool {
        !matches!(self, HeaderRewrite::Unchanged)
    }
}

/// Apply the engine's decision to a request's headers.
///
/// `url` is the request destination and `origin_url` the page that issued
/// it. `prune` is computed from `origin_url`, never from the current header
/// value. When the request carries no `Referer`, only `target` and `replace`
/// add one. An empty computed value drops the header instead of sending it
/// empty.
pub fn rewrite_referer_header(
    engine: &RefererModEngine,
    url: &str,
    origin_url: Option<&str>,
    headers: &mut Vec<Header>,
) -> HeaderRewrite {
    match try_rewrite(engine, url, origin_url, headers) {
        Ok(rewrite) => rewrite,
        Err(e) => {
            tracing::warn!(
                target_url = url,
                origin_url = origin_url.unwrap_or_default(),
                error = %e,
                "cannot determine referer policy, leaving headers untouched"
            );
            HeaderRewrite::Unchanged
        }
    }
}

fn try_rewrite(
    engine: &RefererModEngine,
    url: &str,
    origin_url: Option<&str>,
    headers: &mut Vec<Header>,
) -> Result<HeaderRewrite> {
    let target = parse_url(url)?;
    if !is_network_url(&target) {
        return Ok(HeaderRewrite::Unchanged);
    }
    let origin_url = origin_url.filter(|s| !s.is_empty());
    let source = origin_url.map(parse_url).transpose()?;

    let policy = engine.snapshot().resolve_policy(&target, source.as_ref());
    let position = headers.iter().position(Header::is_referer);

    let rewrite = match (position, policy.action) {
        (_, Action::Keep) => HeaderRewrite::Unchanged,
        (Some(index), Action::Remove) => {
            headers.remove(index);
            HeaderRewrite::Removed
        }
        (None, Action::Remove) => HeaderRewrite::Unchanged,
        (Some(index), _) => {
            let value = apply_policy(&policy, &target, origin_url, source.as_ref());
            if value.is_empty() {
                headers.remove(index);
                HeaderRewrite::Removed
            } else {
                headers[index].value = value.clone();
                HeaderRewrite::Replaced(value)
            }
        }
        (None, action) if action.synthesizes() => {
            let value = apply_policy(&policy, &target, origin_url, source.as_ref());
            if value.is_empty() {
                HeaderRewrite::Unchanged
            } else {
                headers.push(Header::new(REFERER_HEADER, value.clone()));
                HeaderRewrite::Added(value)
            }
        }
        (None, _) => HeaderRewrite::Unchanged,
    };

    log::debug!(
        "referer for {}: {} -> {:?}",
        target.host_str().unwrap_or_default(),
        policy.action,
        rewrite
    );
    Ok(rewrite)
}

/// Value to report as `document.referrer` for a page at `url` whose true
/// referrer is `true_referrer` (empty when there is none).
pub fn document_referrer(engine: &RefererModEngine, url: &str, true_referrer: &str) -> String {
    let source = Some(true_referrer).filter(|s| !s.is_empty());
    match engine.compute_referrer(url, source) {
        Ok(referrer) => referrer,
        Err(e) => {
            tracing::warn!(
                target_url = url,
                error = %e,
                "cannot determine document.referrer override, reporting original"
            );
            true_referrer.to_string()
        }
    }
}

/// Message a page sends to ask for its referrer override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferrerQuery {
    /// The page's own URL
    pub target: String,
    /// The page's true referrer, empty if none
    #[serde(default)]
    pub referrer: String,
}

/// Reply to a [`ReferrerQuery`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferrerResponse {
    pub referrer: String,
}

impl ReferrerQuery {
    pub fn new(target: impl Into<String>, referrer: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            referrer: referrer.into(),
        }
    }

    pub fn answer(&self, engine: &RefererModEngine) -> ReferrerResponse {
        ReferrerResponse {
            referrer: document_referrer(engine, &self.target, &self.referrer),
        }
    }
}
