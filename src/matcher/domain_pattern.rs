use regex::Regex;

use super::HostMatcher;
use crate::error::{RefererError, Result};

/// Marker that turns a domain string into a verbatim regular expression
const ANCHOR: char = '$';

/// Compiled hostname matcher.
///
/// A plain domain such as `example.com` matches the domain itself and every
/// subdomain (`www.example.com`), never a host that merely ends with the same
/// characters (`notexample.com`). A domain ending in `$` is an anchored
/// pattern: it is compiled as a regular expression exactly as written.
#[derive(Debug, Clone)]
pub enum DomainPattern {
    /// Domain plus subdomains, stored lowercased
    Suffix(String),
    /// Expert form, used verbatim
    Anchored(Regex),
}

impl DomainPattern {
    /// Compile a domain string from configuration
    pub fn compile(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(RefererError::ConfigError("empty domain".to_string()));
        }

        if spec.ends_with(ANCHOR) {
            let regex = Regex::new(spec).map_err(|e| {
                RefererError::ConfigError(format!("invalid domain pattern '{}': {}", spec, e))
            })?;
            return Ok(DomainPattern::Anchored(regex));
        }

        Ok(DomainPattern::Suffix(spec.to_lowercase()))
    }

    /// Whether this pattern was given in the anchored expert form
    pub fn is_anchored(&self) -> bool {
        matches!(self, DomainPattern::Anchored(_))
    }

    /// The configured domain or pattern text
    pub fn as_str(&self) -> &str {
        match self {
            DomainPattern::Suffix(domain) => domain,
            DomainPattern::Anchored(regex) => regex.as_str(),
        }
    }
}

impl HostMatcher for DomainPattern {
    /// Match a hostname, returning the length of the matched span.
    ///
    /// For suffix patterns the span includes the separating dot, so
    /// `example.com` matched against `www.example.com` yields 12 while an
    /// exact hit yields 11. Longer spans are more specific.
    fn match_len(&self, host: &str) -> Option<usize> {
        match self {
            DomainPattern::Suffix(domain) => {
                if host.len() == domain.len() {
                    return host.eq_ignore_ascii_case(domain).then_some(domain.len());
                }
                let split = host.len().checked_sub(domain.len() + 1)?;
                if !host.is_char_boundary(split) {
                    return None;
                }
                let (_, tail) = host.split_at(split);
                let matched = tail.starts_with('.') && tail[1..].eq_ignore_ascii_case(domain);
                matched.then_some(tail.len())
            }
            DomainPattern::Anchored(regex) => regex.find(host).map(|m| m.len()),
        }
    }
}
