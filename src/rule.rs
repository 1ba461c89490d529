use url::Url;

use crate::error::{RefererError, Result};
use crate::matcher::{DomainPattern, HostMatcher};
use crate::types::{Action, Policy, RawRule};

/// Origin match length for rules without a source constraint
pub const NO_ORIGIN_CONSTRAINT: isize = -1;

/// A compiled domain rule
#[derive(Debug, Clone)]
pub struct Rule {
    /// Target host matcher
    pub target: DomainPattern,
    /// Source host matcher, if the rule is restricted to a source domain
    pub source: Option<DomainPattern>,
    /// Action to apply
    pub action: Action,
    /// Literal referer, only meaningful for `replace`
    pub referer: Option<String>,
}

impl Rule {
    /// Compile a rule from raw configuration data
    pub fn new(raw: &RawRule) -> Result<Self> {
        if raw.domain.trim().is_empty() {
            return Err(RefererError::ConfigError(
                "rule has an empty domain".to_string(),
            ));
        }

        let target = DomainPattern::compile(&raw.domain)?;
        let source = match raw.origin.as_deref().map(str::trim) {
            Some(origin) if !origin.is_empty() => Some(DomainPattern::compile(origin)?),
            _ => None,
        };
        let action: Action = raw
            .action
            .parse()
            .map_err(|e: RefererError| e.context(format_args!("domain '{}'", raw.domain.trim())))?;
        let referer = (action == Action::Replace).then(|| raw.referer.clone());

        Ok(Self {
            target,
            source,
            action,
            referer,
        })
    }

    /// Match against a (source, target) pair
    pub fn matches(&self, source: Option<&Url>, target: &Url) -> Option<RuleMatch<'_>> {
        self.match_hosts(source.and_then(Url::host_str), target.host_str().unwrap_or(""))
    }

    /// Match against already-extracted host names. A missing source host
    /// is matched as the empty string.
    pub fn match_hosts(&self, source_host: Option<&str>, target_host: &str) -> Option<RuleMatch<'_>> {
        let target_len = self.target.match_len(target_host)?;

        let origin_len = match &self.source {
            Some(pattern) => pattern.match_len(source_host.unwrap_or(""))? as isize,
            None => NO_ORIGIN_CONSTRAINT,
        };

        Some(RuleMatch {
            rule: self,
            target_len,
            origin_len,
        })
    }

    /// The policy this rule applies
    pub fn policy(&self) -> Policy {
        Policy::new(self.action, self.referer.clone().unwrap_or_default())
    }
}

/// A successful rule match with its specificity scores
#[derive(Debug, Clone, Copy)]
pub struct RuleMatch<'a> {
    pub rule: &'a Rule,
    /// Length of the matched target host span
    pub target_len: usize,
    /// Length of the matched source host span, or `NO_ORIGIN_CONSTRAINT`
    pub origin_len: isize,
}

impl RuleMatch<'_> {
    /// Strict ordering used to pick the single best match.
    ///
    /// A longer target match wins; on equal targets a longer origin match
    /// wins, and any matching origin constraint beats none. Full ties keep
    /// the incumbent.
    pub fn is_better_than(&self, incumbent: Option<&RuleMatch<'_>>) -> bool {
        match incumbent {
            None => true,
            Some(other) => {
                self.target_len > other.target_len
                    || (self.target_len == other.target_len && self.origin_len > other.origin_len)
            }
        }
    }
}

/// Fold matches into the best one, keeping the earliest on full ties
pub fn best_match<'a, I>(matches: I) -> Option<RuleMatch<'a>>
where
    I: IntoIterator<Item = RuleMatch<'a>>,
{
    matches.into_iter().fold(None, |best, candidate| {
        if candidate.is_better_than(best.as_ref()) {
            Some(candidate)
        } else {
            best
        }
    })
}
