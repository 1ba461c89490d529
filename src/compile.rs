use url::Url;

use crate::error::{RefererError, Result};
use crate::rule::{best_match, Rule};
use crate::types::{Action, Policy, RefererConfig};

/// Schemes that address network resources. Targets with any other scheme
/// (internal pages, inline documents) get their referrer passed through.
const NETWORK_SCHEMES: &[&str] = &["http", "https", "ws", "wss", "ftp"];

/// Whether a URL addresses a network resource
pub fn is_network_url(url: &Url) -> bool {
    NETWORK_SCHEMES.contains(&url.scheme())
}

/// Parse a URL, mapping failures to `InvalidUrl`
pub fn parse_url(s: &str) -> Result<Url> {
    Url::parse(s).map_err(|e| RefererError::invalid_url(s, e))
}

/// Parse an optional source URL. An empty string counts as absent.
fn parse_source(s: Option<&str>) -> Result<Option<Url>> {
    match s {
        Some(s) if !s.is_empty() => parse_url(s).map(Some),
        _ => Ok(None),
    }
}

/// Origin serialization with trailing slash, as sent for `prune` and `target`
fn origin_referrer(url: &Url) -> String {
    format!("{}/", url.origin().ascii_serialization())
}

/// One immutable generation of compiled configuration.
///
/// Lookups only read the rules and defaults, so a generation can be shared
/// between threads without locking.
#[derive(Debug)]
pub struct CompiledConfig {
    rules: Vec<Rule>,
    same: Policy,
    any: Policy,
}

impl CompiledConfig {
    /// Create a new compiled configuration
    pub fn new(rules: Vec<Rule>, same: Policy, any: Policy) -> Self {
        Self { rules, same, any }
    }

    /// Resolve the policy for a request to `target` coming from `source`
    pub fn resolve_policy(&self, target: &Url, source: Option<&Url>) -> Policy {
        let target_host = target.host_str().unwrap_or("");
        let source_host = source.map(|s| s.host_str().unwrap_or(""));
        self.resolve_hosts(target_host, source_host)
    }

    /// Resolve the policy from host names. `source_host` is `None` when the
    /// request has no source at all.
    pub fn resolve_hosts(&self, target_host: &str, source_host: Option<&str>) -> Policy {
        let matches = self
            .rules
            .iter()
            .filter_map(|rule| rule.match_hosts(source_host, target_host));
        if let Some(best) = best_match(matches) {
            return best.rule.policy();
        }

        match source_host {
            Some(source_host) if source_host == target_host => self.same.clone(),
            _ => self.any.clone(),
        }
    }

    /// Compute the referrer to expose for a navigation from `source` to `target`.
    ///
    /// An absent source is passed through as the empty string.
    pub fn compute_referrer(&self, target: &str, source: Option<&str>) -> Result<String> {
        let target_url = parse_url(target)?;
        if !is_network_url(&target_url) {
            return Ok(source.unwrap_or_default().to_string());
        }

        let source_url = parse_source(source)?;
        let policy = self.resolve_policy(&target_url, source_url.as_ref());
        Ok(apply_policy(&policy, &target_url, source, source_url.as_ref()))
    }

    /// Get the number of rules
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Policy used when no rule matches and source and target hosts are equal
    pub fn same_domain_default(&self) -> &Policy {
        &self.same
    }

    /// Policy used when no rule matches otherwise
    pub fn any_domain_default(&self) -> &Policy {
        &self.any
    }
}

/// Turn a resolved policy into the referrer string
pub(crate) fn apply_policy(
    policy: &Policy,
    target: &Url,
    source: Option<&str>,
    source_url: Option<&Url>,
) -> String {
    match policy.action {
        Action::Prune => source_url.map(origin_referrer).unwrap_or_default(),
        Action::Target => origin_referrer(target),
        Action::Replace => policy.referer.clone(),
        Action::Remove => String::new(),
        Action::Keep => source.unwrap_or_default().to_string(),
    }
}

/// Compile a configuration into a new generation.
///
/// Every rule is compiled before anything is returned, so one invalid rule
/// fails the whole configuration.
pub fn compile(config: &RefererConfig) -> Result<CompiledConfig> {
    let mut rules = Vec::with_capacity(config.domains.len());

    for (index, raw) in config.domains.iter().enumerate() {
        let rule = Rule::new(raw).map_err(|e| e.context(format_args!("rule {}", index + 1)))?;
        log::debug!(
            "rule {}: {} pattern '{}' -> {}",
            index + 1,
            if rule.target.is_anchored() { "anchored" } else { "suffix" },
            rule.target.as_str(),
            rule.action
        );
        rules.push(rule);
    }

    let same = config
        .same
        .compile()
        .map_err(|e| e.context("same-domain default"))?;
    let any = config.any.compile().map_err(|e| e.context("default"))?;

    log::debug!(
        "compiled {} referer rules (same: {}, any: {})",
        rules.len(),
        same.action,
        any.action
    );

    Ok(CompiledConfig::new(rules, same, any))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawPolicy, RawRule};

    fn config(domains: Vec<RawRule>) -> RefererConfig {
        RefererConfig {
            domains,
            ..RefererConfig::default()
        }
    }

    #[test]
    fn test_compile_simple_rules() {
        let compiled = compile(
            &config(vec![
                RawRule::new("example.com", "keep"),
                RawRule::new("www.example.com", "remove"),
                RawRule::new("ads.test", "replace").with_referer("https://fixed.example/"),
            ]),
        )
        .unwrap();
        assert_eq!(compiled.rule_count(), 3);
        assert_eq!(compiled.same_domain_default(), &Policy::new(Action::Keep, ""));
        assert_eq!(compiled.any_domain_default(), &Policy::new(Action::Prune, ""));
    }

    #[test]
    fn test_compile_rejects_invalid_rule() {
        let err = compile(
            &config(vec![
                RawRule::new("example.com", "keep"),
                RawRule::new("bad.test", "mangle"),
            ]),
        )
        .err()
        .unwrap();
        match err {
            RefererError::ConfigError(msg) => assert!(msg.starts_with("rule 2:"), "got: {}", msg),
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_compile_rejects_invalid_default() {
        let mut cfg = RefererConfig::default();
        cfg.any = RawPolicy::new("bogus", "");
        assert!(matches!(compile(&cfg), Err(RefererError::ConfigError(_))));
    }

    #[test]
    fn test_specific_target_wins() {
        let compiled = compile(
            &config(vec![
                RawRule::new("www.example.com", "remove"),
                RawRule::new("example.com", "keep"),
            ]),
        )
        .unwrap();
        let policy = compiled.resolve_hosts("www.example.com", Some("other.test"));
        assert_eq!(policy.action, Action::Remove);
        let policy = compiled.resolve_hosts("img.example.com", Some("other.test"));
        assert_eq!(policy.action, Action::Keep);
    }

    #[test]
    fn test_fallback_defaults() {
        let mut cfg = RefererConfig::default();
        cfg.same = RawPolicy::new("keep", "");
        cfg.any = RawPolicy::new("remove", "");
        let compiled = compile(&cfg).unwrap();

        assert_eq!(
            compiled.resolve_hosts("a.example.com", Some("a.example.com")).action,
            Action::Keep
        );
        assert_eq!(
            compiled.resolve_hosts("a.example.com", Some("b.example.com")).action,
            Action::Remove
        );
        assert_eq!(compiled.resolve_hosts("a.example.com", None).action, Action::Remove);
    }

    #[test]
    fn test_compute_prune() {
        let compiled = compile(&RefererConfig::default()).unwrap();
        let referrer = compiled
            .compute_referrer("https://x.test/page", Some("https://y.test/ref?x=1"))
            .unwrap();
        assert_eq!(referrer, "https://y.test/");

        // Nothing to prune
        assert_eq!(compiled.compute_referrer("https://x.test/page", None).unwrap(), "");
        assert_eq!(
            compiled.compute_referrer("https://x.test/page", Some("")).unwrap(),
            ""
        );
    }

    #[test]
    fn test_compute_prune_keeps_port() {
        let compiled = compile(&RefererConfig::default()).unwrap();
        let referrer = compiled
            .compute_referrer("https://x.test/", Some("http://y.test:8080/a/b"))
            .unwrap();
        assert_eq!(referrer, "http://y.test:8080/");
    }

    #[test]
    fn test_non_network_target_passes_through() {
        let compiled = compile(&config(vec![RawRule::new("y.test", "remove")])).unwrap();
        let source = "https://y.test/ref?x=1";
        assert_eq!(
            compiled.compute_referrer("about:blank", Some(source)).unwrap(),
            source
        );
        assert_eq!(
            compiled
                .compute_referrer("data:text/html,<p>hi</p>", Some(source))
                .unwrap(),
            source
        );
        assert_eq!(compiled.compute_referrer("about:blank", None).unwrap(), "");
    }

    #[test]
    fn test_invalid_urls() {
        let compiled = compile(&RefererConfig::default()).unwrap();
        assert!(matches!(
            compiled.compute_referrer("not a url", None),
            Err(RefererError::InvalidUrl { .. })
        ));
        assert!(matches!(
            compiled.compute_referrer("https://x.test/", Some("/relative/path")),
            Err(RefererError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_lookups_leave_generation_untouched() {
        let compiled = compile(&config(vec![
            RawRule::new("example.com", "remove"),
            RawRule::new("cdn.test", "keep").with_origin("shop.test"),
        ]))
        .unwrap();
        let before = format!("{:?}", compiled);

        for i in 0..50 {
            let target = format!("h{}.example.com", i);
            assert_eq!(compiled.resolve_hosts(&target, None).action, Action::Remove);
            compiled.resolve_hosts("cdn.test", Some("www.shop.test"));
            compiled.resolve_hosts("other.test", Some("other.test"));
        }

        assert_eq!(format!("{:?}", compiled), before);
    }

    #[test]
    fn test_source_presence_changes_fallback() {
        let compiled = compile(&config(vec![RawRule::new("example.com", "remove")])).unwrap();
        assert_eq!(
            compiled.resolve_hosts("other.test", Some("other.test")).action,
            Action::Keep
        );
        assert_eq!(compiled.resolve_hosts("other.test", None).action, Action::Prune);
    }
}
