mod domain_pattern;

pub use domain_pattern::DomainPattern;

/// Trait for host matchers
pub trait HostMatcher: Send + Sync {
    /// Match a hostname, returning the length of the matched span.
    /// Longer spans are more specific.
    fn match_len(&self, host: &str) -> Option<usize>;

    /// Check if the host matches this matcher
    fn matches(&self, host: &str) -> bool {
        self.match_len(host).is_some()
    }
}
