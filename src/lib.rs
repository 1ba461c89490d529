//! Referer Mod - A rule-based Referer rewriting engine for Rust
//!
//! This library decides what to expose in place of the true referring URL,
//! both for the `Referer` request header and for `document.referrer`:
//! - Per-destination domain rules (domain plus all subdomains)
//! - Optional per-source constraints on each rule
//! - Specificity-based rule precedence (longest target match, then longest source match)
//! - Separate fallbacks for same-host and cross-host navigation
//! - Atomic reconfiguration while lookups keep running
//!
//! # Example
//!
//! ```rust
//! use referer_mod::{parse_config, RefererModEngine};
//!
//! let config = parse_config(r#"{
//!     "any": { "action": "prune", "referer": "" },
//!     "same": { "action": "keep", "referer": "" },
//!     "domains": [
//!         { "domain": "example.com", "action": "remove", "referer": "" },
//!         { "domain": "img.example.com", "origin": "news.test", "action": "keep", "referer": "" }
//!     ]
//! }"#).unwrap();
//!
//! let engine = RefererModEngine::new(&config).unwrap();
//!
//! let referrer = engine
//!     .compute_referrer("https://www.example.com/", Some("https://news.test/story?id=1"))
//!     .unwrap();
//! assert_eq!(referrer, "");
//!
//! let referrer = engine
//!     .compute_referrer("https://img.example.com/a.png", Some("https://news.test/story?id=1"))
//!     .unwrap();
//! assert_eq!(referrer, "https://news.test/story?id=1");
//! ```
//!
//! # Actions
//!
//! | Action | Referrer sent |
//! |--------|---------------|
//! | `keep` | The original referrer, unchanged |
//! | `prune` | Origin of the original referrer, e.g. `https://news.test/` |
//! | `target` | Origin of the destination |
//! | `replace` | The rule's configured `referer` string |
//! | `remove` | Nothing |
//!
//! # Domain Patterns
//!
//! | Pattern | Matches |
//! |---------|---------|
//! | `example.com` | `example.com`, `www.example.com`, not `notexample.com` |
//! | `^(www\|cdn)\.example\.com$` | Regular expression, used as written because it ends in `$` |

pub mod compile;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod parser;
pub mod rewrite;
pub mod rule;
pub mod types;

// Re-export commonly used items
pub use compile::{compile, CompiledConfig};
pub use engine::RefererModEngine;
pub use error::{RefererError, Result};
pub use matcher::{DomainPattern, HostMatcher};
pub use parser::{export_config, parse_config, parse_config_from_file};
pub use rewrite::{
    document_referrer, rewrite_referer_header, Header, HeaderRewrite, ReferrerQuery,
    ReferrerResponse,
};
pub use rule::{Rule, RuleMatch};
pub use types::{Action, Policy, RawPolicy, RawRule, RefererConfig};
