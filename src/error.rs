use thiserror::Error;

/// Referer engine error types
#[derive(Error, Debug)]
pub enum RefererError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl RefererError {
    pub(crate) fn invalid_url(url: &str, source: url::ParseError) -> Self {
        RefererError::InvalidUrl {
            url: url.to_string(),
            source,
        }
    }

    /// Prefix a configuration error message, leaving other kinds untouched
    pub(crate) fn context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            RefererError::ConfigError(msg) => RefererError::ConfigError(format!("{}: {}", ctx, msg)),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, RefererError>;
