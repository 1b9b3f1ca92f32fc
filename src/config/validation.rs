//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, word length bounded)
//! - Check addresses and the origin URL are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::ProxyConfig;

/// Upper bound for `transform.word_length`.
pub const MAX_WORD_LENGTH: usize = 64;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// Human readable reason.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "listener.request_timeout_secs",
            "must be greater than zero",
        ));
    }

    validate_origin(&config.upstream.origin, &mut errors);
    if config.upstream.timeout_ms == 0 {
        errors.push(ValidationError::new(
            "upstream.timeout_ms",
            "must be greater than zero",
        ));
    }
    // The upstream deadline must fire first so slow origins map to a
    // FetchTimeout rather than the outer request deadline.
    let request_timeout_ms = config.listener.request_timeout_secs.saturating_mul(1000);
    if config.upstream.timeout_ms > 0 && request_timeout_ms <= config.upstream.timeout_ms {
        errors.push(ValidationError::new(
            "listener.request_timeout_secs",
            format!(
                "must exceed upstream.timeout_ms ({} ms), got {} ms",
                config.upstream.timeout_ms, request_timeout_ms
            ),
        ));
    }

    let word_length = config.transform.word_length;
    if word_length == 0 || word_length > MAX_WORD_LENGTH {
        errors.push(ValidationError::new(
            "transform.word_length",
            format!("must be between 1 and {}, got {}", MAX_WORD_LENGTH, word_length),
        ));
    }
    if config.transform.mark.is_empty() {
        errors.push(ValidationError::new("transform.mark", "must not be empty"));
    }
    if config.transform.max_nesting_depth == 0 {
        errors.push(ValidationError::new(
            "transform.max_nesting_depth",
            "must be greater than zero",
        ));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// The origin doubles as a literal href prefix, so it is checked as written
// rather than normalized.
fn validate_origin(origin: &str, errors: &mut Vec<ValidationError>) {
    match Url::parse(origin) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            if origin.ends_with('/') {
                errors.push(ValidationError::new(
                    "upstream.origin",
                    "must not end with '/'",
                ));
            }
        }
        Ok(url) => errors.push(ValidationError::new(
            "upstream.origin",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "upstream.origin",
            format!("'{}' is not a valid URL: {}", origin, e),
        )),
    }
}
