//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, request deadline).
    pub listener: ListenerConfig,

    /// The single upstream origin and how to reach it.
    pub upstream: UpstreamConfig,

    /// HTML rewriting rules.
    pub transform: TransformConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Total time allowed for one inbound request, fetch and transform included.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Absolute base URL of the origin, without a trailing slash.
    ///
    /// Also used verbatim as the prefix stripped from anchor hrefs.
    pub origin: String,

    /// Hard bound on one upstream read (connect, headers and body) in milliseconds.
    pub timeout_ms: u64,

    /// `User-Agent` sent to the origin.
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: "https://habrahabr.ru".to_string(),
            timeout_ms: 10_000,
            user_agent: concat!("trademark-proxy/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Tags whose direct text children are never marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IgnoredTag {
    Pre,
    Code,
    Script,
    Style,
    Head,
    Title,
    Meta,
}

impl IgnoredTag {
    /// Every variant, in declaration order.
    pub const ALL: [IgnoredTag; 7] = [
        IgnoredTag::Pre,
        IgnoredTag::Code,
        IgnoredTag::Script,
        IgnoredTag::Style,
        IgnoredTag::Head,
        IgnoredTag::Title,
        IgnoredTag::Meta,
    ];

    /// Map a lowercase HTML tag name onto the enumeration.
    pub fn from_tag_name(name: &str) -> Option<Self> {
        match name {
            "pre" => Some(IgnoredTag::Pre),
            "code" => Some(IgnoredTag::Code),
            "script" => Some(IgnoredTag::Script),
            "style" => Some(IgnoredTag::Style),
            "head" => Some(IgnoredTag::Head),
            "title" => Some(IgnoredTag::Title),
            "meta" => Some(IgnoredTag::Meta),
            _ => None,
        }
    }
}

/// HTML rewriting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Exact length of the word runs that get marked.
    pub word_length: usize,

    /// Glyph appended after every marked word.
    pub mark: String,

    /// Parent tags that exclude a text node from marking.
    pub ignore_tags: Vec<IgnoredTag>,

    /// Element nesting deeper than this fails the document.
    pub max_nesting_depth: usize,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            word_length: 6,
            mark: "\u{2122}".to_string(),
            ignore_tags: IgnoredTag::ALL.to_vec(),
            max_nesting_depth: 1000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
