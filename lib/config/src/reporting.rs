use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct ReportingConfig {
    /// Whether captured errors are forwarded to the collector.
    /// When disabled, errors are only written to the local log
    /// (the local-development mode).
    /// Default: false
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// The collector endpoint errors are reported to.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Access token sent with every report batch.
    /// Required when reporting is enabled.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Environment tag attached to every report (e.g. "production").
    #[serde(default)]
    pub environment: Option<String>,

    /// Error categories that are never reported. A rule may be narrowed
    /// to specific operations by name.
    #[serde(default)]
    pub suppress: Vec<SuppressionRuleConfig>,

    /// Operations (by resolved name) whose errors are never reported,
    /// regardless of category.
    /// Example: ["IntrospectionQuery", "MyBooks"]
    #[serde(default)]
    pub ignore_operations: Vec<String>,

    /// A maximum number of reports to hold in a buffer before sending to the collector.
    /// Default: 1000
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Accepts invalid SSL certificates
    /// Default: false
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,

    /// A timeout for only the connect phase of a request to the collector
    /// Default: 5 seconds
    #[serde(
        default = "default_connect_timeout",
        deserialize_with = "humantime_serde::deserialize",
        serialize_with = "humantime_serde::serialize"
    )]
    #[schemars(with = "String")]
    pub connect_timeout: Duration,

    /// A timeout for the entire request to the collector
    /// Default: 15 seconds
    #[serde(
        default = "default_request_timeout",
        deserialize_with = "humantime_serde::deserialize",
        serialize_with = "humantime_serde::serialize"
    )]
    #[schemars(with = "String")]
    pub request_timeout: Duration,

    /// Frequency of flushing the buffer to the collector
    /// Default: 5 seconds
    #[serde(
        default = "default_flush_interval",
        deserialize_with = "humantime_serde::deserialize",
        serialize_with = "humantime_serde::serialize"
    )]
    #[schemars(with = "String")]
    pub flush_interval: Duration,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct SuppressionRuleConfig {
    /// The error category this rule matches (e.g. "ValidationError").
    pub category: String,

    /// When set, the rule only applies to these operations.
    #[serde(default)]
    pub operations: Option<Vec<String>>,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            access_token: None,
            environment: None,
            suppress: Vec::new(),
            ignore_operations: Vec::new(),
            buffer_size: default_buffer_size(),
            accept_invalid_certs: default_accept_invalid_certs(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            flush_interval: default_flush_interval(),
        }
    }
}

fn default_enabled() -> bool {
    false
}

fn default_endpoint() -> String {
    "https://collector.invalid/errors".to_string()
}

fn default_buffer_size() -> usize {
    1000
}

fn default_accept_invalid_certs() -> bool {
    false
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_flush_interval() -> Duration {
    Duration::from_secs(5)
}
