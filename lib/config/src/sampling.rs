use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct SamplingConfig {
    /// Strategy used to decide whether a request's trace is retained.
    ///
    /// `ratio` keeps the fraction of traces configured by the `ratio` field.
    #[serde(default)]
    pub mode: SamplingMode,

    /// Fraction of traces to retain when `mode` is `ratio`.
    /// 0.0 = keep none, 1.0 = keep all.
    /// Default: 1.0
    #[serde(default = "default_ratio")]
    pub ratio: f64,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    AlwaysOn,
    AlwaysOff,
    Ratio,
}

impl Default for SamplingMode {
    fn default() -> Self {
        SamplingMode::AlwaysOn
    }
}

fn default_ratio() -> f64 {
    1.0
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            mode: SamplingMode::default(),
            ratio: default_ratio(),
        }
    }
}
