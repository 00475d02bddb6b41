use faultline_config::sampling::{SamplingConfig, SamplingMode};
use http::Method;
use rand::RngExt;

/// Request metadata the sampler is allowed to see. The operation name is
/// the resolved one; the composer only evaluates the sampler after body
/// parsing, so the name here is never the stale transport-level label.
pub struct SamplingDetails<'a> {
    pub method: &'a Method,
    pub operation_name: Option<&'a str>,
}

pub enum Sampler {
    AlwaysOn,
    AlwaysOff,
    Ratio(f64),
}

impl Sampler {
    pub fn from_config(config: &SamplingConfig) -> Self {
        match config.mode {
            SamplingMode::AlwaysOn => Sampler::AlwaysOn,
            SamplingMode::AlwaysOff => Sampler::AlwaysOff,
            SamplingMode::Ratio => Sampler::Ratio(config.ratio.clamp(0.0, 1.0)),
        }
    }

    pub fn should_sample(&self, details: &SamplingDetails) -> bool {
        // Pre-flight probes carry no business work worth tracing.
        if details.method == Method::OPTIONS {
            return false;
        }

        match self {
            Sampler::AlwaysOn => true,
            Sampler::AlwaysOff => false,
            Sampler::Ratio(ratio) if *ratio >= 1.0 => true,
            Sampler::Ratio(ratio) if *ratio <= 0.0 => false,
            Sampler::Ratio(ratio) => rand::rng().random_bool(*ratio),
        }
    }
}
