use std::sync::Arc;

use faultline_config::GatewayConfig;

use crate::handler::GatewayHandler;
use crate::pipeline::classify::SuppressionRules;
use crate::pipeline::sampling::Sampler;
use crate::reporting::ReportingRuntime;

/// Immutable per-process state shared by all requests. The sampler and
/// the suppression rules are compiled once here; request processing only
/// ever reads them.
pub struct GatewaySharedState {
    pub config: Arc<GatewayConfig>,
    pub sampler: Sampler,
    pub suppression_rules: SuppressionRules,
    pub reporting: ReportingRuntime,
    pub handler: Arc<dyn GatewayHandler>,
}

impl GatewaySharedState {
    pub fn new(config: Arc<GatewayConfig>, handler: Arc<dyn GatewayHandler>) -> Self {
        Self {
            sampler: Sampler::from_config(&config.sampling),
            suppression_rules: SuppressionRules::from_config(&config.reporting),
            reporting: ReportingRuntime::disabled(),
            config,
            handler,
        }
    }
}
