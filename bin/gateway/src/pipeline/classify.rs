use faultline_config::reporting::ReportingConfig;

use crate::pipeline::context::RequestContext;

pub const DEFAULT_CATEGORY: &str = "InternalError";

/// A categorized business error. Handlers wrap their failures in this type
/// (directly or somewhere in their cause chain) so suppression rules can
/// match them by category.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Fault {
    category: String,
    message: String,
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Fault {
    pub fn new(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(
        category: impl Into<String>,
        message: impl Into<String>,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            category: category.into(),
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

struct SuppressionRule {
    category: String,
    operations: Option<Vec<String>>,
}

impl SuppressionRule {
    fn applies_to(&self, operation_name: Option<&str>) -> bool {
        match &self.operations {
            None => true,
            Some(operations) => {
                operation_name.is_some_and(|name| operations.iter().any(|op| op == name))
            }
        }
    }
}

/// Compiled suppression configuration. Built once at startup, read-only
/// during request processing.
pub struct SuppressionRules {
    rules: Vec<SuppressionRule>,
    ignored_operations: Vec<String>,
    reporting_enabled: bool,
}

impl SuppressionRules {
    pub fn from_config(config: &ReportingConfig) -> Self {
        Self {
            rules: config
                .suppress
                .iter()
                .map(|rule| SuppressionRule {
                    category: rule.category.clone(),
                    operations: rule.operations.clone(),
                })
                .collect(),
            ignored_operations: config.ignore_operations.clone(),
            reporting_enabled: config.enabled,
        }
    }
}

pub struct Classification {
    pub reportable: bool,
}

/// Decide whether a captured failure goes to the reporting sink. Never
/// fails; the composer still emits a response either way.
///
/// The whole cause chain is checked against the category rules, so a
/// categorized error stays suppressible after being wrapped with context.
pub fn classify(
    error: &anyhow::Error,
    ctx: &RequestContext,
    rules: &SuppressionRules,
) -> Classification {
    // Reporting disabled entirely: local-development mode, log only.
    if !rules.reporting_enabled {
        return Classification { reportable: false };
    }

    if let Some(operation_name) = ctx.operation_name() {
        if rules
            .ignored_operations
            .iter()
            .any(|ignored| ignored == operation_name)
        {
            return Classification { reportable: false };
        }
    }

    for link in error.chain() {
        if let Some(fault) = link.downcast_ref::<Fault>() {
            if rules
                .rules
                .iter()
                .any(|rule| rule.category == fault.category() && rule.applies_to(ctx.operation_name()))
            {
                return Classification { reportable: false };
            }
        }
    }

    Classification { reportable: true }
}

/// The category used when building a report: the first categorized link
/// in the chain, or the generic fallback.
pub fn error_category(error: &anyhow::Error) -> &str {
    error
        .chain()
        .find_map(|link| link.downcast_ref::<Fault>())
        .map(|fault| fault.category())
        .unwrap_or(DEFAULT_CATEGORY)
}
