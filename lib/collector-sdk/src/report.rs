use serde::{Deserialize, Serialize};

/// A single captured failure, ready to be shipped to the collector.
/// Built once at the point of capture and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorReport {
    /// Error category, e.g. "ValidationError" or "InternalError".
    pub category: String,
    /// Top-level error message.
    pub message: String,
    /// Messages of the wrapped causes, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
    /// Resolved operation name of the failing request, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    /// HTTP method of the failing request.
    pub method: String,
    /// Environment tag, e.g. "production".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Capture time, milliseconds since the unix epoch.
    pub timestamp: u64,
}

/// Wire format of a single POST to the collector.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportBatch {
    pub reports: Vec<ErrorReport>,
}
