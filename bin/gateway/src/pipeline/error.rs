use http::StatusCode;
use ntex::{
    http::{Response, ResponseBuilder},
    web::error::QueryPayloadError,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to parse GraphQL request payload")]
    FailedToParseBody(serde_json::Error),
    #[error("Failed to parse GraphQL variables JSON")]
    FailedToParseVariables(serde_json::Error),
    #[error("Failed to parse GraphQL extensions JSON")]
    FailedToParseExtensions(serde_json::Error),
    #[error("Failed to parse query parameters")]
    GetUnprocessableQueryParams(QueryPayloadError),
}

impl PipelineError {
    pub fn graphql_error_code(&self) -> &'static str {
        match self {
            Self::FailedToParseVariables(_) => "BAD_USER_INPUT",
            _ => "BAD_REQUEST",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct FailedExecutionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GraphQLError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<GraphQLErrorExtensions>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GraphQLErrorExtensions {
    pub code: String,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>, code: &str) -> Self {
        Self {
            message: message.into(),
            extensions: Some(GraphQLErrorExtensions {
                code: code.to_string(),
            }),
        }
    }
}

impl From<PipelineError> for Response {
    fn from(val: PipelineError) -> Self {
        let result = FailedExecutionResult {
            errors: Some(vec![GraphQLError::new(
                val.to_string(),
                val.graphql_error_code(),
            )]),
        };

        ResponseBuilder::new(val.status_code()).json(&result)
    }
}

/// The generic error body returned when a business handler fails. The
/// message of the originating error is surfaced; everything else about
/// the failure stays in the local log and the report.
pub fn failure_response(error: &anyhow::Error) -> Response {
    let result = FailedExecutionResult {
        errors: Some(vec![GraphQLError::new(
            error.to_string(),
            "INTERNAL_SERVER_ERROR",
        )]),
    };

    ResponseBuilder::new(StatusCode::INTERNAL_SERVER_ERROR).json(&result)
}
