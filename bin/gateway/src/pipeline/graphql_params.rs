use http::Method;
use ntex::util::Bytes;
use ntex::web::types::Query;
use ntex::web::HttpRequest;

use crate::pipeline::error::PipelineError;

/// The GraphQL request envelope, as far as the gateway cares about it.
/// The query itself is opaque here; only the operation name feeds the
/// span rename and the sampling/suppression decisions.
#[derive(serde::Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphQLParams {
    pub query: Option<String>,
    pub operation_name: Option<String>,
    pub variables: Option<serde_json::Value>,
    pub extensions: Option<serde_json::Value>,
}

#[derive(serde::Deserialize, Debug)]
struct GetQueryParams {
    pub query: Option<String>,
    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,
    pub variables: Option<String>,
    pub extensions: Option<String>,
}

impl TryInto<GraphQLParams> for GetQueryParams {
    type Error = PipelineError;

    fn try_into(self) -> Result<GraphQLParams, Self::Error> {
        let variables = match self.variables.as_deref() {
            Some(v_str) if !v_str.is_empty() => Some(
                serde_json::from_str(v_str).map_err(PipelineError::FailedToParseVariables)?,
            ),
            _ => None,
        };

        let extensions = match self.extensions.as_deref() {
            Some(e_str) if !e_str.is_empty() => Some(
                serde_json::from_str(e_str).map_err(PipelineError::FailedToParseExtensions)?,
            ),
            _ => None,
        };

        Ok(GraphQLParams {
            query: self.query,
            operation_name: self.operation_name,
            variables,
            extensions,
        })
    }
}

pub fn extract_graphql_params(
    req: &HttpRequest,
    body: &Bytes,
) -> Result<GraphQLParams, PipelineError> {
    if req.method() == Method::GET {
        let params = Query::<GetQueryParams>::from_query(req.query_string())
            .map_err(PipelineError::GetUnprocessableQueryParams)?
            .into_inner();
        return params.try_into();
    }

    if body.is_empty() {
        return Ok(GraphQLParams::default());
    }

    serde_json::from_slice(body).map_err(PipelineError::FailedToParseBody)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ntex::web::test::TestRequest;

    #[test]
    fn parses_operation_name_from_post_body() {
        let req = TestRequest::with_uri("/graphql")
            .method(Method::POST)
            .to_http_request();
        let body = Bytes::from_static(br#"{"query":"query MyBooks { books { title } }","operationName":"MyBooks"}"#);
        let params = extract_graphql_params(&req, &body).unwrap();
        assert_eq!(params.operation_name.as_deref(), Some("MyBooks"));
        assert!(params.query.is_some());
    }

    #[test]
    fn empty_body_resolves_to_no_operation_name() {
        let req = TestRequest::with_uri("/graphql")
            .method(Method::POST)
            .to_http_request();
        let params = extract_graphql_params(&req, &Bytes::new()).unwrap();
        assert_eq!(params.operation_name, None);
    }

    #[test]
    fn malformed_body_is_rejected() {
        let req = TestRequest::with_uri("/graphql")
            .method(Method::POST)
            .to_http_request();
        let body = Bytes::from_static(b"{not-json");
        assert!(matches!(
            extract_graphql_params(&req, &body),
            Err(PipelineError::FailedToParseBody(_))
        ));
    }

    #[test]
    fn parses_operation_name_from_get_query_string() {
        let req = TestRequest::with_uri(
            "/graphql?query=query%20MyBooks%20%7B%20books%20%7D&operationName=MyBooks",
        )
        .method(Method::GET)
        .to_http_request();
        let params = extract_graphql_params(&req, &Bytes::new()).unwrap();
        assert_eq!(params.operation_name.as_deref(), Some("MyBooks"));
    }
}
