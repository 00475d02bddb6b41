use std::sync::Arc;

use ntex::{
    util::Bytes,
    web::{self, HttpRequest},
};
use tracing::{error, Instrument};

use crate::{
    pipeline::{
        classify::classify,
        context::RequestContext,
        graphql_params::extract_graphql_params,
        sampling::SamplingDetails,
        trace_span::RequestSpanBuilder,
    },
    reporting::build_report,
    shared_state::GatewaySharedState,
};

pub mod classify;
pub mod context;
pub mod error;
pub mod graphql_params;
pub mod preflight;
pub mod sampling;
pub mod trace_span;

/// Wraps the configured business handler with tracing, sampling, error
/// classification and reporting. Every path through here emits exactly
/// one response.
pub async fn gateway_request_handler(
    req: &HttpRequest,
    body_bytes: Bytes,
    shared_state: &Arc<GatewaySharedState>,
) -> web::HttpResponse {
    // Pre-flight probes are answered before any tracing or business logic.
    if let Some(early_response) = preflight::get_early_response(req) {
        return early_response;
    }

    let span = RequestSpanBuilder::from_request(req, &body_bytes).build();
    let mut ctx = RequestContext::new(req.method().clone(), span);

    let params = match extract_graphql_params(req, &body_bytes) {
        Ok(params) => params,
        Err(e) => {
            let response: web::HttpResponse = e.into();
            ctx.span().record_response(&response);
            return response;
        }
    };

    // The true operation name resolves only after body parsing, later than
    // the span was opened: rename first, then sample, so the sampler never
    // sees the stale transport-level label.
    ctx.resolve_operation_name(params.operation_name.as_deref());
    let sampled = ctx.sampling_decision(|| {
        shared_state.sampler.should_sample(&SamplingDetails {
            method: ctx.method(),
            operation_name: ctx.operation_name(),
        })
    });
    ctx.span().record_sampling_decision(sampled);

    let result = shared_state
        .handler
        .handle(req, body_bytes, &ctx)
        .instrument(ctx.span().span.clone())
        .await;

    match result {
        Ok(response) => {
            ctx.span().record_response(&response);
            response
        }
        Err(err) => failed_response(err, &ctx, shared_state).await,
    }
}

/// The business handler failed: classify exactly once, report at most
/// once, and still produce a response.
async fn failed_response(
    err: anyhow::Error,
    ctx: &RequestContext,
    shared_state: &Arc<GatewaySharedState>,
) -> web::HttpResponse {
    let classification = classify(&err, ctx, &shared_state.suppression_rules);

    if classification.reportable {
        match shared_state.reporting.active() {
            Some(sink) => {
                let report = build_report(
                    &err,
                    ctx,
                    shared_state.config.reporting.environment.clone(),
                );
                // the sink swallows its own failures
                sink.report(report).await;
            }
            None => {
                error!("handler failed (no reporting sink installed): {:?}", err);
            }
        }
    } else {
        error!(
            operation = ctx.operation_name().unwrap_or("anonymous"),
            "handler failed (suppressed): {:?}", err
        );
    }

    ctx.span().record_internal_server_error();

    // A handler that already put headers on the wire must not get a second
    // response body written over its stream; terminate cleanly instead.
    if ctx.headers_sent() {
        return web::HttpResponse::InternalServerError().finish();
    }

    error::failure_response(&err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::GatewayHandler;
    use crate::pipeline::classify::Fault;
    use crate::pipeline::error::FailedExecutionResult;
    use crate::reporting::ReportSink;
    use async_trait::async_trait;
    use faultline_collector_sdk::report::ErrorReport;
    use faultline_config::reporting::{ReportingConfig, SuppressionRuleConfig};
    use faultline_config::GatewayConfig;
    use http::{Method, StatusCode};
    use ntex::http::body::{BodySize, MessageBody};
    use ntex::web::test::TestRequest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct SinkProbe {
        calls: AtomicUsize,
        last: Mutex<Option<ErrorReport>>,
    }

    struct MockSink(Arc<SinkProbe>);

    #[async_trait]
    impl ReportSink for MockSink {
        async fn report(&self, report: ErrorReport) {
            self.0.calls.fetch_add(1, Ordering::SeqCst);
            *self.0.last.lock().unwrap() = Some(report);
        }
    }

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait(?Send)]
    impl GatewayHandler for CountingHandler {
        async fn handle(
            &self,
            _req: &HttpRequest,
            _body: Bytes,
            _ctx: &RequestContext,
        ) -> Result<web::HttpResponse, anyhow::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(web::HttpResponse::Ok()
                .header("x-custom", "kept")
                .json(&serde_json::json!({ "data": { "books": [] } })))
        }
    }

    struct FailingHandler {
        category: Option<&'static str>,
        message: &'static str,
        mark_headers_sent: bool,
    }

    impl FailingHandler {
        fn categorized(category: &'static str, message: &'static str) -> Self {
            Self {
                category: Some(category),
                message,
                mark_headers_sent: false,
            }
        }

        fn plain(message: &'static str) -> Self {
            Self {
                category: None,
                message,
                mark_headers_sent: false,
            }
        }
    }

    #[async_trait(?Send)]
    impl GatewayHandler for FailingHandler {
        async fn handle(
            &self,
            _req: &HttpRequest,
            _body: Bytes,
            ctx: &RequestContext,
        ) -> Result<web::HttpResponse, anyhow::Error> {
            if self.mark_headers_sent {
                ctx.mark_headers_sent();
            }
            match self.category {
                Some(category) => Err(anyhow::Error::new(Fault::new(category, self.message))),
                None => Err(anyhow::anyhow!(self.message)),
            }
        }
    }

    struct TestSetup {
        state: Arc<GatewaySharedState>,
        probe: Arc<SinkProbe>,
    }

    fn setup(handler: impl GatewayHandler + 'static, reporting: ReportingConfig) -> TestSetup {
        let config = GatewayConfig {
            reporting,
            ..GatewayConfig::default()
        };
        let state = Arc::new(GatewaySharedState::new(
            Arc::new(config),
            Arc::new(handler),
        ));
        let probe = Arc::new(SinkProbe::default());
        state.reporting.install(Box::new(MockSink(probe.clone())));
        TestSetup { state, probe }
    }

    fn reporting_enabled() -> ReportingConfig {
        ReportingConfig {
            enabled: true,
            ..ReportingConfig::default()
        }
    }

    fn post_request(body: &'static [u8]) -> (HttpRequest, Bytes) {
        let req = TestRequest::with_uri("/graphql")
            .method(Method::POST)
            .header("content-type", "application/json")
            .to_http_request();
        (req, Bytes::from_static(body))
    }

    fn body_json(res: &web::HttpResponse) -> FailedExecutionResult {
        match res.body().as_ref() {
            Some(ntex::http::body::Body::Bytes(bytes)) => serde_json::from_slice(bytes).unwrap(),
            _ => panic!("expected an in-memory response body"),
        }
    }

    fn body_is_empty(res: &web::HttpResponse) -> bool {
        match res.body().as_ref().map(|b| b.size()) {
            None | Some(BodySize::None) | Some(BodySize::Empty) => true,
            Some(BodySize::Sized(size)) => size == 0,
            Some(BodySize::Stream) => false,
        }
    }

    #[ntex::test]
    async fn preflight_short_circuits_before_everything() {
        let calls = Arc::new(AtomicUsize::new(0));
        let TestSetup { state, probe } = setup(
            CountingHandler {
                calls: calls.clone(),
            },
            reporting_enabled(),
        );

        let req = TestRequest::with_uri("/graphql")
            .method(Method::OPTIONS)
            .to_http_request();
        let res = gateway_request_handler(&req, Bytes::new(), &state).await;

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(body_is_empty(&res));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[ntex::test]
    async fn successful_response_passes_through_untouched() {
        let calls = Arc::new(AtomicUsize::new(0));
        let TestSetup { state, probe } = setup(
            CountingHandler {
                calls: calls.clone(),
            },
            reporting_enabled(),
        );

        let (req, body) = post_request(br#"{"query":"{ books { title } }"}"#);
        let res = gateway_request_handler(&req, body, &state).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get("x-custom").unwrap(), "kept");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[ntex::test]
    async fn suppressed_category_is_not_reported_but_still_answered() {
        let TestSetup { state, probe } = setup(
            FailingHandler::categorized("ValidationError", "bad input"),
            ReportingConfig {
                enabled: true,
                suppress: vec![SuppressionRuleConfig {
                    category: "ValidationError".to_string(),
                    operations: None,
                }],
                ..ReportingConfig::default()
            },
        );

        let (req, body) = post_request(br#"{"query":"{ books }"}"#);
        let res = gateway_request_handler(&req, body, &state).await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
        let result = body_json(&res);
        assert_eq!(result.errors.unwrap()[0].message, "bad input");
    }

    #[ntex::test]
    async fn ignored_operation_is_not_reported() {
        let TestSetup { state, probe } = setup(
            FailingHandler::categorized("DatabaseError", "connection refused"),
            ReportingConfig {
                enabled: true,
                ignore_operations: vec!["MyBooks".to_string()],
                ..ReportingConfig::default()
            },
        );

        let (req, body) =
            post_request(br#"{"query":"query MyBooks { books }","operationName":"MyBooks"}"#);
        let res = gateway_request_handler(&req, body, &state).await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[ntex::test]
    async fn unsuppressed_error_is_reported_exactly_once() {
        let TestSetup { state, probe } = setup(
            FailingHandler::categorized("DatabaseError", "connection refused"),
            reporting_enabled(),
        );

        let (req, body) =
            post_request(br#"{"query":"query MyBooks { books }","operationName":"MyBooks"}"#);
        let res = gateway_request_handler(&req, body, &state).await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);

        let report = probe.last.lock().unwrap().clone().unwrap();
        assert_eq!(report.category, "DatabaseError");
        assert_eq!(report.message, "connection refused");
        assert_eq!(report.operation_name.as_deref(), Some("MyBooks"));
        assert_eq!(report.method, "POST");

        let result = body_json(&res);
        assert_eq!(result.errors.unwrap()[0].message, "connection refused");
    }

    #[ntex::test]
    async fn reporting_disabled_keeps_errors_local() {
        let TestSetup { state, probe } = setup(
            FailingHandler::plain("boom"),
            ReportingConfig::default(), // enabled: false
        );

        let (req, body) = post_request(br#"{"query":"{ books }"}"#);
        let res = gateway_request_handler(&req, body, &state).await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[ntex::test]
    async fn no_error_body_is_written_after_headers_were_sent() {
        let TestSetup { state, probe } = setup(
            FailingHandler {
                category: None,
                message: "stream broke midway",
                mark_headers_sent: true,
            },
            reporting_enabled(),
        );

        let (req, body) = post_request(br#"{"query":"{ books }"}"#);
        let res = gateway_request_handler(&req, body, &state).await;

        assert!(body_is_empty(&res));
        // the failure is still classified and reported
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }

    #[ntex::test]
    async fn malformed_body_is_rejected_without_invoking_the_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let TestSetup { state, probe } = setup(
            CountingHandler {
                calls: calls.clone(),
            },
            reporting_enabled(),
        );

        let (req, body) = post_request(b"{not-json");
        let res = gateway_request_handler(&req, body, &state).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
        let result = body_json(&res);
        assert_eq!(
            result.errors.unwrap()[0]
                .extensions
                .as_ref()
                .unwrap()
                .code,
            "BAD_REQUEST"
        );
    }

    #[ntex::test]
    async fn sink_teardown_falls_back_to_local_logging() {
        let TestSetup { state, probe } = setup(
            FailingHandler::plain("boom"),
            reporting_enabled(),
        );
        state.reporting.reset();

        let (req, body) = post_request(br#"{"query":"{ books }"}"#);
        let res = gateway_request_handler(&req, body, &state).await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }
}
