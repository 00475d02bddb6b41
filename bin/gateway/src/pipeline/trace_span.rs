use http::header::{HOST, USER_AGENT};
use ntex::http::body::MessageBody;
use ntex::web;
use std::borrow::Cow;

use tracing::{field::Empty, info_span, Span};

const SPAN_TARGET: &str = "faultline-gateway";

/// Collects the transport-level attributes of an inbound request before
/// the span is opened. The span starts under the generic `http.server`
/// label; the true operation name is only known after body parsing and
/// is recorded later via [`RequestSpan::rename`].
pub struct RequestSpanBuilder<'a> {
    request_body_size: Option<usize>,
    request_method: Cow<'a, http::Method>,
    header_user_agent: Option<Cow<'a, http::HeaderValue>>,
    server_address: Option<&'a str>,
    server_port: Option<u16>,
    url: Cow<'a, http::Uri>,
}

#[derive(Clone)]
pub struct RequestSpan {
    pub span: Span,
}

impl std::ops::Deref for RequestSpan {
    type Target = Span;
    fn deref(&self) -> &Self::Target {
        &self.span
    }
}

impl<'a> RequestSpanBuilder<'a> {
    pub fn from_request(request: &'a web::HttpRequest, body: &ntex::util::Bytes) -> Self {
        let (server_address, server_port) =
            match request.headers().get(HOST).and_then(|h| h.to_str().ok()) {
                Some(host) => {
                    if let Some((host, port_str)) = host.rsplit_once(':') {
                        (Some(host), port_str.parse::<u16>().ok())
                    } else {
                        (Some(host), None)
                    }
                }
                None => (None, None),
            };
        RequestSpanBuilder {
            request_body_size: Some(body.len()),
            request_method: Cow::Borrowed(request.method()),
            header_user_agent: request
                .headers()
                .get(USER_AGENT)
                .map(|h| Cow::Owned(h.into())),
            url: Cow::Borrowed(request.uri()),
            server_address,
            server_port,
        }
    }

    /// Consume self and turn into a [Span]
    pub fn build(self) -> RequestSpan {
        // We follow the HTTP server span conventions:
        // https://opentelemetry.io/docs/specs/semconv/http/http-spans/#http-server
        let url_full = self.url.to_string();

        let span = info_span!(
            target: SPAN_TARGET,
            "http.server",
            "otel.name" = Empty,
            "otel.status_code" = Empty,
            "otel.kind" = "Server",
            "error.type" = Empty,
            "server.address" = self.server_address,
            "server.port" = self.server_port,
            "url.full" = url_full,
            "url.path" = self.url.path(),
            "http.request.body.size" = self.request_body_size,
            "http.request.method" = self.request_method.as_str(),
            "user_agent.original" = self.header_user_agent.as_ref().and_then(|v| v.to_str().ok()),
            "http.response.status_code" = Empty,
            "http.response.body.size" = Empty,
            "graphql.operation.name" = Empty,
            "sampling.decision" = Empty,
        );

        RequestSpan { span }
    }
}

impl RequestSpan {
    /// Overwrite the span label with the resolved operation name.
    /// Empty names keep the generic transport label; repeated calls
    /// last-write-win.
    pub fn rename(&self, operation_name: &str) {
        if operation_name.is_empty() {
            return;
        }
        self.record("otel.name", operation_name);
        self.record("graphql.operation.name", operation_name);
    }

    pub fn record_sampling_decision(&self, sampled: bool) {
        self.record("sampling.decision", sampled);
    }

    pub fn record_response(&self, response: &web::HttpResponse) {
        self.record("http.response.status_code", response.status().as_str());
        if let Some(body) = response.body().as_ref() {
            match body.size() {
                ntex::http::body::BodySize::None
                | ntex::http::body::BodySize::Empty
                | ntex::http::body::BodySize::Stream => {
                    self.record("http.response.body.size", 0);
                }
                ntex::http::body::BodySize::Sized(size) => {
                    self.record("http.response.body.size", size);
                }
            }
        }
        if response.status().is_server_error() {
            self.record("otel.status_code", "Error");
            self.record("error.type", response.status().as_str());
        } else {
            self.record("otel.status_code", "Ok");
        }
    }

    pub fn record_internal_server_error(&self) {
        self.record("otel.status_code", "Error");
        self.record("error.type", "500");
        self.record("http.response.status_code", "500");
    }
}
