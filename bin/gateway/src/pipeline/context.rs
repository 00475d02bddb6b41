use std::sync::atomic::{AtomicBool, Ordering};

use http::Method;
use once_cell::sync::OnceCell;

use crate::pipeline::trace_span::RequestSpan;

/// Per-request state. Owns the trace span for the request's lifetime and
/// carries the resolved operation name, the one-shot sampling decision and
/// the response-write progress flag. Never shared across requests.
pub struct RequestContext {
    method: Method,
    operation_name: Option<String>,
    span: RequestSpan,
    sampled: OnceCell<bool>,
    headers_sent: AtomicBool,
}

impl RequestContext {
    pub fn new(method: Method, span: RequestSpan) -> Self {
        Self {
            method,
            operation_name: None,
            span,
            sampled: OnceCell::new(),
            headers_sent: AtomicBool::new(false),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn span(&self) -> &RequestSpan {
        &self.span
    }

    /// Record the operation name once body parsing has resolved it.
    /// An absent or empty name leaves the generic transport label in
    /// place; repeated calls last-write-win.
    pub fn resolve_operation_name(&mut self, name: Option<&str>) {
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.span.rename(name);
            self.operation_name = Some(name.to_string());
        }
    }

    pub fn operation_name(&self) -> Option<&str> {
        self.operation_name.as_deref()
    }

    /// Compute the sampling decision at most once for this request.
    /// Later calls return the stored decision without re-evaluating.
    pub fn sampling_decision(&self, decide: impl FnOnce() -> bool) -> bool {
        *self.sampled.get_or_init(decide)
    }

    pub fn is_sampled(&self) -> Option<bool> {
        self.sampled.get().copied()
    }

    /// Handlers that stream their response call this once the status line
    /// and headers are on the wire, so a later failure does not produce a
    /// second response body.
    pub fn mark_headers_sent(&self) {
        self.headers_sent.store(true, Ordering::Relaxed);
    }

    pub fn headers_sent(&self) -> bool {
        self.headers_sent.load(Ordering::Relaxed)
    }
}
