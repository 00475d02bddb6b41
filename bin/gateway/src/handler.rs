use async_trait::async_trait;
use ntex::util::Bytes;
use ntex::web::{self, HttpRequest};
use serde::Serialize;

use crate::pipeline::context::RequestContext;

/// The pluggable business handler the gateway wraps. May fail with any
/// error type; categorized failures use [`crate::pipeline::classify::Fault`]
/// somewhere in the chain. Handlers that stream must call
/// [`RequestContext::mark_headers_sent`] before writing.
#[async_trait(?Send)]
pub trait GatewayHandler: Send + Sync {
    async fn handle(
        &self,
        req: &HttpRequest,
        body: Bytes,
        ctx: &RequestContext,
    ) -> Result<web::HttpResponse, anyhow::Error>;
}

#[derive(Serialize, Clone)]
struct Book {
    title: &'static str,
    author: &'static str,
}

/// Demo handler serving a tiny static "books" dataset; stands in for a
/// real GraphQL executor in local development and in the tests.
pub struct BooksHandler {
    books: Vec<Book>,
}

impl Default for BooksHandler {
    fn default() -> Self {
        Self {
            books: vec![
                Book {
                    title: "The Awakening",
                    author: "Kate Chopin",
                },
                Book {
                    title: "City of Glass",
                    author: "Paul Auster",
                },
            ],
        }
    }
}

#[async_trait(?Send)]
impl GatewayHandler for BooksHandler {
    async fn handle(
        &self,
        _req: &HttpRequest,
        _body: Bytes,
        _ctx: &RequestContext,
    ) -> Result<web::HttpResponse, anyhow::Error> {
        Ok(web::HttpResponse::Ok().json(&serde_json::json!({
            "data": { "books": self.books }
        })))
    }
}
