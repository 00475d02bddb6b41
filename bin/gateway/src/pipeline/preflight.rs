use http::{header, Method, StatusCode};
use ntex::{
    http::header::HeaderValue,
    web::{self, HttpRequest},
};

/// Browsers negotiate cross-origin permissions with an OPTIONS probe
/// before the real request. Those probes get an empty success response
/// straight away: no span, no sampling, no business handler.
pub fn get_early_response(req: &HttpRequest) -> Option<web::HttpResponse> {
    if req.method() == Method::OPTIONS {
        Some(
            web::HttpResponse::Ok()
                .status(StatusCode::NO_CONTENT)
                .header(header::CONTENT_LENGTH, HeaderValue::from_static("0"))
                .finish(),
        )
    } else {
        None
    }
}
