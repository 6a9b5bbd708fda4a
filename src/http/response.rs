//! Router-generated responses.
//!
//! # Responsibilities
//! - Plain-text not-found response for unmatched requests
//! - Plain-text internal-error response for forwarding failures and panics
//!
//! # Design Decisions
//! - Bodies carry a short diagnostic only, never upstream internals
//! - Upstream responses are passed through untouched (see server.rs)

use std::any::Any;
use std::fmt::Display;

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

pub const NO_ROUTE_BODY: &str = "No matching route found";

fn plain_text(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
}

/// 404 for requests no rule (with a resolvable destination) matched.
pub fn not_found() -> Response {
    plain_text(StatusCode::NOT_FOUND, NO_ROUTE_BODY.to_string())
}

/// 500 with a short diagnostic.
pub fn routing_error(message: impl Display) -> Response {
    plain_text(StatusCode::INTERNAL_SERVER_ERROR, format!("Routing error: {}", message))
}

/// Panic handler for `CatchPanicLayer`.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!(panic = %detail, "Handler panicked while routing");
    routing_error("internal error")
}
