//! Request handling.
//!
//! # Responsibilities
//! - Generate and propagate a unique request ID (UUID v4)
//! - Extract routing-relevant information (hostname, pathname)
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Hostname comes from the URI authority, else the Host header
//! - The request is read as a WHATWG URL: dot segments (including `%2e`
//!   forms) are resolved, the hostname is lowercased, IDNA-encoded and
//!   stripped of its port
//! - Query string, scheme and port never participate in routing

use axum::http::{header, Request};
use thiserror::Error;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use url::Url;

use crate::routing::RequestTarget;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Stands in for the host when a request carries none; never routed on.
const MISSING_HOST: &str = "missing-host.invalid";

/// The request could not be read as a URL.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("Host header is not a valid authority")]
    InvalidHost,

    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Owned hostname/pathname pair extracted from a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingTarget {
    pub hostname: String,
    pub pathname: String,
}

impl RoutingTarget {
    pub fn as_target(&self) -> RequestTarget<'_> {
        RequestTarget::new(&self.hostname, &self.pathname)
    }
}

impl From<&Url> for RoutingTarget {
    fn from(url: &Url) -> Self {
        Self {
            hostname: url.host_str().unwrap_or_default().to_string(),
            pathname: url.path().to_string(),
        }
    }
}

/// Extract the hostname and pathname a request is routed on.
///
/// A request without any host routes on an empty hostname.
pub fn extract_target<B>(req: &Request<B>) -> Result<RoutingTarget, TargetError> {
    let authority = request_authority(req)?;
    // Asterisk-form (`OPTIONS *`) has no path to route on.
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .filter(|p| p.starts_with('/'))
        .unwrap_or("/");

    let url = Url::parse(&format!(
        "http://{}{}",
        authority.unwrap_or(MISSING_HOST),
        path_and_query
    ))?;

    let mut target = RoutingTarget::from(&url);
    if authority.is_none() {
        target.hostname.clear();
    }
    Ok(target)
}

/// Raw authority of the request: the URI's, else the Host header.
fn request_authority<B>(req: &Request<B>) -> Result<Option<&str>, TargetError> {
    if let Some(authority) = req.uri().authority() {
        return Ok(Some(authority.as_str()));
    }
    let Some(value) = req.headers().get(header::HOST) else {
        return Ok(None);
    };
    let host = std::str::from_utf8(value.as_bytes()).map_err(|_| TargetError::InvalidHost)?;
    // Anything that would end the authority must not leak into the path.
    if host.contains(['/', '\\', '?', '#']) {
        return Err(TargetError::InvalidHost);
    }
    Ok(Some(host))
}

/// Request ID of the request, if the request ID layer ran.
pub fn request_id<B>(req: &Request<B>) -> &str {
    req.headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Layer assigning an `x-request-id` to requests that lack one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer copying the request's `x-request-id` onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}
