//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, extract hostname/pathname)
//!     → [routing layer resolves a destination]
//!     → server.rs (forward verbatim to destination)
//!     → response.rs (404 / 500 when the router answers itself)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{extract_target, RoutingTarget, TargetError, X_REQUEST_ID};
pub use server::{AppState, ForwardError, HttpServer};
