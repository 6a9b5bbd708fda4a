//! Rule-based HTTP request router library.
//!
//! Requests are matched against an ordered, immutable rule set on their
//! hostname and pathname. The first rule whose destination resolves wins and
//! the request is forwarded to that destination unmodified.

pub mod config;
pub mod destination;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::RouterConfig;
pub use destination::DestinationPool;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{dispatch, MatchResult, Rule, RuleSet};
