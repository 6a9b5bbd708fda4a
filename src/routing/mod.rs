//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (hostname, pathname)
//!     → router.rs (ordered scan, destination lookup)
//!     → matcher.rs (evaluate rule conditions)
//!     → registry.rs (resolve destination name)
//!     → Return: resolved destination or NoMatch
//!
//! Rule Compilation (at startup):
//!     RuleConfig[]
//!     → rule.rs (compile conditions, reject malformed rules)
//!     → Freeze as immutable RuleSet behind Arc
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - Literal prefix/suffix/exact comparisons only, no regex
//! - Deterministic: same input and registry always yield the same result
//! - First match wins in declaration order; no specificity ranking
//! - A match whose destination is missing is skipped, not fatal

pub mod matcher;
pub mod registry;
pub mod router;
pub mod rule;

pub use matcher::{Matcher, Predicate, RequestTarget};
pub use registry::DestinationRegistry;
pub use router::{dispatch, step, MatchResult, Resolved, Router, ScanState};
pub use rule::{matches, Rule, RuleSet};
