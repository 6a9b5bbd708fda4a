//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Walk the rule set in declaration order
//! - Resolve the first matching rule's destination
//! - Skip matches whose destination cannot be resolved
//! - Return the resolved destination or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) linear scan, no caching (rule sets are small and static)
//! - The scan is an explicit state machine; `step` is one transition
//! - Explicit NoMatch rather than silent default
//!
//! ```text
//! Start → Scanning(i) ─┬─ rule i misses ─────────────→ Scanning(i+1)
//!                      ├─ rule i hits, resolves ─────→ MatchedResolved   (terminal)
//!                      ├─ rule i hits, unresolved ───→ MatchedUnresolved → Scanning(i+1)
//!                      └─ i == len ──────────────────→ ExhaustedNoMatch  (terminal)
//! ```

use std::sync::Arc;

use crate::config::{RuleConfig, ValidationError};
use crate::observability::metrics;
use crate::routing::matcher::{Matcher, RequestTarget};
use crate::routing::registry::DestinationRegistry;
use crate::routing::rule::{Rule, RuleSet};

/// A rule whose destination was found in the registry.
#[derive(Debug, PartialEq, Eq)]
pub struct Resolved<'a, H> {
    pub rule: &'a Rule,
    pub handle: &'a H,
}

impl<H> Clone for Resolved<'_, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for Resolved<'_, H> {}

impl<'a, H> Resolved<'a, H> {
    pub fn destination_name(&self) -> &'a str {
        self.rule.destination()
    }

    pub fn rule_name(&self) -> &'a str {
        self.rule.name()
    }
}

/// Outcome of dispatching one request.
#[derive(Debug, PartialEq, Eq)]
pub enum MatchResult<'a, H> {
    Matched(Resolved<'a, H>),
    NoMatch,
}

impl<'a, H> MatchResult<'a, H> {
    pub fn matched(self) -> Option<Resolved<'a, H>> {
        match self {
            MatchResult::Matched(resolved) => Some(resolved),
            MatchResult::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched(_))
    }
}

/// Per-request scan state.
#[derive(Debug, PartialEq, Eq)]
pub enum ScanState<'a, H> {
    Start,
    Scanning(usize),
    MatchedResolved(Resolved<'a, H>),
    MatchedUnresolved(usize),
    ExhaustedNoMatch,
}

impl<H> ScanState<'_, H> {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanState::MatchedResolved(_) | ScanState::ExhaustedNoMatch)
    }
}

/// Advance the scan by one transition. Terminal states map to themselves.
pub fn step<'a, R>(
    rules: &'a RuleSet,
    target: &RequestTarget<'_>,
    registry: &'a R,
    state: ScanState<'a, R::Handle>,
) -> ScanState<'a, R::Handle>
where
    R: DestinationRegistry + ?Sized,
{
    match state {
        ScanState::Start => ScanState::Scanning(0),
        ScanState::Scanning(index) => match rules.get(index) {
            None => ScanState::ExhaustedNoMatch,
            Some(rule) if !rule.matches(target) => ScanState::Scanning(index + 1),
            Some(rule) => match registry.resolve(rule.destination()) {
                Some(handle) => ScanState::MatchedResolved(Resolved { rule, handle }),
                None => ScanState::MatchedUnresolved(index),
            },
        },
        ScanState::MatchedUnresolved(index) => ScanState::Scanning(index + 1),
        terminal => terminal,
    }
}

/// Find the first matching rule whose destination resolves.
pub fn dispatch<'a, R>(
    rules: &'a RuleSet,
    hostname: &str,
    pathname: &str,
    registry: &'a R,
) -> MatchResult<'a, R::Handle>
where
    R: DestinationRegistry + ?Sized,
{
    let target = RequestTarget::new(hostname, pathname);
    let mut state = ScanState::Start;

    loop {
        state = match step(rules, &target, registry, state) {
            ScanState::MatchedResolved(resolved) => {
                tracing::debug!(
                    rule = %resolved.rule_name(),
                    destination = %resolved.destination_name(),
                    "Matched rule"
                );
                return MatchResult::Matched(resolved);
            }
            ScanState::ExhaustedNoMatch => return MatchResult::NoMatch,
            ScanState::MatchedUnresolved(index) => {
                if let Some(rule) = rules.get(index) {
                    tracing::warn!(
                        rule = %rule.name(),
                        destination = %rule.destination(),
                        "Destination not found, skipping rule"
                    );
                    metrics::record_unresolved(rule.name(), rule.destination());
                }
                ScanState::MatchedUnresolved(index)
            }
            next => next,
        };
    }
}

/// Shared, immutable rule table.
#[derive(Debug, Clone, Default)]
pub struct Router {
    rules: Arc<RuleSet>,
}

impl Router {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    /// Compile a router from configured rules.
    pub fn from_config(configs: &[RuleConfig]) -> Result<Self, Vec<ValidationError>> {
        RuleSet::from_config(configs).map(Self::new)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Dispatch a request target against this router's rules.
    pub fn dispatch<'a, R>(&'a self, target: &RequestTarget<'_>, registry: &'a R) -> MatchResult<'a, R::Handle>
    where
        R: DestinationRegistry + ?Sized,
    {
        dispatch(&self.rules, target.hostname, target.pathname, registry)
    }
}
