//! Rule predicate evaluation.
//!
//! # Responsibilities
//! - Describe the literal hostname/pathname conditions a rule can carry
//! - Evaluate a single condition against a request target
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Comparisons are literal: no globbing, no regex, no case folding
//! - Empty prefix/suffix values match everything, empty exact values only match ""
//! - Evaluation is pure; the same target always yields the same answer

/// The parts of a request that participate in routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTarget<'a> {
    pub hostname: &'a str,
    pub pathname: &'a str,
}

impl<'a> RequestTarget<'a> {
    pub fn new(hostname: &'a str, pathname: &'a str) -> Self {
        Self { hostname, pathname }
    }
}

/// Trait for matching request targets against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the target satisfies this condition.
    fn matches(&self, target: &RequestTarget<'_>) -> bool;
}

/// A single literal condition on the hostname or pathname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    HostnameExact(String),
    HostnameSuffix(String),
    HostnamePrefix(String),
    PathnameExact(String),
    PathnameSuffix(String),
    PathnamePrefix(String),
}

impl Predicate {
    /// Config key this predicate was declared under, for diagnostics.
    pub fn key(&self) -> &'static str {
        match self {
            Predicate::HostnameExact(_) => "hostname",
            Predicate::HostnameSuffix(_) => "hostnameEndsWith",
            Predicate::HostnamePrefix(_) => "hostnameStartsWith",
            Predicate::PathnameExact(_) => "pathname",
            Predicate::PathnameSuffix(_) => "pathnameEndsWith",
            Predicate::PathnamePrefix(_) => "pathnameStartsWith",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Predicate::HostnameExact(v)
            | Predicate::HostnameSuffix(v)
            | Predicate::HostnamePrefix(v)
            | Predicate::PathnameExact(v)
            | Predicate::PathnameSuffix(v)
            | Predicate::PathnamePrefix(v) => v,
        }
    }
}

impl Matcher for Predicate {
    fn matches(&self, target: &RequestTarget<'_>) -> bool {
        match self {
            Predicate::HostnameExact(v) => target.hostname == v,
            Predicate::HostnameSuffix(v) => target.hostname.ends_with(v.as_str()),
            Predicate::HostnamePrefix(v) => target.hostname.starts_with(v.as_str()),
            Predicate::PathnameExact(v) => target.pathname == v,
            Predicate::PathnameSuffix(v) => target.pathname.ends_with(v.as_str()),
            Predicate::PathnamePrefix(v) => target.pathname.starts_with(v.as_str()),
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={:?}", self.key(), self.value())
    }
}

/// Combines multiple predicates with AND semantics.
///
/// An empty conjunction is vacuously true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AndMatcher {
    predicates: Vec<Predicate>,
}

impl AndMatcher {
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self { predicates }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, target: &RequestTarget<'_>) -> bool {
        // All predicates must pass (AND)
        self.predicates.iter().all(|p| p.matches(target))
    }
}
