//! Routing rules and the ordered rule set.
//!
//! # Responsibilities
//! - Compile `RuleConfig` entries into immutable `Rule` values
//! - Preserve declaration order exactly
//! - Reject malformed rules, drop informational ones
//!
//! # Design Decisions
//! - A default rule short-circuits every other condition
//! - The rule set is built once and never mutated; share it via `Arc`

use std::sync::Arc;

use crate::config::validation::{rule_destination, ValidationError};
use crate::config::RuleConfig;
use crate::routing::matcher::{AndMatcher, Matcher, Predicate, RequestTarget};

/// One routing entry: a condition and the destination it selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: Arc<str>,
    destination: Arc<str>,
    is_default: bool,
    conditions: AndMatcher,
}

impl Rule {
    /// Create a rule that matches every request until conditions are added.
    pub fn new(name: impl Into<Arc<str>>, destination: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            destination: destination.into(),
            is_default: false,
            conditions: AndMatcher::default(),
        }
    }

    /// Create a catch-all rule.
    pub fn catch_all(name: impl Into<Arc<str>>, destination: impl Into<Arc<str>>) -> Self {
        Self {
            is_default: true,
            ..Self::new(name, destination)
        }
    }

    /// Add a condition to the rule.
    pub fn with(self, predicate: Predicate) -> Self {
        let mut predicates = self.conditions.predicates().to_vec();
        predicates.push(predicate);
        Self {
            conditions: AndMatcher::new(predicates),
            ..self
        }
    }

    /// Compile a configured rule.
    ///
    /// Returns `Ok(None)` for a default rule without a destination.
    pub fn from_config(index: usize, config: &RuleConfig) -> Result<Option<Self>, ValidationError> {
        let destination = match rule_destination(index, config)? {
            Some(destination) => destination,
            None => return Ok(None),
        };

        let predicates = [
            config.hostname.clone().map(Predicate::HostnameExact),
            config.hostname_ends_with.clone().map(Predicate::HostnameSuffix),
            config.hostname_starts_with.clone().map(Predicate::HostnamePrefix),
            config.pathname_starts_with.clone().map(Predicate::PathnamePrefix),
            config.pathname_ends_with.clone().map(Predicate::PathnameSuffix),
            config.pathname.clone().map(Predicate::PathnameExact),
        ]
        .into_iter()
        .flatten()
        .collect();

        Ok(Some(Self {
            name: config.display_name(index).into(),
            destination: destination.into(),
            is_default: config.is_default,
            conditions: AndMatcher::new(predicates),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn predicates(&self) -> &[Predicate] {
        self.conditions.predicates()
    }

    /// Non-default rule with no conditions.
    pub fn is_unconditional(&self) -> bool {
        !self.is_default && self.conditions.is_empty()
    }
}

impl Matcher for Rule {
    fn matches(&self, target: &RequestTarget<'_>) -> bool {
        self.is_default || self.conditions.matches(target)
    }
}

/// Whether `rule` selects a request with the given hostname and pathname.
pub fn matches(rule: &Rule, hostname: &str, pathname: &str) -> bool {
    rule.matches(&RequestTarget::new(hostname, pathname))
}

/// An ordered, immutable sequence of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Compile configured rules in declaration order.
    pub fn from_config(configs: &[RuleConfig]) -> Result<Self, Vec<ValidationError>> {
        let mut rules = Vec::with_capacity(configs.len());
        let mut errors = Vec::new();

        for (index, config) in configs.iter().enumerate() {
            match Rule::from_config(index, config) {
                Ok(Some(rule)) => rules.push(rule),
                Ok(None) => {
                    tracing::warn!(
                        rule = %config.display_name(index),
                        "Dropping default rule without a destination"
                    );
                }
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        tracing::debug!(rules = rules.len(), "Rule set compiled");
        Ok(Self { rules })
    }

    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ignores_conditions() {
        let rule = Rule::catch_all("fallback", "B").with(Predicate::HostnameExact("never".into()));
        assert!(rule.matches(&RequestTarget::new("other.com", "/")));
        assert!(rule.matches(&RequestTarget::new("", "")));
    }

    #[test]
    fn test_conditions_are_conjunctive() {
        let rule = Rule::new("api", "A")
            .with(Predicate::HostnameExact("a.example.com".into()))
            .with(Predicate::PathnamePrefix("/api/".into()));
        assert!(rule.matches(&RequestTarget::new("a.example.com", "/api/x")));
        assert!(!rule.matches(&RequestTarget::new("a.example.com", "/web")));
        assert!(!rule.matches(&RequestTarget::new("b.example.com", "/api/x")));
    }

    #[test]
    fn test_matches_compares_literally() {
        let rule = Rule::new("exact", "A").with(Predicate::PathnameExact(String::new()));
        assert!(matches(&rule, "h", ""));
        assert!(!matches(&rule, "h", "/"));

        let rule = Rule::new("case", "A").with(Predicate::HostnameSuffix(".Example.com".into()));
        assert!(!matches(&rule, "a.example.com", "/"));
    }

    #[test]
    fn test_unconditional_rule_matches_everything() {
        let rule = Rule::new("oops", "A");
        assert!(rule.is_unconditional());
        assert!(rule.matches(&RequestTarget::new("anything", "/at/all")));
        assert!(!Rule::catch_all("fallback", "A").is_unconditional());
    }

    #[test]
    fn test_from_config_maps_every_key() {
        let config = RuleConfig {
            name: Some("all".into()),
            destination: Some("A".into()),
            hostname: Some("h".into()),
            hostname_starts_with: Some("hs".into()),
            hostname_ends_with: Some("he".into()),
            pathname: Some("p".into()),
            pathname_starts_with: Some("ps".into()),
            pathname_ends_with: Some("pe".into()),
            ..Default::default()
        };
        let rule = Rule::from_config(0, &config).unwrap().unwrap();
        assert_eq!(rule.name(), "all");
        assert_eq!(rule.destination(), "A");
        assert_eq!(
            rule.predicates(),
            &[
                Predicate::HostnameExact("h".into()),
                Predicate::HostnameSuffix("he".into()),
                Predicate::HostnamePrefix("hs".into()),
                Predicate::PathnamePrefix("ps".into()),
                Predicate::PathnameSuffix("pe".into()),
                Predicate::PathnameExact("p".into()),
            ]
        );
    }

    #[test]
    fn test_rule_set_preserves_order_and_drops_informational() {
        let configs = vec![
            RuleConfig {
                name: Some("first".into()),
                destination: Some("A".into()),
                pathname_starts_with: Some("/a".into()),
                ..Default::default()
            },
            RuleConfig {
                name: Some("note".into()),
                is_default: true,
                ..Default::default()
            },
            RuleConfig {
                destination: Some("B".into()),
                is_default: true,
                ..Default::default()
            },
        ];
        let set = RuleSet::from_config(&configs).unwrap();
        let names: Vec<_> = set.iter().map(Rule::name).collect();
        assert_eq!(names, vec!["first", "rule-2"]);
    }

    #[test]
    fn test_rule_set_rejects_malformed() {
        let configs = vec![RuleConfig {
            name: Some("orphan".into()),
            pathname: Some("/".into()),
            ..Default::default()
        }];
        let errors = RuleSet::from_config(&configs).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingDestination { rule: "orphan".into() }]);
    }
}
