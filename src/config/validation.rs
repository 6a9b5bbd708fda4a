//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject malformed rules (no destination on a routable rule)
//! - Check referential integrity when strict destinations are enabled
//! - Validate addresses and timeouts
//! - Lint rule order for likely misconfigurations (never fatal)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::uri::Authority;
use thiserror::Error;

use crate::config::schema::{RouterConfig, RuleConfig};

/// A configuration problem that prevents startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("rule '{rule}' has no destination and is not a default rule")]
    MissingDestination { rule: String },

    #[error("rule '{rule}' has an empty destination name")]
    EmptyDestination { rule: String },

    #[error("rule '{rule}' references undeclared destination '{destination}'")]
    UnknownDestination { rule: String, destination: String },

    #[error("destination name must not be empty")]
    EmptyDestinationName,

    #[error("destination '{name}' is declared more than once")]
    DuplicateDestination { name: String },

    #[error("destination '{name}' has invalid address '{address}'")]
    InvalidDestinationAddress { name: String, address: String },

    #[error("{field} '{address}' is not a valid socket address")]
    InvalidBindAddress { field: &'static str, address: String },

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },
}

/// A suspicious but legal configuration, reported at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleLint {
    /// The rule set is empty; every request gets a not-found response.
    EmptyRuleSet,
    /// A non-default rule declares no conditions and matches every request.
    Unconditional { rule: String },
    /// A rule that can never be reached because an earlier catch-all precedes it.
    Unreachable { rule: String, shadowed_by: String },
    /// Two rules share a name, making logs ambiguous.
    DuplicateRuleName { rule: String },
    /// A default rule without a destination; dropped when the rule set is built.
    InformationalDefault { rule: String },
    /// A declared destination no rule refers to.
    UnusedDestination { name: String },
    /// No default rule; unmatched requests get a not-found response.
    NoDefault,
}

impl std::fmt::Display for RuleLint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleLint::EmptyRuleSet => write!(f, "no rules configured; every request will be rejected"),
            RuleLint::Unconditional { rule } => write!(
                f,
                "rule '{}' has no conditions and is not marked default; it matches every request",
                rule
            ),
            RuleLint::Unreachable { rule, shadowed_by } => write!(
                f,
                "rule '{}' is unreachable: earlier rule '{}' matches every request",
                rule, shadowed_by
            ),
            RuleLint::DuplicateRuleName { rule } => write!(f, "rule name '{}' is used more than once", rule),
            RuleLint::InformationalDefault { rule } => {
                write!(f, "default rule '{}' has no destination and will be ignored", rule)
            }
            RuleLint::UnusedDestination { name } => {
                write!(f, "destination '{}' is not referenced by any rule", name)
            }
            RuleLint::NoDefault => write!(f, "no default rule; unmatched requests return 404"),
        }
    }
}

/// Resolve the destination a rule routes to.
///
/// Returns `Ok(None)` for a default rule that carries no destination
/// (informational only).
pub fn rule_destination<'a>(index: usize, rule: &'a RuleConfig) -> Result<Option<&'a str>, ValidationError> {
    match rule.destination.as_deref() {
        Some("") => Err(ValidationError::EmptyDestination {
            rule: rule.display_name(index),
        }),
        Some(destination) => Ok(Some(destination)),
        None if rule.is_default => Ok(None),
        None => Err(ValidationError::MissingDestination {
            rule: rule.display_name(index),
        }),
    }
}

/// Validate a loaded configuration, collecting every error.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress {
            field: "listener.bind_address",
            address: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidBindAddress {
            field: "observability.metrics_address",
            address: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "timeouts.request_secs" });
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "timeouts.connect_secs" });
    }

    let mut declared = HashSet::new();
    for destination in &config.destinations {
        if destination.name.is_empty() {
            errors.push(ValidationError::EmptyDestinationName);
            continue;
        }
        if !declared.insert(destination.name.as_str()) {
            errors.push(ValidationError::DuplicateDestination {
                name: destination.name.clone(),
            });
        }
        if destination.address.parse::<Authority>().is_err() {
            errors.push(ValidationError::InvalidDestinationAddress {
                name: destination.name.clone(),
                address: destination.address.clone(),
            });
        }
    }

    for (index, rule) in config.rules.iter().enumerate() {
        match rule_destination(index, rule) {
            Ok(Some(destination)) => {
                if config.routing.strict_destinations && !declared.contains(destination) {
                    errors.push(ValidationError::UnknownDestination {
                        rule: rule.display_name(index),
                        destination: destination.to_string(),
                    });
                }
            }
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Report legal but suspicious rule configurations.
pub fn lint_rules(config: &RouterConfig) -> Vec<RuleLint> {
    let mut lints = Vec::new();

    if config.rules.is_empty() {
        lints.push(RuleLint::EmptyRuleSet);
        return lints;
    }

    let declared: HashSet<&str> = config.destinations.iter().map(|d| d.name.as_str()).collect();
    let mut names = HashSet::new();
    let mut referenced = HashSet::new();
    let mut catch_all: Option<String> = None;
    let mut has_default = false;

    for (index, rule) in config.rules.iter().enumerate() {
        let name = rule.display_name(index);

        if rule.name.is_some() && !names.insert(name.clone()) {
            lints.push(RuleLint::DuplicateRuleName { rule: name.clone() });
        }

        if let Some(shadowed_by) = &catch_all {
            lints.push(RuleLint::Unreachable {
                rule: name.clone(),
                shadowed_by: shadowed_by.clone(),
            });
        }

        let destination = rule.destination.as_deref().filter(|d| !d.is_empty());
        if let Some(destination) = destination {
            referenced.insert(destination);
        }

        if rule.is_default {
            has_default = true;
            if destination.is_none() {
                lints.push(RuleLint::InformationalDefault { rule: name.clone() });
            }
        } else if rule.is_unconditional() {
            lints.push(RuleLint::Unconditional { rule: name.clone() });
        }

        // A catch-all only shadows later rules if its own destination resolves.
        let matches_everything = rule.is_default || rule.is_unconditional();
        if catch_all.is_none() && matches_everything {
            if let Some(destination) = destination {
                if declared.contains(destination) {
                    catch_all = Some(name);
                }
            }
        }
    }

    if !has_default {
        lints.push(RuleLint::NoDefault);
    }

    for destination in &config.destinations {
        if !referenced.contains(destination.name.as_str()) {
            lints.push(RuleLint::UnusedDestination {
                name: destination.name.clone(),
            });
        }
    }

    lints
}
