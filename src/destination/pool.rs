//! Destination pool.
//!
//! # Responsibilities
//! - Hold the named upstream destinations declared in configuration
//! - Resolve destination names for the dispatcher
//! - Rewrite request URIs towards a resolved destination
//!
//! # Design Decisions
//! - Built once at startup, read-only afterwards (shared via Arc)
//! - One address per destination; no balancing or health state

use std::collections::HashMap;
use std::str::FromStr;

use axum::http::uri::{Authority, InvalidUriParts, PathAndQuery, Scheme, Uri};

use crate::config::{DestinationConfig, ValidationError};
use crate::routing::DestinationRegistry;

/// A single named upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    name: String,
    authority: Authority,
}

impl Destination {
    pub fn new(name: impl Into<String>, address: &str) -> Result<Self, ValidationError> {
        let name = name.into();
        let authority = Authority::from_str(address).map_err(|_| ValidationError::InvalidDestinationAddress {
            name: name.clone(),
            address: address.to_string(),
        })?;
        Ok(Self { name, authority })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Point `uri` at this destination, keeping path and query untouched.
    pub fn rewrite_uri(&self, uri: &Uri) -> Result<Uri, InvalidUriParts> {
        let mut parts = uri.clone().into_parts();
        parts.scheme = Some(Scheme::HTTP);
        parts.authority = Some(self.authority.clone());
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        Uri::from_parts(parts)
    }
}

/// Named destinations available for forwarding.
#[derive(Debug, Clone, Default)]
pub struct DestinationPool {
    destinations: HashMap<String, Destination>,
}

impl DestinationPool {
    /// Create a pool from configuration.
    pub fn new(configs: &[DestinationConfig]) -> Result<Self, ValidationError> {
        let mut destinations = HashMap::with_capacity(configs.len());
        for config in configs {
            let destination = Destination::new(config.name.clone(), &config.address)?;
            tracing::debug!(
                destination = %destination.name,
                address = %destination.authority,
                "Destination registered"
            );
            destinations.insert(config.name.clone(), destination);
        }
        Ok(Self { destinations })
    }

    pub fn get(&self, name: &str) -> Option<&Destination> {
        self.destinations.get(name)
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}

impl DestinationRegistry for DestinationPool {
    type Handle = Destination;

    fn resolve(&self, name: &str) -> Option<&Destination> {
        self.get(name)
    }
}
