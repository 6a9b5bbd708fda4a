//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, or JSON for *.json)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → HttpServer::new (validated again for configs built in code,
//!       lints logged, compiled once into the RuleSet and DestinationPool)
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at startup; there is no reload
//! - All sections except `rules` have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError, ConfigFormat};
pub use schema::RouterConfig;
pub use schema::ListenerConfig;
pub use schema::RuleConfig;
pub use schema::DestinationConfig;
pub use schema::{LogFormat, ObservabilityConfig, RoutingConfig, TimeoutConfig};
pub use validation::{RuleLint, ValidationError};
