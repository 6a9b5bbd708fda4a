//! Destination subsystem.
//!
//! # Data Flow
//! ```text
//! [[destinations]] config
//!     → pool.rs (parse addresses, index by name)
//!     → DestinationPool (immutable, DestinationRegistry impl)
//!     → dispatcher resolves rule destinations by name
//!     → server rewrites the request URI towards the resolved address
//! ```

pub mod pool;

pub use pool::{Destination, DestinationPool};
