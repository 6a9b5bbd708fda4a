//! Destination lookup seam.
//!
//! The dispatcher only ever asks "is there a destination with this name?".
//! Whatever owns the destinations (the HTTP server's pool, a test map)
//! implements `DestinationRegistry`.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Name-to-handle lookup supplied by the hosting environment.
pub trait DestinationRegistry {
    /// What a resolved destination hands back to the caller.
    type Handle;

    /// Look up a destination by name.
    fn resolve(&self, name: &str) -> Option<&Self::Handle>;
}

impl<T, S: BuildHasher> DestinationRegistry for HashMap<String, T, S> {
    type Handle = T;

    fn resolve(&self, name: &str) -> Option<&T> {
        self.get(name)
    }
}

impl<T> DestinationRegistry for BTreeMap<String, T> {
    type Handle = T;

    fn resolve(&self, name: &str) -> Option<&T> {
        self.get(name)
    }
}

impl<R: DestinationRegistry + ?Sized> DestinationRegistry for &R {
    type Handle = R::Handle;

    fn resolve(&self, name: &str) -> Option<&R::Handle> {
        (**self).resolve(name)
    }
}
