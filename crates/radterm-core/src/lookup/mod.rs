//! External terminology lookup (DeCS).
//!
//! The engine depends only on [`TermLookup`]. [`DecsClient`] is the real
//! implementation: cache first, then a rate-limited, retried HTTP search in
//! Portuguese and, failing a relevant match, in English.

use std::sync::Arc;

pub mod cache;
pub mod client;
pub mod limiter;
pub mod relevance;
pub mod retry;
pub mod transport;

pub use cache::{CacheEntry, CacheError, FileCache, LookupCache, MemoryCache};
pub use client::{DecsClient, LookupStats};
pub use limiter::RateLimiter;
pub use relevance::RelevanceScores;
pub use retry::RetryPolicy;
pub use transport::{HttpResponse, Transport, TransportError, UreqTransport};

/// Source of externally sourced Portuguese translations.
pub trait TermLookup: Send + Sync {
    /// Portuguese translation for `term`, or `None` when nothing relevant
    /// was found or the service could not be reached.
    fn search_term(&self, term: &str) -> Option<String>;
}

impl<T: TermLookup + ?Sized> TermLookup for Arc<T> {
    fn search_term(&self, term: &str) -> Option<String> {
        (**self).search_term(term)
    }
}

impl<T: TermLookup + ?Sized> TermLookup for &T {
    fn search_term(&self, term: &str) -> Option<String> {
        (**self).search_term(term)
    }
}
