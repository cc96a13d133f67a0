use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, debug_span, warn};

use super::cache::{CacheEntry, CacheError, LookupCache, NOT_FOUND_PAYLOAD};
use super::limiter::RateLimiter;
use super::relevance::{self, RelevanceScores};
use super::retry::RetryPolicy;
use super::transport::{Transport, UreqTransport};
use super::TermLookup;
use crate::settings::settings;

/// Query languages, in the order they are tried.
const LANGS: [&str; 2] = ["pt", "en"];

/// Outcome of one language's request loop. Only `Failed` leaves a term
/// uncached.
enum Fetch {
    /// A 200 with a JSON body.
    Payload(Value, String),
    /// The service answered but had nothing usable (non-retryable status or
    /// an unparseable body).
    NoData,
    /// Retries exhausted on transport errors or retryable statuses.
    Failed,
}

/// Counters for one client's lifetime.
#[derive(Debug, Default)]
pub struct LookupStats {
    pub cache_hits: AtomicU64,
    pub requests: AtomicU64,
    pub failures: AtomicU64,
}

impl LookupStats {
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

/// DeCS lookup client. `Send + Sync`; one instance may serve many threads.
pub struct DecsClient<T: Transport> {
    transport: T,
    cache: Arc<dyn LookupCache>,
    limiter: RateLimiter,
    retry: RetryPolicy,
    scores: RelevanceScores,
    stats: LookupStats,
}

impl DecsClient<UreqTransport> {
    /// HTTP client configured from the global settings.
    pub fn from_settings(cache: Arc<dyn LookupCache>) -> Self {
        let lookup = &settings().lookup;
        Self::new(UreqTransport::from_settings(lookup), cache)
    }
}

impl<T: Transport> DecsClient<T> {
    /// Limiter, retry policy and relevance scores come from the global settings.
    pub fn new(transport: T, cache: Arc<dyn LookupCache>) -> Self {
        let s = settings();
        Self {
            transport,
            cache,
            limiter: RateLimiter::per_second(s.lookup.requests_per_second),
            retry: RetryPolicy::from_settings(&s.lookup),
            scores: RelevanceScores::from(&s.relevance),
            stats: LookupStats::default(),
        }
    }

    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_scores(mut self, scores: RelevanceScores) -> Self {
        self.scores = scores;
        self
    }

    pub fn stats(&self) -> &LookupStats {
        &self.stats
    }

    pub fn cache(&self) -> &Arc<dyn LookupCache> {
        &self.cache
    }

    /// Flush the cache; call at the end of a session.
    pub fn flush(&self) -> Result<(), CacheError> {
        self.cache.flush()
    }

    fn fetch(&self, term: &str, lang: &str, started: Instant) -> Fetch {
        for attempt in 1..=self.retry.max_attempts {
            self.limiter.wait();
            self.stats.requests.fetch_add(1, Ordering::Relaxed);

            let retry_after = match self.transport.search(term, lang) {
                Ok(resp) if resp.status == 200 => {
                    return match serde_json::from_str::<Value>(&resp.body) {
                        Ok(v) => Fetch::Payload(v, resp.body),
                        Err(e) => {
                            debug!(term, lang, error = %e, "unparseable response body");
                            Fetch::NoData
                        }
                    };
                }
                Ok(resp) if RetryPolicy::is_retryable_status(resp.status) => {
                    debug!(term, lang, attempt, status = resp.status, "retryable status");
                    resp.retry_after
                }
                Ok(resp) => {
                    debug!(term, lang, status = resp.status, "non-retryable status");
                    return Fetch::NoData;
                }
                Err(e) => {
                    debug!(term, lang, attempt, error = %e, "transport error");
                    None
                }
            };

            if attempt == self.retry.max_attempts {
                break;
            }
            let delay = self.retry.delay_for(attempt, retry_after.as_deref());
            if let Some(budget) = self.retry.max_elapsed {
                if started.elapsed() + delay > budget {
                    debug!(term, lang, ?budget, "retry budget exhausted");
                    break;
                }
            }
            std::thread::sleep(delay);
        }
        self.stats.failures.fetch_add(1, Ordering::Relaxed);
        Fetch::Failed
    }
}

impl<T: Transport> TermLookup for DecsClient<T> {
    fn search_term(&self, term: &str) -> Option<String> {
        let _span = debug_span!("DecsClient::search_term", term).entered();

        if let Some(hit) = self.cache.get(term) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            debug!(found = hit.term_pt.is_some(), "cache hit");
            return hit.term_pt;
        }

        let started = Instant::now();
        let mut answered = false;
        let mut first_payload: Option<String> = None;
        let mut found: Option<(String, String)> = None;
        for lang in LANGS {
            match self.fetch(term, lang, started) {
                Fetch::Payload(value, raw) => {
                    answered = true;
                    if let Some(pt) = relevance::best_translation(&value, term, &self.scores) {
                        found = Some((pt, raw));
                        break;
                    }
                    first_payload.get_or_insert(raw);
                }
                Fetch::NoData => answered = true,
                Fetch::Failed => {}
            }
        }

        let entry = match found {
            Some((pt, raw)) => CacheEntry::new(term, Some(pt), raw),
            None => {
                if !answered {
                    debug!("no answer from service, caching not-found");
                }
                CacheEntry::new(
                    term,
                    None,
                    first_payload.unwrap_or_else(|| NOT_FOUND_PAYLOAD.to_string()),
                )
            }
        };
        let result = entry.term_pt.clone();
        if let Err(e) = self.cache.put(entry) {
            warn!(error = %e, "failed to persist lookup result");
        }
        result
    }
}

#[cfg(test)]
mod tests;
