use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use super::*;
use crate::lookup::cache::MemoryCache;
use crate::lookup::transport::{HttpResponse, TransportError};

/// Replays scripted responses and records every `(words, lang)` call.
#[derive(Default)]
struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedTransport {
    fn new(script: Vec<Result<HttpResponse, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::default(),
        }
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transport for Arc<ScriptedTransport> {
    fn search(&self, words: &str, lang: &str) -> Result<HttpResponse, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((words.to_string(), lang.to_string()));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::status(404)))
    }
}

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        backoff_base: 0.001,
        backoff_max: 0.002,
        max_elapsed: None,
    }
}

fn client(
    transport: &Arc<ScriptedTransport>,
    cache: Arc<dyn LookupCache>,
) -> DecsClient<Arc<ScriptedTransport>> {
    DecsClient::new(Arc::clone(transport), cache)
        .with_limiter(RateLimiter::new(Duration::ZERO))
        .with_retry(fast_retry(3))
}

fn body(en: &str, pt: &str) -> String {
    json!({
        "objects": [{
            "decsws_response": {"record_list": {"record": {
                "descriptor_list": [
                    {"attr": {"lang": "en"}, "descriptor": en},
                    {"attr": {"lang": "pt"}, "descriptor": pt}
                ]
            }}}
        }]
    })
    .to_string()
}

#[test]
fn portuguese_hit_is_cached() {
    let t = Arc::new(ScriptedTransport::new(vec![Ok(HttpResponse::ok(body(
        "Brain Scan",
        "Varredura Cerebral",
    )))]));
    let cache: Arc<dyn LookupCache> = Arc::new(MemoryCache::new());
    let c = client(&t, Arc::clone(&cache));

    assert_eq!(c.search_term("brain scan").as_deref(), Some("Varredura Cerebral"));
    assert_eq!(c.search_term("brain scan").as_deref(), Some("Varredura Cerebral"));
    assert_eq!(t.calls(), vec![("brain scan".to_string(), "pt".to_string())]);
    assert_eq!(c.stats().cache_hits(), 1);
    assert!(cache.get("brain scan").unwrap().raw_payload.contains("Varredura"));
}

#[test]
fn falls_back_to_english() {
    let t = Arc::new(ScriptedTransport::new(vec![
        Ok(HttpResponse::ok(body("Brain Neoplasms", "Neoplasias Encefálicas"))),
        Ok(HttpResponse::ok(body("Heart", "Coração"))),
    ]));
    let c = client(&t, Arc::new(MemoryCache::new()));
    assert_eq!(c.search_term("heart").as_deref(), Some("Coração"));
    let langs: Vec<String> = t.calls().into_iter().map(|(_, l)| l).collect();
    assert_eq!(langs, vec!["pt", "en"]);
}

#[test]
fn answered_not_found_is_cached() {
    let t = Arc::new(ScriptedTransport::new(vec![
        Ok(HttpResponse::ok(r#"{"objects": []}"#)),
        Ok(HttpResponse::ok(r#"{"objects": []}"#)),
    ]));
    let cache: Arc<dyn LookupCache> = Arc::new(MemoryCache::new());
    let c = client(&t, Arc::clone(&cache));
    assert_eq!(c.search_term("NonExistentTerm"), None);
    assert_eq!(c.search_term("NonExistentTerm"), None);
    assert_eq!(t.calls().len(), 2);
    let entry = cache.get("NonExistentTerm").unwrap();
    assert_eq!(entry.term_pt, None);
}

#[test]
fn retries_retryable_status_then_succeeds() {
    let mut throttled = HttpResponse::status(429);
    throttled.retry_after = Some("0".to_string());
    let t = Arc::new(ScriptedTransport::new(vec![
        Ok(throttled),
        Ok(HttpResponse::status(503)),
        Ok(HttpResponse::ok(body("Liver", "Fígado"))),
    ]));
    let c = client(&t, Arc::new(MemoryCache::new()));
    assert_eq!(c.search_term("liver").as_deref(), Some("Fígado"));
    assert_eq!(t.calls().len(), 3);
    assert_eq!(c.stats().requests(), 3);
}

#[test]
fn exhausted_retries_are_cached_as_not_found() {
    let t = Arc::new(ScriptedTransport::new(
        (0..12).map(|_| Err(TransportError::Timeout)).collect(),
    ));
    let cache: Arc<dyn LookupCache> = Arc::new(MemoryCache::new());
    let c = client(&t, Arc::clone(&cache));
    assert_eq!(c.search_term("liver"), None);
    // 3 attempts for pt, 3 for en.
    assert_eq!(t.calls().len(), 6);
    assert_eq!(c.stats().failures(), 2);
    assert_eq!(
        cache.get("liver").unwrap().raw_payload,
        crate::lookup::cache::NOT_FOUND_PAYLOAD
    );

    // Recalled from cache without another exchange.
    assert_eq!(c.search_term("liver"), None);
    assert_eq!(t.calls().len(), 6);
    assert_eq!(c.stats().cache_hits(), 1);
}

#[test]
fn non_retryable_status_stops_immediately() {
    let t = Arc::new(ScriptedTransport::new(vec![
        Ok(HttpResponse::status(400)),
        Ok(HttpResponse::status(404)),
    ]));
    let cache: Arc<dyn LookupCache> = Arc::new(MemoryCache::new());
    let c = client(&t, Arc::clone(&cache));
    assert_eq!(c.search_term("liver"), None);
    assert_eq!(t.calls().len(), 2);
    assert_eq!(
        cache.get("liver").unwrap().raw_payload,
        crate::lookup::cache::NOT_FOUND_PAYLOAD
    );
}

#[test]
fn unparseable_body_is_no_data() {
    let t = Arc::new(ScriptedTransport::new(vec![
        Ok(HttpResponse::ok("<html>")),
        Ok(HttpResponse::ok("not json")),
    ]));
    let c = client(&t, Arc::new(MemoryCache::new()));
    assert_eq!(c.search_term("liver"), None);
    assert_eq!(t.calls().len(), 2);
}

#[test]
fn retry_budget_bounds_attempts() {
    let t = Arc::new(ScriptedTransport::new(
        (0..8).map(|_| Err(TransportError::Network("reset".into()))).collect(),
    ));
    let c = DecsClient::new(Arc::clone(&t), Arc::new(MemoryCache::new()))
        .with_limiter(RateLimiter::new(Duration::ZERO))
        .with_retry(RetryPolicy {
            max_attempts: 4,
            backoff_base: 1.0,
            backoff_max: 8.0,
            max_elapsed: Some(Duration::from_millis(10)),
        });
    assert_eq!(c.search_term("liver"), None);
    // The first backoff already exceeds the budget: one attempt per language.
    assert_eq!(t.calls().len(), 2);
}
