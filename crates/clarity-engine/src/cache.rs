// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded memoization of text-only results.
//!
//! Entries are keyed by (trimmed query, tier). Once `capacity` entries are
//! stored further insertions are refused; nothing is ever evicted.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use clarity_core::Tier;
use serde::Serialize;
use tracing::debug;

use crate::record::ResultRecord;

type CacheKey = (String, Tier);

/// Snapshot of cache occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub cached_count: usize,
    pub limit: usize,
}

/// Process-wide response cache shared by concurrent dispatches.
#[derive(Debug)]
pub struct ResponseCache {
    capacity: usize,
    entries: Mutex<HashMap<CacheKey, ResultRecord>>,
}

impl ResponseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn key(query: &str, tier: Tier) -> CacheKey {
        (query.trim().to_string(), tier)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, ResultRecord>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up a prior result. The returned copy is marked as cache-sourced
    /// and carries `elapsed` as its processing time.
    pub fn get(&self, query: &str, tier: Tier, elapsed: Duration) -> Option<ResultRecord> {
        let hit = self
            .lock()
            .get(&Self::key(query, tier))
            .map(|record| record.cached_copy(elapsed));
        if hit.is_some() {
            debug!(%tier, "cache hit");
        }
        hit
    }

    /// Store a result. Returns whether it was stored.
    ///
    /// Records from requests with media, inserts beyond capacity and
    /// duplicate keys are refused.
    pub fn put(&self, query: &str, tier: Tier, record: &ResultRecord) -> bool {
        if record.profile.media().any() {
            return false;
        }

        let mut entries = self.lock();
        let key = Self::key(query, tier);
        if entries.len() >= self.capacity || entries.contains_key(&key) {
            return false;
        }
        entries.insert(key, record.clone());
        debug!(%tier, cached = entries.len(), "result cached");
        true
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            cached_count: self.len(),
            limit: self.capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clarity_core::MediaFlags;
    use clarity_router::QueryAnalyzer;

    fn record(query: &str, media: MediaFlags) -> ResultRecord {
        ResultRecord {
            answer: Some(format!("answer to {query}")),
            explanation: None,
            profile: QueryAnalyzer::default().analyze(query, media),
            model: "m".into(),
            model_display_name: "M".into(),
            success: true,
            failure: None,
            error: None,
            elapsed: Duration::from_secs(2),
            from_cache: false,
            wait_seconds: None,
        }
    }

    #[test]
    fn put_then_get_marks_from_cache() {
        let cache = ResponseCache::new(50);
        assert!(cache.put("What is AI?", Tier::Rapid, &record("What is AI?", MediaFlags::NONE)));

        let hit = cache
            .get("What is AI?", Tier::Rapid, Duration::from_micros(5))
            .unwrap();
        assert!(hit.from_cache);
        assert_eq!(hit.elapsed, Duration::from_micros(5));
        assert_eq!(hit.answer.as_deref(), Some("answer to What is AI?"));
    }

    #[test]
    fn tier_is_part_of_the_key() {
        let cache = ResponseCache::new(50);
        cache.put("What is AI?", Tier::Rapid, &record("What is AI?", MediaFlags::NONE));
        assert!(cache.get("What is AI?", Tier::Advanced, Duration::ZERO).is_none());
    }

    #[test]
    fn query_is_trimmed() {
        let cache = ResponseCache::new(50);
        cache.put("  hello ", Tier::Rapid, &record("hello", MediaFlags::NONE));
        assert!(cache.get("hello", Tier::Rapid, Duration::ZERO).is_some());
    }

    #[test]
    fn insert_at_capacity_is_noop() {
        let cache = ResponseCache::new(50);
        for i in 0..50 {
            let q = format!("query {i}");
            assert!(cache.put(&q, Tier::Rapid, &record(&q, MediaFlags::NONE)));
        }
        assert!(!cache.put("one more", Tier::Rapid, &record("one more", MediaFlags::NONE)));
        assert_eq!(cache.len(), 50);
        assert!(cache.get("one more", Tier::Rapid, Duration::ZERO).is_none());
    }

    #[test]
    fn media_records_are_refused() {
        let cache = ResponseCache::new(50);
        let media = MediaFlags {
            has_image: true,
            ..MediaFlags::NONE
        };
        assert!(!cache.put("describe", Tier::Advanced, &record("describe", media)));
        assert!(cache.is_empty());
    }

    #[test]
    fn first_record_wins() {
        let cache = ResponseCache::new(50);
        let mut first = record("hello", MediaFlags::NONE);
        first.answer = Some("first".into());
        let mut second = first.clone();
        second.answer = Some("second".into());

        assert!(cache.put("hello", Tier::Rapid, &first));
        assert!(!cache.put("hello", Tier::Rapid, &second));
        let hit = cache.get("hello", Tier::Rapid, Duration::ZERO).unwrap();
        assert_eq!(hit.answer.as_deref(), Some("first"));
    }

    #[test]
    fn concurrent_inserts_respect_capacity() {
        let cache = ResponseCache::new(10);
        std::thread::scope(|s| {
            for t in 0..4 {
                let cache = &cache;
                s.spawn(move || {
                    for i in 0..10 {
                        let q = format!("t{t} q{i}");
                        cache.put(&q, Tier::Rapid, &record(&q, MediaFlags::NONE));
                    }
                });
            }
        });
        assert_eq!(cache.len(), 10);
    }

    #[test]
    fn clear_and_stats() {
        let cache = ResponseCache::new(50);
        cache.put("hello", Tier::Rapid, &record("hello", MediaFlags::NONE));
        assert_eq!(
            cache.stats(),
            CacheStats {
                cached_count: 1,
                limit: 50
            }
        );
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 50);
    }
}
