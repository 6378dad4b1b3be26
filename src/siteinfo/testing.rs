//! Lookup engine driven by hand
//!
//! `ManualLookupEngine` never touches the network. Lookups stay pending until
//! the caller reports results with [`ManualLookupEngine::report`], which makes
//! it possible to exercise the icon store and the HTTP layer deterministically.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{IconCandidate, LookupEngine, LookupResult, QueryState, SiteInfo, UpdateNotifier};

#[derive(Default)]
pub struct ManualLookupEngine {
    results: Mutex<HashMap<String, LookupResult>>,
    lookup_calls: Mutex<Vec<String>>,
    updated: UpdateNotifier,
}

impl ManualLookupEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the result for `url` and notify listeners
    pub fn report(&self, url: &str, state: QueryState, icons: Vec<IconCandidate>) {
        {
            let mut results = lock(&self.results);
            results.insert(
                url.to_string(),
                LookupResult {
                    state,
                    info: SiteInfo {
                        url: url.to_string(),
                        icons,
                    },
                },
            );
        }
        self.updated.publish(url);
    }

    /// Number of `lookup` calls made for `url`
    pub fn lookup_count(&self, url: &str) -> usize {
        lock(&self.lookup_calls)
            .iter()
            .filter(|called| called.as_str() == url)
            .count()
    }

    /// Number of distinct URLs the engine has been asked to resolve
    pub fn started_lookups(&self) -> usize {
        lock(&self.results).len()
    }
}

impl LookupEngine for ManualLookupEngine {
    fn lookup(&self, url: &str) -> LookupResult {
        lock(&self.lookup_calls).push(url.to_string());
        lock(&self.results)
            .entry(url.to_string())
            .or_insert_with(|| LookupResult::pending(url))
            .clone()
    }

    fn updates(&self) -> &UpdateNotifier {
        &self.updated
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
