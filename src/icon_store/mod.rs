//! In-memory icon lookup cache
//!
//! The store owns two caches for the lifetime of the process:
//!
//! - a metadata cache keyed by domain, holding an [`IconStoreEntry`] per
//!   domain that has ever been looked up
//! - a data cache keyed by icon source URL, holding raw icon bytes once the
//!   lookup engine has downloaded them
//!
//! Lookups are deduplicated per domain. Entries are created in `Processing`
//! state and move to `Done` when the engine reports the lookup ready. Nothing
//! is evicted or refreshed.

use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::errors::{AppError, AppResult};
use crate::models::{IconDescriptor, IconStoreEntry, LookupStatus};
use crate::siteinfo::{LookupEngine, LookupResult, SubscriptionId};
use crate::utils::UrlUtils;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconStoreOptions {
    /// Fetch site home pages over HTTPS
    pub secure_fetch: bool,
}

impl Default for IconStoreOptions {
    fn default() -> Self {
        Self { secure_fetch: true }
    }
}

#[derive(Default)]
struct Caches {
    metadata: DashMap<String, IconStoreEntry>,
    data: DashMap<String, Bytes>,
    /// Lookup URL → domain key it was requested under
    lookup_domains: DashMap<String, String>,
}

impl Caches {
    fn get(&self, domain: &str) -> Option<IconStoreEntry> {
        self.metadata.get(domain).map(|entry| entry.value().clone())
    }

    /// Snapshot of the entry once it has left `Processing`
    fn finished(&self, domain: &str) -> Option<IconStoreEntry> {
        self.get(domain).filter(|entry| !entry.status.is_processing())
    }

    fn ensure_entry(&self, domain: &str) -> IconStoreEntry {
        self.metadata
            .entry(domain.to_string())
            .or_insert_with(IconStoreEntry::processing)
            .value()
            .clone()
    }

    fn remember_lookup(&self, url: &str, domain: &str) {
        self.lookup_domains
            .entry(url.to_string())
            .or_insert_with(|| domain.to_string());
    }

    /// Domain key for a lookup URL. URL parsing normalises hosts (default
    /// ports, IDN), so the key recorded at lookup time wins.
    fn domain_for_lookup(&self, url: &str) -> String {
        self.lookup_domains
            .get(url)
            .map(|domain| domain.value().clone())
            .unwrap_or_else(|| UrlUtils::domain_for_url(url))
    }

    fn apply_update(&self, result: &LookupResult) {
        let domain = self.domain_for_lookup(&result.info.url);

        {
            let mut entry = self
                .metadata
                .entry(domain.clone())
                .or_insert_with(IconStoreEntry::processing);

            entry.icons = result
                .info
                .icons
                .iter()
                .map(|icon| IconDescriptor {
                    width: icon.width,
                    height: icon.height,
                    source_url: icon.url.clone(),
                })
                .collect();
            entry.last_modified = Utc::now();

            info!(
                "Icons updated for {}, total {}",
                domain,
                entry.icons.len()
            );

            if result.is_ready() && entry.status.is_processing() {
                entry.status = LookupStatus::Done;
                info!(
                    "Icon lookup for {} completed in {} ms",
                    domain,
                    (entry.last_modified - entry.submitted).num_milliseconds()
                );
            }
        }

        for icon in &result.info.icons {
            if let Some(data) = &icon.data {
                self.data.insert(icon.url.clone(), data.clone());
            }
        }
    }
}

struct StoreInner {
    caches: Arc<Caches>,
    engine: Arc<dyn LookupEngine>,
    options: IconStoreOptions,
    update_subscription: SubscriptionId,
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        self.engine.updates().ignore(self.update_subscription);
    }
}

/// Pending result of a waiting `query`, settled by whichever of the
/// completion listener or the timeout gets there first
type SettleSlot = Arc<Mutex<Option<oneshot::Sender<IconStoreEntry>>>>;

fn settle_once(slot: &SettleSlot, entry: IconStoreEntry) {
    let sender = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(sender) = sender {
        let _ = sender.send(entry);
    }
}

/// Icon metadata and data cache in front of a lookup engine
#[derive(Clone)]
pub struct IconStore {
    inner: Arc<StoreInner>,
}

impl IconStore {
    /// Create a store and subscribe it to the engine's update notifications
    pub fn new(engine: Arc<dyn LookupEngine>, options: IconStoreOptions) -> Self {
        let caches = Arc::new(Caches::default());

        let handler_caches = caches.clone();
        let handler_engine = Arc::downgrade(&engine);
        let update_subscription = engine.updates().listen(move |url| {
            if let Some(engine) = handler_engine.upgrade() {
                handler_caches.apply_update(&engine.lookup(url));
            }
        });

        Self {
            inner: Arc::new(StoreInner {
                caches,
                engine,
                options,
                update_subscription,
            }),
        }
    }

    /// Entry for `domain`, starting a lookup if the domain is unknown.
    ///
    /// Known domains are answered from the cache whatever their status. For a
    /// new lookup with a `timeout`, waits until the engine reports the lookup
    /// finished or the timeout elapses, then returns the entry as it stands.
    pub async fn query(
        &self,
        domain: &str,
        timeout: Option<Duration>,
    ) -> AppResult<IconStoreEntry> {
        if let Some(entry) = self.inner.caches.get(domain) {
            return Ok(entry);
        }

        let entry = self.lookup(domain);
        match timeout {
            Some(timeout) if entry.status.is_processing() => {
                Ok(self.wait_for_completion(domain, timeout).await)
            }
            _ => Ok(entry),
        }
    }

    /// Ask the engine to resolve `domain` and make sure an entry exists.
    ///
    /// Safe to call repeatedly and concurrently: only the first call creates
    /// the entry and the engine deduplicates by lookup URL.
    pub fn lookup(&self, domain: &str) -> IconStoreEntry {
        let url = self.url_for_domain(domain);
        info!("Starting lookup for {} ({})", domain, url);

        // Recorded first: the engine may publish before `lookup` returns
        self.inner.caches.remember_lookup(&url, domain);
        self.inner.engine.lookup(&url);
        self.inner.caches.ensure_entry(domain)
    }

    /// Cached bytes for an icon. Never starts a fetch.
    pub fn fetch_data(&self, source_url: &str) -> AppResult<Bytes> {
        self.inner
            .caches
            .data
            .get(source_url)
            .map(|data| data.value().clone())
            .ok_or_else(|| AppError::not_found("icon", source_url))
    }

    /// Number of domains with a cache entry
    pub fn entry_count(&self) -> usize {
        self.inner.caches.metadata.len()
    }

    /// Number of icons whose bytes are cached
    pub fn cached_icon_count(&self) -> usize {
        self.inner.caches.data.len()
    }

    fn url_for_domain(&self, domain: &str) -> String {
        UrlUtils::url_for_domain(domain, self.inner.options.secure_fetch)
    }

    async fn wait_for_completion(&self, domain: &str, timeout: Duration) -> IconStoreEntry {
        let lookup_url = self.url_for_domain(domain);
        let (sender, receiver) = oneshot::channel();
        let slot: SettleSlot = Arc::new(Mutex::new(Some(sender)));

        // Registered after the store's own update handler, so the entry has
        // already been updated by the time this runs.
        let subscription = {
            let caches = self.inner.caches.clone();
            let slot = slot.clone();
            let domain = domain.to_string();
            self.inner.engine.updates().listen(move |url| {
                if url != lookup_url {
                    return;
                }
                if let Some(entry) = caches.finished(&domain) {
                    settle_once(&slot, entry);
                }
            })
        };

        // The lookup may have finished before the listener was registered
        if let Some(entry) = self.inner.caches.finished(domain) {
            settle_once(&slot, entry);
        }

        let outcome = tokio::time::timeout(timeout, receiver).await;
        self.inner.engine.updates().ignore(subscription);

        match outcome {
            Ok(Ok(entry)) => entry,
            _ => {
                // Late notifications become no-ops
                slot.lock().unwrap_or_else(PoisonError::into_inner).take();
                debug!(
                    "Lookup for {} still processing after {} ms",
                    domain,
                    timeout.as_millis()
                );
                self.inner.caches.ensure_entry(domain)
            }
        }
    }
}
