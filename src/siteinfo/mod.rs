//! Site metadata lookup engine
//!
//! Given the home page URL of a site, the engine discovers the icons the site
//! publishes and reports progress through an [`UpdateNotifier`]. Results are
//! partial until the lookup reaches [`QueryState::Ready`].

use bytes::Bytes;

pub mod events;
pub mod fetcher;
pub mod html;
pub mod service;
pub mod testing;

pub use events::{Listener, SubscriptionId, UpdateNotifier};
pub use fetcher::{HttpUrlFetcher, UrlFetcher, UrlResponse};
pub use service::SiteInfoService;
pub use testing::ManualLookupEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Pending,
    Ready,
}

/// An icon found during a lookup, with its payload once downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconCandidate {
    pub width: u32,
    pub height: u32,
    pub url: String,
    pub data: Option<Bytes>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteInfo {
    pub url: String,
    pub icons: Vec<IconCandidate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub state: QueryState,
    pub info: SiteInfo,
}

impl LookupResult {
    pub fn pending(url: &str) -> Self {
        Self {
            state: QueryState::Pending,
            info: SiteInfo {
                url: url.to_string(),
                icons: Vec::new(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == QueryState::Ready
    }
}

/// Contract between the icon store and whatever resolves site icons
pub trait LookupEngine: Send + Sync {
    /// Current result for `url`, starting a lookup if none exists yet.
    /// Repeated calls for the same URL never start duplicate work.
    fn lookup(&self, url: &str) -> LookupResult;

    /// Notifications carrying the lookup URL whenever its result changes
    fn updates(&self) -> &UpdateNotifier;
}
