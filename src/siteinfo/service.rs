//! Network-backed lookup engine
//!
//! A lookup fetches the site's home page, collects icon candidates from its
//! `<link>` tags plus the conventional favicon locations, downloads every
//! candidate concurrently and publishes an update each time an icon is
//! measured. When all candidates have settled the lookup becomes `Ready`.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use super::html;
use super::{IconCandidate, LookupEngine, LookupResult, QueryState, UpdateNotifier, UrlFetcher};
use crate::utils::ImageUtils;

struct ServiceInner {
    fetcher: Arc<dyn UrlFetcher>,
    queries: DashMap<String, LookupResult>,
    updated: UpdateNotifier,
}

/// Lookup engine that crawls sites over HTTP(S)
#[derive(Clone)]
pub struct SiteInfoService {
    inner: Arc<ServiceInner>,
}

impl SiteInfoService {
    pub fn new(fetcher: Arc<dyn UrlFetcher>) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                fetcher,
                queries: DashMap::new(),
                updated: UpdateNotifier::new(),
            }),
        }
    }
}

impl LookupEngine for SiteInfoService {
    fn lookup(&self, url: &str) -> LookupResult {
        let pending = match self.inner.queries.entry(url.to_string()) {
            Entry::Occupied(existing) => return existing.get().clone(),
            Entry::Vacant(slot) => slot.insert(LookupResult::pending(url)).value().clone(),
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(self.inner.clone().crawl(url.to_string()));
            }
            Err(e) => warn!("Cannot start lookup for {} outside a runtime: {}", url, e),
        }

        pending
    }

    fn updates(&self) -> &UpdateNotifier {
        &self.inner.updated
    }
}

impl ServiceInner {
    async fn crawl(self: Arc<Self>, lookup_url: String) {
        debug!("Crawling {}", lookup_url);

        let page_url = match Url::parse(&lookup_url) {
            Ok(url) => url,
            Err(e) => {
                warn!("Invalid lookup URL {}: {}", lookup_url, e);
                self.finish(&lookup_url);
                return;
            }
        };

        let mut base = page_url;
        let mut candidates = Vec::new();
        match self.fetcher.fetch(&lookup_url).await {
            Ok(response) if response.is_success() => {
                if let Ok(final_url) = Url::parse(&response.url) {
                    base = final_url;
                }
                let page = String::from_utf8_lossy(&response.body);
                candidates = html::extract_icon_links(&page, &base);
                debug!("Found {} icon links on {}", candidates.len(), base);
            }
            Ok(response) => warn!("Fetching {} returned HTTP {}", lookup_url, response.status),
            Err(e) => warn!("Fetching {} failed: {}", lookup_url, e),
        }

        // Relative to wherever the home page redirected to
        for url in html::conventional_icon_urls(&base) {
            if !candidates.contains(&url) {
                candidates.push(url);
            }
        }

        let fetches = candidates
            .into_iter()
            .map(|icon_url| self.clone().fetch_icon(&lookup_url, icon_url));
        join_all(fetches).await;

        self.finish(&lookup_url);
    }

    async fn fetch_icon(self: Arc<Self>, lookup_url: &str, icon_url: Url) {
        let response = match self.fetcher.fetch(icon_url.as_str()).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                debug!("Icon {} returned HTTP {}", icon_url, response.status);
                return;
            }
            Err(e) => {
                warn!("Fetching icon {} failed: {}", icon_url, e);
                return;
            }
        };

        let Some((width, height)) = ImageUtils::dimensions(&response.body) else {
            debug!("Ignoring {}: not a readable image", icon_url);
            return;
        };

        let icon = IconCandidate {
            width,
            height,
            url: icon_url.to_string(),
            data: Some(response.body),
        };

        if let Some(mut query) = self.queries.get_mut(lookup_url) {
            query.info.icons.retain(|existing| existing.url != icon.url);
            query.info.icons.push(icon);
        }

        self.updated.publish(lookup_url);
    }

    fn finish(&self, lookup_url: &str) {
        let icon_count = match self.queries.get_mut(lookup_url) {
            Some(mut query) => {
                query.state = QueryState::Ready;
                query.info.icons.len()
            }
            None => 0,
        };

        info!("Site info for {} ready with {} icons", lookup_url, icon_count);
        self.updated.publish(lookup_url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AppError, AppResult};
    use crate::siteinfo::UrlResponse;
    use async_trait::async_trait;
    use bytes::Bytes;
    use image::{ImageFormat, RgbaImage};
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn png(size: u32) -> Bytes {
        let mut out = Cursor::new(Vec::new());
        RgbaImage::new(size, size)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        Bytes::from(out.into_inner())
    }

    #[derive(Default)]
    struct StaticFetcher {
        pages: HashMap<String, Bytes>,
        fetched: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        fn with(mut self, url: &str, body: Bytes) -> Self {
            self.pages.insert(url.to_string(), body);
            self
        }

        fn fetch_count(&self, url: &str) -> usize {
            self.fetched.lock().unwrap().iter().filter(|u| *u == url).count()
        }
    }

    #[async_trait]
    impl UrlFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> AppResult<UrlResponse> {
            self.fetched.lock().unwrap().push(url.to_string());
            match self.pages.get(url) {
                Some(body) => Ok(UrlResponse {
                    status: 200,
                    url: url.to_string(),
                    body: body.clone(),
                }),
                None if url.ends_with(".ico") => {
                    Err(AppError::lookup_failure(url, "connection refused"))
                }
                None => Ok(UrlResponse {
                    status: 404,
                    url: url.to_string(),
                    body: Bytes::new(),
                }),
            }
        }
    }

    async fn wait_ready(service: &SiteInfoService, url: &str) -> LookupResult {
        for _ in 0..200 {
            let result = service.lookup(url);
            if result.is_ready() {
                return result;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("lookup for {url} never became ready");
    }

    #[tokio::test]
    async fn test_crawl_collects_linked_and_conventional_icons() {
        let html = r#"<html><head>
            <link rel="icon" href="/static/icon-48.png">
            <link rel="stylesheet" href="/site.css">
        </head></html>"#;
        let fetcher = Arc::new(
            StaticFetcher::default()
                .with("https://example.com/", Bytes::from_static(html.as_bytes()))
                .with("https://example.com/static/icon-48.png", png(48))
                .with("https://example.com/apple-touch-icon.png", png(144)),
        );
        let service = SiteInfoService::new(fetcher.clone());

        let updates = Arc::new(AtomicUsize::new(0));
        let counter = updates.clone();
        service.updates().listen(move |url| {
            assert_eq!(url, "https://example.com/");
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let first = service.lookup("https://example.com/");
        assert_eq!(first.state, QueryState::Pending);

        let result = wait_ready(&service, "https://example.com/").await;
        let mut sizes: Vec<(u32, String)> = result
            .info
            .icons
            .iter()
            .map(|icon| (icon.width, icon.url.clone()))
            .collect();
        sizes.sort();

        assert_eq!(
            sizes,
            vec![
                (48, "https://example.com/static/icon-48.png".to_string()),
                (144, "https://example.com/apple-touch-icon.png".to_string()),
            ]
        );
        assert!(result.info.icons.iter().all(|icon| icon.data.is_some()));
        // Two icon updates plus the final ready notification
        assert_eq!(updates.load(Ordering::SeqCst), 3);
        // Repeated lookups never re-crawl
        assert_eq!(fetcher.fetch_count("https://example.com/"), 1);
    }

    #[tokio::test]
    async fn test_unreachable_site_still_becomes_ready() {
        let service = SiteInfoService::new(Arc::new(StaticFetcher::default()));

        service.lookup("https://down.example/");
        let result = wait_ready(&service, "https://down.example/").await;

        assert!(result.info.icons.is_empty());
    }

    #[tokio::test]
    async fn test_non_image_payloads_are_skipped() {
        let fetcher = Arc::new(
            StaticFetcher::default()
                .with("https://example.com/", Bytes::from_static(b"<html></html>"))
                .with(
                    "https://example.com/apple-touch-icon.png",
                    Bytes::from_static(b"<html>not found</html>"),
                ),
        );
        let service = SiteInfoService::new(fetcher);

        service.lookup("https://example.com/");
        let result = wait_ready(&service, "https://example.com/").await;

        assert!(result.info.icons.is_empty());
    }
}
