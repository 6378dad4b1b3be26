//! URL utilities for consistent URL handling
//!
//! Lookups are keyed by the canonical home page URL of a domain, while cache
//! entries are keyed by the domain itself. These helpers convert between the
//! two and extract the pieces of icon URLs the web layer needs.

use url::Url;

/// URL utilities for consistent URL handling
pub struct UrlUtils;

impl UrlUtils {
    /// Canonical lookup URL for a domain
    ///
    /// # Examples
    ///
    /// ```rust
    /// use siteinfo_server::utils::url::UrlUtils;
    ///
    /// assert_eq!(UrlUtils::url_for_domain("example.com", true), "https://example.com/");
    /// assert_eq!(UrlUtils::url_for_domain("localhost:8080", false), "http://localhost:8080/");
    /// ```
    pub fn url_for_domain(domain: &str, secure: bool) -> String {
        let scheme = if secure { "https" } else { "http" };
        format!("{scheme}://{domain}/")
    }

    /// Domain (host plus explicit port) a URL belongs to
    ///
    /// Falls back to the input when it cannot be parsed.
    ///
    /// ```rust
    /// use siteinfo_server::utils::url::UrlUtils;
    ///
    /// assert_eq!(UrlUtils::domain_for_url("https://example.com/"), "example.com");
    /// assert_eq!(UrlUtils::domain_for_url("http://localhost:7561/"), "localhost:7561");
    /// ```
    pub fn domain_for_url(url: &str) -> String {
        match Url::parse(url) {
            Ok(parsed) => match (parsed.host_str(), parsed.port()) {
                (Some(host), Some(port)) => format!("{host}:{port}"),
                (Some(host), None) => host.to_string(),
                (None, _) => url.to_string(),
            },
            Err(_) => url.to_string(),
        }
    }

    /// Last segment of the URL path, used as a download filename
    ///
    /// ```rust
    /// use siteinfo_server::utils::url::UrlUtils;
    ///
    /// assert_eq!(UrlUtils::filename("https://example.com/img/icon.png?v=2"), "icon.png");
    /// ```
    pub fn filename(url: &str) -> String {
        let path = match Url::parse(url) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
        };

        path.rsplit('/').next().unwrap_or_default().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_domain() {
        for domain in ["example.com", "localhost:7561", "127.0.0.1:8060"] {
            let url = UrlUtils::url_for_domain(domain, true);
            assert_eq!(UrlUtils::domain_for_url(&url), domain);
        }
    }

    #[test]
    fn test_default_port_is_dropped() {
        assert_eq!(
            UrlUtils::domain_for_url("https://example.com:443/"),
            "example.com"
        );
    }

    #[test]
    fn test_filename() {
        assert_eq!(
            UrlUtils::filename("https://example.com/favicon.ico"),
            "favicon.ico"
        );
        assert_eq!(UrlUtils::filename("https://example.com/"), "");
        assert_eq!(UrlUtils::filename("not a url/icon.png#frag"), "icon.png");
    }
}
