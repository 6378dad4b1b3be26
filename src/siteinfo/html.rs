//! Icon discovery from a site's HTML

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Locations browsers probe when a page declares no icons
const CONVENTIONAL_ICON_PATHS: &[&str] = &["/favicon.ico", "/apple-touch-icon.png"];

fn link_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?is)<link\b[^>]*>").expect("valid link tag pattern"))
}

fn attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?is)\b([a-z-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
            .expect("valid attribute pattern")
    })
}

fn is_icon_rel(rel: &str) -> bool {
    rel.split_ascii_whitespace().any(|token| {
        let token = token.to_ascii_lowercase();
        token == "icon" || token.starts_with("apple-touch-icon")
    })
}

/// Icon URLs declared by `<link rel="icon">`-style tags, resolved against
/// `base`. Only http(s) URLs are returned, in document order, without
/// duplicates.
pub fn extract_icon_links(html: &str, base: &Url) -> Vec<Url> {
    let mut links: Vec<Url> = Vec::new();

    for tag in link_tag_pattern().find_iter(html) {
        let mut rel = None;
        let mut href = None;

        for attr in attribute_pattern().captures_iter(tag.as_str()) {
            let value = attr
                .get(2)
                .or_else(|| attr.get(3))
                .or_else(|| attr.get(4))
                .map(|m| m.as_str().trim());
            match attr[1].to_ascii_lowercase().as_str() {
                "rel" => rel = value,
                "href" => href = value,
                _ => {}
            }
        }

        let (Some(rel), Some(href)) = (rel, href) else {
            continue;
        };
        if !is_icon_rel(rel) || href.is_empty() {
            continue;
        }

        if let Ok(url) = base.join(href)
            && matches!(url.scheme(), "http" | "https")
            && !links.contains(&url)
        {
            links.push(url);
        }
    }

    links
}

/// Conventional icon locations on the origin of `base`
pub fn conventional_icon_urls(base: &Url) -> Vec<Url> {
    CONVENTIONAL_ICON_PATHS
        .iter()
        .filter_map(|path| base.join(path).ok())
        .collect()
}
