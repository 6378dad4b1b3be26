//! `GET /siteinfo/{domain}`

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::models::{LookupResponse, LookupStatus};
use crate::web::{AppState, handle_error};

#[derive(Debug, Default, Deserialize)]
pub struct SiteInfoParams {
    /// Milliseconds to wait for a lookup in progress
    pub timeout: Option<String>,
}

impl SiteInfoParams {
    /// Missing, non-numeric or zero timeouts mean "answer immediately"
    pub fn wait_timeout(&self) -> Option<Duration> {
        self.timeout
            .as_deref()?
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

/// Icon metadata for a domain.
///
/// Responds 200 once the lookup is done and 202 while it is still running.
pub async fn get_site_info(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    Query(params): Query<SiteInfoParams>,
) -> Response {
    // Store key only; the response echoes the domain as requested
    let key = domain.trim().to_ascii_lowercase();
    let timeout = params.wait_timeout();
    debug!("Site info requested for {} (timeout: {:?})", domain, timeout);

    match state.icon_store.query(&key, timeout).await {
        Ok(entry) => {
            let status = match entry.status {
                LookupStatus::Done => StatusCode::OK,
                LookupStatus::Processing | LookupStatus::NotFound => StatusCode::ACCEPTED,
            };
            let body = LookupResponse::from_entry(&domain, &entry, state.icon_format);
            (status, Json(body)).into_response()
        }
        Err(e) => handle_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(timeout: Option<&str>) -> SiteInfoParams {
        SiteInfoParams {
            timeout: timeout.map(str::to_string),
        }
    }

    #[test]
    fn test_wait_timeout_parsing() {
        assert_eq!(params(None).wait_timeout(), None);
        assert_eq!(params(Some("")).wait_timeout(), None);
        assert_eq!(params(Some("abc")).wait_timeout(), None);
        assert_eq!(params(Some("0")).wait_timeout(), None);
        assert_eq!(params(Some("-5")).wait_timeout(), None);
        assert_eq!(
            params(Some("1500")).wait_timeout(),
            Some(Duration::from_millis(1500))
        );
    }
}
