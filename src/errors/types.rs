//! Error type definitions for the siteinfo server
//!
//! The icon store never fails for a well-formed domain. Most variants
//! originate in the lookup engine or at the HTTP boundary.

use thiserror::Error;

/// Top-level application error type
///
/// Uses `thiserror` to provide the error trait implementations and
/// conversions from the underlying HTTP client error.
#[derive(Error, Debug)]
pub enum AppError {
    /// Requested item is not cached
    #[error("Not found: {resource} {id}")]
    NotFound { resource: String, id: String },

    /// Missing or malformed request input
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Failure while resolving a site or fetching one of its icons
    #[error("Lookup failed for {url}: {message}")]
    LookupFailure { url: String, message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AppError {
    /// Create a not found error for a specific resource
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a lookup failure for the URL being resolved
    pub fn lookup_failure<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::LookupFailure {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
