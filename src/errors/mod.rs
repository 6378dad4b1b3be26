//! Centralized error handling for the siteinfo server
//!
//! All layers report failures through [`AppError`]. The web layer maps each
//! variant onto an HTTP status code and a JSON `{message}` body.
//!
//! # Error Categories
//!
//! - **Not Found**: icon bytes that were never cached
//! - **Validation**: malformed or missing request parameters
//! - **Lookup Failures**: errors raised while crawling a site or fetching icons
//! - **Configuration**: invalid settings detected at startup
//!
//! # Usage
//!
//! ```rust
//! use siteinfo_server::errors::{AppError, AppResult};
//!
//! fn require_src(src: Option<&str>) -> AppResult<&str> {
//!     src.ok_or_else(|| AppError::validation("No source icon URL specified"))
//! }
//!
//! assert!(require_src(None).is_err());
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
