//! Site icon lookup service
//!
//! Resolves the icons a website publishes, caches their metadata and bytes in
//! memory and serves both over a small JSON API.

pub mod config;
pub mod errors;
pub mod icon_store;
pub mod models;
pub mod siteinfo;
pub mod utils;
pub mod web;
