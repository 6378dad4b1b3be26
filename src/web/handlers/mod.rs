//! HTTP request handlers organized by route

pub mod health;
pub mod icondata;
pub mod siteinfo;
