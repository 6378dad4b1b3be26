//! Utility functions for the siteinfo server
//!
//! - `utils::image` for image sniffing and dimension probing
//! - `utils::url` for lookup URL construction and URL inspection

pub mod image;
pub mod url;

pub use self::image::ImageUtils;
pub use self::url::UrlUtils;
