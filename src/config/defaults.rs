//! Configuration default values

// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8060;

// Lookup defaults
pub const DEFAULT_SECURE_FETCH: bool = true;
pub const DEFAULT_REQUEST_TIMEOUT: &str = "30s";
pub const DEFAULT_MAX_REDIRECTS: usize = 5;
pub const DEFAULT_MAX_BODY_BYTES: u64 = 4 * 1024 * 1024;
pub const DEFAULT_USER_AGENT: &str = concat!("siteinfo-server/", env!("CARGO_PKG_VERSION"));
