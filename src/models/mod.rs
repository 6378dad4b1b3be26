use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod lookup_response;

pub use lookup_response::{IconListFormat, LookupIcons, LookupResponse, LookupResponseIcon};

/// A single icon discovered for a site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconDescriptor {
    pub width: u32,
    pub height: u32,
    pub source_url: String,
}

/// Lifecycle of a domain lookup
///
/// `NotFound` is never stored; it describes a domain with no cache entry.
/// `Processing` moves to `Done` at most once and `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupStatus {
    NotFound,
    Processing,
    Done,
}

impl LookupStatus {
    /// Status string used on the wire. Unknown domains are reported as
    /// still processing.
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupStatus::NotFound | LookupStatus::Processing => "processing",
            LookupStatus::Done => "done",
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, LookupStatus::Processing)
    }
}

/// Per-domain cache record held by the icon store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconStoreEntry {
    pub icons: Vec<IconDescriptor>,
    pub status: LookupStatus,
    pub submitted: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl IconStoreEntry {
    /// Fresh entry for a lookup that has just been submitted
    pub fn processing() -> Self {
        let now = Utc::now();
        Self {
            icons: Vec::new(),
            status: LookupStatus::Processing,
            submitted: now,
            last_modified: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_entry() {
        let entry = IconStoreEntry::processing();
        assert!(entry.icons.is_empty());
        assert_eq!(entry.status, LookupStatus::Processing);
        assert_eq!(entry.submitted, entry.last_modified);
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(LookupStatus::NotFound.as_str(), "processing");
        assert_eq!(LookupStatus::Processing.as_str(), "processing");
        assert_eq!(LookupStatus::Done.as_str(), "done");
    }
}
