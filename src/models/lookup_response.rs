//! Wire format for `/siteinfo` responses
//!
//! The icon list has two renderings selected by configuration: a list of
//! icon objects, or a compact map from `"<width>x<height>"` to source URL.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{IconDescriptor, IconStoreEntry};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconListFormat {
    #[default]
    List,
    DimensionMap,
}

impl IconListFormat {
    pub fn render(&self, icons: &[IconDescriptor]) -> LookupIcons {
        match self {
            IconListFormat::List => {
                LookupIcons::List(icons.iter().map(LookupResponseIcon::from).collect())
            }
            IconListFormat::DimensionMap => LookupIcons::ByDimension(
                icons
                    .iter()
                    .map(|icon| {
                        (
                            format!("{}x{}", icon.width, icon.height),
                            icon.source_url.clone(),
                        )
                    })
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponseIcon {
    pub width: u32,
    pub height: u32,
    pub source_url: String,
    pub data_url: String,
}

impl LookupResponseIcon {
    /// Path on this server that serves the cached bytes for `source_url`
    pub fn data_url(source_url: &str) -> String {
        format!("/icondata?src={}", urlencoding::encode(source_url))
    }
}

impl From<&IconDescriptor> for LookupResponseIcon {
    fn from(icon: &IconDescriptor) -> Self {
        Self {
            width: icon.width,
            height: icon.height,
            source_url: icon.source_url.clone(),
            data_url: Self::data_url(&icon.source_url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LookupIcons {
    List(Vec<LookupResponseIcon>),
    ByDimension(BTreeMap<String, String>),
}

impl LookupIcons {
    pub fn len(&self) -> usize {
        match self {
            LookupIcons::List(icons) => icons.len(),
            LookupIcons::ByDimension(icons) => icons.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    pub domain: String,
    pub icons: LookupIcons,
    /// Unix timestamp (seconds)
    pub last_modified: i64,
    pub status: String,
    /// Unix timestamp (seconds)
    pub submitted: i64,
}

impl LookupResponse {
    pub fn from_entry(domain: &str, entry: &IconStoreEntry, format: IconListFormat) -> Self {
        Self {
            domain: domain.to_string(),
            icons: format.render(&entry.icons),
            last_modified: entry.last_modified.timestamp(),
            status: entry.status.as_str().to_string(),
            submitted: entry.submitted.timestamp(),
        }
    }
}
