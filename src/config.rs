//! Loader configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How fetched content is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStrategy {
    /// Always parse the content as the JSON track format
    Json,
    /// Use the binary parser when the content starts with the GLB magic,
    /// otherwise parse JSON
    #[default]
    Sniff,
    /// Always hand the content to the VRM animation parser and attach the
    /// model's skeleton to the result
    VrmAnimation,
}

/// Settings shared by every load issued through one loader
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Prefix prepended to every requested URL
    pub path: String,
    /// Headers sent with every request
    pub request_headers: BTreeMap<String, String>,
    /// Whether requests carry credentials
    pub with_credentials: bool,
    pub strategy: ContentStrategy,
}

impl LoaderConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Full URL for a request, the path prefix joined with the URL
    pub fn resolve(&self, url: &str) -> String {
        format!("{}{url}", self.path)
    }
}
