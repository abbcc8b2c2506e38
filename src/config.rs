use crate::error::AmlError;
use serde::{Deserialize, Serialize};

/// Options for HTML rendering. Missing fields take their defaults when
/// deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Emit an embed placeholder after links to YouTube videos.
    pub youtube_embeds: bool,
    /// Prefix for `[[wikilink]]` targets.
    pub wikipedia_base_url: String,
    /// Emit the collapse toggle inside multi-line quotes.
    pub collapsible_quotes: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            youtube_embeds: true,
            wikipedia_base_url: "https://en.wikipedia.org/wiki/".to_string(),
            collapsible_quotes: true,
        }
    }
}

impl RenderConfig {
    /// # Errors
    /// Returns `AmlError::Config` if the JSON does not describe a `RenderConfig`.
    pub fn from_json(source: &str) -> Result<Self, AmlError> {
        serde_json::from_str(source).map_err(|e| AmlError::Config {
            message: e.to_string(),
        })
    }

    /// # Errors
    /// Returns `AmlError::Config` if the YAML does not describe a `RenderConfig`.
    pub fn from_yaml(source: &str) -> Result<Self, AmlError> {
        serde_yaml::from_str(source).map_err(|e| AmlError::Config {
            message: e.to_string(),
        })
    }
}
