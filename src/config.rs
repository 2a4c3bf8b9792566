//! Renderer configuration
//!
//! Component overrides are a JSON object mapping node type names (or tag
//! aliases) to tag names, e.g. `{"paragraph": "div", "em": "i"}`. An empty tag
//! renders the children without a wrapping element. Keys that name no node
//! type are ignored.

use crate::renderer::{Components, Renderer};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid component overrides: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ComponentOverrides {
    pub tags: BTreeMap<String, String>,
}

impl ComponentOverrides {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Replaces the named entries of `components`, keeping the rest.
    pub fn apply(&self, components: Components) -> Components {
        components.with_overrides(self.tags.iter().map(|(name, tag)| {
            let renderer = if tag.is_empty() {
                Renderer::Fragment
            } else {
                Renderer::tag(tag.as_str())
            };
            (name.as_str(), renderer)
        }))
    }

    pub fn into_components(self) -> Components {
        self.apply(Components::default())
    }
}
