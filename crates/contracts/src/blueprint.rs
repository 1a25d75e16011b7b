//! TrackerBlueprint - Config Loader output
//!
//! Describes the tracking setup: application identity, attribution defaults
//! and output routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerBlueprint {
    #[serde(default)]
    pub version: ConfigVersion,

    /// Host application settings
    pub app: AppConfig,

    /// Attribution classification defaults
    #[serde(default)]
    pub attribution: AttributionConfig,

    /// Output routing
    pub sinks: Vec<SinkConfig>,
}

/// Host application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name (logs only)
    pub name: String,

    /// Deep-link scheme registered by the host (informational)
    #[serde(default)]
    pub scheme: Option<String>,
}

/// Defaults applied when a deep-link payload omits a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionConfig {
    #[serde(default = "default_media_source")]
    pub default_media_source: String,

    #[serde(default = "default_deep_link_value")]
    pub default_deep_link_value: String,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            default_media_source: default_media_source(),
            default_deep_link_value: default_deep_link_value(),
        }
    }
}

fn default_media_source() -> String {
    "direct".to_string()
}

fn default_deep_link_value() -> String {
    "unknown".to_string()
}

/// Sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name, unique per blueprint
    pub name: String,

    pub sink_type: SinkType,

    /// Worker queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Firebase-style analytics
    Firebase,
    /// Meta app events
    Meta,
    /// Attribution platform in-app events
    AttributionPlatform,
    /// Tracing summary
    Log,
    /// JSON-lines journal
    File,
    /// UDP relay
    Network,
}
