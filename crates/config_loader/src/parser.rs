//! Configuration parsing
//!
//! TOML (primary) and JSON.

use contracts::{ContractError, TrackerBlueprint};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn parse_toml(content: &str) -> Result<TrackerBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse_json(content: &str) -> Result<TrackerBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse(content: &str, format: ConfigFormat) -> Result<TrackerBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SinkType;

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[app]
name = "cloudhost"

[[sinks]]
name = "firebase"
sink_type = "firebase"
"#;
        let bp = parse_toml(content).unwrap();
        assert_eq!(bp.app.name, "cloudhost");
        assert_eq!(bp.sinks.len(), 1);
        assert_eq!(bp.sinks[0].sink_type, SinkType::Firebase);
        assert_eq!(bp.sinks[0].queue_capacity, 100);
        assert_eq!(bp.attribution.default_media_source, "direct");
        assert_eq!(bp.attribution.default_deep_link_value, "unknown");
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "app": { "name": "cloudhost", "scheme": "appcms" },
            "attribution": { "default_media_source": "organic_web" },
            "sinks": [
                { "name": "meta", "sink_type": "meta" },
                { "name": "appsflyer", "sink_type": "attribution_platform", "queue_capacity": 8 }
            ]
        }"#;
        let bp = parse_json(content).unwrap();
        assert_eq!(bp.app.scheme.as_deref(), Some("appcms"));
        assert_eq!(bp.attribution.default_media_source, "organic_web");
        assert_eq!(bp.attribution.default_deep_link_value, "unknown");
        assert_eq!(bp.sinks[1].sink_type, SinkType::AttributionPlatform);
        assert_eq!(bp.sinks[1].queue_capacity, 8);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let err = parse_toml("invalid toml [[[").unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_parse_unknown_sink_type() {
        let content = r#"
[app]
name = "x"

[[sinks]]
name = "s"
sink_type = "carrier_pigeon"
"#;
        assert!(parse_toml(content).is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
