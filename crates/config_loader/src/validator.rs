//! Configuration validation
//!
//! Rules:
//! - at least one sink
//! - sink names non-empty and unique
//! - queue_capacity > 0
//! - network sinks carry a parseable `addr`
//! - attribution defaults non-empty

use std::collections::HashSet;
use std::net::SocketAddr;

use contracts::{ContractError, SinkType, TrackerBlueprint};

/// Validate a TrackerBlueprint
///
/// Returns the first error encountered.
pub fn validate(blueprint: &TrackerBlueprint) -> Result<(), ContractError> {
    validate_app(blueprint)?;
    validate_attribution(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

fn validate_app(blueprint: &TrackerBlueprint) -> Result<(), ContractError> {
    if blueprint.app.name.trim().is_empty() {
        return Err(ContractError::config_validation(
            "app.name",
            "app name cannot be empty",
        ));
    }
    Ok(())
}

fn validate_attribution(blueprint: &TrackerBlueprint) -> Result<(), ContractError> {
    let attribution = &blueprint.attribution;
    if attribution.default_media_source.trim().is_empty() {
        return Err(ContractError::config_validation(
            "attribution.default_media_source",
            "default media source cannot be empty",
        ));
    }
    if attribution.default_deep_link_value.trim().is_empty() {
        return Err(ContractError::config_validation(
            "attribution.default_deep_link_value",
            "default deep link value cannot be empty",
        ));
    }
    Ok(())
}

fn validate_sinks(blueprint: &TrackerBlueprint) -> Result<(), ContractError> {
    if blueprint.sinks.is_empty() {
        return Err(ContractError::config_validation(
            "sinks",
            "at least one sink is required",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be > 0",
            ));
        }
        if sink.sink_type == SinkType::Network {
            let addr = sink.params.get("addr").ok_or_else(|| {
                ContractError::config_validation(
                    format!("sinks[{}].params.addr", sink.name),
                    "network sink requires 'addr'",
                )
            })?;
            addr.parse::<SocketAddr>().map_err(|e| {
                ContractError::config_validation(
                    format!("sinks[{}].params.addr", sink.name),
                    format!("invalid address '{}': {}", addr, e),
                )
            })?;
        }
    }
    Ok(())
}
