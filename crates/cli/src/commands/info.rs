//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use contracts::TrackerBlueprint;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    app: AppInfo,
    attribution: AttributionInfo,
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct AppInfo {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scheme: Option<String>,
}

#[derive(Serialize)]
struct AttributionInfo {
    default_media_source: String,
    default_deep_link_value: String,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    params: HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&build_config_info(&blueprint))
            .context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint);
    }

    Ok(())
}

fn build_config_info(blueprint: &TrackerBlueprint) -> ConfigInfo {
    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        app: AppInfo {
            name: blueprint.app.name.clone(),
            scheme: blueprint.app.scheme.clone(),
        },
        attribution: AttributionInfo {
            default_media_source: blueprint.attribution.default_media_source.clone(),
            default_deep_link_value: blueprint.attribution.default_deep_link_value.clone(),
        },
        sinks: blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
                params: s.params.clone(),
            })
            .collect(),
    }
}

fn print_config_info(blueprint: &TrackerBlueprint) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Tracker Configuration                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📱 App");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Name: {}", blueprint.app.name);
    match &blueprint.app.scheme {
        Some(scheme) => println!("   └─ Scheme: {}://", scheme),
        None => println!("   └─ Scheme: (none)"),
    }

    let attribution = &blueprint.attribution;
    println!("\n🔗 Attribution Defaults");
    println!("   ├─ Media Source: {}", attribution.default_media_source);
    println!("   └─ Deep Link Value: {}", attribution.default_deep_link_value);

    println!("\n📤 Sinks ({})", blueprint.sinks.len());
    for (i, sink) in blueprint.sinks.iter().enumerate() {
        let prefix = if i == blueprint.sinks.len() - 1 { "└─" } else { "├─" };
        println!(
            "   {} {} ({:?}, queue {})",
            prefix, sink.name, sink.sink_type, sink.queue_capacity
        );
    }

    println!();
}
