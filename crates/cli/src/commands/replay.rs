//! `replay` command implementation.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use contracts::{ConversionCallback, DeepLinkCallback, FlagStore};
use session::{
    AttributionListener, ConversionOutcome, DispatchReport, FileFlagStore, MemoryFlagStore,
    TrackingSession,
};

use crate::cli::ReplayArgs;
use crate::error::CliError;

/// One scripted host action
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptAction {
    Launch,
    SignUp { email: String },
    Logout,
    Deposit { value: f64, currency: String },
    CreateInstance { product_id: String },
    ScreenView { screen_name: String },
    Conversion { payload: ConversionCallback },
    DeepLink { payload: DeepLinkCallback },
}

/// Parse a JSONL script; blank lines and `#` comments are skipped
pub fn parse_script(content: &str) -> crate::error::Result<Vec<ScriptAction>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| CliError::script_parse(idx + 1, e.to_string()))
        })
        .collect()
}

/// Execute the `replay` command
pub async fn run_replay(args: &ReplayArgs) -> Result<()> {
    info!(config = %args.config.display(), script = %args.script.display(), "Loading replay");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let script = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script {}", args.script.display()))?;
    let actions = parse_script(&script)?;

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    info!(
        app = %blueprint.app.name,
        sinks = blueprint.sinks.len(),
        actions = actions.len(),
        "Configuration loaded"
    );

    let mut session = TrackingSession::from_blueprint(&blueprint)
        .await
        .context("Failed to start tracking session")?;

    let result = match args.state.as_deref() {
        Some(path) => {
            let mut store = open_state(path)?;
            replay(&mut session, &mut store, actions, args.json).await
        }
        None => {
            let mut store = MemoryFlagStore::new();
            replay(&mut session, &mut store, actions, args.json).await
        }
    };

    if !args.json {
        println!("\n{}", session.stats());
    }
    session.shutdown().await;
    info!("Replay finished");
    result
}

fn open_state(path: &Path) -> Result<FileFlagStore> {
    FileFlagStore::open(path)
        .with_context(|| format!("Failed to open state file {}", path.display()))
}

/// Run every action in order against one session
pub async fn replay<S: FlagStore>(
    session: &mut TrackingSession,
    store: &mut S,
    actions: Vec<ScriptAction>,
    json: bool,
) -> Result<()> {
    for action in actions {
        if let Some(report) = apply(session, store, action).await {
            print_report(&report, json)?;
        }
    }
    Ok(())
}

/// Apply one action; returns the report when an event was dispatched
pub async fn apply<S: FlagStore>(
    session: &mut TrackingSession,
    store: &mut S,
    action: ScriptAction,
) -> Option<DispatchReport> {
    match action {
        ScriptAction::Launch => session.app_launched(store).await,
        ScriptAction::SignUp { email } => match session.sign_up(&email, store).await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(error = %e, "Sign-up rejected");
                None
            }
        },
        ScriptAction::Logout => {
            session.clear_identity();
            None
        }
        ScriptAction::Deposit { value, currency } => Some(session.deposit(value, &currency).await),
        ScriptAction::CreateInstance { product_id } => {
            Some(session.create_instance(&product_id).await)
        }
        ScriptAction::ScreenView { screen_name } => Some(session.screen_view(&screen_name).await),
        ScriptAction::Conversion { payload } => {
            match session.on_conversion_data(payload).await {
                ConversionOutcome::Classified(attribution) => {
                    info!(attribution = attribution.kind(), "Install classified");
                }
                ConversionOutcome::AlreadyClassified => info!("Install already classified"),
                ConversionOutcome::Ignored => warn!("Conversion callback ignored"),
            }
            None
        }
        ScriptAction::DeepLink { payload } => session.on_deep_link(payload).await,
    }
}

fn print_report(report: &DispatchReport, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(report).context("Failed to serialize report")?;
        println!("{}", line);
        return Ok(());
    }

    let mark = if report.all_delivered() { "✓" } else { "✗" };
    println!(
        "{} {} ({}/{} delivered)",
        mark,
        report.event,
        report.delivered_count(),
        report.outcomes.len()
    );
    for (sink, outcome) in &report.outcomes {
        println!("   └─ {}: {}", sink, outcome.status());
    }
    Ok(())
}
