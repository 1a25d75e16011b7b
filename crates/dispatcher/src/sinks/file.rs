//! FileSink - appends events to a JSON-lines journal

use contracts::{ContractError, EventParams, EventSink, TrackedEvent};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Journal file, created (with parents) if missing
    pub path: PathBuf,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./events.jsonl"));

        Self { path }
    }
}

/// One journal line
#[derive(Serialize)]
struct JournalRecord<'a> {
    ts: String,
    sink: &'a str,
    event: &'a str,
    params: &'a EventParams,
}

/// Sink that appends one JSON record per event
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    writer: Option<BufWriter<File>>,
    records: u64,
}

impl FileSink {
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)?;

        Ok(Self {
            name: name.into(),
            config,
            writer: Some(BufWriter::new(file)),
            records: 0,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, FileSinkConfig::from_params(params))
    }

    fn append(&mut self, event: &TrackedEvent) -> Result<(), ContractError> {
        let record = JournalRecord {
            ts: chrono::Utc::now().to_rfc3339(),
            sink: &self.name,
            event: &event.name,
            params: &event.params,
        };
        let line = serde_json::to_string(&record)
            .map_err(|e| ContractError::sink_write(&self.name, format!("json error: {e}")))?;

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| ContractError::sink_write(&self.name, "journal closed"))?;
        writeln!(writer, "{line}")?;
        self.records += 1;
        Ok(())
    }
}

impl EventSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, event),
        fields(sink = %self.name, event = %event.name)
    )]
    async fn write(&mut self, event: &TrackedEvent) -> Result<(), ContractError> {
        self.append(event)
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        debug!(
            sink = %self.name,
            path = %self.config.path.display(),
            records = self.records,
            "FileSink closed"
        );
        Ok(())
    }
}
