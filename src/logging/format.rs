//! Log setup plus one-line JSON stage reports (ndjson) for batch job audit.

use serde::Serialize;
use std::error::Error;
use std::io::{self, Write};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Summary of one pipeline stage run
#[derive(Debug, Clone, Serialize)]
pub struct StageReport<'a> {
    pub ts: String,
    pub stage: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub succeeded: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
}

impl<'a> StageReport<'a> {
    pub fn new(stage: &'a str) -> Self {
        Self {
            ts: chrono::Utc::now().to_rfc3339(),
            stage,
            input: None,
            output: None,
            succeeded: None,
            failed: None,
            bytes: None,
        }
    }

    pub fn input(mut self, path: &std::path::Path) -> Self {
        self.input = Some(path.display().to_string());
        self
    }

    pub fn output(mut self, path: &std::path::Path) -> Self {
        self.output = Some(path.display().to_string());
        self
    }

    pub fn counts(mut self, succeeded: usize, failed: usize) -> Self {
        self.succeeded = Some(succeeded);
        self.failed = Some(failed);
        self
    }

    pub fn bytes(mut self, bytes: usize) -> Self {
        self.bytes = Some(bytes);
        self
    }
}

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install the global subscriber on stderr. `RUST_LOG` wins over `default_level`;
    /// fails if the level does not parse or a subscriber is already set.
    pub fn init(json: bool, default_level: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(default_level)?,
        };
        let json_layer = json.then(|| fmt::layer().json().with_writer(io::stderr));
        let text_layer = (!json).then(|| fmt::layer().with_target(false).with_writer(io::stderr));
        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .with(text_layer)
            .try_init()?;
        Ok(())
    }

    /// Write `event` as one JSON line, bypassing tracing.
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, event)?;
        writeln!(w)
    }
}
