use anyhow::{Context, Result};
use sieve_core::{validate_async, RunConfig, Value};
use sieve_parser::{parse_file, parse_messages_file};
use std::path::Path;
use tracing::info;

use crate::output::{self, OutputFormat};

/// Run settings taken from the command line.
#[derive(Debug, Default)]
pub struct Options {
    pub abort_early: bool,
    pub abort_pipe_early: bool,
    pub lang: Option<String>,
    pub messages: Option<String>,
}

impl Options {
    fn config(self) -> Result<RunConfig> {
        let mut config = RunConfig::new()
            .with_abort_early(self.abort_early)
            .with_abort_pipe_early(self.abort_pipe_early);
        if let Some(lang) = self.lang {
            config = config.with_lang(lang);
        }
        if let Some(path) = self.messages {
            let messages = parse_messages_file(Path::new(&path))
                .with_context(|| format!("Failed to parse messages file: {}", path))?;
            config = config.with_messages(messages.catalog());
        }
        Ok(config)
    }
}

pub async fn execute(
    schema_path: &str,
    input_path: &str,
    options: Options,
    format: OutputFormat,
) -> Result<()> {
    info!("Validating {} against {}", input_path, schema_path);
    info!("Abort early: {}", options.abort_early);

    let definition = parse_file(Path::new(schema_path))
        .with_context(|| format!("Failed to parse schema file: {}", schema_path))?;
    let schema = definition
        .build()
        .with_context(|| format!("Failed to build schema: {}", schema_path))?;

    let input = load_input(Path::new(input_path))?;
    let config = options.config()?;

    // The async entry point accepts every schema, async members or not
    let dataset = validate_async(&*schema, input, &config).await;

    output::print_validation_report(&dataset, format)?;

    if !dataset.is_valid() {
        std::process::exit(1);
    }

    Ok(())
}

/// Reads a data file as YAML (`.yaml`, `.yml`) or JSON (anything else).
fn load_input(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);

    let json: serde_json::Value = match extension.as_deref() {
        Some("yaml" | "yml") => serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse YAML input: {}", path.display()))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON input: {}", path.display()))?,
    };
    Ok(json.into())
}
