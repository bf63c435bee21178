use anyhow::{Context, Result};
use sieve_core::Step;
use sieve_parser::parse_file;
use std::path::Path;
use tracing::info;

use crate::output::{self, OutputFormat, SchemaSummary};

pub fn execute(schema_path: &str, format: OutputFormat) -> Result<()> {
    info!("Checking schema definition: {}", schema_path);

    let path = Path::new(schema_path);
    let definition = parse_file(path)
        .with_context(|| format!("Failed to parse schema file: {}", schema_path))?;

    // Building compiles every regex pattern in the tree
    let schema = definition
        .build()
        .with_context(|| format!("Failed to build schema: {}", schema_path))?;

    let info = schema.info();
    let summary = SchemaSummary {
        path: schema_path,
        step_type: info.step_type,
        expects: info.expects.as_deref(),
        is_async: info.is_async,
        members: definition.member_count(),
        pipe: definition.pipe.len(),
    };

    output::print_schema_summary(&summary, format)
}
