use anyhow::Result;
use clap::ValueEnum;
use colored::*;
use serde_json::json;
use sieve_core::{flatten, Dataset};

/// How reports are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// What `check` reports about a built schema.
#[derive(Debug)]
pub struct SchemaSummary<'a> {
    pub path: &'a str,
    pub step_type: &'a str,
    pub expects: Option<&'a str>,
    pub is_async: bool,
    pub members: usize,
    pub pipe: usize,
}

pub fn print_validation_report(dataset: &Dataset, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json_report(dataset),
        OutputFormat::Text => {
            print_text_report(dataset);
            Ok(())
        }
    }
}

fn print_text_report(dataset: &Dataset) {
    println!("\n{}", "═".repeat(60));
    println!("{}", "  VALIDATION REPORT".bold());
    println!("{}", "═".repeat(60));

    if dataset.is_valid() {
        println!(
            "\n{} {}",
            "✓".green().bold(),
            "Validation PASSED".green().bold()
        );
    } else {
        println!(
            "\n{} {}",
            "✗".red().bold(),
            "Validation FAILED".red().bold()
        );
    }

    if !dataset.issues.is_empty() {
        println!("\n{}", "Issues:".red().bold());
        for (i, issue) in dataset.issues.iter().enumerate() {
            println!("  {}. {}", i + 1, issue.message.red());
            if let Some(path) = issue.dot_path() {
                println!("     at {}", path.dimmed());
            }
        }
    }

    println!("\n{}", "Summary:".bold());
    println!("  Status:       {:?}", dataset.status());
    println!("  Total issues: {}", dataset.issues.len());
    println!("{}", "═".repeat(60));
}

fn print_json_report(dataset: &Dataset) -> Result<()> {
    let output = json!({
        "valid": dataset.is_valid(),
        "status": dataset.status(),
        "output": dataset.is_valid().then(|| dataset.value.to_json()),
        "issues": dataset.issues,
        "flat": flatten(&dataset.issues),
        "summary": {
            "issue_count": dataset.issues.len(),
        }
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn print_schema_summary(summary: &SchemaSummary<'_>, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        let output = json!({
            "path": summary.path,
            "type": summary.step_type,
            "expects": summary.expects,
            "async": summary.is_async,
            "members": summary.members,
            "pipe": summary.pipe,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_success("Schema definition is valid");

    println!("\nSchema Summary:");
    println!("  File:     {}", summary.path);
    println!("  Type:     {}", summary.step_type);
    println!("  Expects:  {}", summary.expects.unwrap_or("N/A"));
    println!("  Async:    {}", summary.is_async);
    println!("  Members:  {}", summary.members);
    println!("  Pipe:     {} action(s)", summary.pipe);
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}
