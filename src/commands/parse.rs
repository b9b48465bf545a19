//! @acp:module "Parse Command"
//! @acp:summary "List the methods parsed from an API source file"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use crate::config::Config;

use super::open_parser;

/// Options for the parse command
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// API source file; resolved from config when absent
    pub file: Option<PathBuf>,
    /// Dump parsed entries as JSON
    pub json: bool,
}

/// Execute the parse command
pub fn execute_parse(options: ParseOptions, config: &Config) -> Result<()> {
    let parser = open_parser(options.file, config)?;
    let parsed = parser.parsed_source();

    if options.json {
        println!("{}", serde_json::to_string_pretty(parsed)?);
        return Ok(());
    }

    for (name, entry) in parsed {
        let verb = entry
            .settings
            .as_ref()
            .and_then(|s| s.http_method.as_deref())
            .unwrap_or("GET");
        let params = entry.settings.as_ref().map(|s| s.params.len()).unwrap_or(0);
        let summary = entry
            .description
            .as_deref()
            .and_then(|d| d.lines().next())
            .unwrap_or("");

        println!(
            "{:<7} {} {}",
            style(verb).cyan(),
            style(name).bold(),
            style(format!("({} params)", params)).dim()
        );
        if !summary.is_empty() {
            println!("        {}", summary);
        }
    }

    println!();
    println!(
        "{} {} methods parsed",
        style("✓").green(),
        parsed.len()
    );
    Ok(())
}
