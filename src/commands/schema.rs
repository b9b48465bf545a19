//! @acp:module "Schema Command"
//! @acp:summary "Print the GraphQL SDL generated from an API source file"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use crate::config::Config;
use crate::graphql::{api_field, build_schema, ClientMode};

use super::open_parser;

/// Options for the schema command
#[derive(Debug, Clone)]
pub struct SchemaOptions {
    /// API source file; resolved from config when absent
    pub file: Option<PathBuf>,
    /// Expose a `host` argument on the API field
    pub host_arg: bool,
    /// Write the SDL here instead of stdout
    pub output: Option<PathBuf>,
}

/// Execute the schema command
pub fn execute_schema(options: SchemaOptions, config: &Config) -> Result<()> {
    let parser = open_parser(options.file, config)?;
    let mode = if options.host_arg {
        ClientMode::Host {
            default_host: config.host.clone(),
        }
    } else {
        ClientMode::Bound
    };

    let schema = build_schema(&config.field_name, api_field(&parser, mode)?)?;
    let sdl = schema.sdl();

    match options.output {
        Some(path) => {
            std::fs::write(&path, &sdl)?;
            eprintln!(
                "{} Schema written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => print!("{}", sdl),
    }
    Ok(())
}
