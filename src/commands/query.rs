//! @acp:module "Query Command"
//! @acp:summary "Run a GraphQL query against a live cluster through the generated schema"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use async_graphql::Request;
use console::style;

use crate::config::Config;
use crate::graphql::{api_field, build_schema, ClientMode};

use super::open_parser;

/// Options for the query command
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// API source file; resolved from config when absent
    pub file: Option<PathBuf>,
    /// GraphQL query text
    pub query: String,
    /// Cluster address; config host when absent
    pub host: Option<String>,
}

/// Execute the query command
pub async fn execute_query(options: QueryOptions, config: &Config) -> Result<()> {
    let parser = open_parser(options.file, config)?;
    let default_host = options.host.unwrap_or_else(|| config.host.clone());
    let schema = build_schema(
        &config.field_name,
        api_field(&parser, ClientMode::Host { default_host })?,
    )?;

    let response = schema.execute(Request::new(options.query)).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.errors.is_empty() {
        eprintln!(
            "{} Query finished with {} error(s)",
            style("✗").red(),
            response.errors.len()
        );
        return Err(anyhow!("query failed"));
    }
    Ok(())
}
