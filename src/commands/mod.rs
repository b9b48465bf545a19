//! @acp:module "Commands"
//! @acp:summary "CLI command implementations"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Each command is in its own submodule and takes an options struct.

pub mod fields;
pub mod parse;
pub mod query;
pub mod schema;

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::graphql::type_prefix;
use crate::project::{ApiParser, ParserOptions};

pub use fields::{execute_fields, FieldsOptions};
pub use parse::{execute_parse, ParseOptions};
pub use query::{execute_query, QueryOptions};
pub use schema::{execute_schema, SchemaOptions};

/// Type prefix from config, else derived from the API version
pub fn configured_prefix(config: &Config) -> String {
    config
        .prefix
        .clone()
        .unwrap_or_else(|| type_prefix(&config.api_version))
}

/// @acp:summary "Parser for an explicit file, or the file the config resolves to"
pub fn open_parser(file: Option<PathBuf>, config: &Config) -> Result<ApiParser> {
    let path = match file {
        Some(path) => path,
        None => config
            .resolve_api_file()
            .context("No API file given and none configured")?,
    };
    let options = ParserOptions {
        api_version: Some(config.api_version.clone()),
        prefix: Some(configured_prefix(config)),
        client: None,
        namespace_order: Some(config.namespace_order.clone()),
    };
    ApiParser::from_file(&path, options)
        .with_context(|| format!("Failed to parse {}", path.display()))
}
