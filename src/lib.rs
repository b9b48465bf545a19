#![forbid(unsafe_code)]

//! @acp:module "esapi Library"
//! @acp:summary "Typed GraphQL surface generated from the annotated Elasticsearch client API"
//! @acp:domain schema
//! @acp:layer api
//! @acp:stability experimental
//!
//! # esapi
//!
//! Reads the annotated API source shipped with the legacy Elasticsearch
//! JavaScript client and turns every documented method into a typed field.
//!
//! ## Features
//!
//! - **Safe Parsing**: tree-sitter doc comment extraction and a restricted
//!   literal parser for `ca({...})` settings
//! - **Typed Arguments**: scalars, synthesized enums, coerced defaults
//! - **Namespaces**: dotted method names nest into container types
//! - **GraphQL**: dynamic async-graphql schema with a pluggable client
//!
//! ## Example
//!
//! ```rust,no_run
//! use esapi::{api_field, build_schema, ApiParser, ClientMode, ParserOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let parser = ApiParser::from_file(
//!         std::path::Path::new("apis/5_0.js"),
//!         ParserOptions::default(),
//!     )?;
//!     let field = api_field(&parser, ClientMode::Host {
//!         default_host: "http://localhost:9200".into(),
//!     })?;
//!     let schema = build_schema("elastic", field)?;
//!     println!("{}", schema.sdl());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod graphql;
pub mod loader;
pub mod parse;
pub mod project;
pub mod resolve;

// Re-exports
pub use client::{catalogue_from, Catalogue, HttpClient, PreparedRequest};
pub use config::Config;
pub use error::{ApiError, ClientError, ErrorCategory, Result};
pub use graphql::{api_field, build_schema, type_prefix, ApiField, ApiScope, ClientMode};
pub use loader::{find_api_version_file, load_api_file};
pub use parse::{
    normalize_source, MethodAddress, MethodSettings, ParamDescriptor, ParamType,
    ParsedMethodEntry, ParsedSource, Parser,
};
pub use project::{
    reorder_keys, ApiParser, ArgConfig, ArgType, EnumType, FieldConfig, FieldMap, ParserOptions,
    Scalar,
};
pub use resolve::{prune_args, ApiClient, Args, MethodResolver, RequestContext};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
