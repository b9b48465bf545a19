#![forbid(unsafe_code)]
//! esapi Command Line Interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use esapi::commands::{
    execute_fields, execute_parse, execute_query, execute_schema, FieldsOptions, ParseOptions,
    QueryOptions, SchemaOptions,
};
use esapi::config::CONFIG_FILE;
use esapi::Config;

#[derive(Parser)]
#[command(name = "esapi")]
#[command(about = "Elastic API to GraphQL - typed query surface from the annotated client API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an API source file and list its methods
    Parse {
        /// API source file
        file: PathBuf,

        /// Output as JSON (default: human-readable)
        #[arg(long)]
        json: bool,
    },

    /// Print the generated field tree
    Fields {
        /// API source file (default: resolved from config)
        file: Option<PathBuf>,

        /// Also list arguments of each field
        #[arg(short, long)]
        args: bool,
    },

    /// Print the GraphQL schema
    Schema {
        /// API source file (default: resolved from config)
        file: Option<PathBuf>,

        /// Add a `host` argument to the API field
        #[arg(long)]
        host_arg: bool,

        /// Write SDL to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Execute a GraphQL query against a cluster
    Query {
        /// API source file (default: resolved from config)
        file: Option<PathBuf>,

        /// Query text
        #[arg(short, long)]
        query: String,

        /// Cluster address (default: config host)
        #[arg(long, env = "ESAPI_HOST")]
        host: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_err()
    {
        eprintln!("{} tracing subscriber already initialized", style("!").yellow());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load config
    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Parse { file, json } => {
            let options = ParseOptions {
                file: Some(file),
                json,
            };
            execute_parse(options, &config)?;
        }

        Commands::Fields { file, args } => {
            execute_fields(FieldsOptions { file, args }, &config)?;
        }

        Commands::Schema { file, host_arg, output } => {
            let options = SchemaOptions {
                file,
                host_arg,
                output,
            };
            execute_schema(options, &config)?;
        }

        Commands::Query { file, query, host } => {
            let options = QueryOptions { file, query, host };
            execute_query(options, &config).await?;
        }
    }

    Ok(())
}
