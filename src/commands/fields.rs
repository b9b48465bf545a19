//! @acp:module "Fields Command"
//! @acp:summary "Print the generated field tree with argument types"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use crate::config::Config;
use crate::project::{FieldMap, OutputType};

use super::open_parser;

/// Options for the fields command
#[derive(Debug, Clone)]
pub struct FieldsOptions {
    /// API source file; resolved from config when absent
    pub file: Option<PathBuf>,
    /// Also list each field's arguments
    pub args: bool,
}

/// Execute the fields command
pub fn execute_fields(options: FieldsOptions, config: &Config) -> Result<()> {
    let parser = open_parser(options.file, config)?;
    let fields = parser.generate_field_map()?;

    println!("{} {}", style(parser.prefix()).bold(), style(format!("Elastic API v{}", parser.api_version())).dim());
    let mut out = String::new();
    render_tree(&fields, 1, options.args, &mut out);
    print!("{}", out);

    let enums = parser.enum_types();
    println!();
    println!(
        "{} {} top-level fields, {} enums",
        style("✓").green(),
        fields.len(),
        enums.len()
    );
    Ok(())
}

/// Indented listing of a field map
pub fn render_tree(fields: &FieldMap, depth: usize, with_args: bool, out: &mut String) {
    let indent = "  ".repeat(depth);
    for (name, field) in fields {
        match &field.ty {
            OutputType::Namespace(ns) => {
                out.push_str(&format!("{}{}: {}\n", indent, name, ns.name));
                render_tree(&ns.fields, depth + 1, with_args, out);
            }
            OutputType::Json => {
                out.push_str(&format!("{}{}({}): JSON\n", indent, name, field.args.len()));
                if with_args {
                    for (arg_name, arg) in &field.args {
                        let default = arg
                            .default_value
                            .as_ref()
                            .map(|d| format!(" = {}", d))
                            .unwrap_or_default();
                        out.push_str(&format!("{}    {}: {}{}\n", indent, arg_name, arg.ty, default));
                    }
                }
            }
        }
    }
}
