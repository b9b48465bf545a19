//! @acp:module "Parser"
//! @acp:summary "Builds parsed method entries from annotated client API source"
//! @acp:domain schema
//! @acp:layer service
//!
//! Pipeline: normalize the source, tokenize doc comments, then derive one
//! [`ParsedMethodEntry`] per comment that documents a statement.

pub mod comments;
pub mod literal;
pub mod normalize;
pub mod types;

use std::sync::LazyLock;

use regex::Regex;

pub use comments::{CommentBlock, CommentDescription, CommentTag, CommentTokenizer, DocCommentTokenizer};
pub use literal::{parse_literal, parse_literal_prefix, LiteralError, LiteralErrorKind};
pub use normalize::normalize_source;
pub use types::{
    MethodAddress, MethodSettings, ParamDescriptor, ParamType, ParsedMethodEntry, ParsedSource,
    UrlVariant,
};

use crate::error::{ApiError, Result};

/// Start of the factory call that registers a method: `ca({`
static FACTORY_CALL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bca\(\s*\{").unwrap());

/// What must follow the settings literal: `);`
static FACTORY_CALL_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\)\s*;").unwrap());

/// @acp:summary "Turns annotated source text into a ParsedSource map"
pub struct Parser {
    tokenizer: Box<dyn CommentTokenizer>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Parser with the tree-sitter doc comment tokenizer
    pub fn new() -> Self {
        Self::with_tokenizer(Box::new(DocCommentTokenizer))
    }

    pub fn with_tokenizer(tokenizer: Box<dyn CommentTokenizer>) -> Self {
        Self { tokenizer }
    }

    /// @acp:summary "Parse normalized source into method entries keyed by dotted name"
    ///
    /// Blocks without a context are skipped. A later entry with the same
    /// dotted name replaces the earlier one in place.
    pub fn parse_source(&self, source: &str) -> Result<ParsedSource> {
        if source.trim().is_empty() {
            return Err(ApiError::EmptySource);
        }

        let blocks = self.tokenizer.tokenize(source).map_err(ApiError::Tokenizer)?;
        let mut parsed = ParsedSource::new();

        for block in &blocks {
            let Some(context) = block.context.as_deref() else {
                continue;
            };
            let segments = method_segments(context);
            if segments.is_empty() {
                tracing::debug!("Skipping comment at line {} with empty name", block.line);
                continue;
            }

            let entry = ParsedMethodEntry {
                description: cleanup_description(&block.description.full),
                settings: code_to_settings(&block.code),
                param_descriptions: parse_params_description(&block.tags),
                segments,
            };
            let key = entry.dotted_name();
            if parsed.insert(key.clone(), entry).is_some() {
                tracing::debug!("Method {} redefined at line {}", key, block.line);
            }
        }

        tracing::debug!("Parsed {} methods from {} comment blocks", parsed.len(), blocks.len());
        Ok(parsed)
    }
}

/// `api.indices.prototype.create` -> `["indices", "create"]`
pub fn method_segments(context: &str) -> Vec<String> {
    let mut parts: Vec<&str> = context.split('.').collect();
    if parts.first() == Some(&"api") {
        parts.remove(0);
    }
    parts
        .into_iter()
        .filter(|p| !p.is_empty() && *p != "prototype")
        .map(str::to_string)
        .collect()
}

/// Strip a leading `- ` and surrounding whitespace; empty text means no description
pub fn cleanup_description(text: &str) -> Option<String> {
    let text = text.strip_prefix("- ").unwrap_or(text).trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// `params.index` -> `index`
pub fn cleanup_param_name(name: &str) -> Option<String> {
    let name = name.strip_prefix("params.").unwrap_or(name).trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Per-parameter descriptions from `@param` tags, skipping the bulk `params` tag
pub fn parse_params_description(tags: &[CommentTag]) -> indexmap::IndexMap<String, String> {
    let mut descriptions = indexmap::IndexMap::new();
    for tag in tags {
        if tag.kind != "param" || tag.name == "params" {
            continue;
        }
        let Some(name) = cleanup_param_name(&tag.name) else {
            continue;
        };
        if let Some(description) = cleanup_description(&tag.description) {
            descriptions.insert(name, description);
        }
    }
    descriptions
}

/// @acp:summary "Extract and read the first `ca({...});` settings literal"
///
/// Missing call means no settings. A literal that is not plain data, or that
/// does not match the settings shape, also yields `None` with a warning.
pub fn code_to_settings(code: &str) -> Option<MethodSettings> {
    let call = FACTORY_CALL_PATTERN.find(code)?;
    // literal starts at the brace that closes the match
    let literal_start = call.end() - 1;
    let literal_text = &code[literal_start..];

    let (value, consumed) = match parse_literal_prefix(literal_text) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Skipping settings literal: {}", e);
            return None;
        }
    };

    if !FACTORY_CALL_END.is_match(&literal_text[consumed..]) {
        tracing::warn!("Settings literal is not a complete ca({{...}}); call");
        return None;
    }

    match serde_json::from_value::<MethodSettings>(value) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!("Settings literal has unexpected shape: {}", e);
            None
        }
    }
}
