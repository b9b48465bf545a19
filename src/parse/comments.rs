//! @acp:module "Comment Extractor"
//! @acp:summary "Doc comment tokenizer over tree-sitter JavaScript syntax trees"
//! @acp:domain schema
//! @acp:layer parser
//!
//! Locates `/** ... */` blocks, the statement each one documents and the
//! code that follows it. The tokenizer sits behind [`CommentTokenizer`] so
//! the entry builder can be driven by any implementation.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tree_sitter::{Node, Parser};

/// Tag line: `@param {Type} name description`
static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@(\S+)(?:\s+\{([^}]*)\})?(?:\s+(.*))?$").unwrap()
});

/// Leading ` * ` gutter of a comment line
static GUTTER_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\*? ?").unwrap());

/// Tags whose first word is part of the description, not a name
const UNNAMED_TAGS: &[&str] = &["return", "returns", "throws", "example", "see", "deprecated"];

/// @acp:summary "Description text of a comment block"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDescription {
    /// First paragraph
    pub summary: String,
    /// All text before the first tag
    pub full: String,
}

/// @acp:summary "One `@tag` line with its continuation lines"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentTag {
    /// Tag kind without `@`, e.g. `param`
    pub kind: String,
    /// Types listed in braces, split on `|`
    pub types: Vec<String>,
    /// Tag subject, e.g. `params.index`; empty for unnamed tags
    pub name: String,
    pub description: String,
}

/// @acp:summary "Comment block plus the code it documents"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentBlock {
    /// Dotted target of the following statement, e.g. `api.indices.prototype.create`
    pub context: Option<String>,
    pub description: CommentDescription,
    pub tags: Vec<CommentTag>,
    /// Verbatim source from the end of the comment up to the next doc comment
    pub code: String,
    /// 1-based line of the comment start
    pub line: usize,
}

/// @acp:summary "Turns source text into an ordered sequence of comment blocks"
pub trait CommentTokenizer: Send + Sync {
    fn tokenize(&self, source: &str) -> Result<Vec<CommentBlock>, String>;
}

/// @acp:summary "Default tokenizer backed by tree-sitter-javascript"
#[derive(Debug, Default, Clone, Copy)]
pub struct DocCommentTokenizer;

impl CommentTokenizer for DocCommentTokenizer {
    fn tokenize(&self, source: &str) -> Result<Vec<CommentBlock>, String> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_javascript::LANGUAGE.into())
            .map_err(|e| format!("cannot load JavaScript grammar: {}", e))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| "parser returned no syntax tree".to_string())?;

        let bytes = source.as_bytes();
        let mut doc_nodes = Vec::new();
        collect_doc_comments(tree.root_node(), bytes, &mut doc_nodes);

        let mut blocks = Vec::with_capacity(doc_nodes.len());
        for (i, node) in doc_nodes.iter().enumerate() {
            let text = node.utf8_text(bytes).map_err(|e| e.to_string())?;
            let code_end = doc_nodes
                .get(i + 1)
                .map(|next| next.start_byte())
                .unwrap_or(source.len());

            let (description, tags) = parse_comment_body(text);
            blocks.push(CommentBlock {
                context: statement_context(*node, bytes),
                description,
                tags,
                code: source[node.end_byte()..code_end].to_string(),
                line: node.start_position().row + 1,
            });
        }
        Ok(blocks)
    }
}

fn is_doc_comment(node: &Node, bytes: &[u8]) -> bool {
    node.kind() == "comment"
        && node
            .utf8_text(bytes)
            .map(|t| t.starts_with("/**") && !t.starts_with("/**/"))
            .unwrap_or(false)
}

/// Pre-order walk, so nodes come out in source order
fn collect_doc_comments<'t>(node: Node<'t>, bytes: &[u8], out: &mut Vec<Node<'t>>) {
    if is_doc_comment(&node, bytes) {
        out.push(node);
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_doc_comments(child, bytes, out);
    }
}

/// Name of whatever the comment documents, or `None` when it is not followed
/// by a recognizable statement
fn statement_context(comment: Node, bytes: &[u8]) -> Option<String> {
    let mut next = comment.next_named_sibling();
    while let Some(node) = next {
        if node.kind() != "comment" {
            break;
        }
        if is_doc_comment(&node, bytes) {
            return None;
        }
        next = node.next_named_sibling();
    }
    let node = next?;

    let compact = |n: Node| -> Option<String> {
        let text: String = n
            .utf8_text(bytes)
            .ok()?
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        (!text.is_empty()).then_some(text)
    };

    match node.kind() {
        "expression_statement" => {
            let mut cursor = node.walk();
            let expr = node.named_children(&mut cursor).next()?;
            match expr.kind() {
                "assignment_expression" | "augmented_assignment_expression" => {
                    compact(expr.child_by_field_name("left")?)
                }
                _ => None,
            }
        }
        "function_declaration" | "generator_function_declaration" => {
            compact(node.child_by_field_name("name")?).map(|name| format!("{}()", name))
        }
        "class_declaration" => compact(node.child_by_field_name("name")?),
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = node.walk();
            let declarator = node
                .named_children(&mut cursor)
                .find(|c| c.kind() == "variable_declarator")?;
            compact(declarator.child_by_field_name("name")?)
        }
        _ => None,
    }
}

/// Split raw comment text into description and tags
pub fn parse_comment_body(raw: &str) -> (CommentDescription, Vec<CommentTag>) {
    let inner = raw
        .trim()
        .trim_start_matches("/**")
        .trim_end_matches("*/");

    let mut description_lines: Vec<String> = Vec::new();
    let mut tags: Vec<CommentTag> = Vec::new();

    for line in inner.lines() {
        let line = GUTTER_PATTERN.replace(line, "");
        let line = line.trim_end();

        if let Some(caps) = TAG_PATTERN.captures(line) {
            let kind = caps[1].to_string();
            let types = caps
                .get(2)
                .map(|m| {
                    m.as_str()
                        .split('|')
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect()
                })
                .unwrap_or_default();
            let rest = caps.get(3).map(|m| m.as_str().trim()).unwrap_or("");

            let (name, description) = if UNNAMED_TAGS.contains(&kind.as_str()) {
                (String::new(), rest.to_string())
            } else {
                let mut parts = rest.splitn(2, char::is_whitespace);
                let name = parts.next().map(clean_tag_name).unwrap_or_default();
                let description = parts.next().unwrap_or("").trim().to_string();
                (name, description)
            };

            tags.push(CommentTag {
                kind,
                types,
                name,
                description,
            });
        } else if let Some(tag) = tags.last_mut() {
            if !line.trim().is_empty() {
                if !tag.description.is_empty() {
                    tag.description.push('\n');
                }
                tag.description.push_str(line.trim());
            }
        } else {
            description_lines.push(line.to_string());
        }
    }

    let full = description_lines.join("\n").trim().to_string();
    let summary = full.split("\n\n").next().unwrap_or("").trim().to_string();
    (CommentDescription { summary, full }, tags)
}

/// `[params.size=10]` -> `params.size`
fn clean_tag_name(raw: &str) -> String {
    let name = raw.trim_start_matches('[').trim_end_matches(']');
    name.split('=').next().unwrap_or(name).to_string()
}
