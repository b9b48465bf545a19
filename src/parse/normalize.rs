//! @acp:module "Source Normalizer"
//! @acp:summary "Repairs known annotation and syntax irregularities before parsing"
//! @acp:domain schema
//! @acp:layer parser

use std::sync::LazyLock;

use regex::Regex;

/// Cross-reference markup inside tag types: `{<<api-param-type-string,`String`>>}`.
/// With several references in one brace the last type is kept.
static XREF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{<<[^}\n]*`([^`}\n]*)`[^`}\n]*\}").unwrap()
});

/// Bracket access on a registration line: `api.indices.prototype['delete'] = ca({`
static BRACKET_ACCESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(api.*)\['(.+)'\](.*ca)").unwrap()
});

/// @acp:summary "Rewrite raw source into text the comment extractor can handle"
///
/// Both rewrites are line-local and leave unmatched text untouched.
pub fn normalize_source(code: &str) -> String {
    let cleaned = XREF_PATTERN.replace_all(code, "{${1}}");
    BRACKET_ACCESS_PATTERN
        .replace_all(&cleaned, "${1}.${2}${3}")
        .into_owned()
}
