//! @acp:module "Parsed Source Types"
//! @acp:summary "Method settings, parameter descriptors and parsed method entries"
//! @acp:domain schema
//! @acp:layer model
//!
//! Field names on the wire follow the client source dialect (`type`, `fmt`,
//! `req`, `needBody`, `method`) so a settings literal deserializes directly.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// @acp:summary "Declared type of one API parameter"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParamType {
    String,
    Boolean,
    Number,
    Time,
    List,
    Enum,
    /// Any type name this dialect does not know yet
    Other(String),
}

impl ParamType {
    pub fn as_str(&self) -> &str {
        match self {
            ParamType::String => "string",
            ParamType::Boolean => "boolean",
            ParamType::Number => "number",
            ParamType::Time => "time",
            ParamType::List => "list",
            ParamType::Enum => "enum",
            ParamType::Other(s) => s,
        }
    }
}

impl From<String> for ParamType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "string" => ParamType::String,
            "boolean" => ParamType::Boolean,
            "number" => ParamType::Number,
            "time" => ParamType::Time,
            "list" => ParamType::List,
            "enum" => ParamType::Enum,
            _ => ParamType::Other(s),
        }
    }
}

impl From<ParamType> for String {
    fn from(t: ParamType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @acp:summary "Shape of one declared parameter"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    /// Declared type; absent in some entries of the source
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ParamType>,
    /// Allowed literal values for `enum` parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Value>>,
    /// Declared default, in its source form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Wire name when it differs from the map key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// @acp:summary "One alternate path template of a method"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlVariant {
    /// Template such as `/<%=index%>/_search`
    #[serde(rename = "fmt", default)]
    pub path_template: String,
    /// Placeholders that must be provided for this template
    #[serde(rename = "req", default, skip_serializing_if = "IndexMap::is_empty")]
    pub required_params: IndexMap<String, ParamDescriptor>,
    /// Optional placeholders
    #[serde(rename = "opt", default, skip_serializing_if = "IndexMap::is_empty")]
    pub optional_params: IndexMap<String, ParamDescriptor>,
}

/// @acp:summary "Evaluated `ca({...})` settings literal of one method"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodSettings {
    #[serde(default)]
    pub params: IndexMap<String, ParamDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<UrlVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<UrlVariant>>,
    #[serde(rename = "method", default, skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,
    #[serde(rename = "needBody", default, skip_serializing_if = "std::ops::Not::not")]
    pub requires_body: bool,
}

impl MethodSettings {
    /// `urls` if present, else `url` as a one-element list, else nothing
    pub fn url_variants(&self) -> &[UrlVariant] {
        match (&self.urls, &self.url) {
            (Some(urls), _) => urls,
            (None, Some(url)) => std::slice::from_ref(url),
            (None, None) => &[],
        }
    }

    /// Whether the method accepts a request body
    pub fn accepts_body(&self) -> bool {
        matches!(self.http_method.as_deref(), Some("POST") | Some("PUT"))
    }
}

/// @acp:summary "Address of a client capability, resolved once at projection"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MethodAddress {
    /// Top-level capability, e.g. `search`
    Single { name: String },
    /// Capability inside a namespace, e.g. `indices` / `create`
    Namespaced { namespace: String, name: String },
}

impl MethodAddress {
    /// Build an address from name segments; `None` when there are none
    pub fn from_segments(segments: &[String]) -> Option<Self> {
        match segments {
            [] => None,
            [name] => Some(MethodAddress::Single { name: name.clone() }),
            [namespace @ .., name] => Some(MethodAddress::Namespaced {
                namespace: namespace.join("."),
                name: name.clone(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MethodAddress::Single { name } | MethodAddress::Namespaced { name, .. } => name,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match self {
            MethodAddress::Single { .. } => None,
            MethodAddress::Namespaced { namespace, .. } => Some(namespace),
        }
    }

    /// Dotted form, e.g. `indices.create`
    pub fn dotted(&self) -> String {
        match self {
            MethodAddress::Single { name } => name.clone(),
            MethodAddress::Namespaced { namespace, name } => format!("{}.{}", namespace, name),
        }
    }
}

impl std::fmt::Display for MethodAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dotted())
    }
}

/// @acp:summary "Everything known about one documented method"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedMethodEntry {
    /// Method name segments, `["indices", "create"]`
    pub segments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<MethodSettings>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub param_descriptions: IndexMap<String, String>,
}

impl ParsedMethodEntry {
    pub fn dotted_name(&self) -> String {
        self.segments.join(".")
    }

    /// Capability address; entries are only built with at least one segment
    pub fn address(&self) -> Option<MethodAddress> {
        MethodAddress::from_segments(&self.segments)
    }
}

/// Parsed entries keyed by dotted method name, in source order
pub type ParsedSource = IndexMap<String, ParsedMethodEntry>;
