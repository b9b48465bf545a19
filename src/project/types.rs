//! @acp:module "Projected Types"
//! @acp:summary "Type-system agnostic description of the generated field surface"
//! @acp:domain schema
//! @acp:layer model
//!
//! These types describe what to mount, not how. The GraphQL layer turns
//! them into engine types; the CLI prints them directly.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::resolve::MethodResolver;

/// Built-in scalar targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    String,
    Boolean,
    Float,
    /// Opaque blob for lists, bodies and untyped params
    Json,
}

impl Scalar {
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::String => "String",
            Scalar::Boolean => "Boolean",
            Scalar::Float => "Float",
            Scalar::Json => "JSON",
        }
    }
}

/// @acp:summary "Synthesized enum with variant names mapped to literal values"
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: String,
    /// Variant name -> literal value, in option order
    pub values: IndexMap<String, Value>,
}

impl EnumType {
    /// Variant name carrying this literal value
    pub fn name_of(&self, value: &Value) -> Option<&str> {
        self.values
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(name, _)| name.as_str())
    }

    /// Literal value behind a variant name
    pub fn value_of(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

/// @acp:summary "Argument type: scalar, enum, or wrapped in list / non-null"
#[derive(Debug, Clone)]
pub enum ArgType {
    Scalar(Scalar),
    Enum(Arc<EnumType>),
    List(Box<ArgType>),
    NonNull(Box<ArgType>),
}

impl ArgType {
    pub fn list_of(self) -> Self {
        ArgType::List(Box::new(self))
    }

    pub fn non_null(self) -> Self {
        ArgType::NonNull(Box::new(self))
    }

    /// Innermost named type
    pub fn named(&self) -> &ArgType {
        match self {
            ArgType::List(inner) | ArgType::NonNull(inner) => inner.named(),
            other => other,
        }
    }

    pub fn as_enum(&self) -> Option<&Arc<EnumType>> {
        match self.named() {
            ArgType::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_scalar(&self, scalar: Scalar) -> bool {
        matches!(self, ArgType::Scalar(s) if *s == scalar)
    }
}

impl PartialEq for ArgType {
    /// Enums compare by identity so equal-looking enums from different caches differ
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ArgType::Scalar(a), ArgType::Scalar(b)) => a == b,
            (ArgType::Enum(a), ArgType::Enum(b)) => Arc::ptr_eq(a, b),
            (ArgType::List(a), ArgType::List(b)) => a == b,
            (ArgType::NonNull(a), ArgType::NonNull(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::Scalar(s) => write!(f, "{}", s.type_name()),
            ArgType::Enum(e) => write!(f, "{}", e.name),
            ArgType::List(inner) => write!(f, "[{}]", inner),
            ArgType::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

/// @acp:summary "One argument of a generated field"
#[derive(Debug, Clone, PartialEq)]
pub struct ArgConfig {
    pub ty: ArgType,
    pub description: Option<String>,
    /// Coerced default; enum defaults stay in literal form
    pub default_value: Option<Value>,
}

impl ArgConfig {
    pub fn new(ty: ArgType) -> Self {
        Self {
            ty,
            description: None,
            default_value: None,
        }
    }
}

/// @acp:summary "Container object grouping the fields of one namespace"
#[derive(Debug, Clone)]
pub struct NamespaceType {
    pub name: String,
    pub fields: FieldMap,
}

/// Result type of a generated field
#[derive(Debug, Clone)]
pub enum OutputType {
    Json,
    Namespace(Arc<NamespaceType>),
}

/// How a field produces its value
#[derive(Debug, Clone)]
pub enum FieldResolver {
    /// Calls one client capability
    Method(Arc<MethodResolver>),
    /// Returns an empty placeholder so nested fields can resolve
    Namespace,
}

/// @acp:summary "One generated field: type, description, arguments, resolver"
#[derive(Debug, Clone)]
pub struct FieldConfig {
    pub ty: OutputType,
    pub description: Option<String>,
    pub args: IndexMap<String, ArgConfig>,
    pub resolve: FieldResolver,
}

impl FieldConfig {
    pub fn namespace(ty: Arc<NamespaceType>) -> Self {
        Self {
            ty: OutputType::Namespace(ty),
            description: None,
            args: IndexMap::new(),
            resolve: FieldResolver::Namespace,
        }
    }

    pub fn as_namespace(&self) -> Option<&Arc<NamespaceType>> {
        match &self.ty {
            OutputType::Namespace(ns) => Some(ns),
            OutputType::Json => None,
        }
    }
}

/// Fields keyed by name, in mount order
pub type FieldMap = IndexMap<String, FieldConfig>;
