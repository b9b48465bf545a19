//! @acp:module "Enum Synthesis"
//! @acp:summary "Canonical variant naming and the per-parser enum cache"
//! @acp:domain schema
//! @acp:layer service

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use serde_json::Value;

use super::types::EnumType;

/// Variant name for one option literal; `None` for literals that cannot be variants
///
/// Names keep `true` / `"true"` and friends apart once the type system has
/// erased the difference.
pub fn variant_name(value: &Value) -> Option<String> {
    let name = match value {
        Value::String(s) if s.is_empty() => "empty_string".to_string(),
        Value::String(s) if s == "true" => "true_string".to_string(),
        Value::Bool(true) => "true_boolean".to_string(),
        Value::String(s) if s == "false" => "false_string".to_string(),
        Value::Bool(false) => "false_boolean".to_string(),
        Value::String(s) if s == "null" => "null_string".to_string(),
        Value::Number(n) => format!("number_{}", n),
        Value::String(s) => s.clone(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    Some(sanitize_name(&name))
}

/// Make a string a legal GraphQL name: `[_A-Za-z][_0-9A-Za-z]*`
fn sanitize_name(raw: &str) -> String {
    let mut name: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// `wait_for_status` -> `Wait_for_status`
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build the variant map for an option list
fn enum_values(options: &[Value]) -> IndexMap<String, Value> {
    let mut values = IndexMap::new();
    for option in options {
        let Some(mut name) = variant_name(option) else {
            tracing::debug!("Enum option {} cannot be a variant, skipped", option);
            continue;
        };
        if values.contains_key(&name) {
            if values[&name] == *option {
                continue;
            }
            let mut n = 1;
            while values.contains_key(&format!("{}_{}", name, n)) {
                n += 1;
            }
            name = format!("{}_{}", name, n);
        }
        values.insert(name, option.clone());
    }
    values
}

/// @acp:summary "Field name -> serialized option set -> enum type"
///
/// Owned by one parser. Two parsers never share enum types even when they
/// would produce identical definitions.
#[derive(Debug, Default)]
pub struct EnumCache {
    prefix: String,
    state: Mutex<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    by_field: HashMap<String, IndexMap<String, Arc<EnumType>>>,
    /// Every generated type name; fields differing only in case share a base name
    names: HashSet<String>,
}

impl EnumCache {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            state: Mutex::new(CacheState::default()),
        }
    }

    /// @acp:summary "Cached enum for this field and option set, created on first use"
    ///
    /// The first option set seen for a field is named `<prefix>Enum_<Field>`,
    /// later ones `<prefix>Enum_<Field>_<n>` with the first `n` not yet taken.
    pub fn get_or_create(&self, field_name: &str, options: &[Value]) -> Arc<EnumType> {
        let key = Value::Array(options.to_vec()).to_string();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let CacheState { by_field, names } = &mut *state;
        let by_options = by_field.entry(field_name.to_string()).or_default();

        if let Some(existing) = by_options.get(&key) {
            return Arc::clone(existing);
        }

        let base = format!("{}Enum_{}", self.prefix, upper_first(field_name));
        let mut n = by_options.len();
        let mut name = base.clone();
        loop {
            if n > 0 {
                name = format!("{}_{}", base, n);
            }
            if !names.contains(&name) {
                break;
            }
            n += 1;
        }

        let enum_type = Arc::new(EnumType {
            name: name.clone(),
            values: enum_values(options),
        });
        tracing::debug!("Synthesized enum {}", enum_type.name);
        names.insert(name);
        by_options.insert(key, Arc::clone(&enum_type));
        enum_type
    }

    /// Every enum created so far, ordered by name
    pub fn all(&self) -> Vec<Arc<EnumType>> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let mut all: Vec<_> = state
            .by_field
            .values()
            .flat_map(|m| m.values().cloned())
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }
}
