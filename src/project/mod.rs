//! @acp:module "Type Projector"
//! @acp:summary "Projects parsed method entries into typed field and argument configs"
//! @acp:domain schema
//! @acp:layer service
//!
//! An [`ApiParser`] is built once from one API source file. Building it
//! parses the source; the field map is derived on demand and only touches
//! the parser's own enum cache.

pub mod defaults;
pub mod enums;
pub mod namespace;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

pub use enums::EnumCache;
pub use namespace::{reassemble_nested_fields, reorder_keys};
pub use types::{
    ArgConfig, ArgType, EnumType, FieldConfig, FieldMap, FieldResolver, NamespaceType, OutputType,
    Scalar,
};

use crate::config::{Config, DEFAULT_API_VERSION};
use crate::error::{ApiError, Result};
use crate::loader;
use crate::parse::{
    normalize_source, MethodSettings, ParamDescriptor, ParamType, ParsedSource, Parser,
};
use crate::resolve::{ApiClient, Args, MethodResolver};

/// Type name prefix when none is given
pub const DEFAULT_PREFIX: &str = "Elastic";

/// Top-level namespaces listed first in a field map
pub const DEFAULT_NAMESPACE_ORDER: &[&str] = &[
    "cat", "cluster", "indices", "ingest", "nodes", "snapshot", "tasks", "search",
];

/// @acp:summary "Construction options for an ApiParser"
#[derive(Clone, Default)]
pub struct ParserOptions {
    /// API version label; `_default` when unset
    pub api_version: Option<String>,
    /// Type name prefix; `Elastic` when unset
    pub prefix: Option<String>,
    /// Client used when a request carries none
    pub client: Option<Arc<dyn ApiClient>>,
    /// Priority order of top-level keys; the built-in list when unset
    pub namespace_order: Option<Vec<String>>,
}

/// @acp:summary "Parsed API source plus the projection state derived from it"
pub struct ApiParser {
    api_version: String,
    prefix: String,
    client: Option<Arc<dyn ApiClient>>,
    parsed_source: ParsedSource,
    namespace_order: Vec<String>,
    enums: EnumCache,
}

impl ApiParser {
    /// @acp:summary "Normalize and parse raw API source text"
    pub fn from_source(raw_source: &str, options: ParserOptions) -> Result<Self> {
        let source = normalize_source(raw_source);
        let parsed = Parser::new().parse_source(&source)?;
        Ok(Self::from_parsed(parsed, options))
    }

    /// Load, normalize and parse an API source file
    pub fn from_file(path: &Path, options: ParserOptions) -> Result<Self> {
        let source = loader::load_api_file(path)?;
        let parsed = Parser::new().parse_source(&source)?;
        tracing::info!("Loaded {} API methods from {}", parsed.len(), path.display());
        Ok(Self::from_parsed(parsed, options))
    }

    /// Resolve the API file from config and parse it
    pub fn from_config(config: &Config, client: Option<Arc<dyn ApiClient>>) -> Result<Self> {
        let path = config.resolve_api_file()?;
        Self::from_file(
            &path,
            ParserOptions {
                api_version: Some(config.api_version.clone()),
                prefix: config.prefix.clone(),
                client,
                namespace_order: Some(config.namespace_order.clone()),
            },
        )
    }

    /// Wrap an already parsed source
    pub fn from_parsed(parsed_source: ParsedSource, options: ParserOptions) -> Self {
        let prefix = options.prefix.unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        Self {
            api_version: options
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            enums: EnumCache::new(prefix.clone()),
            prefix,
            client: options.client,
            parsed_source,
            namespace_order: options.namespace_order.unwrap_or_else(|| {
                DEFAULT_NAMESPACE_ORDER.iter().map(|s| s.to_string()).collect()
            }),
        }
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn parsed_source(&self) -> &ParsedSource {
        &self.parsed_source
    }

    pub fn client(&self) -> Option<&Arc<dyn ApiClient>> {
        self.client.as_ref()
    }

    /// Enums synthesized so far
    pub fn enum_types(&self) -> Vec<Arc<EnumType>> {
        self.enums.all()
    }

    /// @acp:summary "Field config for every parsed method, nested and reordered"
    pub fn generate_field_map(&self) -> Result<FieldMap> {
        let mut flat = FieldMap::with_capacity(self.parsed_source.len());
        for name in self.parsed_source.keys() {
            flat.insert(name.clone(), self.generate_field_config(name, None)?);
        }
        let nested = reassemble_nested_fields(flat, &self.prefix);
        Ok(reorder_keys(nested, &self.namespace_order))
    }

    /// @acp:summary "Field config of one method, optionally with fixed arguments"
    pub fn generate_field_config(&self, method_name: &str, fixed_args: Option<Args>) -> Result<FieldConfig> {
        if method_name.is_empty() {
            return Err(ApiError::MissingMethodName);
        }
        let entry = self
            .parsed_source
            .get(method_name)
            .ok_or_else(|| ApiError::UnknownMethod(method_name.to_string()))?;
        let address = entry
            .address()
            .ok_or_else(|| ApiError::UnknownMethod(method_name.to_string()))?;

        let args = self.settings_to_arg_map(entry.settings.as_ref(), &entry.param_descriptions);
        let resolver = MethodResolver::new(address, fixed_args.unwrap_or_default(), self.client.clone());

        Ok(FieldConfig {
            ty: OutputType::Json,
            description: entry.description.clone(),
            args,
            resolve: FieldResolver::Method(Arc::new(resolver)),
        })
    }

    /// @acp:summary "Argument map of one method from its settings"
    ///
    /// Declared params and URL-required params share one namespace; a later
    /// definition of the same name replaces the earlier one.
    pub fn settings_to_arg_map(
        &self,
        settings: Option<&MethodSettings>,
        descriptions: &IndexMap<String, String>,
    ) -> IndexMap<String, ArgConfig> {
        let mut args = IndexMap::new();
        let Some(settings) = settings else {
            return args;
        };

        if settings.accepts_body() {
            let body = ArgType::Scalar(Scalar::Json);
            let ty = if settings.requires_body { body.non_null() } else { body };
            args.insert("body".to_string(), ArgConfig::new(ty));
        }

        let url_required = settings
            .url_variants()
            .iter()
            .flat_map(|variant| variant.required_params.iter());
        for (name, param) in settings.params.iter().chain(url_required) {
            let description = descriptions.get(name).map(String::as_str);
            args.insert(name.clone(), self.param_to_arg_config(param, name, description));
        }
        args
    }

    /// @acp:summary "Project one parameter descriptor into an argument config"
    pub fn param_to_arg_config(
        &self,
        param: &ParamDescriptor,
        field_name: &str,
        description: Option<&str>,
    ) -> ArgConfig {
        let mut arg = ArgConfig::new(self.param_type(param, field_name));

        match param.default.as_ref().filter(|d| defaults::is_truthy(d)) {
            Some(declared) => {
                arg.default_value = defaults::coerce_default(declared, &arg.ty);
                if arg.default_value.is_none() {
                    tracing::debug!("Dropping non-numeric default {} of {}", declared, field_name);
                }
            }
            None if field_name == "format" => {
                arg.default_value = Some(Value::String("json".to_string()));
            }
            None => {}
        }

        arg.description = description.map(str::to_string);

        if matches!(arg.default_value, Some(Value::Array(_))) {
            arg.ty = arg.ty.list_of();
        }
        arg
    }

    /// Target type for a declared parameter type
    pub fn param_type(&self, param: &ParamDescriptor, field_name: &str) -> ArgType {
        match &param.kind {
            Some(ParamType::String) | Some(ParamType::Time) => ArgType::Scalar(Scalar::String),
            Some(ParamType::Boolean) => ArgType::Scalar(Scalar::Boolean),
            Some(ParamType::Number) => ArgType::Scalar(Scalar::Float),
            Some(ParamType::Enum) => match &param.options {
                Some(options) => ArgType::Enum(self.get_enum_type(field_name, options)),
                None => ArgType::Scalar(Scalar::String),
            },
            Some(ParamType::List) | None => ArgType::Scalar(Scalar::Json),
            Some(ParamType::Other(kind)) => {
                tracing::debug!("Unknown param type '{}' of {}, using JSON", kind, field_name);
                ArgType::Scalar(Scalar::Json)
            }
        }
    }

    /// Cached enum for a field and its option list
    pub fn get_enum_type(&self, field_name: &str, options: &[Value]) -> Arc<EnumType> {
        self.enums.get_or_create(field_name, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{ParsedMethodEntry, UrlVariant};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parser() -> ApiParser {
        ApiParser::from_parsed(
            ParsedSource::new(),
            ParserOptions {
                prefix: Some("ElasticAPI50".into()),
                ..Default::default()
            },
        )
    }

    fn descriptor(value: Value) -> ParamDescriptor {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_param_types() {
        let p = parser();
        let cases = [
            (json!({ "type": "string" }), "String"),
            (json!({ "type": "boolean" }), "Boolean"),
            (json!({ "type": "number" }), "Float"),
            (json!({ "type": "time" }), "String"),
            (json!({ "type": "list" }), "JSON"),
            (json!({ "type": "enum" }), "String"),
            (json!({}), "JSON"),
            (json!({ "type": "duration" }), "JSON"),
        ];
        for (desc, expected) in cases {
            assert_eq!(p.param_type(&descriptor(desc), "x").to_string(), expected);
        }
        let e = p.param_type(&descriptor(json!({ "type": "enum", "options": ["a"] })), "level");
        assert_eq!(e.to_string(), "ElasticAPI50Enum_Level");
    }

    #[test]
    fn test_format_gets_json_default() {
        let p = parser();
        let implicit = p.param_to_arg_config(&descriptor(json!({ "type": "string" })), "format", None);
        assert_eq!(implicit.default_value, Some(json!("json")));

        let explicit =
            p.param_to_arg_config(&descriptor(json!({ "type": "string", "default": "yaml" })), "format", None);
        assert_eq!(explicit.default_value, Some(json!("yaml")));

        let falsy = p.param_to_arg_config(&descriptor(json!({ "type": "string", "default": "" })), "format", None);
        assert_eq!(falsy.default_value, Some(json!("json")));
    }

    #[test]
    fn test_defaults_are_coerced() {
        let p = parser();
        let number = p.param_to_arg_config(&descriptor(json!({ "type": "number", "default": "5" })), "size", None);
        assert_eq!(number.default_value, Some(json!(5.0)));

        let broken =
            p.param_to_arg_config(&descriptor(json!({ "type": "number", "default": "1m" })), "timeout", None);
        assert_eq!(broken.default_value, None);

        let boolean =
            p.param_to_arg_config(&descriptor(json!({ "type": "boolean", "default": "1" })), "refresh", None);
        assert_eq!(boolean.default_value, Some(json!(true)));
    }

    #[test]
    fn test_array_default_promotes_to_list() {
        let p = parser();
        let arg = p.param_to_arg_config(
            &descriptor(json!({ "type": "enum", "options": ["open", "closed"], "default": ["open"] })),
            "expandWildcards",
            Some("Expand wildcards"),
        );
        assert_eq!(arg.ty.to_string(), "[ElasticAPI50Enum_ExpandWildcards]");
        assert_eq!(arg.default_value, Some(json!(["open"])));
        assert_eq!(arg.description.as_deref(), Some("Expand wildcards"));
    }

    #[test]
    fn test_arg_map_covers_params_and_url_placeholders() {
        let p = parser();
        let settings: MethodSettings = serde_json::from_value(json!({
            "params": { "refresh": { "type": "boolean" }, "index": { "type": "string" } },
            "urls": [
                { "fmt": "/<%=index%>/<%=type%>", "req": { "index": { "type": "list" }, "type": { "type": "string" } } },
                { "fmt": "/<%=id%>", "req": { "id": { "type": "string" } } }
            ],
            "method": "PUT",
            "needBody": true
        }))
        .unwrap();
        let mut descriptions = IndexMap::new();
        descriptions.insert("id".to_string(), "Document ID".to_string());

        let args = p.settings_to_arg_map(Some(&settings), &descriptions);
        let names: Vec<_> = args.keys().cloned().collect();
        assert_eq!(names, vec!["body", "refresh", "index", "type", "id"]);
        assert_eq!(args["body"].ty.to_string(), "JSON!");
        // URL placeholder definition replaces the declared param
        assert_eq!(args["index"].ty.to_string(), "JSON");
        assert_eq!(args["id"].description.as_deref(), Some("Document ID"));
    }

    #[test]
    fn test_get_without_settings_has_no_args() {
        let p = parser();
        assert!(p.settings_to_arg_map(None, &IndexMap::new()).is_empty());

        let optional_body = MethodSettings {
            http_method: Some("POST".into()),
            url: Some(UrlVariant::default()),
            ..Default::default()
        };
        let args = p.settings_to_arg_map(Some(&optional_body), &IndexMap::new());
        assert_eq!(args["body"].ty.to_string(), "JSON");
    }

    #[test]
    fn test_field_config_errors() {
        let mut parsed = ParsedSource::new();
        parsed.insert(
            "ping".into(),
            ParsedMethodEntry {
                segments: vec!["ping".into()],
                description: Some("Ping".into()),
                settings: None,
                param_descriptions: IndexMap::new(),
            },
        );
        let p = ApiParser::from_parsed(parsed, ParserOptions::default());

        assert!(matches!(
            p.generate_field_config("", None),
            Err(ApiError::MissingMethodName)
        ));
        assert!(matches!(
            p.generate_field_config("pong", None),
            Err(ApiError::UnknownMethod(name)) if name == "pong"
        ));
        let field = p.generate_field_config("ping", None).unwrap();
        assert_eq!(field.description.as_deref(), Some("Ping"));
        assert!(field.args.is_empty());
        assert_eq!(p.prefix(), "Elastic");
        assert_eq!(p.api_version(), "_default");
    }
}
