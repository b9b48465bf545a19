//! @acp:module "GraphQL Schema Factory"
//! @acp:summary "Mounts a projected field map into an async-graphql dynamic schema"
//! @acp:domain schema
//! @acp:layer api
//!
//! The API is exposed as one object field. Its resolver yields an
//! [`ApiScope`] that namespace fields pass down unchanged and leaf fields
//! read to find their client.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_graphql::dynamic::{
    Enum, EnumItem, Field, FieldFuture, FieldValue, InputValue, Object, ResolverContext,
    Scalar as GqlScalar, Schema, Type, TypeRef,
};
use async_graphql::{Name, Value as GqlValue};
use indexmap::IndexMap;
use serde_json::Value;

use crate::client::{catalogue_from, Catalogue, HttpClient};
use crate::error::{ApiError, Result};
use crate::project::{
    ApiParser, ArgConfig, ArgType, EnumType, FieldConfig, FieldMap, FieldResolver, OutputType,
    Scalar,
};
use crate::resolve::{ApiClient, Args, MethodResolver, RequestContext};

/// Root query type name
pub const QUERY_TYPE: &str = "Query";

/// `ElasticAPI` plus the version with its first `.` removed
pub fn type_prefix(api_version: &str) -> String {
    format!("ElasticAPI{}", api_version.replacen('.', "", 1))
}

/// Where leaf fields get their client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMode {
    /// Use the parser's bound client or one from the request data
    Bound,
    /// Take a `host` argument and build an HTTP client per request
    Host { default_host: String },
}

/// Value passed from the API field down through namespace fields
#[derive(Debug, Clone, Default)]
pub struct ApiScope {
    pub context: Option<RequestContext>,
}

/// @acp:summary "Mountable API field plus every type it references"
pub struct ApiField {
    type_name: String,
    description: String,
    mode: ClientMode,
    catalogue: Arc<Catalogue>,
    types: Vec<Type>,
}

impl ApiField {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Types to register alongside the field
    pub fn types(&self) -> &[Type] {
        &self.types
    }

    /// @acp:summary "Build the field under `name`, returning it with its types"
    pub fn into_field(self, name: &str) -> (Field, Vec<Type>) {
        let mut field = match self.mode {
            ClientMode::Bound => Field::new(name, TypeRef::named(&self.type_name), |_ctx| {
                FieldFuture::new(async move { Ok(Some(FieldValue::owned_any(ApiScope::default()))) })
            }),
            ClientMode::Host { default_host } => {
                let catalogue = self.catalogue;
                Field::new(name, TypeRef::named(&self.type_name), move |ctx| {
                    let catalogue = Arc::clone(&catalogue);
                    FieldFuture::new(async move {
                        let host = ctx
                            .args
                            .get("host")
                            .and_then(|v| v.string().ok().map(str::to_string));
                        let host = host.ok_or_else(|| ApiError::Config("missing host".to_string()))?;
                        let client: Arc<dyn ApiClient> = Arc::new(HttpClient::new(&host, catalogue)?);
                        let scope = ApiScope {
                            context: Some(RequestContext::new(client)),
                        };
                        Ok(Some(FieldValue::owned_any(scope)))
                    })
                })
                .argument(InputValue::new("host", TypeRef::named(TypeRef::STRING)).default_value(default_host))
            }
        };
        field = field.description(self.description);
        (field, self.types)
    }
}

/// @acp:summary "Project the parser's API into a mountable field"
pub fn api_field(parser: &ApiParser, mode: ClientMode) -> Result<ApiField> {
    let fields = parser.generate_field_map()?;
    let mut registry = TypeRegistry::default();
    let root = registry.object(parser.prefix(), &fields);

    let mut types: Vec<Type> = vec![GqlScalar::new(Scalar::Json.type_name())
        .description("Arbitrary JSON value")
        .into()];
    types.extend(registry.enums.into_values().map(Type::from));
    types.extend(registry.objects.into_iter().map(Type::from));
    types.push(root.into());

    Ok(ApiField {
        type_name: parser.prefix().to_string(),
        description: format!("Elastic API v{}", parser.api_version()),
        mode,
        catalogue: Arc::new(catalogue_from(parser.parsed_source())),
        types,
    })
}

/// @acp:summary "Finish a schema whose Query exposes the API under `field_name`"
pub fn build_schema(field_name: &str, api: ApiField) -> Result<Schema> {
    let (field, types) = api.into_field(field_name);
    let query = Object::new(QUERY_TYPE).field(field);

    let mut builder = Schema::build(QUERY_TYPE, None, None).register(query);
    for ty in types {
        builder = builder.register(ty);
    }
    builder.finish().map_err(|e| ApiError::Schema(e.to_string()))
}

#[derive(Default)]
struct TypeRegistry {
    enums: BTreeMap<String, Enum>,
    objects: Vec<Object>,
}

impl TypeRegistry {
    /// Object type for a field map; nested containers are registered as they are met
    fn object(&mut self, name: &str, fields: &FieldMap) -> Object {
        let mut object = Object::new(name);
        for (field_name, config) in fields {
            object = object.field(self.field(field_name, config));
        }
        object
    }

    fn field(&mut self, name: &str, config: &FieldConfig) -> Field {
        let mut field = match (&config.ty, &config.resolve) {
            (OutputType::Namespace(ns), _) => {
                let container = self.object(&ns.name, &ns.fields);
                self.objects.push(container);
                namespace_field(name, &ns.name)
            }
            (OutputType::Json, FieldResolver::Method(resolver)) => {
                leaf_field(name, Arc::clone(resolver), Arc::new(config.args.clone()))
            }
            (OutputType::Json, FieldResolver::Namespace) => {
                Field::new(name, TypeRef::named(Scalar::Json.type_name()), |_ctx| {
                    FieldFuture::new(async move { Ok(Some(FieldValue::value(GqlValue::Null))) })
                })
            }
        };

        for (arg_name, arg) in &config.args {
            field = field.argument(self.input_value(arg_name, arg));
        }
        if let Some(description) = &config.description {
            field = field.description(description);
        }
        field
    }

    fn input_value(&mut self, name: &str, arg: &ArgConfig) -> InputValue {
        if let Some(enum_type) = arg.ty.as_enum() {
            self.enums
                .entry(enum_type.name.clone())
                .or_insert_with(|| enum_definition(enum_type));
        }

        let mut input = InputValue::new(name, type_ref(&arg.ty));
        if let Some(description) = &arg.description {
            input = input.description(description);
        }
        if let Some(default) = &arg.default_value {
            match default_to_graphql(default, &arg.ty) {
                Some(value) => input = input.default_value(value),
                None => tracing::warn!("Default {} of argument {} has no GraphQL form, dropped", default, name),
            }
        }
        input
    }
}

fn enum_definition(enum_type: &EnumType) -> Enum {
    enum_type
        .values
        .keys()
        .fold(Enum::new(&enum_type.name), |e, name| e.item(EnumItem::new(name)))
}

fn type_ref(ty: &ArgType) -> TypeRef {
    match ty {
        ArgType::Scalar(s) => TypeRef::named(s.type_name()),
        ArgType::Enum(e) => TypeRef::named(&e.name),
        ArgType::List(inner) => TypeRef::List(Box::new(type_ref(inner))),
        ArgType::NonNull(inner) => TypeRef::NonNull(Box::new(type_ref(inner))),
    }
}

/// GraphQL form of a default; enum literals become variant names
fn default_to_graphql(value: &Value, ty: &ArgType) -> Option<GqlValue> {
    match ty {
        ArgType::NonNull(inner) => default_to_graphql(value, inner),
        ArgType::List(inner) => match value {
            Value::Array(items) => items
                .iter()
                .map(|item| default_to_graphql(item, inner))
                .collect::<Option<Vec<_>>>()
                .map(GqlValue::List),
            single => default_to_graphql(single, inner),
        },
        ArgType::Enum(e) => e.name_of(value).map(|name| GqlValue::Enum(Name::new(name))),
        ArgType::Scalar(_) => GqlValue::from_json(value.clone()).ok(),
    }
}

/// Argument value as the client expects it; enum variant names become literals
///
/// Variables deliver enum values as strings. A single value given for a list
/// argument is decoded as a one-element list.
fn decode_argument(value: &GqlValue, ty: &ArgType) -> serde_json::Result<Value> {
    match (value, ty) {
        (GqlValue::Null, _) => Ok(Value::Null),
        (_, ArgType::NonNull(inner)) => decode_argument(value, inner),
        (GqlValue::List(items), ArgType::List(inner)) => items
            .iter()
            .map(|item| decode_argument(item, inner))
            .collect::<serde_json::Result<Vec<_>>>()
            .map(Value::Array),
        (single, ArgType::List(inner)) => {
            decode_argument(single, inner).map(|item| Value::Array(vec![item]))
        }
        (GqlValue::Enum(name), ArgType::Enum(e)) => Ok(enum_literal(e, name.as_str())),
        (GqlValue::String(name), ArgType::Enum(e)) => Ok(enum_literal(e, name)),
        _ => value.clone().into_json(),
    }
}

fn enum_literal(enum_type: &EnumType, variant: &str) -> Value {
    enum_type
        .value_of(variant)
        .cloned()
        .unwrap_or_else(|| Value::String(variant.to_string()))
}

/// Client for this request: API scope, then request data, then none
fn scoped_client(ctx: &ResolverContext<'_>) -> Option<Arc<dyn ApiClient>> {
    if let Ok(scope) = ctx.parent_value.try_downcast_ref::<ApiScope>() {
        if let Some(context) = &scope.context {
            return Some(Arc::clone(&context.client));
        }
    }
    ctx.data_opt::<RequestContext>()
        .map(|context| Arc::clone(&context.client))
}

fn namespace_field(name: &str, type_name: &str) -> Field {
    Field::new(name, TypeRef::named(type_name), |ctx| {
        FieldFuture::new(async move {
            let scope = ctx
                .parent_value
                .try_downcast_ref::<ApiScope>()
                .map(Clone::clone)
                .unwrap_or_default();
            Ok(Some(FieldValue::owned_any(scope)))
        })
    })
}

fn leaf_field(name: &str, resolver: Arc<MethodResolver>, arg_types: Arc<IndexMap<String, ArgConfig>>) -> Field {
    Field::new(name, TypeRef::named(Scalar::Json.type_name()), move |ctx| {
        let resolver = Arc::clone(&resolver);
        let arg_types = Arc::clone(&arg_types);
        FieldFuture::new(async move {
            let mut args = Args::new();
            for (arg_name, value) in ctx.args.iter() {
                let decoded = match arg_types.get(arg_name.as_str()) {
                    Some(arg) => decode_argument(value.as_value(), &arg.ty)?,
                    None => value.as_value().clone().into_json()?,
                };
                if !decoded.is_null() {
                    args.insert(arg_name.to_string(), decoded);
                }
            }

            let client = scoped_client(&ctx);
            let result = resolver.resolve(client.as_ref(), args).await?;
            Ok(Some(FieldValue::value(GqlValue::from_json(result)?)))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::EnumCache;
    use serde_json::json;

    #[test]
    fn test_type_prefix() {
        assert_eq!(type_prefix("5.0"), "ElasticAPI50");
        assert_eq!(type_prefix("1.7.1"), "ElasticAPI17.1");
        assert_eq!(type_prefix("_default"), "ElasticAPI_default");
    }

    #[test]
    fn test_enum_default_and_decoding() {
        let cache = EnumCache::new("P");
        let e = cache.get_or_create("refresh", &[json!(""), json!("true"), json!(false)]);
        let ty = ArgType::Enum(e.clone());

        assert_eq!(
            default_to_graphql(&json!("true"), &ty),
            Some(GqlValue::Enum(Name::new("true_string")))
        );
        assert_eq!(default_to_graphql(&json!("nope"), &ty), None);

        let decoded = decode_argument(&GqlValue::Enum(Name::new("false_boolean")), &ty).unwrap();
        assert_eq!(decoded, json!(false));

        let list = ty.clone().list_of();
        let decoded = decode_argument(
            &GqlValue::List(vec![
                GqlValue::Enum(Name::new("empty_string")),
                GqlValue::Enum(Name::new("true_string")),
            ]),
            &list,
        )
        .unwrap();
        assert_eq!(decoded, json!(["", "true"]));
    }

    #[test]
    fn test_decodes_enum_names_given_as_strings() {
        let cache = EnumCache::new("P");
        let e = cache.get_or_create("refresh", &[json!("true"), json!(true), json!(false), json!("null")]);
        let ty = ArgType::Enum(e);

        let decode = |name: &str| decode_argument(&GqlValue::String(name.into()), &ty).unwrap();
        assert_eq!(decode("true_string"), json!("true"));
        assert_eq!(decode("true_boolean"), json!(true));
        assert_eq!(decode("false_boolean"), json!(false));
        assert_eq!(decode("null_string"), json!("null"));
    }

    #[test]
    fn test_single_value_for_list_argument() {
        let cache = EnumCache::new("P");
        let e = cache.get_or_create("level", &[json!(""), json!("cluster")]);
        let list = ArgType::Enum(e).list_of();

        assert_eq!(
            decode_argument(&GqlValue::Enum(Name::new("empty_string")), &list).unwrap(),
            json!([""])
        );
        assert_eq!(
            decode_argument(&GqlValue::String("cluster".into()), &list).unwrap(),
            json!(["cluster"])
        );
        assert_eq!(decode_argument(&GqlValue::Null, &list).unwrap(), Value::Null);
    }

    #[test]
    fn test_scalar_defaults() {
        let float = ArgType::Scalar(Scalar::Float);
        assert_eq!(
            default_to_graphql(&json!(30.0), &float),
            GqlValue::from_json(json!(30.0)).ok()
        );
        let list = ArgType::Scalar(Scalar::String).list_of();
        assert_eq!(
            default_to_graphql(&json!(["a"]), &list),
            Some(GqlValue::List(vec![GqlValue::String("a".into())]))
        );
    }
}
