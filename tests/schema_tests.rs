//! GraphQL schema integration tests
//!
//! Builds the dynamic schema from the sample API file and executes queries
//! against a recording client.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_graphql::{Request, Variables};
use serde_json::{json, Value};

use esapi::{
    api_field, build_schema, ApiClient, ApiParser, Args, ClientMode, MethodAddress, ParserOptions,
    RequestContext,
};

/// Records every call and answers with a fixed payload
struct RecordingClient {
    reply: Value,
    calls: Mutex<Vec<(String, Args)>>,
}

impl RecordingClient {
    fn new(reply: Value) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, Args)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ApiClient for RecordingClient {
    async fn call(&self, address: &MethodAddress, args: Args) -> esapi::Result<Value> {
        self.calls.lock().unwrap().push((address.dotted(), args));
        Ok(self.reply.clone())
    }
}

fn sample_parser(client: Option<Arc<dyn ApiClient>>) -> ApiParser {
    ApiParser::from_file(
        &Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/api_sample.js"),
        ParserOptions {
            api_version: Some("5.0".into()),
            prefix: Some("ElasticAPI50".into()),
            client,
            ..Default::default()
        },
    )
    .unwrap()
}

/// One method whose enum options mix strings, booleans and a list default
const REINDEX_SOURCE: &str = r#"
/**
 * Perform a [reindex](https://www.elastic.co/guide/) request
 *
 * @param {Object} params - An object with parameters used to carry out this action
 * @param {String} params.refresh - Refresh the affected indices
 */
api.reindex = ca({
  params: {
    refresh: {
      type: 'enum',
      options: ['', true, 'true', false, 'false', 'null', 'wait_for']
    },
    level: {
      type: 'enum',
      'default': ['cluster'],
      options: ['cluster', 'indices', 'shards']
    }
  },
  url: {
    fmt: '/_reindex'
  },
  method: 'POST'
});
"#;

fn reindex_schema(client: Arc<dyn ApiClient>) -> async_graphql::dynamic::Schema {
    let parser = ApiParser::from_source(
        REINDEX_SOURCE,
        ParserOptions {
            prefix: Some("Test".into()),
            client: Some(client),
            ..Default::default()
        },
    )
    .unwrap();
    build_schema("elastic", api_field(&parser, ClientMode::Bound).unwrap()).unwrap()
}

fn bound_schema(client: Option<Arc<dyn ApiClient>>) -> async_graphql::dynamic::Schema {
    let parser = sample_parser(client);
    build_schema("elastic", api_field(&parser, ClientMode::Bound).unwrap()).unwrap()
}

// =============================================================================
// SDL
// =============================================================================

mod sdl_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sdl_contains_namespaces_and_enums() {
        let sdl = bound_schema(None).sdl();

        assert!(sdl.contains("type ElasticAPI50 "));
        assert!(sdl.contains("type ElasticAPI50_Cat "));
        assert!(sdl.contains("type ElasticAPI50_Indices "));
        assert!(sdl.contains("enum ElasticAPI50Enum_DefaultOperator "));
        assert!(sdl.contains("enum ElasticAPI50Enum_Refresh "));
        assert!(sdl.contains("scalar JSON"));
        assert!(sdl.contains("Elastic API v5.0"));
        assert!(!sdl.contains("host:"));
    }

    #[test]
    fn test_host_mode_adds_host_argument() {
        let parser = sample_parser(None);
        let field = api_field(
            &parser,
            ClientMode::Host {
                default_host: "http://localhost:9200".into(),
            },
        )
        .unwrap();
        assert_eq!(field.type_name(), "ElasticAPI50");

        let sdl = build_schema("elastic", field).unwrap().sdl();
        assert!(sdl.contains("host: String"));
        assert!(sdl.contains("http://localhost:9200"));
    }
}

// =============================================================================
// Execution
// =============================================================================

mod execution_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_nested_field_calls_client_from_request_data() {
        let client = RecordingClient::new(json!({ "acknowledged": true }));
        let schema = bound_schema(None);

        let request = Request::new(r#"{ elastic { indices { create(index: "logs") } } }"#)
            .data(RequestContext::new(client.clone()));
        let response = schema.execute(request).await;

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        assert_eq!(
            response.data.into_json().unwrap(),
            json!({ "elastic": { "indices": { "create": { "acknowledged": true } } } })
        );

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "indices.create");
        assert_eq!(calls[0].1.get("index"), Some(&json!("logs")));
    }

    #[tokio::test]
    async fn test_enum_arguments_are_decoded_and_pruned() {
        let client = RecordingClient::new(json!({ "hits": [] }));
        let schema = bound_schema(Some(client.clone() as Arc<dyn ApiClient>));

        let query = r#"{ elastic { search(body: { q: "title:rust" }, defaultOperator: AND, size: 5) } }"#;
        let response = schema.execute(Request::new(query)).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);

        let calls = client.calls();
        assert_eq!(calls[0].0, "search");
        let args = &calls[0].1;
        assert_eq!(args.get("defaultOperator"), Some(&json!("AND")));
        assert_eq!(args.get("body"), Some(&json!({ "q": "title:rust" })));
        assert_eq!(args.get("size").and_then(Value::as_f64), Some(5.0));
        // suggestMode has a default but no body.suggestField
        assert!(!args.contains_key("suggestMode"));
    }

    #[tokio::test]
    async fn test_enum_literal_variants() {
        let client = RecordingClient::new(json!({}));
        let schema = bound_schema(Some(client.clone() as Arc<dyn ApiClient>));

        let query = r#"{ elastic { bulk(body: [], refresh: empty_string) } }"#;
        let response = schema.execute(Request::new(query)).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        assert_eq!(client.calls()[0].1.get("refresh"), Some(&json!("")));
    }

    #[tokio::test]
    async fn test_request_client_overrides_bound_client() {
        let bound = RecordingClient::new(json!("bound"));
        let scoped = RecordingClient::new(json!("scoped"));
        let schema = bound_schema(Some(bound.clone() as Arc<dyn ApiClient>));

        let request = Request::new("{ elastic { ping } }").data(RequestContext::new(scoped.clone()));
        let response = schema.execute(request).await;

        assert_eq!(
            response.data.into_json().unwrap(),
            json!({ "elastic": { "ping": "scoped" } })
        );
        assert!(bound.calls().is_empty());
        assert_eq!(scoped.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_client_is_a_field_error() {
        let schema = bound_schema(None);
        let response = schema.execute(Request::new("{ elastic { info } }")).await;

        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].message.to_lowercase().contains("client"));
    }

    #[tokio::test]
    async fn test_unknown_enum_variant_is_rejected() {
        let client = RecordingClient::new(json!({}));
        let schema = bound_schema(Some(client.clone() as Arc<dyn ApiClient>));

        let query = r#"{ elastic { search(defaultOperator: XOR) } }"#;
        let response = schema.execute(Request::new(query)).await;
        assert!(!response.errors.is_empty());
        assert!(client.calls().is_empty());
    }
}

// =============================================================================
// Enum decoding
// =============================================================================

mod enum_decoding_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn refresh_via_variable(variant: &str) -> Option<Value> {
        let client = RecordingClient::new(json!({}));
        let schema = reindex_schema(client.clone());

        let query = "query($r: TestEnum_Refresh) { elastic { reindex(refresh: $r) } }";
        let request = Request::new(query).variables(Variables::from_json(json!({ "r": variant })));
        let response = schema.execute(request).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        calls[0].1.get("refresh").cloned()
    }

    #[tokio::test]
    async fn test_variable_enum_values_decode_to_literals() {
        assert_eq!(refresh_via_variable("true_string").await, Some(json!("true")));
        assert_eq!(refresh_via_variable("true_boolean").await, Some(json!(true)));
        assert_eq!(refresh_via_variable("false_string").await, Some(json!("false")));
        assert_eq!(refresh_via_variable("false_boolean").await, Some(json!(false)));
        assert_eq!(refresh_via_variable("null_string").await, Some(json!("null")));
        assert_eq!(refresh_via_variable("empty_string").await, Some(json!("")));
        assert_eq!(refresh_via_variable("wait_for").await, Some(json!("wait_for")));
    }

    #[tokio::test]
    async fn test_inline_enum_value_decodes_to_literal() {
        let client = RecordingClient::new(json!({}));
        let schema = reindex_schema(client.clone());

        let response = schema
            .execute(Request::new("{ elastic { reindex(refresh: wait_for, level: indices) } }"))
            .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let args = &client.calls()[0].1;
        assert_eq!(args.get("refresh"), Some(&json!("wait_for")));
        assert_eq!(args.get("level"), Some(&json!(["indices"])));
    }

    #[tokio::test]
    async fn test_list_enum_argument_forms() {
        let client = RecordingClient::new(json!({}));
        let schema = reindex_schema(client.clone());

        let queries = [
            "{ elastic { reindex } }",
            "{ elastic { reindex(level: [indices, shards]) } }",
        ];
        for query in queries {
            let response = schema.execute(Request::new(query)).await;
            assert!(response.errors.is_empty(), "{:?}", response.errors);
        }

        let query = "query($l: [TestEnum_Level]) { elastic { reindex(level: $l) } }";
        let request = Request::new(query).variables(Variables::from_json(json!({ "l": ["shards"] })));
        let response = schema.execute(request).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);

        let levels: Vec<_> = client
            .calls()
            .iter()
            .map(|(_, args)| args.get("level").cloned())
            .collect();
        assert_eq!(
            levels,
            vec![
                Some(json!(["cluster"])),
                Some(json!(["indices", "shards"])),
                Some(json!(["shards"])),
            ]
        );
    }
}
