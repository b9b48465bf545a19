//! @acp:module "HTTP Client"
//! @acp:summary "ApiClient that turns parsed method settings into Elasticsearch HTTP calls"
//! @acp:domain network
//! @acp:layer service
//!
//! Each call picks the first URL variant whose required placeholders are all
//! given, renders the path, sends the remaining declared params as the query
//! string and the `body` argument as JSON.

use std::sync::Arc;

use indexmap::IndexMap;
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::parse::{MethodAddress, MethodSettings, ParsedSource, UrlVariant};
use crate::resolve::{ApiClient, Args};

/// Method settings keyed by dotted method name
pub type Catalogue = IndexMap<String, MethodSettings>;

/// Settings of every parsed method that has them
pub fn catalogue_from(parsed: &ParsedSource) -> Catalogue {
    parsed
        .iter()
        .filter_map(|(name, entry)| entry.settings.clone().map(|s| (name.clone(), s)))
        .collect()
}

/// @acp:summary "Fully rendered request, before it is sent"
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    /// Rendered path segments, unencoded
    pub path: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// @acp:summary "Elasticsearch client over reqwest"
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base: Url,
    credentials: Option<(String, String)>,
    catalogue: Arc<Catalogue>,
}

impl HttpClient {
    /// Client for `host`; credentials in the host URL become basic auth
    pub fn new(host: &str, catalogue: Arc<Catalogue>) -> std::result::Result<Self, ClientError> {
        let invalid = |reason: String| ClientError::InvalidHost {
            host: host.to_string(),
            reason,
        };
        let mut base = Url::parse(host).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".to_string()));
        }

        let credentials = if base.username().is_empty() {
            None
        } else {
            let user = base.username().to_string();
            let pass = base.password().unwrap_or("").to_string();
            // cannot fail on a base URL
            let _ = base.set_username("");
            let _ = base.set_password(None);
            Some((user, pass))
        };

        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base,
            credentials,
            catalogue,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// @acp:summary "Render one call into method, path, query and body"
    pub fn prepare(&self, address: &MethodAddress, mut args: Args) -> std::result::Result<PreparedRequest, ClientError> {
        let dotted = address.dotted();
        let settings = self
            .catalogue
            .get(&dotted)
            .ok_or_else(|| ClientError::UnknownMethod(dotted.clone()))?;

        let variant = settings
            .url_variants()
            .iter()
            .find(|v| v.required_params.keys().all(|k| is_present(args.get(k))))
            .ok_or_else(|| ClientError::NoMatchingUrl {
                method: dotted.clone(),
            })?;

        let path = render_path(variant, &mut args);
        let body = args.remove("body").filter(|b| !b.is_null());

        let mut query = Vec::new();
        for (name, value) in &args {
            let Some(param) = settings.params.get(name) else {
                tracing::debug!("Argument {} is not a declared param of {}, skipped", name, dotted);
                continue;
            };
            if let Some(rendered) = render_value(value) {
                let wire_name = param.name.clone().unwrap_or_else(|| name.clone());
                query.push((wire_name, rendered));
            }
        }

        let method = match settings.http_method.as_deref() {
            Some(m) => Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                .map_err(|_| ClientError::UnsupportedMethod(m.to_string()))?,
            None if body.is_some() => Method::POST,
            None => Method::GET,
        };

        Ok(PreparedRequest {
            method,
            path,
            query,
            body,
        })
    }

    fn url_for(&self, request: &PreparedRequest) -> std::result::Result<Url, ClientError> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| ClientError::InvalidHost {
                host: self.base.to_string(),
                reason: "URL cannot carry a path".to_string(),
            })?;
            segments.pop_if_empty();
            segments.extend(&request.path);
        }
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    async fn send(&self, request: PreparedRequest) -> std::result::Result<Value, ClientError> {
        let url = self.url_for(&request)?;
        tracing::debug!("{} {}", request.method, url);

        let is_head = request.method == Method::HEAD;
        let mut builder = self.http.request(request.method, url);
        if let Some((user, pass)) = &self.credentials {
            builder = builder.basic_auth(user, Some(pass));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        if is_head {
            return match status {
                s if s.is_success() => Ok(Value::Bool(true)),
                StatusCode::NOT_FOUND => Ok(Value::Bool(false)),
                s => Err(ClientError::Status {
                    status: s.as_u16(),
                    body: String::new(),
                }),
            };
        }

        let text = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

#[async_trait::async_trait]
impl ApiClient for HttpClient {
    async fn call(&self, address: &MethodAddress, args: Args) -> Result<Value> {
        let request = self.prepare(address, args)?;
        Ok(self.send(request).await?)
    }
}

fn is_present(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
}

/// Query and path form of an argument value; lists are comma-joined
fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(render_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

/// Fill `<%=name%>` placeholders, consuming the arguments they use
fn render_path(variant: &UrlVariant, args: &mut Args) -> Vec<String> {
    let mut segments = Vec::new();
    for raw in variant.path_template.split('/').filter(|s| !s.is_empty()) {
        let mut segment = String::new();
        let mut rest = raw;
        while let Some(start) = rest.find("<%=") {
            segment.push_str(&rest[..start]);
            let after = &rest[start + 3..];
            let Some(end) = after.find("%>") else {
                segment.push_str(&rest[start..]);
                rest = "";
                break;
            };
            let name = after[..end].trim();
            if let Some(value) = args.remove(name) {
                segment.push_str(&render_value(&value).unwrap_or_default());
            }
            rest = &after[end + 2..];
        }
        segment.push_str(rest);
        segments.push(segment);
    }
    segments
}
