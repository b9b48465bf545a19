//! @acp:module "Resolver Runtime"
//! @acp:summary "Merges fixed and request arguments and dispatches to the API client"
//! @acp:domain schema
//! @acp:layer service
//!
//! Resolvers share no mutable state; each call picks its client, prunes
//! and merges arguments, then makes one downstream call.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{ApiError, Result};
use crate::parse::MethodAddress;
use crate::project::defaults::is_truthy;

/// Argument map passed to a client capability
pub type Args = Map<String, Value>;

/// @acp:summary "Downstream client exposing API capabilities by address"
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    /// Invoke the capability at `address` with the merged arguments
    async fn call(&self, address: &MethodAddress, args: Args) -> Result<Value>;
}

/// @acp:summary "Request-scoped value carrying the client for one query"
#[derive(Clone)]
pub struct RequestContext {
    pub client: Arc<dyn ApiClient>,
}

impl RequestContext {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext").finish_non_exhaustive()
    }
}

/// Whether `body.<field>` exists and is truthy; no body counts as no field
fn body_has_truthy(args: &Args, field: &str) -> bool {
    args.get("body")
        .and_then(|body| body.get(field))
        .map(is_truthy)
        .unwrap_or(false)
}

/// @acp:summary "Drop arguments that are only valid alongside certain body fields"
///
/// `defaultOperator` needs a truthy `body.q`; `suggestMode` needs a truthy
/// `body.suggestField`.
pub fn prune_args(args: &mut Args) {
    if !body_has_truthy(args, "q") {
        args.remove("defaultOperator");
    }
    if !body_has_truthy(args, "suggestField") {
        args.remove("suggestMode");
    }
}

/// @acp:summary "Per-field resolver bound to one method address"
pub struct MethodResolver {
    pub address: MethodAddress,
    /// Arguments fixed at projection time; request arguments override them
    pub fixed_args: Args,
    bound_client: Option<Arc<dyn ApiClient>>,
}

impl MethodResolver {
    pub fn new(address: MethodAddress, fixed_args: Args, bound_client: Option<Arc<dyn ApiClient>>) -> Self {
        Self {
            address,
            fixed_args,
            bound_client,
        }
    }

    pub fn has_bound_client(&self) -> bool {
        self.bound_client.is_some()
    }

    /// Request-scoped client first, then the bound one
    pub fn client_for(&self, scoped: Option<&Arc<dyn ApiClient>>) -> Result<Arc<dyn ApiClient>> {
        scoped
            .or(self.bound_client.as_ref())
            .cloned()
            .ok_or(ApiError::MissingClient)
    }

    /// Arguments as they will be sent: pruned request args over fixed args
    pub fn merge_args(&self, mut request_args: Args) -> Args {
        prune_args(&mut request_args);
        let mut merged = self.fixed_args.clone();
        merged.extend(request_args);
        merged
    }

    /// @acp:summary "Resolve one field invocation"
    pub async fn resolve(&self, scoped: Option<&Arc<dyn ApiClient>>, request_args: Args) -> Result<Value> {
        let client = self.client_for(scoped)?;
        let args = self.merge_args(request_args);
        tracing::debug!("Calling {} with {} args", self.address, args.len());
        client.call(&self.address, args).await
    }
}

impl fmt::Debug for MethodResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodResolver")
            .field("address", &self.address)
            .field("fixed_args", &self.fixed_args)
            .field("bound_client", &self.bound_client.is_some())
            .finish()
    }
}
