//! Per-region cache of invoke clients.

use super::{Invoker, LambdaInvoker};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Builds an invoker for a region (`None` meaning the default region).
pub type InvokerFactory = Box<dyn Fn(Option<&str>) -> Arc<dyn Invoker> + Send + Sync>;

/// Region-keyed invokers, created on first use and kept for the lifetime
/// of the cache.
///
/// Holds at most one invoker per region. Two tasks racing on a new region
/// may both build one; the last insert wins and the two are equivalent.
pub struct ClientCache {
    /// Cached invokers by region.
    clients: RwLock<HashMap<Option<String>, Arc<dyn Invoker>>>,
    /// Creates invokers for regions not seen yet.
    factory: InvokerFactory,
}

impl ClientCache {
    /// Create a cache that builds invokers with `factory`.
    pub fn new(
        factory: impl Fn(Option<&str>) -> Arc<dyn Invoker> + Send + Sync + 'static,
    ) -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
            factory: Box::new(factory),
        }
    }

    /// Create a cache of [`LambdaInvoker`]s sharing `sdk_config`.
    pub fn from_sdk_config(sdk_config: aws_config::SdkConfig) -> Self {
        Self::new(move |region| {
            Arc::new(LambdaInvoker::from_sdk_config(&sdk_config, region)) as Arc<dyn Invoker>
        })
    }

    /// Load AWS configuration from the environment and build a cache on it.
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::from_sdk_config(sdk_config)
    }

    /// Get the invoker for `region`, creating it if needed.
    pub async fn get(&self, region: Option<&str>) -> Arc<dyn Invoker> {
        let key = region.map(str::to_string);

        if let Some(client) = self.clients.read().await.get(&key) {
            debug!("Reusing client for region {:?}", region);
            return client.clone();
        }

        let client = (self.factory)(region);
        self.clients.write().await.insert(key, client.clone());
        info!("Created client for region {:?}", region);
        client
    }

    /// Number of cached invokers.
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}

impl std::fmt::Debug for ClientCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCache").finish_non_exhaustive()
    }
}
