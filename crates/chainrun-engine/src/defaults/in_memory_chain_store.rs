//! In-memory [`ChainStore`] backed by a `BTreeMap`. Suitable for tests and
//! single-process embedding; not a persistence layer.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::ChainStoreError;
use crate::traits::ChainStore;
use crate::types::ChainDef;

#[derive(Default)]
pub struct InMemoryChainStore {
    chains: RwLock<BTreeMap<String, ChainDef>>,
}

impl InMemoryChainStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a chain under its own id.
    pub async fn insert(&self, chain: ChainDef) {
        self.chains.write().await.insert(chain.id.clone(), chain);
    }

    pub async fn remove(&self, id: &str) -> Option<ChainDef> {
        self.chains.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.chains.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chains.read().await.is_empty()
    }
}

#[async_trait]
impl ChainStore for InMemoryChainStore {
    async fn get_chain(&self, id: &str) -> Result<Option<ChainDef>, ChainStoreError> {
        Ok(self.chains.read().await.get(id).cloned())
    }
}
