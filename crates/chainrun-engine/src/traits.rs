//! Collaborator trait interfaces.
//!
//! The engine touches the outside world through exactly two seams: where
//! chain definitions come from ([`ChainStore`]) and where prompts go
//! ([`TextGenerator`]). Both are injected into
//! [`ChainExecutor`](crate::executor::ChainExecutor) as `Arc<dyn _>`, so
//! tests substitute fakes without any global state.

use async_trait::async_trait;

use crate::errors::{ChainStoreError, GenerationError};
use crate::types::ChainDef;

/// Where chain definitions come from.
///
/// Implementations might read from a relational store, a file, or a static
/// test map. The engine needs nothing beyond lookup by id.
#[async_trait]
pub trait ChainStore: Send + Sync {
    /// Retrieve a chain by id. Returns `None` if it does not exist.
    async fn get_chain(&self, id: &str) -> Result<Option<ChainDef>, ChainStoreError>;
}

/// Turns a prompt into a completion.
///
/// The engine wraps every call with its own retry policy, so
/// implementations should be stateless and safe to invoke repeatedly with
/// the same prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Generator name for diagnostics.
    fn name(&self) -> &str;
}
