//! Prompt chain execution engine.
//!
//! A chain is a directed acyclic graph of text-processing nodes. Input
//! nodes carry values, llm nodes call a Text Generation Service, transform
//! and output nodes reshape text locally. Edges feed a node's output into
//! its successors as previous context, and `{{var}}` placeholders resolve
//! against caller inputs and earlier node outputs.
//!
//! [`ChainExecutor`] is the entry point: give it a [`ChainStore`] and a
//! [`TextGenerator`], call [`run`](ChainExecutor::run), and read the
//! [`ExecutionResult`]. Validation (unknown edge endpoints, cycles, empty
//! chains) happens before any node executes, and every failure mode is
//! reported inside the result rather than as an `Err`.
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! use chainrun_engine::{ChainExecutor, InMemoryChainStore};
//! # async fn demo(generator: Arc<dyn chainrun_engine::TextGenerator>) {
//! let store = Arc::new(InMemoryChainStore::new());
//! let executor = ChainExecutor::new(store, generator);
//! let result = executor.run("my-chain", BTreeMap::new()).await;
//! if result.success {
//!     println!("{}", result.final_output.unwrap_or_default());
//! }
//! # }
//! ```

pub mod context;
pub mod defaults;
pub mod errors;
pub mod executor;
pub mod template;
pub mod traits;
pub mod types;

pub use context::gather_context;
pub use defaults::InMemoryChainStore;
pub use errors::{ChainStoreError, GenerationError, RunError};
pub use executor::{ChainExecutor, NodeOutcome};
pub use template::resolve_variables;
pub use traits::{ChainStore, TextGenerator};
pub use types::{
    ChainDef, Edge, ExecutionResult, NodeDef, NodeExecutionLog, NodeKind, RetryConfig,
    RunContext,
};
