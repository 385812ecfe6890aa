//! Default in-memory collaborator implementations.

mod in_memory_chain_store;

pub use in_memory_chain_store::InMemoryChainStore;
