//! Stagehand infrastructure: storage adapters.
//!
//! Provides the narrow key-value store contract, an in-memory backend with
//! store-enforced expiry, and the key-value-backed session repository.

pub mod kv;
pub mod kv_session_repository;
pub mod memory_store;

pub use kv::KeyValueStore;
pub use kv_session_repository::KvSessionRepository;
pub use memory_store::InMemoryKeyValueStore;
