//! Adapters for external dependencies.

pub mod dictionary_api;
pub mod document;
pub mod memory_snapshot;
pub mod prefs_file;
pub mod prefs_memory;
pub mod redis_snapshot;

pub use dictionary_api::DictionaryApiValidator;
pub use memory_snapshot::MemorySnapshotStore;
pub use prefs_file::FilePreferenceStore;
pub use prefs_memory::MemoryPreferenceStore;
pub use redis_snapshot::RedisSnapshotStore;
