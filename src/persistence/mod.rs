//! Key/value persistence
//!
//! Progress and settings are small JSON-encoded values under fixed keys. The
//! backing store is chosen by the host:
//! - `MemoryStore`: tests and headless runs
//! - `LocalStore`: browser LocalStorage (wasm only)
//! - `JsonFileStore`: a single JSON object on disk (native only)

pub mod progress;
pub mod store;

pub use progress::Progress;
#[cfg(not(target_arch = "wasm32"))]
pub use store::JsonFileStore;
#[cfg(target_arch = "wasm32")]
pub use store::LocalStore;
pub use store::{KeyValueStore, MemoryStore};
