//! cardbox-store: storage backends and configuration.
//!
//! Implements [`cardbox_core::traits::CardStore`] over JSON files and over
//! an in-memory map, and loads `cardbox.toml`.

pub mod config;
pub mod json;
pub mod memory;

pub use config::{load_config, load_config_from, open_store, Backend, CardboxConfig};
pub use json::JsonFileStore;
pub use memory::MemoryStore;
