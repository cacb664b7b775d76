pub mod cards;
pub mod exchange;
pub mod init;
pub mod lists;
pub mod manage;
pub mod stats;
pub mod study;

use std::path::Path;

use anyhow::Result;

use cardbox_core::model::CardList;
use cardbox_core::repository::CardRepository;
use cardbox_store::{load_config_from, open_store, CardboxConfig};

/// Load config and open the configured store.
pub fn open(config_path: Option<&Path>) -> Result<(CardboxConfig, CardRepository)> {
    let config = load_config_from(config_path)?;
    let store = open_store(&config)?;
    Ok((config, CardRepository::new(store)))
}

/// Resolve `--list` (an id or an exact name).
pub async fn resolve_list(repository: &CardRepository, key: &str) -> Result<CardList> {
    Ok(repository.find_list(key).await?)
}
