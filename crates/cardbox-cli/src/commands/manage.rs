//! List management: `new-list`, `rename-list`, `delete-list`.

use std::path::Path;

use anyhow::Result;

use super::{open, resolve_list};

pub async fn new_list(config_path: Option<&Path>, name: &str) -> Result<()> {
    let (_, repository) = open(config_path)?;
    let list = repository.create_list(name).await?;
    println!("Created list \"{}\" ({})", list.name, list.id);
    Ok(())
}

pub async fn rename_list(config_path: Option<&Path>, key: &str, name: &str) -> Result<()> {
    let (_, repository) = open(config_path)?;
    let list = resolve_list(&repository, key).await?;
    let renamed = repository.rename_list(&list.id, name).await?;
    println!("Renamed \"{}\" to \"{}\"", list.name, renamed.name);
    Ok(())
}

pub async fn delete_list(config_path: Option<&Path>, key: &str) -> Result<()> {
    let (_, repository) = open(config_path)?;
    let list = resolve_list(&repository, key).await?;
    repository.delete_list(&list.id).await?;
    println!("Deleted list \"{}\"", list.name);
    Ok(())
}
