//! The `cardbox init` command.

use std::path::Path;

use anyhow::{Context, Result};

use cardbox_store::config::{sample_config, CONFIG_FILE_NAME};

pub fn execute(config_path: Option<&Path>) -> Result<()> {
    let path = config_path.unwrap_or_else(|| Path::new(CONFIG_FILE_NAME));

    if path.exists() {
        println!("{} already exists, skipping.", path.display());
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, sample_config())
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Created {}", path.display());

    println!("\nNext steps:");
    println!("  1. Run: cardbox new-list --name Vocabulary");
    println!("  2. Run: cardbox import --list Vocabulary --file words.txt");
    println!("  3. Run: cardbox learn --list Vocabulary");

    Ok(())
}
