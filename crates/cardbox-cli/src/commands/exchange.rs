//! Import and export: `import`, `import-json`, `export`.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use cardbox_core::exchange::Envelope;

use super::{open, resolve_list};

fn read_input(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

pub async fn import_text(config_path: Option<&Path>, key: &str, file: &Path) -> Result<()> {
    let text = read_input(file)?;
    let (_, repository) = open(config_path)?;
    let list = resolve_list(&repository, key).await?;
    let count = repository.import_text(&list.id, &text).await?;
    println!("Imported {count} cards into \"{}\"", list.name);
    Ok(())
}

pub async fn import_json(config_path: Option<&Path>, file: &Path) -> Result<()> {
    let raw = read_input(file)?;
    let envelope = Envelope::from_json(&raw)
        .with_context(|| format!("failed to parse {}", file.display()))?;
    let (_, repository) = open(config_path)?;
    let imported = repository.import_envelope(&envelope).await?;
    for (list, count) in &imported {
        println!("Imported \"{}\" ({count} cards)", list.name);
    }
    println!("{} lists imported", imported.len());
    Ok(())
}

pub async fn export(config_path: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let (_, repository) = open(config_path)?;
    let envelope = repository.export_envelope().await?;
    let json = envelope.to_json()?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "Exported {} lists ({} cards) to {}",
                envelope.lists.len(),
                envelope.card_count(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
