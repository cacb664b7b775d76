//! Card commands: `add`, `edit`, `remove`, `cards`.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use comfy_table::{Cell, Table};

use super::{open, resolve_list};

pub async fn add(config_path: Option<&Path>, key: &str, prompt: &str, answer: &str) -> Result<()> {
    let (_, repository) = open(config_path)?;
    let list = resolve_list(&repository, key).await?;
    let card = repository.add_card(&list.id, prompt, answer).await?;
    println!("Added card {} to \"{}\"", card.id, list.name);
    Ok(())
}

pub async fn edit(
    config_path: Option<&Path>,
    key: &str,
    card_id: &str,
    prompt: Option<&str>,
    answer: Option<&str>,
) -> Result<()> {
    anyhow::ensure!(
        prompt.is_some() || answer.is_some(),
        "nothing to change: pass --prompt and/or --answer"
    );
    let (_, repository) = open(config_path)?;
    let list = resolve_list(&repository, key).await?;
    let card = repository.edit_card(&list.id, card_id, prompt, answer).await?;
    println!("Updated card {}: {} - {}", card.id, card.prompt, card.answer);
    Ok(())
}

pub async fn remove(config_path: Option<&Path>, key: &str, card_id: &str) -> Result<()> {
    let (_, repository) = open(config_path)?;
    let list = resolve_list(&repository, key).await?;
    let card = repository.delete_card(&list.id, card_id).await?;
    println!("Removed card \"{}\" from \"{}\"", card.prompt, list.name);
    Ok(())
}

pub async fn show(config_path: Option<&Path>, key: &str) -> Result<()> {
    let (_, repository) = open(config_path)?;
    let list = resolve_list(&repository, key).await?;
    let cards = repository.cards(&list.id).await?;

    if cards.is_empty() {
        println!("\"{}\" has no cards.", list.name);
        return Ok(());
    }

    let now = Utc::now();
    let mut table = Table::new();
    table.set_header(vec![
        "Id", "Prompt", "Answer", "Score", "Ease", "Interval", "Reps", "W/L", "Due",
    ]);
    for card in &cards {
        let due = if card.is_new() {
            "new".to_string()
        } else if card.is_due(now) {
            "now".to_string()
        } else {
            card.due_at().format("%Y-%m-%d %H:%M").to_string()
        };
        table.add_row(vec![
            Cell::new(&card.id),
            Cell::new(&card.prompt),
            Cell::new(&card.answer),
            Cell::new(format!("{:.1}", card.score)),
            Cell::new(format!("{:.2}", card.ease_factor)),
            Cell::new(format!("{}m", card.interval)),
            Cell::new(card.repetitions),
            Cell::new(format!("{}/{}", card.total_wins, card.total_losses)),
            Cell::new(due),
        ]);
    }

    println!("{table}");
    Ok(())
}
