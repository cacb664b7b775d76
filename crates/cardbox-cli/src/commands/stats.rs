//! The `cardbox stats` command.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use comfy_table::{Cell, Table};

use cardbox_core::selector::Selector;
use cardbox_core::statistics::compute_list_stats;

use super::{open, resolve_list};

pub async fn execute(config_path: Option<&Path>, key: &str, json: bool) -> Result<()> {
    let (config, repository) = open(config_path)?;
    let list = resolve_list(&repository, key).await?;
    let cards = repository.cards(&list.id).await?;
    let stats = compute_list_stats(&cards, &Selector::new(config.selector), Utc::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![Cell::new(&list.name), Cell::new("")]);
    table.add_row(vec![Cell::new("Cards"), Cell::new(stats.total)]);
    table.add_row(vec![Cell::new("New"), Cell::new(stats.new)]);
    table.add_row(vec![Cell::new("Due"), Cell::new(stats.due)]);
    table.add_row(vec![Cell::new("In rotation"), Cell::new(stats.in_rotation)]);
    table.add_row(vec![Cell::new("Difficult"), Cell::new(stats.difficult)]);
    table.add_row(vec![Cell::new("Mastered"), Cell::new(stats.mastered)]);
    table.add_row(vec![
        Cell::new("Average score"),
        Cell::new(format!("{:.1}", stats.average_score)),
    ]);
    println!("{table}");
    Ok(())
}
