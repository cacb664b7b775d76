//! The `cardbox lists` command.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use comfy_table::{Cell, Table};
use futures::future::try_join_all;

use cardbox_core::selector::Selector;
use cardbox_core::statistics::compute_list_stats;

use super::open;

pub async fn execute(config_path: Option<&Path>) -> Result<()> {
    let (config, repository) = open(config_path)?;
    let lists = repository.lists().await?;

    if lists.is_empty() {
        println!("No lists yet. Create one with `cardbox new-list --name <NAME>`.");
        return Ok(());
    }

    let decks = try_join_all(lists.iter().map(|list| repository.cards(&list.id))).await?;
    let selector = Selector::new(config.selector.clone());
    let now = Utc::now();

    let mut table = Table::new();
    table.set_header(vec!["List", "Id", "Cards", "New", "In rotation", "Avg score"]);
    for (list, cards) in lists.iter().zip(&decks) {
        let stats = compute_list_stats(cards, &selector, now);
        table.add_row(vec![
            Cell::new(&list.name),
            Cell::new(&list.id),
            Cell::new(stats.total),
            Cell::new(stats.new),
            Cell::new(stats.in_rotation),
            Cell::new(format!("{:.1}", stats.average_score)),
        ]);
    }

    println!("{table}");
    Ok(())
}
