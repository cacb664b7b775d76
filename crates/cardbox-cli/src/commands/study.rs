//! Interactive study: `study` and `learn`.
//!
//! Both read one command per line from stdin: `f` flips the card, `y` and
//! `n` answer it, `q` quits. End of input quits as well.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use cardbox_core::random::{rng_from_seed, RandomSource};
use cardbox_core::scheduler::Scheduler;
use cardbox_core::selector::Selector;
use cardbox_core::session::{Presented, SessionState, StudySession};

use super::{open, resolve_list};

enum Command {
    Flip,
    Answer(bool),
    Quit,
}

type Input = Lines<BufReader<Stdin>>;

/// Read commands until one answers or quits. Flips are handled here.
async fn next_command<R: RandomSource>(
    input: &mut Input,
    session: &mut StudySession<R>,
) -> Result<Command> {
    loop {
        let Some(line) = input.next_line().await? else {
            return Ok(Command::Quit);
        };
        let command = match line.trim() {
            "f" | "flip" => Command::Flip,
            "y" | "yes" => Command::Answer(true),
            "n" | "no" => Command::Answer(false),
            "q" | "quit" => Command::Quit,
            "" => continue,
            other => {
                println!("Unknown command '{other}'. Use f, y, n or q.");
                continue;
            }
        };
        match command {
            Command::Flip => {
                if let Some(presented) = session.reveal() {
                    println!("  -> {}", presented.visible_text());
                }
            }
            other => return Ok(other),
        }
    }
}

fn show(presented: &Presented) {
    println!("\n[{}] {}", presented.face, presented.visible_text());
    println!("(f)lip, (y)es I knew it, (n)o, (q)uit");
}

fn new_session(
    repository: cardbox_core::repository::CardRepository,
    list_id: &str,
    config: &cardbox_store::CardboxConfig,
    seed: Option<u64>,
) -> StudySession<impl RandomSource> {
    tracing::debug!(list = %list_id, ?seed, "opening study session");
    StudySession::new(
        repository,
        list_id,
        Scheduler::new(config.scheduler.clone()),
        Selector::new(config.selector.clone()),
        rng_from_seed(seed),
    )
}

pub async fn execute(config_path: Option<&Path>, key: &str, seed: Option<u64>) -> Result<()> {
    let (config, repository) = open(config_path)?;
    let list = resolve_list(&repository, key).await?;
    let mut session = new_session(repository, &list.id, &config, seed);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    session.start(Utc::now()).await?;
    println!("Studying \"{}\"", list.name);

    loop {
        let presented = match session.state() {
            SessionState::HasCard(presented) => presented,
            SessionState::Empty | SessionState::Loading => {
                println!("All caught up!");
                if !session.new_cards().is_empty() {
                    println!(
                        "{} new cards waiting: run `cardbox learn --list \"{}\"`.",
                        session.new_cards().len(),
                        list.name
                    );
                }
                break;
            }
        };
        show(presented);

        match next_command(&mut input, &mut session).await? {
            Command::Answer(correct) => {
                session.answer(correct, Utc::now()).await;
            }
            Command::Quit | Command::Flip => break,
        }
    }

    println!("Answered {} cards.", session.answered());
    Ok(())
}

pub async fn learn(config_path: Option<&Path>, key: &str, seed: Option<u64>) -> Result<()> {
    let (config, repository) = open(config_path)?;
    let list = resolve_list(&repository, key).await?;
    let mut session = new_session(repository, &list.id, &config, seed);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    session.start(Utc::now()).await?;
    let pending: Vec<String> = session.new_cards().iter().map(|card| card.id.clone()).collect();
    if pending.is_empty() {
        println!("No new cards in \"{}\".", list.name);
        return Ok(());
    }
    println!("Learning {} new cards from \"{}\"", pending.len(), list.name);

    for card_id in &pending {
        let presented = session.surface(card_id)?;
        show(presented);

        match next_command(&mut input, &mut session).await? {
            Command::Answer(correct) => {
                session.answer(correct, Utc::now()).await;
            }
            Command::Quit | Command::Flip => break,
        }
    }

    println!("Answered {} cards.", session.answered());
    Ok(())
}
