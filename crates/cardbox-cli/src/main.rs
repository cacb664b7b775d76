//! cardbox CLI: spaced-repetition flashcards in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "cardbox", version, about = "Spaced-repetition flashcards")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter cardbox.toml
    Init,

    /// Show every list with its statistics
    Lists,

    /// Create a list
    NewList {
        #[arg(long)]
        name: String,
    },

    /// Rename a list
    RenameList {
        /// List id or exact name
        #[arg(long)]
        list: String,

        #[arg(long)]
        name: String,
    },

    /// Delete a list and all of its cards
    DeleteList {
        #[arg(long)]
        list: String,
    },

    /// Add a card to a list
    Add {
        #[arg(long)]
        list: String,

        #[arg(long)]
        prompt: String,

        #[arg(long)]
        answer: String,
    },

    /// Change the prompt or answer of a card
    Edit {
        #[arg(long)]
        list: String,

        /// Card id
        #[arg(long)]
        card: String,

        #[arg(long)]
        prompt: Option<String>,

        #[arg(long)]
        answer: Option<String>,
    },

    /// Delete a card
    Remove {
        #[arg(long)]
        list: String,

        #[arg(long)]
        card: String,
    },

    /// Show the cards of a list with their scheduling state
    Cards {
        #[arg(long)]
        list: String,
    },

    /// Import "Name - Definition" lines from a text file
    Import {
        #[arg(long)]
        list: String,

        /// Text file, or "-" for stdin
        #[arg(long)]
        file: PathBuf,
    },

    /// Import lists from a JSON export
    ImportJson {
        #[arg(long)]
        file: PathBuf,
    },

    /// Export every list as JSON (stdout when no output is given)
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Study the due cards of a list
    Study {
        #[arg(long)]
        list: String,

        /// Seed for a reproducible session
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Go through the never-answered cards of a list once
    Learn {
        #[arg(long)]
        list: String,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Statistics for one list
    Stats {
        #[arg(long)]
        list: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cardbox=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Init => commands::init::execute(config),
        Commands::Lists => commands::lists::execute(config).await,
        Commands::NewList { name } => commands::manage::new_list(config, &name).await,
        Commands::RenameList { list, name } => {
            commands::manage::rename_list(config, &list, &name).await
        }
        Commands::DeleteList { list } => commands::manage::delete_list(config, &list).await,
        Commands::Add {
            list,
            prompt,
            answer,
        } => commands::cards::add(config, &list, &prompt, &answer).await,
        Commands::Edit {
            list,
            card,
            prompt,
            answer,
        } => {
            commands::cards::edit(config, &list, &card, prompt.as_deref(), answer.as_deref())
                .await
        }
        Commands::Remove { list, card } => commands::cards::remove(config, &list, &card).await,
        Commands::Cards { list } => commands::cards::show(config, &list).await,
        Commands::Import { list, file } => {
            commands::exchange::import_text(config, &list, &file).await
        }
        Commands::ImportJson { file } => commands::exchange::import_json(config, &file).await,
        Commands::Export { output } => commands::exchange::export(config, output.as_deref()).await,
        Commands::Study { list, seed } => commands::study::execute(config, &list, seed).await,
        Commands::Learn { list, seed } => commands::study::learn(config, &list, seed).await,
        Commands::Stats { list, json } => commands::stats::execute(config, &list, json).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
