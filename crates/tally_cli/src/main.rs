//! Tally CLI - shared checklists from the command line
//!
//! Usage: tally <command> [options]

use clap::{Parser, Subcommand};
use tally_common::{TallyError, EXIT_CONFIG_ERROR, EXIT_ERROR};

mod commands;

#[derive(Parser)]
#[command(name = "tally", version = "0.1.0", about = "Shared real-time checklists")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose/debug logging
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a Tally session in the current directory
    Init {
        /// Display name stored in the session config
        #[arg(long, default_value = "")]
        name: String,
    },

    /// Create a new shared list
    Create {
        /// List name (3-50 characters)
        name: String,
    },

    /// Join a list by its share code
    Join {
        /// The share code from the list's invite link
        code: String,
    },

    /// Show all lists you are a member of
    Lists {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add an item to a list
    Add {
        /// List id or name
        list: String,

        /// Item text (2-100 characters)
        text: String,
    },

    /// Mark an item done (moves it to the end of the list)
    Done {
        /// List id or name
        list: String,

        /// Item id or text
        item: String,
    },

    /// Mark an item not done (moves it before the done items)
    Undone {
        /// List id or name
        list: String,

        /// Item id or text
        item: String,
    },

    /// Move an item to a new position
    Move {
        /// List id or name
        list: String,

        /// Item id or text
        item: String,

        /// Target position, 0-based
        position: usize,
    },

    /// Delete an item
    Rm {
        /// List id or name
        list: String,

        /// Item id or text
        item: String,
    },

    /// Rename a list
    Rename {
        /// List id or name
        list: String,

        /// New name (3-50 characters)
        name: String,
    },

    /// Set a list's emoji and theme color
    Theme {
        /// List id or name
        list: String,

        #[arg(long)]
        emoji: Option<String>,

        /// One of the unlocked reward colors
        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a list for every member
    Drop {
        /// List id or name
        list: String,
    },

    /// Leave a shared list
    Leave {
        /// List id or name
        list: String,
    },

    /// Show reward progress and unlocked colors
    Rewards,

    /// Send feedback to the developers
    Feedback {
        message: String,

        /// Feedback category: bug, idea or other
        #[arg(long, default_value = "other")]
        kind: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tally_common::telemetry::init_tracing(cli.verbose, false);
    tracing::debug!("Tally CLI started");

    let result = match cli.command {
        Commands::Init { name } => commands::cmd_init(&name).await,
        Commands::Create { name } => commands::cmd_create(&name).await,
        Commands::Join { code } => commands::cmd_join(&code).await,
        Commands::Lists { json } => commands::cmd_lists(json).await,
        Commands::Add { list, text } => commands::cmd_add(&list, &text).await,
        Commands::Done { list, item } => commands::cmd_set_done(&list, &item, true).await,
        Commands::Undone { list, item } => commands::cmd_set_done(&list, &item, false).await,
        Commands::Move {
            list,
            item,
            position,
        } => commands::cmd_move(&list, &item, position).await,
        Commands::Rm { list, item } => commands::cmd_rm(&list, &item).await,
        Commands::Rename { list, name } => commands::cmd_rename(&list, &name).await,
        Commands::Theme { list, emoji, color } => commands::cmd_theme(&list, emoji, color).await,
        Commands::Drop { list } => commands::cmd_drop(&list).await,
        Commands::Leave { list } => commands::cmd_leave(&list).await,
        Commands::Rewards => commands::cmd_rewards().await,
        Commands::Feedback { message, kind } => commands::cmd_feedback(&kind, &message).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let code = match e.downcast_ref::<TallyError>() {
            Some(TallyError::ConfigError(_)) => EXIT_CONFIG_ERROR,
            _ => EXIT_ERROR,
        };
        std::process::exit(code);
    }
}
