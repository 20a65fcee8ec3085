pub mod render;
pub mod watch;

use std::{
    io::{self, Write as _},
    path::PathBuf,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use render::print_checklist;
use tracing::level_filters::LevelFilter;
use watch::run_watch;

use crate::{
    store::{checklist::Checklist, state_storage::StateStorageImpl},
    utils::{
        clock::{Clock, DefaultClock},
        dir::create_application_default_path,
        logging::enable_logging,
    },
};

#[derive(Parser, Debug)]
#[command(name = "Habitline", version, long_about = None)]
#[command(about = "Daily habit checklist for the terminal", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Add a habit to the checklist")]
    Add {
        #[arg(
            required = true,
            help = "Name of the habit. Multiple words are joined with spaces"
        )]
        name: Vec<String>,
    },
    #[command(about = "Toggle a habit done or undone for today")]
    Toggle {
        #[arg(help = "Position of the habit as shown by status, starting from 1")]
        position: usize,
    },
    #[command(about = "Remove a habit from the checklist")]
    Remove {
        #[arg(help = "Position of the habit as shown by status, starting from 1")]
        position: usize,
    },
    #[command(name = "clear-done", about = "Remove every habit that is done for today")]
    ClearDone {},
    #[command(about = "Remove all habits and start over")]
    Reset {
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    #[command(about = "Show the checklist and today's progress")]
    Status {},
    #[command(about = "Keep the checklist open and re-render when the day rolls over")]
    Watch {},
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = match args.dir {
        Some(dir) => dir,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&dir, logging_level, args.log)?;

    let storage = StateStorageImpl::new(dir)?;
    let mut checklist = Checklist::load(storage, Box::new(DefaultClock)).await;
    // Stale done flags from a previous day must never reach the screen.
    checklist.reset_if_new_day().await;

    match args.commands {
        Commands::Add { name } => {
            checklist.add_habit(&name.join(" ")).await;
        }
        // Displayed positions are 1-based; 0 wraps to an out-of-range index
        // and is ignored like any other stale position.
        Commands::Toggle { position } => {
            checklist.toggle_done(position.wrapping_sub(1)).await;
        }
        Commands::Remove { position } => {
            checklist.delete_habit(position.wrapping_sub(1)).await;
        }
        Commands::ClearDone {} => {
            checklist.clear_completed().await;
        }
        Commands::Reset { yes } => {
            if yes || confirm_reset()? {
                checklist.reset_all().await;
            }
        }
        Commands::Status {} => {}
        Commands::Watch {} => return run_watch(checklist).await,
    }

    print_checklist(checklist.state(), checklist.clock().time());
    Ok(())
}

fn confirm_reset() -> Result<bool> {
    print!("Reset all habits and progress? This cannot be undone. [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
