use clap::{Parser, Subcommand, ValueEnum};
use image_ranker::interaction::TierSlot;
use image_ranker::session::Session;
use image_ranker::types::ViewMode;
use image_ranker::{config, output};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "image-ranker")]
#[command(about = "Rank images or sort them into a tier list, then export it as a PNG")]
#[command(long_about = "\
Rank images or sort them into a tier list, then export it as a PNG

New images land in the unranked pool. `promote` moves them into the ranked
list (ranking mode) or the first tier (tier mode); `demote` sends them back.

Workspace layout:

  .image-ranker/
  ├── config.toml          # Optional, see `image-ranker gen-config`
  ├── blobs/               # Private copies of every added image
  └── storage/             # Saved board state, one JSON file per slot

Images are referenced by id, any unique id prefix, or exact file name.
Tiers are referenced by key or name.

Set RUST_LOG (e.g. RUST_LOG=image_ranker=debug) for more detail on stderr.")]
#[command(version)]
struct Cli {
    /// Workspace directory holding images, state and config
    #[arg(long, default_value = ".image-ranker", global = true)]
    workspace: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add image files (or directories of images) to the unranked pool
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Show the ranked list, the tiers and the unranked pool
    List,
    /// Move pool images into the ranking (or first tier, in tier mode)
    Promote {
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Send ranked or tiered images back to the pool
    Demote {
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Remove images entirely and delete their stored copies
    Discard {
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Move the ranked image at position FROM to position TO (1-based)
    Move { from: usize, to: usize },
    /// Switch between the ranking and tier views
    Mode { mode: ModeArg },
    /// Manage tiers
    #[command(subcommand)]
    Tier(TierCommand),
    /// Remove every image and reset tiers to S A B C D
    Clear,
    /// Export the current view as <filename>.png
    Export {
        /// Directory to write into
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum TierCommand {
    /// Append a tier named after the last one (S A B C D → E)
    Add,
    /// Remove a tier; its images return to the pool
    Remove { tier: String },
    Rename { tier: String, name: String },
    /// Set a tier's color (#rgb or #rrggbb)
    Recolor { tier: String, color: String },
    /// Move an image into a tier, or back to the pool with --pool
    Move {
        item: String,
        #[arg(required_unless_present = "pool")]
        tier: Option<String>,
        #[arg(long, conflicts_with = "tier")]
        pool: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Ranking,
    Tier,
}

impl From<ModeArg> for ViewMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Ranking => ViewMode::Ranking,
            ModeArg::Tier => ViewMode::Tier,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_ranker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut session = Session::open(&cli.workspace)?;
    match cli.command {
        Command::Add { paths } => {
            let added = session.upload(&paths)?;
            output::print_added(session.board(), &added);
        }
        Command::List => output::print_board(session.board()),
        Command::Promote { items } => {
            for reference in &items {
                let id = session.item(reference)?;
                session.promote(&id)?;
            }
            output::print_board(session.board());
        }
        Command::Demote { items } => {
            for reference in &items {
                let id = session.item(reference)?;
                session.demote(&id)?;
            }
            output::print_board(session.board());
        }
        Command::Discard { items } => {
            for reference in &items {
                let id = session.item(reference)?;
                session.discard(&id)?;
            }
            output::print_board(session.board());
        }
        Command::Move { from, to } => {
            let (Some(from), Some(to)) = (from.checked_sub(1), to.checked_sub(1)) else {
                return Err("positions start at 1".into());
            };
            session.reorder(from, to)?;
            output::print_board(session.board());
        }
        Command::Mode { mode } => {
            session.set_mode(mode.into())?;
            println!("Mode: {}", session.board().mode());
        }
        Command::Tier(command) => {
            run_tier_command(&mut session, command)?;
            output::print_board(session.board());
        }
        Command::Clear => {
            session.clear_all()?;
            println!("Cleared {}", cli.workspace.display());
        }
        Command::Export { out } => {
            init_thread_pool(&session.config().processing);
            // Export failures are reported, not fatal.
            match session.export(&out) {
                Ok(path) => {
                    let size = image::image_dimensions(&path).ok();
                    println!("{}", output::format_exported(session.board(), &path, size));
                }
                Err(e) => error!(error = %e, "export failed; no file written"),
            }
        }
        // Printed before the workspace was opened.
        Command::GenConfig => {}
    }

    Ok(())
}

fn run_tier_command(
    session: &mut Session,
    command: TierCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        TierCommand::Add => {
            let key = session.add_tier()?;
            println!("Added tier {key}");
        }
        TierCommand::Remove { tier } => {
            let key = session.tier(&tier)?;
            session.remove_tier(&key)?;
        }
        TierCommand::Rename { tier, name } => {
            let key = session.tier(&tier)?;
            session.rename_tier(&key, &name)?;
        }
        TierCommand::Recolor { tier, color } => {
            let key = session.tier(&tier)?;
            session.recolor_tier(&key, &color)?;
        }
        TierCommand::Move { item, tier, pool } => {
            let id = session.item(&item)?;
            let target = match (tier, pool) {
                (_, true) => TierSlot::Unranked,
                (Some(tier), false) => TierSlot::Tier(session.tier(&tier)?),
                (None, false) => return Err("a tier or --pool is required".into()),
            };
            session.move_to(&id, target)?;
        }
    }
    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Never more threads than available cores; the config can only lower it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
