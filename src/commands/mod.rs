use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use jornada::{EconomyStore, Engine, JsonFileStore, Ledger, Settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod chat;
mod users;

use chat::{run_chat, run_pipe, run_send};
use users::{run_show, run_users};

#[derive(Parser)]
#[command(
    name = "jornada",
    version,
    about = "Chat economy bot: jobs, ranks, pets and a shop, driven by #commands",
    long_about = None
)]
pub struct Cli {
    /// Directory holding config.json and economy.json
    #[arg(long, global = true, default_value = ".jornada")]
    pub data_dir: PathBuf,
    /// Command prefix (overrides config.json)
    #[arg(long, global = true)]
    pub prefix: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write default settings and an empty economy ledger
    Init {
        /// Overwrite existing files
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Read chat lines from stdin as one sender and print the bot's replies
    Chat {
        #[command(flatten)]
        sender: SenderArgs,
    },
    /// Send a single chat line
    Send {
        #[command(flatten)]
        sender: SenderArgs,
        /// Message text, e.g. "#comprar Caja Misteriosa"
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Process JSON-lines inbound events from stdin, write JSON-lines replies
    Pipe,
    /// List registered users
    Users,
    /// Print one user record as JSON
    Show {
        /// Sender id
        id: String,
    },
}

#[derive(clap::Args, Clone, Debug)]
pub struct SenderArgs {
    /// Sender id (stable key of the economy profile)
    #[arg(long)]
    pub sender: String,
    /// Display name used at registration
    #[arg(long)]
    pub name: String,
    /// Treat the sender as a moderator of the current chat
    #[arg(long, default_value_t = false)]
    pub moderator: bool,
}

pub fn run() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn dispatch(cli: Cli) -> Result<(), String> {
    let Cli {
        data_dir,
        prefix,
        command,
    } = cli;

    match command {
        Command::Init { force } => run_init(&data_dir, force),
        Command::Chat { sender } => run_chat(open_engine(&data_dir, prefix)?, sender),
        Command::Send { sender, text } => {
            run_send(&open_engine(&data_dir, prefix)?, sender, text.join(" "))
        }
        Command::Pipe => run_pipe(open_engine(&data_dir, prefix)?),
        Command::Users => run_users(&JsonFileStore::in_dir(&data_dir)),
        Command::Show { id } => run_show(&JsonFileStore::in_dir(&data_dir), &id),
    }
}

fn load_settings(data_dir: &Path, prefix: Option<String>) -> Result<Settings, String> {
    let mut settings = Settings::load_from_dir(data_dir).map_err(|e| e.to_string())?;
    if let Some(prefix) = prefix {
        settings.prefix = prefix;
        settings.validate().map_err(|e| e.to_string())?;
    }
    Ok(settings)
}

fn open_engine(
    data_dir: &Path,
    prefix: Option<String>,
) -> Result<Engine<JsonFileStore>, String> {
    let settings = load_settings(data_dir, prefix)?;
    let store = JsonFileStore::in_dir(data_dir);
    info!(store = %store.path().display(), prefix = %settings.prefix, "economy engine ready");
    Engine::new(store, settings).map_err(|e| e.to_string())
}

fn run_init(data_dir: &Path, force: bool) -> Result<(), String> {
    let settings_path = Settings::path_in(data_dir);
    if settings_path.exists() && !force {
        println!(
            "Settings already present at {} (use --force to overwrite)",
            settings_path.display()
        );
    } else {
        let path = Settings::default()
            .save_to_dir(data_dir)
            .map_err(|e| e.to_string())?;
        println!("Wrote default settings to {}", path.display());
    }

    let store = JsonFileStore::in_dir(data_dir);
    if store.path().exists() && !force {
        println!(
            "Economy ledger already present at {} (use --force to reset)",
            store.path().display()
        );
    } else {
        store
            .save_all(&Ledger::default())
            .map_err(|e| e.to_string())?;
        println!("Initialized empty ledger at {}", store.path().display());
    }
    Ok(())
}
