use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "doomjournal", version, about = "Doom Journal CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write default settings for any missing field
    Install,
    /// Evaluate a navigation against the gate
    Check(commands::gate::CheckArgs),
    /// Re-check an already open page for pass expiry
    Watch(commands::gate::WatchArgs),
    /// Show the current access pass
    Pass,
    /// Run an interactive writing session on stdin
    Write(commands::write::WriteArgs),
    /// Journal entries
    Entries {
        #[command(subcommand)]
        action: commands::entries::EntriesAction,
    },
    /// Export all entries
    Export {
        #[command(subcommand)]
        action: commands::export::ExportAction,
    },
    /// Import entries from a JSON export
    Import {
        /// Path to a JSON export
        file: std::path::PathBuf,
    },
    /// Blocking settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("doomjournal=info,doomjournal_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Install => commands::settings::install(),
        Commands::Check(args) => commands::gate::check(args),
        Commands::Watch(args) => commands::gate::watch(args),
        Commands::Pass => commands::settings::pass(),
        Commands::Write(args) => commands::write::run(args),
        Commands::Entries { action } => commands::entries::run(action),
        Commands::Export { action } => commands::export::run(action),
        Commands::Import { file } => commands::export::import(&file),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "doomjournal",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
