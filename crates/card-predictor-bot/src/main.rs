//! Card Predictor relay entry point.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use card_predictor_bot::config::{resolve_settings, SettingsOverrides};
use card_predictor_bot::protocol::UpdateHandler;
use card_predictor_bot::replay::replay;
use card_predictor_bot::transport::StdioTransport;

#[derive(Parser)]
#[command(
    name = "card-predictor-bot",
    about = "Relay chat updates to per-chat card prediction engines",
    version
)]
struct Cli {
    /// Path to a JSON predictor config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Only trigger on the known combination table.
    #[arg(long, global = true)]
    strict: bool,

    /// Rounds after the target in which a prediction may resolve.
    #[arg(long, global = true)]
    window: Option<u64>,

    /// Seconds to retain predictions and provisional messages before eviction.
    #[arg(long, global = true, conflicts_with = "no_retention")]
    retention: Option<u64>,

    /// Never evict predictions or provisional messages.
    #[arg(long, global = true)]
    no_retention: bool,

    /// Also analyze private chats.
    #[arg(long, global = true)]
    include_private: bool,

    /// Skip edited messages.
    #[arg(long, global = true)]
    ignore_edits: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read JSON chat updates from stdin and write outbound messages to stdout (default).
    Serve,

    /// Replay a plain-text feed, one message per line, through a single engine.
    Replay {
        /// Feed file.
        file: PathBuf,
    },

    /// Print the effective configuration as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   card-predictor-bot completions bash > ~/.local/share/bash-completion/completions/card-predictor-bot
    ///   card-predictor-bot completions zsh > ~/.zfunc/_card-predictor-bot
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

impl Cli {
    fn overrides(&self) -> SettingsOverrides {
        let retention_secs = if self.no_retention {
            Some(None)
        } else {
            self.retention.map(Some)
        };

        SettingsOverrides {
            config_path: self.config.clone(),
            strict: self.strict.then_some(true),
            verification_window: self.window,
            retention_secs,
            include_private: self.include_private.then_some(true),
            process_edits: self.ignore_edits.then_some(false),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let overrides = cli.overrides();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let settings = resolve_settings(&overrides)?;
            tracing::info!("Card predictor relay {}", env!("CARGO_PKG_VERSION"));
            let handler = UpdateHandler::new(settings)?;
            let transport = StdioTransport::new(handler);
            let summary = transport.run().await?;
            tracing::info!(
                "Processed {} updates: {} sent, {} skipped",
                summary.lines,
                summary.sent,
                summary.skipped
            );
            for report in transport.handler().session_reports().await {
                tracing::info!(
                    "Chat {}: {} messages, {} sent, {} pending, {} correct, {} failed (active {} to {})",
                    report.chat_id,
                    report.messages_seen,
                    report.outputs_sent,
                    report.stats.pending,
                    report.stats.correct,
                    report.stats.failed,
                    report.started_at.format("%Y-%m-%d %H:%M:%S"),
                    report.last_activity.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }

        Commands::Replay { file } => {
            let settings = resolve_settings(&overrides)?;
            let input = std::fs::File::open(&file).map_err(|e| {
                anyhow::anyhow!("Failed to open feed {}: {e}", file.display())
            })?;
            let stdout = std::io::stdout();
            let summary = replay(
                &settings.predictor,
                std::io::BufReader::new(input),
                stdout.lock(),
            )?;
            eprintln!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Commands::Info => {
            let settings = resolve_settings(&overrides)?;
            let info = serde_json::json!({
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "settings": settings,
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(
                shell,
                &mut cmd,
                "card-predictor-bot",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}
