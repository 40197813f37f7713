#![deny(unsafe_code)]

//! tabkey CLI: check configuration, import legacy settings, and replay
//! keypresses against Markdown files.

mod press;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tabkey_config::{AppConfig, Hotkey, LegacySettings};
use tabkey_core::{EditingMode, Position, build_info, classify};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::press::PressOptions;

/// tabkey: Tab and Enter handling for Markdown editing.
#[derive(Parser)]
#[command(name = "tabkey", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "tabkey.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },

    /// Convert a legacy plugin `data.json` into TOML.
    Import {
        /// The JSON settings file.
        file: PathBuf,
    },

    /// Press a key in a Markdown file and print the result.
    Press {
        file: PathBuf,

        /// Cursor (or selection anchor) as LINE:COLUMN, zero-based.
        #[arg(long)]
        at: Position,

        /// Selection head as LINE:COLUMN.
        #[arg(long)]
        to: Option<Position>,

        /// `tab`, `enter`, or any hotkey such as `Ctrl+Tab`.
        #[arg(long, default_value = "tab")]
        key: Hotkey,

        #[arg(long, value_enum, default_value_t = ModeArg::Source)]
        mode: ModeArg,

        /// Press the key this many times.
        #[arg(long, default_value_t = 1)]
        repeat: usize,

        /// Write the edited text back to the file.
        #[arg(long)]
        write: bool,
    },

    /// Show the zone each syntax token classifies to.
    Classify {
        #[arg(required = true)]
        tokens: Vec<String>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Source,
    LivePreview,
}

impl From<ModeArg> for EditingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Source => EditingMode::Source,
            ModeArg::LivePreview => EditingMode::LivePreview,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = load_config(&cli.config).await?;
    init_tracing(cli.verbose, loaded.as_ref());
    tracing::debug!(version = %build_info::version_string(), "tabkey starting");
    if loaded.is_none() {
        info!(path = %cli.config.display(), "Config file not found, using defaults");
    }
    let config = loaded.unwrap_or_default();

    match cli.command {
        Commands::Config { show } => cmd_config(&cli.config, &config, show)?,
        Commands::Import { file } => cmd_import(&file).await?,
        Commands::Press {
            file,
            at,
            to,
            key,
            mode,
            repeat,
            write,
        } => {
            let opts = PressOptions {
                at,
                to,
                hotkey: key,
                mode: mode.into(),
                repeat,
            };
            cmd_press(&config, &file, &opts, write).await?
        }
        Commands::Classify { tokens, json } => cmd_classify(&tokens, json)?,
    }

    Ok(())
}

/// Verbosity flags override the configured level; `RUST_LOG` overrides both.
fn init_tracing(verbose: u8, config: Option<&AppConfig>) {
    let level = match (verbose, config) {
        (0, Some(config)) => config.logging.level.as_str(),
        (0, None) => "info",
        (1, _) => "debug",
        _ => "trace",
    };
    let developer_mode = config.is_some_and(|c| c.logging.developer_mode);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(filter_directives(level, developer_mode))),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn filter_directives(level: &str, developer_mode: bool) -> String {
    if developer_mode {
        format!("{level},{}=debug", tabkey_core::logging::DECISION_TARGET)
    } else {
        level.to_string()
    }
}

fn cmd_config(config_path: &Path, config: &AppConfig, show: bool) -> Result<()> {
    let (_settings, warnings) = config.build_settings()?;
    for warning in &warnings {
        warn!(%warning, "configuration warning");
    }
    if show {
        let toml_str =
            toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {e}"))?;
        println!("{toml_str}");
    } else if warnings.is_empty() {
        println!("Configuration at '{}' is valid.", config_path.display());
    } else {
        println!(
            "Configuration at '{}' is valid with {} warning(s).",
            config_path.display(),
            warnings.len()
        );
    }
    Ok(())
}

async fn cmd_import(file: &Path) -> Result<()> {
    let json = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    println!("{}", import_to_toml(&json)?);
    Ok(())
}

fn import_to_toml(json: &str) -> Result<String> {
    let config = LegacySettings::from_json(json)?.into_config()?;
    toml::to_string_pretty(&config).map_err(|e| anyhow::anyhow!("TOML error: {e}"))
}

async fn cmd_press(config: &AppConfig, file: &Path, opts: &PressOptions, write: bool) -> Result<()> {
    let (settings, warnings) = config.build_settings()?;
    for warning in &warnings {
        warn!(%warning, "configuration warning");
    }

    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let outcome = press::press(&text, settings, opts);
    for (i, dispatch) in outcome.dispatches.iter().enumerate() {
        info!(press = i + 1, key = %opts.hotkey, "{}", press::describe(dispatch));
    }
    println!("{}", outcome.marked_text());

    if write {
        tokio::fs::write(file, outcome.text())
            .await
            .with_context(|| format!("failed to write {}", file.display()))?;
        info!(path = %file.display(), "file updated");
    }
    Ok(())
}

fn cmd_classify(tokens: &[String], json: bool) -> Result<()> {
    if json {
        let rows: Vec<_> = tokens
            .iter()
            .map(|token| serde_json::json!({ "token": token, "zone": classify(token) }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for token in tokens {
            println!("{token:?} -> {}", classify(token));
        }
    }
    Ok(())
}

/// Load the config file, or `None` if it does not exist.
async fn load_config(path: &Path) -> Result<Option<AppConfig>> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        let config = AppConfig::load(path)
            .await
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(Some(config))
    } else {
        Ok(None)
    }
}
