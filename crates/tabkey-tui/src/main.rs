#![deny(unsafe_code)]

//! tabkey TUI: a small Markdown editor with the engine's Tab/Enter handling
//! and a live view of its decisions.

mod app;
mod keymap;
mod panels;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Tabs},
};
use tabkey_config::AppConfig;
use tabkey_core::{LogCollector, build_info};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::app::{App, Panel};
use crate::panels::EditorPanel;

/// Interactive playground for tabkey.
#[derive(Parser)]
#[command(name = "tabkey-tui", version, about, long_about = None)]
struct Args {
    /// Markdown file to edit; created on save if missing.
    file: Option<PathBuf>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "tabkey.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let collector = LogCollector::new(1000);
    let log_reader = collector.reader();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "info,{}=debug",
                tabkey_core::logging::DECISION_TARGET
            ))
        }))
        .with(collector)
        .init();

    let mut config = load_config(&args.config).await;
    // the decisions panel is the point of the TUI
    config.logging.developer_mode = true;
    let (settings, warnings) = config.build_settings()?;

    let text = match &args.file {
        Some(path) => load_note(path).await?,
        None => String::new(),
    };
    let editor = EditorPanel::new(&text, args.file.clone());

    info!(version = %build_info::version_string(), "Starting tabkey TUI");

    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let mut app = App::new(&config, settings, &warnings, log_reader, editor);
    let result = run(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while !app.should_quit {
        app.tick();
        terminal.draw(|frame| render(frame, app))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let action = app.keymap.resolve(key, app.active_panel);
            app.handle_action(action);
        }

        if let Some(request) = app.take_save_request() {
            let result = tokio::fs::write(&request.path, &request.text)
                .await
                .map_err(|e| e.to_string());
            if result.is_ok() {
                info!(path = %request.path.display(), "saved");
            }
            app.save_finished(result);
        }
    }
    Ok(())
}

fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // panel tabs
            Constraint::Min(1),    // active panel
            Constraint::Length(2), // status bar
        ])
        .split(frame.area());

    let tabs = Tabs::new(Panel::ALL.map(Panel::title))
        .select(app.active_panel.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(tabs, chunks[0]);

    match app.active_panel {
        Panel::Editor => app.editor.render(frame, chunks[1]),
        Panel::Decisions => app.decisions.render(frame, chunks[1]),
        Panel::Config => app.config_panel.render(frame, chunks[1]),
    }

    let status = Paragraph::new(app.status_line())
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, chunks[2]);
}

/// Best-effort: a missing or invalid file falls back to defaults.
async fn load_config(path: &Path) -> AppConfig {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        info!(path = %path.display(), "Config file not found, using defaults");
        return AppConfig::default();
    }
    AppConfig::load(path).await.unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
        AppConfig::default()
    })
}

async fn load_note(path: &Path) -> Result<String> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))
    } else {
        Ok(String::new())
    }
}
