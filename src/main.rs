//! Itemdesk CLI - hosts the item store bridge and runs template setup

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use itemdesk::bridge::{AddItemResponse, DeleteItemResponse, GetItemsResponse, TestResponse};
use itemdesk::config::{self, ItemdeskConfig};
use itemdesk::output::{emit_failure, emit_success, is_quiet, OutputMode};
use itemdesk::setup::{self, TemplateVars};
use itemdesk::storage::ItemStore;
use itemdesk::ui::{self, Icons};
use itemdesk::{Bridge, DatabaseApi};
use owo_colors::OwoColorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "itemdesk")]
#[command(version)]
#[command(about = "Desktop app template core - SQLite item store behind a whitelisted bridge")]
#[command(long_about = r#"
Itemdesk hosts a single-table SQLite store for a desktop UI. The UI can
only reach the store through four functions: test, addItem, getItems and
deleteItem.

Example usage:
  itemdesk add "hello"
  itemdesk list --limit 5
  itemdesk serve --port 4317
  itemdesk setup --app-name "My App" --author "Jane Doe"
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Emit machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Add an item
    Add {
        /// Message to store
        message: String,
    },

    /// List the most recent items
    List {
        /// Maximum number of items
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Delete an item by id
    Delete {
        /// Item id
        id: i64,
    },

    /// Insert a diagnostic item and list
    Test,

    /// Show statistics about the database
    Stats,

    /// Serve the UI and the bridge over HTTP
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory with the built UI
        #[arg(long)]
        ui_dir: Option<PathBuf>,
    },

    /// Serve the bridge as newline-delimited JSON on stdin/stdout
    Stdio,

    /// Replace template placeholders across a project
    Setup {
        /// Project root
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// App name (prompted when missing)
        #[arg(long)]
        app_name: Option<String>,

        /// App description
        #[arg(long)]
        description: Option<String>,

        /// Author name
        #[arg(long)]
        author: Option<String>,

        /// Reverse-domain app id (defaults to a suggestion)
        #[arg(long)]
        app_id: Option<String>,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let output_mode = OutputMode::from_flag(cli.json);

    // Initialize logging. Always stderr: stdout carries results.
    let default_level = if cli.verbose {
        "debug"
    } else if matches!(cli.command, Commands::Serve { .. } | Commands::Stdio) {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let mut cfg = config::load_config(Some(&config_path))?.unwrap_or_default();
    if let Some(database) = &cli.database {
        cfg.database = Some(database.display().to_string());
    }

    match cli.command {
        Commands::Init { force } => {
            let cfg = ItemdeskConfig {
                app_name: Some(cfg.app_name().to_string()),
                list_limit: Some(cfg.list_limit()),
                port: Some(cfg.port()),
                ..cfg
            };
            config::write_config(&config_path, &cfg, force)?;
            if output_mode.is_human() {
                ui::success(&format!("Wrote {}", config_path.display()));
                ui::info("Database", &cfg.database_path().display().to_string());
            } else {
                emit_success(output_mode, "init", serde_json::json!({
                    "config": config_path,
                    "database": cfg.database_path(),
                }))?;
            }
        }

        Commands::Add { message } => {
            let (bridge, api) = open_api(&cfg, cfg.list_limit());
            let response: AddItemResponse = serde_json::from_value(api.add_item(&message).await)?;
            bridge.teardown();

            if output_mode.is_human() {
                match (&response.item, &response.error) {
                    (Some(item), _) => {
                        println!("{} {}", Icons::NEW.style(ui::theme().success.clone()), response.message.as_deref().unwrap_or_default());
                        ui::info("ID", &item.id.to_string());
                    }
                    (None, error) => ui::error(error.as_deref().unwrap_or("Failed to add item")),
                }
            } else {
                emit(output_mode, "add", response.success, &response)?;
            }
            exit_on_failure(response.success);
        }

        Commands::List { limit } => {
            let limit = limit.unwrap_or_else(|| cfg.list_limit());
            let (bridge, api) = open_api(&cfg, limit);
            let response: GetItemsResponse = serde_json::from_value(api.get_items().await)?;
            bridge.teardown();

            if output_mode.is_human() {
                if let Some(error) = &response.error {
                    ui::error(error);
                } else if response.items.is_empty() {
                    println!("{} No items stored.", Icons::EMPTY);
                } else {
                    println!("{}", ui::items_table(&response.items));
                }
            } else {
                emit(output_mode, "list", response.success, &response)?;
            }
            exit_on_failure(response.success);
        }

        Commands::Delete { id } => {
            let (bridge, api) = open_api(&cfg, cfg.list_limit());
            let response: DeleteItemResponse = serde_json::from_value(api.delete_item(id).await)?;
            bridge.teardown();

            if output_mode.is_human() {
                match (&response.message, &response.error) {
                    (_, Some(error)) => ui::error(error),
                    (Some(message), None) if response.success => {
                        println!("{} {}", Icons::DEL.style(ui::theme().success.clone()), message)
                    }
                    (Some(message), None) => ui::warn(message),
                    (None, None) => {}
                }
            } else {
                emit(output_mode, "delete", response.success, &response)?;
            }
            exit_on_failure(response.success);
        }

        Commands::Test => {
            let (bridge, api) = open_api(&cfg, cfg.list_limit());
            let spinner = output_mode.is_human().then(|| ui::Spinner::new("Running database test..."));
            let response: TestResponse = serde_json::from_value(api.test().await)?;
            bridge.teardown();
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }

            if output_mode.is_human() {
                if response.success {
                    println!("{} {}", Icons::TEST, response.message.style(ui::theme().success.clone()));
                    println!("{}", ui::items_table(&response.items));
                } else {
                    ui::error(&response.message);
                }
            } else {
                emit(output_mode, "test", response.success, &response)?;
            }
            exit_on_failure(response.success);
        }

        Commands::Stats => {
            let path = cfg.database_path();
            let store = ItemStore::open_existing(&path)
                .context("No database yet. Add an item with `itemdesk add` first")?;
            let count = store.count()?;
            let newest = store.list_recent(1)?.into_iter().next();
            let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

            if output_mode.is_human() {
                println!("{} Itemdesk Statistics", Icons::STATS);
                println!(
                    "{}",
                    ui::stats_table(&[
                        ("Database", &path.display().to_string()),
                        ("Items", &count.to_string()),
                        ("Newest", newest.as_ref().map(|i| i.created_at.as_str()).unwrap_or("-")),
                        ("Size", &ui::human_bytes(size)),
                    ])
                );
            } else {
                emit_success(output_mode, "stats", serde_json::json!({
                    "database": path,
                    "items": count,
                    "newest": newest,
                    "size_bytes": size,
                }))?;
            }
        }

        Commands::Serve { port, ui_dir } => {
            let port = port.unwrap_or_else(|| cfg.port());
            let ui_dir = ui_dir.unwrap_or_else(|| cfg.ui_dir());
            let (bridge, api) = open_api(&cfg, cfg.list_limit());

            if output_mode.is_human() && !is_quiet() {
                ui::header("Itemdesk");
                ui::info("Database", &cfg.database_path().display().to_string());
                ui::info("UI", &ui_dir.display().to_string());
                println!("{} Server running at http://127.0.0.1:{}", Icons::GLOBE, port);
            }

            let result = itemdesk::server::start_server(port, api, &ui_dir, shutdown_signal()).await;
            bridge.teardown();
            result?;
        }

        Commands::Stdio => {
            let (bridge, api) = open_api(&cfg, cfg.list_limit());
            let result = itemdesk::stdio::run_stdio(api).await;
            bridge.teardown();
            result?;
        }

        Commands::Setup { root, app_name, description, author, app_id, dry_run } => {
            run_setup(output_mode, &root, app_name, description, author, app_id, dry_run)?;
        }
    }

    Ok(())
}

/// Set up the bridge for the configured database and wrap it in the shim.
/// Initialization failure is logged by the bridge; the api then reports it.
fn open_api(cfg: &ItemdeskConfig, list_limit: usize) -> (Arc<Bridge>, DatabaseApi) {
    let bridge = Arc::new(Bridge::setup(&cfg.database_path()).with_list_limit(list_limit));
    let api = DatabaseApi::new(bridge.clone());
    (bridge, api)
}

fn emit<T: serde::Serialize>(mode: OutputMode, command: &str, ok: bool, data: T) -> anyhow::Result<()> {
    if ok {
        emit_success(mode, command, data)
    } else {
        emit_failure(mode, command, data)
    }
}

fn exit_on_failure(success: bool) {
    if !success {
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

fn prompt(term: &console::Term, label: &str) -> anyhow::Result<String> {
    term.write_str(label)?;
    Ok(term.read_line()?.trim().to_string())
}

fn run_setup(
    output_mode: OutputMode,
    root: &Path,
    app_name: Option<String>,
    description: Option<String>,
    author: Option<String>,
    app_id: Option<String>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let interactive = output_mode.is_human() && console::Term::stdout().is_term();
    let term = console::Term::stdout();

    let app_name = match app_name {
        Some(name) => name,
        None if interactive => prompt(&term, "📱 App name (e.g., \"My Awesome App\"): ")?,
        None => anyhow::bail!("--app-name is required when not running interactively"),
    };
    if app_name.trim().is_empty() {
        anyhow::bail!("App name is required");
    }
    let description = match description {
        Some(d) => d,
        None if interactive => prompt(&term, "📝 App description: ")?,
        None => String::new(),
    };
    let author = match author {
        Some(a) => a,
        None if interactive => prompt(&term, "👤 Author name: ")?,
        None => String::new(),
    };
    let app_id = match app_id {
        Some(id) => Some(id),
        None if interactive => {
            let suggested = setup::suggested_app_id(&author, &app_name);
            Some(prompt(&term, &format!("🆔 App ID [{}]: ", suggested))?)
        }
        None => None,
    };

    let vars = TemplateVars::new(&app_name, &description, &author, app_id.as_deref())?;
    let files = setup::collect_files(root)?;

    let started = Instant::now();
    let report = if output_mode.is_human() {
        ui::header(if dry_run { "Template Setup (dry run)" } else { "Template Setup" });
        let progress = ui::FileProgress::new(files.len(), "Processing files");
        let report = setup::run(root, &files, &vars, dry_run, |file| {
            progress.inc(&file.strip_prefix(root).unwrap_or(file).display().to_string());
        });
        progress.finish_with_summary(started.elapsed(), report.scanned, report.updated.len());
        report
    } else {
        setup::run(root, &files, &vars, dry_run, |_| {})
    };

    if output_mode.is_human() {
        for path in &report.updated {
            ui::file_updated(&path.display().to_string());
        }
        for (path, reason) in &report.failed {
            ui::file_failed(&path.display().to_string(), reason);
        }

        ui::section("Summary");
        ui::summary_row("App Name:", &vars.app_name);
        ui::summary_row("Description:", &vars.app_description);
        ui::summary_row("Author:", &vars.author_name);
        ui::summary_row("App ID:", &vars.app_id);
        ui::timing(&format!("{:.2?}", started.elapsed()));
        if dry_run {
            println!("{}", ui::dim("Dry run: no files were written."));
        } else {
            ui::success("Template setup complete!");
        }
    } else {
        emit_success(output_mode, "setup", serde_json::json!({
            "app_name": vars.app_name,
            "app_description": vars.app_description,
            "author_name": vars.author_name,
            "app_id": vars.app_id,
            "dry_run": dry_run,
            "scanned": report.scanned,
            "updated": report.updated,
            "failed": report.failed.iter().map(|(p, e)| serde_json::json!({"path": p, "error": e})).collect::<Vec<_>>(),
        }))?;
    }

    Ok(())
}
