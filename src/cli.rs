//! CLI interface for site-warden
//!
//! Thin command surface over the pipeline: every subcommand maps to one
//! core operation and prints a single human-readable result. The
//! interactive mode offers the same operations behind a `!command` prompt
//! and runs the scheduler in the background alongside it.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use crate::config::Config;
use crate::creation::{CreateOutcome, SiteCreator};
use crate::improve::{ImproveOutcome, Improver};
use crate::moderation::DenylistClassifier;
use crate::scheduler::ImprovementScheduler;
use crate::store::{MemoryStore, RecordStore, RestStore};
use crate::types::SiteRecord;

#[derive(Parser)]
#[command(name = "site-warden")]
#[command(about = "Moderation, dedup, and age-scheduled improvement for generated site records", long_about = None)]
#[command(version)]
struct Cli {
    /// Use an in-process store instead of the configured REST endpoint
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Liveness check
    Ping,
    /// Create a record from a description
    Create {
        /// Free-text description the content is generated from
        description: Vec<String>,
    },
    /// List recent records
    List {
        /// Maximum records to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Show a record's moderation and dedup status
    Inspect {
        /// Record fingerprint
        fingerprint: String,
    },
    /// Run one manual improvement pass on a record
    Improve {
        /// Record fingerprint
        fingerprint: String,
    },
    /// Run the improvement scheduler until Ctrl-C
    Watch,
    /// Interactive prompt with !ping, !create, !list, !inspect, !improve
    Interactive,
    /// Inspect or update configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Set the record store base URL
        #[arg(long)]
        set_store_url: Option<String>,
        /// Set the scheduler tick interval in seconds
        #[arg(long)]
        set_interval: Option<u64>,
    },
}

/// Entry point called from main.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    let store = build_store(&config, cli.offline)?;
    let classifier = DenylistClassifier::new(config.moderation.denylist.clone());

    match cli.command {
        Commands::Ping => {
            println!("Pong!");
            Ok(())
        }
        Commands::Create { description } => {
            let description = description.join(" ");
            if description.trim().is_empty() {
                bail!("Description must not be empty");
            }
            create_site(store, classifier, &description).await
        }
        Commands::List { limit } => list_sites(store, limit).await,
        Commands::Inspect { fingerprint } => inspect_site(store, classifier, &fingerprint).await,
        Commands::Improve { fingerprint } => improve_site(store, classifier, &fingerprint).await,
        Commands::Watch => watch(store, classifier, &config).await,
        Commands::Interactive => interactive(store, classifier, &config).await,
        Commands::Config { show, set_store_url, set_interval } => {
            handle_config(config, show, set_store_url, set_interval)
        }
    }
}

fn build_store(config: &Config, offline: bool) -> Result<Arc<dyn RecordStore>> {
    if offline {
        info!("using in-process record store");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let url = match config.store.resolved_url() {
        Some(u) => u,
        None => bail!(
            "Record store URL not configured. Set WARDEN_STORE_URL or run \
             `site-warden config --set-store-url <url>`."
        ),
    };
    let api_key = match config.store.resolved_api_key() {
        Some(k) => k,
        None => bail!("Record store API key not set. Set WARDEN_STORE_KEY."),
    };
    Ok(Arc::new(RestStore::new(url, api_key, config.store.table.clone())))
}

async fn create_site(
    store: Arc<dyn RecordStore>,
    classifier: DenylistClassifier,
    description: &str,
) -> Result<()> {
    let creator = SiteCreator::new(store, classifier);
    match creator.create(description).await? {
        CreateOutcome::Created(record) => {
            let files: Vec<&str> = record.files.keys().map(String::as_str).collect();
            println!("Site created successfully!");
            println!("- Site ID: {}", record.fingerprint);
            println!("- Files: {}", files.join(", "));
            if let Some(key) = &record.access_key {
                println!("- Access key: {}", key);
            }
        }
        CreateOutcome::Rejected => {
            println!("Site contains harmful content. Creation aborted.");
        }
        CreateOutcome::Duplicate => {
            println!("A site with this fingerprint already exists.");
        }
    }
    Ok(())
}

async fn list_sites(store: Arc<dyn RecordStore>, limit: usize) -> Result<()> {
    let sites = store.query_all(Some(limit)).await?;
    if sites.is_empty() {
        println!("No sites found.");
        return Ok(());
    }
    println!("Sites:");
    for site in &sites {
        println!("- {} (ID: {})", site.name, site.fingerprint);
    }
    Ok(())
}

async fn fetch_one(store: &Arc<dyn RecordStore>, fingerprint: &str) -> Result<Option<SiteRecord>> {
    let matches = store.query_by_field("fingerprint", fingerprint).await?;
    Ok(matches.into_iter().next())
}

async fn inspect_site(
    store: Arc<dyn RecordStore>,
    classifier: DenylistClassifier,
    fingerprint: &str,
) -> Result<()> {
    let matches = store.query_by_field("fingerprint", fingerprint).await?;
    let Some(site) = matches.first() else {
        // Normal negative result, not an error
        println!("Site not found.");
        return Ok(());
    };
    let flagged = classifier.is_flagged(&site.files);
    let duplicate = matches.len() > 1;
    println!("Site: {}", site.name);
    println!("Flagged: {}", flagged);
    println!("Duplicate: {}", duplicate);
    Ok(())
}

async fn improve_site(
    store: Arc<dyn RecordStore>,
    classifier: DenylistClassifier,
    fingerprint: &str,
) -> Result<()> {
    let Some(site) = fetch_one(&store, fingerprint).await? else {
        println!("Site not found.");
        return Ok(());
    };
    let improver = Improver::new(store, classifier);
    match improver.improve(&site).await? {
        ImproveOutcome::Updated(_) => println!("Site \"{}\" improved successfully!", site.name),
        ImproveOutcome::Skipped => {
            println!("Site contains harmful content after improvement. Skipping update.")
        }
    }
    Ok(())
}

fn spawn_scheduler(
    store: Arc<dyn RecordStore>,
    classifier: DenylistClassifier,
    config: &Config,
) -> (broadcast::Sender<()>, tokio::task::JoinHandle<()>) {
    let improver = Improver::new(store.clone(), classifier);
    let mut scheduler = ImprovementScheduler::new(config.scheduler.clone(), store, improver);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let handle = tokio::spawn(async move {
        scheduler.run(shutdown_rx).await;
    });
    (shutdown_tx, handle)
}

async fn watch(
    store: Arc<dyn RecordStore>,
    classifier: DenylistClassifier,
    config: &Config,
) -> Result<()> {
    println!(
        "Scheduler running (tick every {}s). Press Ctrl-C to stop.",
        config.scheduler.interval_secs
    );
    let (shutdown_tx, handle) = spawn_scheduler(store, classifier, config);
    tokio::signal::ctrl_c().await?;
    let _ = shutdown_tx.send(());
    let _ = handle.await;
    println!("Scheduler stopped.");
    Ok(())
}

async fn interactive(
    store: Arc<dyn RecordStore>,
    classifier: DenylistClassifier,
    config: &Config,
) -> Result<()> {
    println!("site-warden running...");
    println!("Commands: !ping, !create <description>, !list, !inspect <id>, !improve <id>, !quit");

    let (shutdown_tx, handle) = spawn_scheduler(store.clone(), classifier.clone(), config);

    let mut editor = rustyline::DefaultEditor::new()?;
    loop {
        let line = match editor.readline("warden> ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(line);

        let (cmd, args) = line.split_once(' ').unwrap_or((line, ""));
        let result = match cmd {
            "!ping" => {
                println!("Pong!");
                Ok(())
            }
            "!create" => {
                if args.trim().is_empty() {
                    println!("Usage: !create <description>");
                    Ok(())
                } else {
                    create_site(store.clone(), classifier.clone(), args.trim()).await
                }
            }
            "!list" => list_sites(store.clone(), 10).await,
            "!inspect" => inspect_site(store.clone(), classifier.clone(), args.trim()).await,
            "!improve" => improve_site(store.clone(), classifier.clone(), args.trim()).await,
            "!quit" | "!exit" => break,
            _ => {
                println!("Unknown command.");
                Ok(())
            }
        };
        // A failed command never takes the prompt down
        if let Err(e) = result {
            println!("Error: {:#}", e);
        }
    }

    let _ = shutdown_tx.send(());
    let _ = handle.await;
    Ok(())
}

fn handle_config(
    mut config: Config,
    show: bool,
    set_store_url: Option<String>,
    set_interval: Option<u64>,
) -> Result<()> {
    let mut changed = false;
    if let Some(url) = set_store_url {
        config.store.url = url;
        changed = true;
    }
    if let Some(interval) = set_interval {
        if interval == 0 {
            bail!("Tick interval must be at least 1 second");
        }
        config.scheduler.interval_secs = interval;
        changed = true;
    }
    if changed {
        config.save()?;
        println!("Configuration saved.");
    }
    if show || !changed {
        let url = if config.store.url.is_empty() { "(unset)" } else { config.store.url.as_str() };
        println!("Store URL:      {}", url);
        println!("Store table:    {}", config.store.table);
        println!("Tick interval:  {}s", config.scheduler.interval_secs);
        println!("Milestones:     {:?}", config.scheduler.milestone_days);
        println!("Denylist:       {:?}", config.moderation.denylist);
    }
    Ok(())
}
