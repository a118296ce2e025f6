mod app;
mod config;
mod error;
mod fetch;
mod radial;
mod store;
mod taxonomy;
mod util;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LayoutConfig, StyleConfig};
use crate::fetch::{CommandFetcher, FetchCommand, FetchTrigger, PredatorName, store_payload};
use crate::store::ArtifactStore;
use crate::taxonomy::FetchPayload;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding `<predator>_prey_hierarchy.json` artifacts.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Predator shown at startup; defaults to the fallback predator.
    #[arg(long)]
    predator: Option<String>,

    /// Predator shown, labelled as a substitute, when a requested one fails.
    #[arg(long, default_value = "Canis lupus")]
    fallback_predator: String,

    /// External program that prints the interaction payload for a predator.
    #[arg(long, default_value = "prey-fetch")]
    fetch_program: String,

    /// Extra argument for the fetch program, placed before the predator name.
    #[arg(long = "fetch-arg")]
    fetch_args: Vec<String>,

    #[arg(long, default_value_t = FetchCommand::DEFAULT_TIMEOUT.as_secs())]
    fetch_timeout_secs: u64,

    /// JSON file overriding category colours and link styles.
    #[arg(long)]
    style: Option<PathBuf>,

    /// Angular gap between neighbouring leaves of different parents, in leaf slots.
    #[arg(long, default_value_t = LayoutConfig::default().cross_parent_separation)]
    cross_parent_separation: f32,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the fetch program for one predator and store its hierarchy.
    Fetch { predator: String },
    /// Build and store a hierarchy from a payload file already on disk.
    Build {
        #[arg(long)]
        input: PathBuf,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prey_radial=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn fetch_command(args: &Args) -> FetchCommand {
    FetchCommand::new(args.fetch_program.clone())
        .with_args(args.fetch_args.iter().cloned())
        .with_timeout(Duration::from_secs(args.fetch_timeout_secs))
}

fn run_fetch(args: &Args, store: ArtifactStore, predator: &str) -> anyhow::Result<()> {
    let name = PredatorName::parse(predator)?;
    let fetcher = CommandFetcher::new(fetch_command(args), store);
    let path = fetcher
        .trigger(&name)
        .with_context(|| format!("failed to fetch prey of {name}"))?;
    println!("{}", path.display());
    Ok(())
}

fn run_build(store: &ArtifactStore, input: &Path) -> anyhow::Result<()> {
    let raw = fs::read_to_string(input)
        .with_context(|| format!("failed to read payload {}", input.display()))?;
    let payload: FetchPayload = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse payload {}", input.display()))?;
    let name = PredatorName::parse(&payload.predator)?;
    let path = store_payload(store, &name, &payload)
        .with_context(|| format!("failed to build hierarchy for {name}"))?;
    println!("{}", path.display());
    Ok(())
}

fn run_gui(args: Args, store: ArtifactStore) -> anyhow::Result<()> {
    let style = match &args.style {
        Some(path) => StyleConfig::load(path)
            .with_context(|| format!("failed to load style {}", path.display()))?,
        None => StyleConfig::default(),
    };
    let layout_config = LayoutConfig {
        cross_parent_separation: args.cross_parent_separation,
        ..LayoutConfig::default()
    };

    let fetcher = Arc::new(CommandFetcher::new(fetch_command(&args), store.clone()));
    let fallback = Some(args.fallback_predator.clone()).filter(|name| !name.trim().is_empty());
    let initial = args.predator.clone().or_else(|| fallback.clone());
    info!(data_dir = %store.dir().display(), "starting viewer");
    let loader = Arc::new(app::Loader::new(store, fetcher, fallback));

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "prey-radial",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::PreyRadialApp::new(
                cc,
                loader,
                style,
                layout_config,
                initial,
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let store = ArtifactStore::new(args.data_dir.clone());

    if let Some(command) = &args.command {
        return match command {
            Command::Fetch { predator } => run_fetch(&args, store, predator),
            Command::Build { input } => run_build(&store, input),
        };
    }
    run_gui(args, store)
}
