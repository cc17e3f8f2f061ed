mod app;
mod config;
mod dispatch;
mod error;
mod event;
mod logging;
mod model;
mod seed;
mod session;
mod theme;

use app::MultiChatApp;
use chrono::Utc;
use clap::Parser;
use config::Config;
use dispatch::Dispatcher;
use eframe::egui;
use session::store::SessionStore;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "multichat")]
#[command(about = "Chat with several AI models side by side")]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset; overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Start with an empty chat history
    #[arg(long)]
    no_seed: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    logging::init_logging(cli.log_level.as_deref(), config.log_level.as_deref());

    let registry = config.registry()?;
    let mut store = SessionStore::new();
    if config.seed_examples && !cli.no_seed {
        if let Err(err) = seed::seed_examples(&mut store, Utc::now()) {
            warn!(%err, "failed to load example conversations");
        }
    }
    let dispatcher = Dispatcher::new(&config.dispatch);
    info!(
        models = registry.list_models().len(),
        sessions = store.len(),
        "starting multichat"
    );

    let app = MultiChatApp::new(registry, store, dispatcher, config.window.narrow_breakpoint);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Multi-AI Chat",
        native_options,
        Box::new(move |creation_context| {
            app.theme().apply_visuals(&creation_context.egui_ctx);
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
