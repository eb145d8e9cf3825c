use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::config::KeyResolver;
use crate::diary::DiaryStore;
use crate::session::SessionStore;

mod app;
mod cli;
pub mod commands;
mod config;
mod diary;
mod overlay;
mod screen;
mod session;
mod theme;
pub mod tui;
mod ui;

pub use theme::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting lazydiary");

    let args = cli::Args::parse();

    let config = config::load()?;
    let resolver = Arc::new(KeyResolver::new(Arc::new(config.keybindings.clone())));
    let theme_name = args.theme.as_deref().unwrap_or(&config.theme.name);
    let theme = theme::theme_from_name(theme_name);

    let diary_path = args
        .diary
        .clone()
        .unwrap_or_else(|| config.storage.diary_path());
    let store = Arc::new(DiaryStore::new(diary_path));
    let sessions = Arc::new(SessionStore::new(
        config.storage.session_path(),
        config.auth.clone(),
    ));
    info!(
        diary = %store.path().display(),
        session = %sessions.path().display(),
        "Opening diary"
    );

    let mut app = App::new(resolver, theme, store, sessions);
    app.run().await?;

    Ok(())
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = config::data_dir().join("logs");
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "lazydiary.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
