use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use commitmark::app::{self, App};
use commitmark::config::Settings;
use commitmark::favorites::FavoritesStore;
use commitmark::network::{CommitSource, GitHubClient};
use commitmark::storage::{FileStore, KeyValueStore};

#[derive(Parser, Debug)]
#[command(name = "commitmark", version, about = "Browse GitHub repositories and commits, bookmark the ones that matter")]
struct Cli {
    /// GitHub username to open on start
    username: Option<String>,

    /// Extra config file, merged over the user and local config
    #[arg(long)]
    config: Option<PathBuf>,

    /// GitHub token (raises the API rate limit)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Commits per page, at most 100
    #[arg(long)]
    per_page: Option<u32>,

    /// Keep favorites in memory only
    #[arg(long)]
    no_persist: bool,

    /// Print saved favorites as JSON and exit
    #[arg(long)]
    favorites: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::new(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(per_page) = cli.per_page {
        settings.commits_per_page = commitmark::network::clamp_per_page(per_page);
    }
    if cli.token.is_some() {
        settings.api_token = cli.token.clone();
    }

    let data_dir = settings.resolve_data_dir();
    if let Some(dir) = &data_dir {
        init_logging(dir, &settings.log_filter);
    }
    tracing::info!("commitmark {} starting", env!("CARGO_PKG_VERSION"));

    let storage: Option<Box<dyn KeyValueStore>> = match (&data_dir, cli.no_persist) {
        (Some(dir), false) => Some(Box::new(FileStore::new(dir.join("favorites")))),
        _ => None,
    };
    let mut favorites = FavoritesStore::new(storage);
    favorites.init();

    if cli.favorites {
        println!("{}", serde_json::to_string_pretty(&favorites.list_favorite_records())?);
        return Ok(());
    }

    let client = GitHubClient::new(&settings.api_base_url, settings.api_token.clone())?;
    let source: Arc<dyn CommitSource> = Arc::new(client);
    let mut app = App::new(source, favorites, settings.commits_per_page, settings.remember_username);

    if let Some(username) = cli.username.or(settings.default_username.clone()) {
        app.enter_username(&username);
    }

    app::run(&mut app).await?;
    tracing::info!("commitmark exiting");
    Ok(())
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging(data_dir: &Path, default_filter: &str) {
    if fs::create_dir_all(data_dir).is_err() {
        return;
    }
    let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("commitmark.log"))
    else {
        return;
    };

    let filter = EnvFilter::try_from_env("COMMITMARK_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}
