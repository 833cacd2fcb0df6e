use std::fs::{self, File};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use orgdash::app::App;
use orgdash::cache::paths;
use orgdash::config::{Cli, Config};
use orgdash::error::Result;
use orgdash::github::GitHubClient;
use orgdash::refresh::{self, Refresher};
use orgdash::report;

const LOG_ENV: &str = "ORGDASH_LOG";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to a file while the TUI owns the terminal, to stderr otherwise.
fn init_logging(config: &Config) -> Result<()> {
    if config.print {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .init();
        return Ok(());
    }

    fs::create_dir_all(&config.cache_dir)?;
    let file = File::create(paths::log_path(&config.cache_dir))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn run(config: Config) -> Result<()> {
    init_logging(&config)?;

    let runtime = tokio::runtime::Runtime::new()?;
    let client = Arc::new(GitHubClient::with_base_url(&config.token, &config.api_url)?);

    if config.print {
        let entry = runtime.block_on(refresh::load_or_fetch_repositories(
            &client,
            &config.repositories_cache(),
            &config.org,
        ))?;
        print!("{}", report::render(&config.org, &entry));
        return Ok(());
    }

    let (refresher, messages) = Refresher::new(
        client,
        config.org.clone(),
        config.repositories_cache(),
        config.pull_requests_cache(),
        runtime.handle().clone(),
    );
    let mut app = App::new(refresher, messages, config.poll_interval, config.admin);

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();
    result?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = Config::from_cli(cli).and_then(run);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("orgdash: {}", e);
            ExitCode::FAILURE
        }
    }
}
