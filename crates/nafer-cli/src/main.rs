use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nafer_core::{
    config::expand_tilde, report::LOAD_FAILURE_SUMMARY, storage::FeedStore, AppConfig,
};

mod commands;

/// Exit status when the settings or the feed store cannot be loaded (-1 as seen by the shell)
const LOAD_FAILURE: u8 = 255;

/// Log filter for `--debug`: our own crates only, not the HTTP stack
const DEBUG_FILTER: &str = "nafer=debug,nafer_core=debug";

#[derive(Parser, Debug)]
#[command(name = "nafer")]
#[command(author, version, about = "News feed basic alarm")]
struct Cli {
    /// Feeds to check. If not provided checks all feeds
    feeds: Vec<String>,

    /// Feed store file
    #[arg(short, long, default_value_os_t = AppConfig::default_store_path())]
    config: PathBuf,

    /// List feeds and exit
    #[arg(long)]
    list: bool,

    /// Short output: <updated>/<bad>!/<total>
    #[arg(short, long)]
    short: bool,

    /// Print raw fetch results to stderr
    #[arg(short, long)]
    debug: bool,

    /// Fetch even feeds checked less than a day ago
    #[arg(short, long)]
    uncached: bool,
}

fn init_logging(config: &AppConfig, debug: bool) {
    let default_filter = if debug {
        DEBUG_FILTER.to_string()
    } else {
        config.general.log_level.clone()
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or(default_filter),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Report a file that could not be loaded, in the format the output mode expects
fn load_failure(cli: &Cli, what: &str, err: &nafer_core::Error) -> ExitCode {
    if cli.short {
        println!("{}", LOAD_FAILURE_SUMMARY);
    } else {
        eprintln!("Issue with the {} ({}). Exiting.", what, err);
    }
    ExitCode::from(LOAD_FAILURE)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load settings
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => return Ok(load_failure(&cli, "settings file", &e)),
    };
    init_logging(&config, cli.debug);

    let store_path = expand_tilde(&cli.config);
    let store = match FeedStore::load(&store_path) {
        Ok(store) => store,
        Err(e) => return Ok(load_failure(&cli, "configuration file", &e)),
    };

    if cli.list {
        commands::list::run(&store);
        return Ok(ExitCode::SUCCESS);
    }

    commands::check::run(store, &store_path, &config, &cli).await?;
    Ok(ExitCode::SUCCESS)
}
