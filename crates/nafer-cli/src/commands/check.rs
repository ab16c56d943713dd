use std::path::Path;

use anyhow::Result;
use chrono::Utc;

use nafer_core::{
    check::{check_all_feeds, CheckPolicy, CheckRequest},
    feed::HttpFeedSource,
    report::{render_table, ShortSummary},
    storage::FeedStore,
    AppConfig,
};

use crate::Cli;

pub async fn run(
    mut store: FeedStore,
    store_path: &Path,
    config: &AppConfig,
    cli: &Cli,
) -> Result<()> {
    let source = HttpFeedSource::new(config)?;
    let request = CheckRequest {
        feeds: cli.feeds.clone(),
        policy: CheckPolicy::new(&config.sync, cli.uncached),
        debug: cli.debug,
    };

    let reports = check_all_feeds(&mut store, &source, &request, Utc::now()).await;

    if cli.short {
        println!("{}", ShortSummary::from_reports(&reports));
    } else {
        println!("{}", render_table(&reports));
    }

    store.save(store_path)?;
    tracing::debug!("Checked {} feeds", reports.len());

    Ok(())
}
