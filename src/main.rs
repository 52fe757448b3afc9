//! # EPG Curator
//!
//! A batch pipeline that fetches remote XMLTV program guides, filters
//! their channels and programmes against a curated whitelist, merges the
//! survivors across sources and writes a single deduplicated XMLTV file.
//!
//! ## Usage
//!
//! ```sh
//! epg_curator -w channel_list.txt -o custom_epg.xml \
//!     -s https://epg.pw/xmltv/epg_GB.xml \
//!     -s https://example.com/epg.xml.gz
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Whitelist**: Load the channel whitelist (fatal if missing or empty)
//! 2. **Fetching**: Download and parse each guide source in turn; a failed
//!    source is logged and skipped
//! 3. **Filtering**: Keep whitelisted channels and the programmes that
//!    reference them, scoped per document
//! 4. **Merging**: Deduplicate channels and programmes across sources,
//!    first occurrence winning
//! 5. **Output**: Write the merged guide, carrying over the first fetched
//!    document's root attributes

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod fetch;
mod filter;
mod merge;
mod models;
mod whitelist;
mod xmltv;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("epg_curator starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.whitelist, ?args.output, sources = args.sources.len(), "Parsed CLI arguments");

    // ---- Load the whitelist; without it there is nothing to filter ----
    let whitelist = match whitelist::load(&args.whitelist).await {
        Ok(whitelist) => whitelist,
        Err(e) => {
            error!(error = %e, path = %args.whitelist, "Cannot proceed without a usable whitelist");
            return Err(e.into());
        }
    };

    let client = fetch::build_client()?;

    // ---- Fetch and filter each source sequentially ----
    let mut all_channels = Vec::new();
    let mut all_programmes = Vec::new();
    let mut root_attributes: Option<Vec<(String, String)>> = None;

    for url in &args.sources {
        info!(%url, "Processing guide source");
        let doc = match fetch::fetch_source(&client, url).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(%url, error = %e, "Guide fetch failed; skipping source");
                continue;
            }
        };

        // The first document that arrives donates the output root attributes.
        if root_attributes.is_none() {
            root_attributes = Some(doc.attributes.clone());
        }

        let selected = filter::filter_document(&doc, &whitelist);
        all_channels.extend(selected.channels);
        all_programmes.extend(selected.programmes);
    }

    // ---- Deduplicate across sources ----
    let channels_before = all_channels.len();
    let programmes_before = all_programmes.len();
    let channels = merge::dedupe_channels(all_channels);
    let programmes = merge::dedupe_programmes(all_programmes);
    info!(
        channels = channels.len(),
        channels_before,
        programmes = programmes.len(),
        programmes_before,
        "Deduplicated aggregated guide entries"
    );

    // ---- Write the merged guide ----
    let Some(attributes) = root_attributes else {
        warn!("No guide source could be fetched; nothing to write");
        return Ok(());
    };
    if channels.is_empty() {
        warn!("No whitelisted channels matched; skipping output generation");
        return Ok(());
    }

    if let Err(e) = xmltv::write_file(&args.output, &attributes, &channels, &programmes).await {
        error!(path = %args.output, error = %e, "Failed writing merged guide");
    } else {
        info!(
            path = %args.output,
            channels = channels.len(),
            programmes = programmes.len(),
            "Merged guide complete"
        );
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
