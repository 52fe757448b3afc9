//! Whitelist file loader.
//!
//! The whitelist is a line-oriented UTF-8 text file mixing two line kinds:
//!
//! ```text
//! # comment
//! United Kingdom GB
//! BBC1,BBC One,HD
//! ,BBC Two,backup feed
//! ```
//!
//! A line without a comma names a country group; every channel line below
//! it belongs to that country until the next group line. Channel lines are
//! `tvg-id,tvg-name,remark` with all three fields present (either identity
//! field may be blank, not both). Malformed lines are logged and skipped;
//! a whitelist that yields no channels at all is fatal for the run.

use crate::models::{ChannelEntry, Whitelist};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Fatal whitelist conditions. Everything else the loader encounters is a
/// per-line warning.
#[derive(Debug, Error)]
pub enum WhitelistError {
    /// The whitelist file could not be read at all.
    #[error("failed to read whitelist {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The file was readable but produced no usable channel entries.
    #[error("whitelist {path} contains no usable channels")]
    Empty { path: String },
}

/// Read and parse the whitelist at `path`.
///
/// # Errors
///
/// [`WhitelistError::Read`] if the file cannot be read,
/// [`WhitelistError::Empty`] if parsing yields no entries. Both halt the
/// run; there is nothing to filter against.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn load(path: &str) -> Result<Whitelist, WhitelistError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| WhitelistError::Read {
            path: path.to_string(),
            source,
        })?;

    let channels = parse(&content);
    if channels.is_empty() {
        return Err(WhitelistError::Empty {
            path: path.to_string(),
        });
    }

    info!(count = channels.len(), "Loaded channel whitelist");
    Ok(channels)
}

/// Parse whitelist text into the channel mapping.
///
/// Later lines with the same `tvg-id`/`tvg-name` pair overwrite earlier
/// ones. Lines that cannot be used are logged with their line number and
/// skipped.
pub fn parse(content: &str) -> Whitelist {
    let mut channels = Whitelist::new();
    let mut current_country: Option<String> = None;

    for (index, raw_line) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if !line.contains(',') {
            info!(country = line, "Recognized country group");
            current_country = Some(line.to_string());
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 3 {
            warn!(
                line = line_number,
                content = line,
                "Channel line needs exactly 3 fields; skipping"
            );
            continue;
        }

        let tvg_id = fields[0].trim();
        let tvg_name = fields[1].trim();
        let remark = fields[2].trim();

        let Some(country) = current_country.as_deref() else {
            warn!(
                line = line_number,
                content = line,
                "Channel line appears before any country group; skipping"
            );
            continue;
        };

        if tvg_id.is_empty() && tvg_name.is_empty() {
            warn!(
                line = line_number,
                content = line,
                "Both tvg-id and tvg-name are empty; skipping"
            );
            continue;
        }

        let entry = ChannelEntry {
            tvg_id: tvg_id.to_string(),
            tvg_name: tvg_name.to_string(),
            country: country.to_string(),
            remark: remark.to_string(),
        };
        debug!(
            tvg_id = %entry.tvg_id,
            tvg_name = %entry.tvg_name,
            country = %entry.country,
            remark = %entry.remark,
            "Read whitelist channel"
        );
        channels.insert(entry.key(), entry);
    }

    channels
}
