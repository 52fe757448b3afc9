//! Whitelist filtering of a single guide document.
//!
//! Matching is a union over both identity fields: a channel is kept when
//! its `id` attribute equals any whitelisted `tvg-id` OR its resolved
//! display name equals any whitelisted `tvg-name`. The two conditions are
//! tested independently, so a channel's id may satisfy one whitelist entry
//! while its name satisfies another; that only blurs which entry gets
//! credited in the log line, never whether the channel is kept.
//!
//! Programmes are scoped to the document they came from: a programme
//! survives only if its `channel` attribute is among the ids of channels
//! matched in this same document.

use crate::models::Whitelist;
use crate::xmltv::{EpgDocument, XmlElement};
use std::collections::HashSet;
use tracing::{info, instrument};

/// Channels and programmes selected from one source document.
#[derive(Debug, Default)]
pub struct FilteredSet {
    pub channels: Vec<XmlElement>,
    pub programmes: Vec<XmlElement>,
}

/// Select the whitelisted channels and their programmes from `doc`.
#[instrument(level = "info", skip_all)]
pub fn filter_document(doc: &EpgDocument, whitelist: &Whitelist) -> FilteredSet {
    let target_ids: HashSet<&str> = whitelist
        .values()
        .map(|entry| entry.tvg_id.as_str())
        .filter(|id| !id.is_empty())
        .collect();
    let target_names: HashSet<&str> = whitelist
        .values()
        .map(|entry| entry.tvg_name.as_str())
        .filter(|name| !name.is_empty())
        .collect();

    let mut selected = FilteredSet::default();
    let mut matched_ids: HashSet<&str> = HashSet::new();

    for channel in &doc.channels {
        let id = channel.attr("id").unwrap_or("").trim();
        let name = channel.display_name().unwrap_or("");

        if !target_ids.contains(id) && !target_names.contains(name) {
            continue;
        }

        // Attribution re-scans the whitelist on either condition; with
        // cross-field matches the credited entry can differ from the one
        // that caused inclusion.
        if let Some(entry) = whitelist
            .values()
            .find(|entry| entry.tvg_id == id || entry.tvg_name == name)
        {
            info!(
                tvg_name = %entry.tvg_name,
                tvg_id = %entry.tvg_id,
                country = %entry.country,
                remark = %entry.remark,
                "Matched whitelisted channel"
            );
        }

        if let Some(raw_id) = channel.attr("id") {
            if !raw_id.is_empty() {
                matched_ids.insert(raw_id.trim());
            }
        }
        selected.channels.push(channel.clone());
    }

    for programme in &doc.programmes {
        let channel_ref = programme.attr("channel").unwrap_or("").trim();
        if matched_ids.contains(channel_ref) {
            selected.programmes.push(programme.clone());
        }
    }

    info!(
        channels = selected.channels.len(),
        programmes = selected.programmes.len(),
        "Filtered guide document"
    );
    selected
}
