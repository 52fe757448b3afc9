//! Data models for the curated channel whitelist.
//!
//! The whitelist is the single piece of user-maintained state in the
//! pipeline: a mapping from channel identity to [`ChannelEntry`] metadata,
//! loaded once at startup and immutable afterwards. Channel identity is the
//! composite `tvg-id` + `tvg-name` pair, since either field alone may be
//! blank in real playlists.

use std::collections::HashMap;

/// Map from the composite whitelist key (see [`ChannelEntry::key`]) to the
/// entry parsed from that line.
pub type Whitelist = HashMap<String, ChannelEntry>;

/// One channel line from the whitelist file.
///
/// Parsed from the `tvg-id,tvg-name,remark` line format, with the country
/// taken from the most recent country-group line above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEntry {
    /// The `tvg-id` a guide channel's `id` attribute is matched against.
    pub tvg_id: String,
    /// The `tvg-name` a guide channel's display name is matched against.
    pub tvg_name: String,
    /// Country group the entry belongs to.
    pub country: String,
    /// Free-form remark carried from the whitelist file (quality tag, notes).
    pub remark: String,
}

impl ChannelEntry {
    /// Composite map key: `"{tvg_id}_{tvg_name}"`.
    ///
    /// Entries sharing both fields collapse to one; entries where only one
    /// field differs stay distinct.
    pub fn key(&self) -> String {
        format!("{}_{}", self.tvg_id, self.tvg_name)
    }
}
