//! Cross-source deduplication of filtered guide entries.
//!
//! Filtered channels and programmes from every source are concatenated in
//! fetch order before landing here; dedupe keeps the first occurrence of
//! each key and drops the rest, so earlier sources win ties.

use crate::xmltv::XmlElement;
use itertools::Itertools;

/// Drop duplicate channels, keyed by trimmed `id` attribute.
///
/// Channels with a missing or blank id share the empty key and collapse
/// to a single survivor.
pub fn dedupe_channels(channels: Vec<XmlElement>) -> Vec<XmlElement> {
    channels
        .into_iter()
        .unique_by(|channel| channel.attr("id").unwrap_or("").trim().to_string())
        .collect()
}

/// Drop duplicate programmes, keyed by the `(start, channel)` pair.
pub fn dedupe_programmes(programmes: Vec<XmlElement>) -> Vec<XmlElement> {
    programmes
        .into_iter()
        .unique_by(|programme| {
            format!(
                "{}_{}",
                programme.attr("start").unwrap_or("").trim(),
                programme.attr("channel").unwrap_or("").trim()
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::filter_document;
    use crate::models::{ChannelEntry, Whitelist};
    use crate::xmltv::{parse_document, render};

    fn channel(id: &str, name: &str) -> XmlElement {
        let mut display = XmlElement::new("display-name".to_string(), Vec::new());
        display.text = Some(name.to_string());
        let mut element = XmlElement::new(
            "channel".to_string(),
            vec![("id".to_string(), id.to_string())],
        );
        element.children.push(display);
        element
    }

    fn programme(start: &str, channel: &str) -> XmlElement {
        XmlElement::new(
            "programme".to_string(),
            vec![
                ("start".to_string(), start.to_string()),
                ("channel".to_string(), channel.to_string()),
            ],
        )
    }

    #[test]
    fn test_channel_dedupe_keeps_first_occurrence() {
        let channels = vec![
            channel("BBC1", "BBC One (source A)"),
            channel("BBC2", "BBC Two"),
            channel("BBC1", "BBC One (source B)"),
        ];
        let unique = dedupe_channels(channels);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].display_name(), Some("BBC One (source A)"));
    }

    #[test]
    fn test_channels_without_id_collapse_to_one() {
        let channels = vec![
            XmlElement::new("channel".to_string(), Vec::new()),
            channel("", "Blank id"),
            channel("BBC1", "BBC One"),
        ];
        let unique = dedupe_channels(channels);
        assert_eq!(unique.len(), 2);
    }

    #[test]
    fn test_programme_dedupe_uses_start_and_channel() {
        let programmes = vec![
            programme("20250101180000", "BBC1"),
            programme("20250101180000", "BBC1"),
            programme("20250101180000", "BBC2"),
            programme("20250101190000", "BBC1"),
        ];
        let unique = dedupe_programmes(programmes);
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_dedupe_across_two_filtered_sources() {
        let whitelist: Whitelist = [(
            "BBC1_BBC One".to_string(),
            ChannelEntry {
                tvg_id: "BBC1".to_string(),
                tvg_name: "BBC One".to_string(),
                country: "United Kingdom GB".to_string(),
                remark: "HD".to_string(),
            },
        )]
        .into_iter()
        .collect();

        let source_a = r#"<tv>
  <channel id="BBC1"><display-name>BBC One</display-name></channel>
  <programme start="20250101180000" channel="BBC1"><title>News</title></programme>
</tv>"#;
        let source_b = r#"<tv>
  <channel id="BBC1"><display-name>BBC One</display-name></channel>
  <programme start="20250101180000" channel="BBC1"><title>News</title></programme>
  <programme start="20250101190000" channel="BBC1"><title>Film</title></programme>
</tv>"#;

        let mut channels = Vec::new();
        let mut programmes = Vec::new();
        for source in [source_a, source_b] {
            let doc = parse_document(source.as_bytes()).unwrap();
            let selected = filter_document(&doc, &whitelist);
            channels.extend(selected.channels);
            programmes.extend(selected.programmes);
        }

        let channels = dedupe_channels(channels);
        let programmes = dedupe_programmes(programmes);
        assert_eq!(channels.len(), 1);
        assert_eq!(programmes.len(), 2);
    }

    #[test]
    fn test_whitelisted_channel_survives_end_to_end() {
        let whitelist = crate::whitelist::parse("United Kingdom GB\nBBC1,BBC One,HD");

        let source = r#"<tv generator-info-name="test">
  <channel id="BBC1"><display-name>BBC One</display-name></channel>
  <channel id="FR3"><display-name>France 3</display-name></channel>
  <programme start="20250101180000 +0000" channel="BBC1"><title>News</title></programme>
  <programme start="20250101180000 +0000" channel="FR3"><title>Journal</title></programme>
</tv>"#;

        let doc = parse_document(source.as_bytes()).unwrap();
        let selected = filter_document(&doc, &whitelist);
        let channels = dedupe_channels(selected.channels);
        let programmes = dedupe_programmes(selected.programmes);

        assert_eq!(channels.len(), 1);
        assert_eq!(programmes.len(), 1);

        let xml = render(&doc.attributes, &channels, &programmes).unwrap();
        assert!(xml.contains("generator-info-name=\"test\""));
        assert!(xml.contains("<channel id=\"BBC1\">"));
        assert!(xml.contains("<title>News</title>"));
        assert!(!xml.contains("FR3"));
        assert!(!xml.contains("Journal"));
    }
}
