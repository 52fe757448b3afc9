//! Command-line interface definitions for the EPG curator.
//!
//! This module defines the CLI arguments and options using the `clap`
//! crate. Paths can also be provided via environment variables.

use clap::Parser;
use url::Url;

/// Command-line arguments for the EPG curator.
///
/// # Examples
///
/// ```sh
/// # Filter two guides against the default channel_list.txt
/// epg_curator -s https://epg.pw/xmltv/epg_GB.xml -s https://example.com/epg.xml
///
/// # Explicit whitelist and output paths
/// epg_curator -w my_channels.txt -o merged.xml -s https://epg.pw/xmltv/epg_GB.xml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the channel whitelist file
    #[arg(short, long, env = "EPG_WHITELIST", default_value = "channel_list.txt")]
    pub whitelist: String,

    /// Path the merged XMLTV document is written to
    #[arg(short, long, env = "EPG_OUTPUT", default_value = "custom_epg.xml")]
    pub output: String,

    /// Guide source URL; repeat the flag to merge several guides
    #[arg(short, long = "source", value_name = "URL")]
    pub sources: Vec<Url>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(&["epg_curator"]);
        assert_eq!(cli.whitelist, "channel_list.txt");
        assert_eq!(cli.output, "custom_epg.xml");
        assert!(cli.sources.is_empty());
    }

    #[test]
    fn test_cli_collects_repeated_sources() {
        let cli = Cli::parse_from(&[
            "epg_curator",
            "--source",
            "https://epg.pw/xmltv/epg_GB.xml",
            "--source",
            "https://example.com/epg.xml.gz",
        ]);
        assert_eq!(cli.sources.len(), 2);
        assert_eq!(cli.sources[0].host_str(), Some("epg.pw"));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(&[
            "epg_curator",
            "-w",
            "/tmp/channels.txt",
            "-o",
            "/tmp/out.xml",
            "-s",
            "http://localhost:8080/epg.xml",
        ]);
        assert_eq!(cli.whitelist, "/tmp/channels.txt");
        assert_eq!(cli.output, "/tmp/out.xml");
        assert_eq!(cli.sources.len(), 1);
    }

    #[test]
    fn test_cli_rejects_invalid_source_url() {
        let result = Cli::try_parse_from(&["epg_curator", "-s", "not a url"]);
        assert!(result.is_err());
    }
}
