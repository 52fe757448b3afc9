//! Remote guide source fetching.
//!
//! Each configured source is one HTTP GET with a fixed 30-second timeout.
//! Bodies carrying the gzip magic bytes are decompressed before parsing,
//! since published EPG feeds are commonly `.xml.gz`. Every failure mode is
//! recoverable at the pipeline level: the caller logs the [`FetchError`]
//! and moves on to the next source.

use crate::xmltv::{self, EpgDocument};
use flate2::read::GzDecoder;
use reqwest::{Client, StatusCode};
use std::borrow::Cow;
use std::io::Read;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument};
use url::Url;

/// Per-request timeout applied to every source fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Why a guide source could not be turned into a parsed document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request exceeded [`FETCH_TIMEOUT`].
    #[error("request timed out after {}s", FETCH_TIMEOUT.as_secs())]
    Timeout,
    /// The server answered with a non-success status.
    #[error("HTTP error {0}")]
    Http(StatusCode),
    /// Connection, TLS or body-read failure.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// The body looked gzipped but would not decompress.
    #[error("gzip decompression failed: {0}")]
    Decompress(#[source] std::io::Error),
    /// The body was not a well-formed XML document.
    #[error("malformed XMLTV document: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Build the HTTP client shared by all source fetches.
pub fn build_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
}

/// Fetch one guide source and parse it into an [`EpgDocument`].
///
/// # Errors
///
/// Returns a [`FetchError`] distinguishing timeout, HTTP status, transport,
/// decompression and XML-parse failures. The caller is expected to skip
/// the source and continue.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_source(client: &Client, url: &Url) -> Result<EpgDocument, FetchError> {
    let response = client.get(url.as_str()).send().await.map_err(classify)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http(status));
    }

    let body = response.bytes().await.map_err(classify)?;
    debug!(bytes = body.len(), "Fetched raw guide body");

    let xml = decompress_if_gzip(&body).map_err(FetchError::Decompress)?;
    let doc = xmltv::parse_document(&xml)?;
    info!(
        channels = doc.channels.len(),
        programmes = doc.programmes.len(),
        "Parsed guide document"
    );
    Ok(doc)
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(e)
    }
}

/// Pass the body through untouched unless it starts with the gzip magic
/// bytes, in which case decompress it.
fn decompress_if_gzip(body: &[u8]) -> std::io::Result<Cow<'_, [u8]>> {
    if !body.starts_with(&GZIP_MAGIC) {
        return Ok(Cow::Borrowed(body));
    }

    let mut decoded = Vec::new();
    GzDecoder::new(body).read_to_end(&mut decoded)?;
    debug!(
        compressed = body.len(),
        decompressed = decoded.len(),
        "Decompressed gzipped guide body"
    );
    Ok(Cow::Owned(decoded))
}
