//! Request construction and response scanning for the range API.
//!
//! A range query sends only the first [`PREFIX_LEN`](crate::PREFIX_LEN) hex characters of a
//! digest. The server answers with every known `SUFFIX:COUNT` pair under that prefix, and the
//! suffix is matched locally.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use url::Url;

use crate::error::Error;
use crate::hasher::{Digest, HashAlgorithm};

/// Header asking the server to pad the response with decoy zero-count entries.
pub const ADD_PADDING_HEADER: &str = "Add-Padding";

/// Rejects URLs that have no path to append a prefix to (`mailto:`, `data:`).
pub fn ensure_base(url: &Url) -> Result<(), Error> {
    if url.cannot_be_a_base() {
        return Err(Error::InvalidBaseUrl {
            url: url.to_string(),
            reason: "URL cannot be a base".to_string(),
        });
    }
    Ok(())
}

/// Builds `{base}/{PREFIX}`, plus `?mode=ntlm` for NT hashes.
pub fn range_url(base: &Url, digest: &Digest) -> Result<Url, Error> {
    ensure_base(base)?;

    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(digest.prefix());
    }

    if digest.algorithm() == HashAlgorithm::Ntlm {
        url.query_pairs_mut().append_pair("mode", HashAlgorithm::Ntlm.as_str());
    }

    Ok(url)
}

/// Builds the padded `GET` request for the bucket holding `digest`.
pub fn build_request(
    http: &reqwest::Client,
    base: &Url,
    digest: &Digest,
) -> Result<reqwest::Request, Error> {
    let url = range_url(base, digest)?;
    http.get(url.clone())
        .header(ADD_PADDING_HEADER, "true")
        .build()
        .map_err(|e| Error::Transport { url: url.to_string(), source: e.into() })
}

/// Scans a range response for the suffix of `digest` and returns its count.
///
/// Stops at the first matching entry. Returns 0 if nothing in the bucket matches. Lines are
/// compared as bytes, so a body that is not UTF-8 never fails the scan on its own.
pub async fn parse_response<R>(body: R, digest: &Digest) -> Result<u64, Error>
where
    R: AsyncBufRead + Unpin,
{
    let suffix = digest.suffix().as_bytes();
    let mut lines = body.split(b'\n');

    while let Some(line) = lines.next_segment().await? {
        let line = line.trim_ascii();
        if line.is_empty() {
            continue;
        }

        let Some(colon) = line.iter().position(|&b| b == b':') else {
            return Err(Error::MalformedEntry { line: String::from_utf8_lossy(line).into_owned() });
        };
        let (entry_suffix, count) = (&line[..colon], &line[colon + 1..]);

        if entry_suffix.eq_ignore_ascii_case(suffix) {
            return String::from_utf8_lossy(count).trim().parse::<u64>().map_err(|source| {
                Error::MalformedCount { line: String::from_utf8_lossy(line).into_owned(), source }
            });
        }
    }

    Ok(0)
}
