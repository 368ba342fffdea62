use std::fmt::Display;
use std::num::ParseIntError;

use crate::client::LookupKind;
use crate::hasher::HashAlgorithm;

/// Renders `["a", "b"]` as `"a", "b"` for error and help text.
pub fn quoted_values<T: Display>(values: &[T]) -> String {
    values.iter().map(|v| format!("\"{v}\"")).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "invalid lookup type: {0:?}, valid values: {valid}",
        valid = quoted_values(&LookupKind::ALL)
    )]
    InvalidLookupKind(String),

    #[error(
        "invalid hash mode: {0:?}, valid values: {valid}",
        valid = quoted_values(&HashAlgorithm::ALL)
    )]
    InvalidAlgorithm(String),

    #[error("invalid {algorithm} hash {hash:?}: expected {expected} hex characters")]
    InvalidDigest {
        hash: String,
        algorithm: HashAlgorithm,
        expected: usize,
    },

    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("HTTP request failed for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("received non-OK HTTP status for {url}: {status}")]
    Http { url: String, status: u16 },

    #[error("malformed range entry {line:?}: count not found")]
    MalformedEntry { line: String },

    #[error("malformed count in range entry {line:?}: {source}")]
    MalformedCount {
        line: String,
        #[source]
        source: ParseIntError,
    },

    #[error("check cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_choice_messages_list_valid_values() {
        let err = Error::InvalidLookupKind("bogus-kind".to_string());
        assert_eq!(
            err.to_string(),
            "invalid lookup type: \"bogus-kind\", valid values: \"password\", \"hash\""
        );

        let err = Error::InvalidAlgorithm("md5".to_string());
        assert_eq!(
            err.to_string(),
            "invalid hash mode: \"md5\", valid values: \"sha1\", \"ntlm\""
        );
    }
}
