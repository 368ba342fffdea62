//! Digest derivation for the two hash modes the range API understands.

use std::fmt;
use std::str::FromStr;

use md4::Md4;
use sha1::{Digest as _, Sha1};

use crate::error::Error;

/// The length of the digest prefix sent to the range API (5 hex characters).
pub const PREFIX_LEN: usize = 5;

/// Hash function used to derive the digest looked up in the breach corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    /// SHA-1 over the UTF-8 bytes of the secret.
    #[default]
    Sha1,
    /// MD4 over the UTF-16LE bytes of the secret (the Windows NT hash).
    Ntlm,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 2] = [HashAlgorithm::Sha1, HashAlgorithm::Ntlm];

    /// Number of hex characters in a digest of this kind.
    pub const fn digest_len(self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Ntlm => 32,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Ntlm => "ntlm",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha1" => Ok(HashAlgorithm::Sha1),
            "ntlm" => Ok(HashAlgorithm::Ntlm),
            other => Err(Error::InvalidAlgorithm(other.to_string())),
        }
    }
}

/// An uppercase hex digest tagged with the algorithm that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    hex: String,
    algorithm: HashAlgorithm,
}

impl Digest {
    /// Validates a caller-supplied hash and normalizes it to uppercase.
    pub fn parse(hash: &str, algorithm: HashAlgorithm) -> Result<Self, Error> {
        let expected = algorithm.digest_len();
        if hash.len() != expected || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidDigest { hash: hash.to_string(), algorithm, expected });
        }

        Ok(Self { hex: hash.to_ascii_uppercase(), algorithm })
    }

    pub fn as_str(&self) -> &str {
        &self.hex
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The part of the digest disclosed to the server.
    pub fn prefix(&self) -> &str {
        &self.hex[..PREFIX_LEN]
    }

    /// The part of the digest matched locally against the range entries.
    pub fn suffix(&self) -> &str {
        &self.hex[PREFIX_LEN..]
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

/// Computes the digest of `secret` under `algorithm`.
pub fn digest(secret: &str, algorithm: HashAlgorithm) -> Digest {
    let hex = match algorithm {
        HashAlgorithm::Sha1 => format!("{:X}", Sha1::digest(secret.as_bytes())),
        HashAlgorithm::Ntlm => {
            let utf16le: Vec<u8> = secret.encode_utf16().flat_map(u16::to_le_bytes).collect();
            format!("{:X}", Md4::digest(&utf16le))
        }
    };

    Digest { hex, algorithm }
}
