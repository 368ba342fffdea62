//! Checks passwords and password hashes against the Have I Been Pwned
//! [Pwned Passwords](https://haveibeenpwned.com/API/v3#PwnedPasswords) range API.
//!
//! Lookups use the k-anonymity model:
//!
//! 1. Hash the password with SHA-1, or with MD4 over UTF-16LE for NTLM
//! 2. Send only the first 5 hex characters of the digest
//! 3. The API returns every `SUFFIX:COUNT` pair sharing that prefix
//! 4. Match the remaining characters locally and report the count
//!
//! Requests always ask for padding, so the response size says nothing about whether
//! the secret was found.
//!
//! ```no_run
//! use hibp_exposed::{ExposureClient, HashAlgorithm};
//!
//! # async fn run() -> Result<(), hibp_exposed::Error> {
//! let client = ExposureClient::with_defaults()?;
//! let count = client.check_password("password", HashAlgorithm::Sha1).await?;
//! println!("seen {count} times");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod hasher;
pub mod range;

pub use client::{ClientConfig, DEFAULT_BASE_URL, ExposureClient, LookupKind};
pub use error::Error;
pub use hasher::{Digest, HashAlgorithm, PREFIX_LEN, digest};
