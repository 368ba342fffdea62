use std::fmt;
use std::io;
use std::pin::pin;
use std::str::FromStr;
use std::time::Duration;

use futures_util::TryStreamExt;
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::hasher::{self, Digest, HashAlgorithm};
use crate::range;

/// Endpoint for the Pwned Passwords range API.
pub const DEFAULT_BASE_URL: &str = "https://api.pwnedpasswords.com/range";

/// Whether the text passed to a check is a plaintext secret or an already computed hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LookupKind {
    #[default]
    Password,
    Hash,
}

impl LookupKind {
    pub const ALL: [LookupKind; 2] = [LookupKind::Password, LookupKind::Hash];

    pub const fn as_str(self) -> &'static str {
        match self {
            LookupKind::Password => "password",
            LookupKind::Hash => "hash",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookupKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "password" => Ok(LookupKind::Password),
            "hash" => Ok(LookupKind::Hash),
            other => Err(Error::InvalidLookupKind(other.to_string())),
        }
    }
}

/// Transport settings applied to every range request.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// End-to-end deadline for a single request, body included.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 100,
            pool_idle_timeout: Duration::from_secs(90),
            max_redirects: 10,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
                .to_string(),
        }
    }
}

/// Checks passwords and hashes against the range API.
///
/// Cloning is cheap and clones share the connection pool, so one client should be built
/// and reused for every check.
#[derive(Debug, Clone)]
pub struct ExposureClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ExposureClient {
    /// Creates a client with its own transport built from `config`.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::Transport { url: config.base_url.clone(), source: e.into() })?;

        Self::from_parts(http, &config.base_url)
    }

    /// Creates a client pointed at [`DEFAULT_BASE_URL`] with the default transport settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(&ClientConfig::default())
    }

    /// Creates a client over an existing HTTP client and base URL.
    pub fn from_parts(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        let parsed = Url::parse(base_url).map_err(|e| Error::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        range::ensure_base(&parsed)?;

        Ok(Self { http, base_url: parsed })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns how many times `hash` appears in the breach corpus.
    ///
    /// The hash may be in either case. Its length must match `algorithm`.
    #[tracing::instrument(level = "debug", skip_all, fields(%algorithm))]
    pub async fn check_hash(&self, hash: &str, algorithm: HashAlgorithm) -> Result<u64, Error> {
        let digest = Digest::parse(hash, algorithm)?;
        self.query(&digest).await
    }

    /// Returns how many times `secret` appears in the breach corpus.
    ///
    /// Only the first five characters of the secret's digest leave the process.
    #[tracing::instrument(level = "debug", skip_all, fields(%algorithm))]
    pub async fn check_password(
        &self,
        secret: &str,
        algorithm: HashAlgorithm,
    ) -> Result<u64, Error> {
        let digest = hasher::digest(secret, algorithm);
        self.query(&digest).await
    }

    pub async fn check(
        &self,
        text: &str,
        lookup: LookupKind,
        algorithm: HashAlgorithm,
    ) -> Result<u64, Error> {
        match lookup {
            LookupKind::Hash => self.check_hash(text, algorithm).await,
            LookupKind::Password => self.check_password(text, algorithm).await,
        }
    }

    /// Parses `lookup` and `algorithm`, then runs the matching check.
    pub async fn check_exposure(
        &self,
        text: &str,
        lookup: &str,
        algorithm: &str,
    ) -> Result<u64, Error> {
        let lookup = lookup.parse::<LookupKind>()?;
        let algorithm = algorithm.parse::<HashAlgorithm>()?;
        self.check(text, lookup, algorithm).await
    }

    /// Like [`check`](Self::check), but gives up with [`Error::Cancelled`] once `cancel` fires.
    pub async fn check_cancellable(
        &self,
        text: &str,
        lookup: LookupKind,
        algorithm: HashAlgorithm,
        cancel: &CancellationToken,
    ) -> Result<u64, Error> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::Cancelled),
            result = self.check(text, lookup, algorithm) => result,
        }
    }

    async fn query(&self, digest: &Digest) -> Result<u64, Error> {
        let request = range::build_request(&self.http, &self.base_url, digest)?;
        let url = request.url().to_string();
        debug!(%url, "querying range");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| Error::Transport { url: url.clone(), source: e.into() })?;

        let status = response.status();
        debug!(%url, %status, "range response");
        if !status.is_success() {
            warn!(%url, %status, "range request rejected");
            return Err(Error::Http { url, status: status.as_u16() });
        }

        let body = pin!(StreamReader::new(response.bytes_stream().map_err(io::Error::other)));
        // the scan itself never decodes, so any I/O error here came from the connection
        match range::parse_response(body, digest).await {
            Err(Error::Io(source)) => Err(Error::Transport { url, source: source.into() }),
            result => result,
        }
    }
}
