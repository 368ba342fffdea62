use std::io::{IsTerminal, Write};
use std::time::Duration;

use clap::Parser;
use hibp_exposed::{
    ClientConfig, DEFAULT_BASE_URL, Error, ExposureClient, HashAlgorithm, LookupKind,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod format;

#[derive(Parser, Debug)]
#[command(name = "exposed")]
#[command(about = "Check passwords or hashes read from stdin against Have I Been Pwned")]
struct Args {
    /// Hash mode ("sha1", "ntlm")
    #[arg(short, long, default_value_t = HashAlgorithm::Sha1)]
    mode: HashAlgorithm,

    /// Lookup type ("password", "hash")
    #[arg(short, long, default_value_t = LookupKind::Password)]
    lookup: LookupKind,

    /// Range API endpoint
    #[arg(long, env = "HIBP_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

/// Checks each line of `input`, reporting results to `out` and failures to `err`.
///
/// Lines are split on raw bytes and decoded lossily, so input that is not UTF-8 fails only
/// its own check.
async fn read_and_check<R, W, E>(
    input: R,
    client: &ExposureClient,
    lookup: LookupKind,
    mode: HashAlgorithm,
    cancel: &CancellationToken,
    out: &mut W,
    err: &mut E,
) -> Result<(), Error>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    E: Write,
{
    let mut lines = input.split(b'\n');
    loop {
        let raw = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            raw = lines.next_segment() => raw?,
        };
        let Some(raw) = raw else { break };
        let line = String::from_utf8_lossy(&raw);
        let text = line.trim();

        match client.check_cancellable(text, lookup, mode, cancel).await {
            Ok(0) => writeln!(out, "{text}: not found")?,
            Ok(count) => {
                writeln!(out, "{text}: exposed {} times", format::group_thousands(count, ','))?
            }
            Err(Error::Cancelled) => break,
            Err(e) => writeln!(err, "failed for {text:?}: {e}")?,
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig {
        base_url: args.base_url.clone(),
        timeout: Duration::from_secs(args.timeout),
        ..ClientConfig::default()
    };
    let client = ExposureClient::new(&config)?;
    debug!(
        base_url = %client.base_url(),
        mode = %args.mode,
        lookup = %args.lookup,
        "reading stdin"
    );

    // Ctrl-C cancels the in-flight check and stops reading
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    if std::io::stdin().is_terminal() {
        match args.lookup {
            LookupKind::Password => println!("Enter passwords to check, one per line:"),
            LookupKind::Hash => println!("Enter {} hashes to check, one per line:", args.mode),
        }
    }

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    read_and_check(
        BufReader::new(tokio::io::stdin()),
        &client,
        args.lookup,
        args.mode,
        &cancel,
        &mut stdout,
        &mut stderr,
    )
    .await?;

    if cancel.is_cancelled() {
        // the stdin reader is still parked in a blocking read
        std::process::exit(130);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_client() -> ExposureClient {
        let config =
            ClientConfig { base_url: "http://127.0.0.1:1/range".to_string(), ..Default::default() };
        ExposureClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_stop_batch() {
        let input: &[u8] = b"abc\n\xff\xfe\nsecond\r\n";
        let (mut out, mut err) = (Vec::new(), Vec::new());

        // hash lookups of these lines fail validation before any request is sent
        read_and_check(
            input,
            &offline_client(),
            LookupKind::Hash,
            HashAlgorithm::Sha1,
            &CancellationToken::new(),
            &mut out,
            &mut err,
        )
        .await
        .unwrap();

        let err = String::from_utf8(err).unwrap();
        let failed: Vec<_> = err.lines().collect();
        assert!(out.is_empty());
        assert_eq!(failed.len(), 3, "{err}");
        assert!(failed[0].starts_with("failed for \"abc\": "));
        assert!(failed[1].starts_with("failed for \"\u{FFFD}\u{FFFD}\": "));
        assert!(failed[2].starts_with("failed for \"second\": "));
    }

    #[tokio::test]
    async fn test_cancelled_before_first_line() {
        let input: &[u8] = b"password\n";
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (mut out, mut err) = (Vec::new(), Vec::new());

        read_and_check(
            input,
            &offline_client(),
            LookupKind::Password,
            HashAlgorithm::Sha1,
            &cancel,
            &mut out,
            &mut err,
        )
        .await
        .unwrap();

        assert!(out.is_empty());
        assert!(err.is_empty());
    }
}
