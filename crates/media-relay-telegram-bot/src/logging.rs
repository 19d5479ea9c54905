use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Regex patterns for redacting sensitive data
pub struct RedactionPatterns {
    token1: Regex,
    token2: Regex,
    token3: Regex,
    api_hash: Regex,
    login_input: Regex,
    secrets: Vec<String>,
}

impl RedactionPatterns {
    /// Initialize all regex patterns
    ///
    /// `secrets` are masked verbatim wherever they appear; empty values are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    pub fn new(secrets: &[&str]) -> Result<Self, regex::Error> {
        Ok(Self {
            token1: Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)(/['\s]*)")?,
            token2: Regex::new(r"([0-9]{8,10}:[A-Za-z0-9_-]{35})")?,
            token3: Regex::new(r"(bot[0-9]{8,10}:)[A-Za-z0-9_-]+")?,
            api_hash: Regex::new(r"(?i)(api_hash\s*[=:]\s*)[0-9a-f]{32}")?,
            login_input: Regex::new(r"\b(PHONE|CODE|PASSWORD)=[^\s&]+")?,
            secrets: secrets
                .iter()
                .map(|s| s.trim())
                .filter(|s| s.len() >= 4)
                .map(str::to_string)
                .collect(),
        })
    }

    /// Mask every known secret in `input`.
    #[must_use]
    pub fn redact(&self, input: &str) -> String {
        let mut output = input.to_string();
        for secret in &self.secrets {
            if output.contains(secret.as_str()) {
                output = output.replace(secret.as_str(), "[MASKED]");
            }
        }
        output = self
            .token1
            .replace_all(&output, "$1[TELEGRAM_TOKEN]$3")
            .to_string();
        output = self
            .token2
            .replace_all(&output, "[TELEGRAM_TOKEN]")
            .to_string();
        output = self
            .token3
            .replace_all(&output, "$1[TELEGRAM_TOKEN]")
            .to_string();
        output = self
            .api_hash
            .replace_all(&output, "$1[MASKED]")
            .to_string();
        output = self
            .login_input
            .replace_all(&output, "$1=[MASKED]")
            .to_string();
        output
    }
}

struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> RedactingWriter<W> {
    const fn new(inner: W, patterns: Arc<RedactionPatterns>) -> Self {
        Self { inner, patterns }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let redacted = self.patterns.redact(&s);
        self.inner.write_all(redacted.as_bytes())?;
        // the caller's buffer counts as fully written
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter<F> {
    make_inner: F,
    patterns: Arc<RedactionPatterns>,
}

impl<F> RedactingMakeWriter<F> {
    const fn new(make_inner: F, patterns: Arc<RedactionPatterns>) -> Self {
        Self {
            make_inner,
            patterns,
        }
    }
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new((self.make_inner)(), self.patterns.clone())
    }
}

/// Filter used when `RUST_LOG` is not set.
#[must_use]
pub fn default_filter(log_level: &str, debug_mode: bool) -> String {
    if debug_mode {
        return "debug".to_string();
    }
    let level = log_level.trim().to_ascii_lowercase();
    let level = match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => level,
        "warning" => "warn".to_string(),
        "critical" => "error".to_string(),
        _ => "info".to_string(),
    };
    format!(
        "media_relay_core={level},media_relay_transport_telegram={level},media_relay_telegram_bot={level},teloxide=warn,grammers=warn,hyper=warn,reqwest=warn"
    )
}

/// Install the global subscriber writing redacted logs to stderr.
///
/// `DEBUG_MODE=true|1` switches the fallback filter to `debug`; `RUST_LOG`
/// overrides both.
///
/// # Errors
///
/// Returns an error if the redaction patterns cannot be compiled.
pub fn init_logging(log_level: &str, secrets: &[&str]) -> Result<(), regex::Error> {
    let patterns = Arc::new(RedactionPatterns::new(secrets)?);
    let make_writer = RedactingMakeWriter::new(io::stderr, patterns);

    let debug_mode = std::env::var("DEBUG_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level, debug_mode)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
    Ok(())
}
