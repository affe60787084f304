//! Log output setup.
//!
//! Everything written to stderr goes through [`RedactingWriter`], which masks
//! the Telegram bot token and commerce backend credentials.

use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Regex patterns for redacting sensitive data
pub struct RedactionPatterns {
    bot_url_token: Regex,
    bare_token: Regex,
    prefixed_token: Regex,
    client_id: Regex,
    bearer: Regex,
}

impl RedactionPatterns {
    /// Initialize all regex patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            bot_url_token: Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)(/['\s]*)")?,
            bare_token: Regex::new(r"([0-9]{8,10}:[A-Za-z0-9_-]{35})")?,
            prefixed_token: Regex::new(r"(bot[0-9]{8,10}:)[A-Za-z0-9_-]+")?,
            client_id: Regex::new(r"client_id=[^\s&]+")?,
            bearer: Regex::new(r"Bearer\s+[A-Za-z0-9._~+/=-]+")?,
        })
    }

    /// Replace every secret in `input` with a placeholder
    #[must_use]
    pub fn redact(&self, input: &str) -> String {
        let output = self
            .bot_url_token
            .replace_all(input, "$1[TELEGRAM_TOKEN]$3");
        let output = self.bare_token.replace_all(&output, "[TELEGRAM_TOKEN]");
        let output = self
            .prefixed_token
            .replace_all(&output, "$1[TELEGRAM_TOKEN]");
        let output = self.client_id.replace_all(&output, "client_id=[MASKED]");
        let output = self.bearer.replace_all(&output, "Bearer [MASKED]");
        output.into_owned()
    }
}

/// Writer that redacts secrets before passing bytes on
pub struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> RedactingWriter<W> {
    /// Wrap `inner` with redaction
    pub const fn new(inner: W, patterns: Arc<RedactionPatterns>) -> Self {
        Self { inner, patterns }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let redacted = self.patterns.redact(&s);
        self.inner.write_all(redacted.as_bytes())?;
        // Report the original length; the redacted text may differ in size
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

/// Install the global tracing subscriber writing redacted output to stderr.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init_logging(patterns: Arc<RedactionPatterns>) {
    let make_writer = RedactingMakeWriter {
        make_inner: io::stderr,
        patterns,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> RedactionPatterns {
        RedactionPatterns::new().expect("patterns compile")
    }

    #[test]
    fn test_redacts_telegram_token_in_url() {
        let line = "error sending request for url (https://api.telegram.org/bot1234567890:AAAbbbCCCdddEEEfffGGGhhhIIIjjjKKKlll/getUpdates)";
        let redacted = patterns().redact(line);
        assert!(!redacted.contains("AAAbbb"));
        assert!(redacted.contains("/bot[TELEGRAM_TOKEN]/getUpdates"));
    }

    #[test]
    fn test_redacts_commerce_credentials() {
        let line = "POST /oauth/access_token client_id=abc123&grant_type=implicit Authorization: Bearer 9f8e7d.c6b5";
        let redacted = patterns().redact(line);
        assert_eq!(
            redacted,
            "POST /oauth/access_token client_id=[MASKED]&grant_type=implicit Authorization: Bearer [MASKED]"
        );
    }

    #[test]
    fn test_writer_reports_original_length() {
        let mut out = Vec::new();
        let mut writer = RedactingWriter::new(&mut out, Arc::new(patterns()));
        let input = b"token Bearer abcdef";
        let written = writer.write(input).expect("write succeeds");
        assert_eq!(written, input.len());
        assert_eq!(String::from_utf8_lossy(&out), "token Bearer [MASKED]");
    }
}
