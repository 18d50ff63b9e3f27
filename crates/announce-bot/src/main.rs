use announce_core::config::CoreSettings;
use announce_transport_discord::config::{BotSettings, DiscordSettings};
use announce_transport_discord::runner::run_bot;
use dotenvy::dotenv;
use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Regex patterns for redacting sensitive data
struct RedactionPatterns {
    token: Regex,
    auth_header: Regex,
    env_token: Regex,
}

impl RedactionPatterns {
    /// Initialize all regex patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            token: Regex::new(r"[A-Za-z0-9_-]{23,28}\.[A-Za-z0-9_-]{6,7}\.[A-Za-z0-9_-]{27,40}")?,
            auth_header: Regex::new(r"(?i)(authorization:\s*bot\s+)\S+")?,
            env_token: Regex::new(r"DISCORD_TOKEN=[^\s&]+")?,
        })
    }

    fn redact(&self, input: &str) -> String {
        let mut output = self
            .token
            .replace_all(input, "[DISCORD_TOKEN]")
            .to_string();
        output = self
            .auth_header
            .replace_all(&output, "$1[DISCORD_TOKEN]")
            .to_string();
        output = self
            .env_token
            .replace_all(&output, "DISCORD_TOKEN=[MASKED]")
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
        // Report the original length; the redacted text may differ in size.
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

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // Redaction must be ready before the first log line
    let patterns = Arc::new(RedactionPatterns::new().map_err(|e| {
        eprintln!("Failed to compile regex patterns: {e}");
        e
    })?);

    init_logging(patterns);

    info!("Starting announce bot...");

    let settings = init_settings();

    if let Err(e) = run_bot(settings).await {
        error!("Bot stopped with error: {:#}", e);
        return Err(e.into());
    }

    Ok(())
}

fn init_logging(patterns: Arc<RedactionPatterns>) {
    let make_writer = RedactingMakeWriter::new(io::stderr, patterns);

    let debug_mode = std::env::var("DEBUG_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    let filter = if debug_mode {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("announce_core=info,announce_transport_discord=info,serenity=warn")
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
}

fn init_settings() -> Arc<BotSettings> {
    let core_settings = match CoreSettings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load announce configuration: {}", e);
            std::process::exit(1);
        }
    };
    let discord_settings = match DiscordSettings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load discord configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Configuration loaded successfully.");
    Arc::new(BotSettings::new(core_settings, discord_settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "MTA4NzY1NDMyMTAxMjM0NTY3OA.GhIjKl.abcdefghijklmnopqrstuvwxyz0123456789AB";

    fn patterns() -> RedactionPatterns {
        RedactionPatterns::new().expect("patterns compile")
    }

    #[test]
    fn test_bare_token_is_masked() {
        let line = format!("connecting with {TOKEN} now");
        assert_eq!(patterns().redact(&line), "connecting with [DISCORD_TOKEN] now");
    }

    #[test]
    fn test_authorization_header_is_masked() {
        let redacted = patterns().redact("Authorization: Bot abc.def.ghi");
        assert_eq!(redacted, "Authorization: Bot [DISCORD_TOKEN]");
    }

    #[test]
    fn test_env_dump_is_masked() {
        let redacted = patterns().redact("DISCORD_TOKEN=secret RUN_MODE=prod");
        assert_eq!(redacted, "DISCORD_TOKEN=[MASKED] RUN_MODE=prod");
    }

    #[test]
    fn test_plain_text_untouched() {
        for line in [
            "User 7 announced to role 42 in channel 200",
            "Bot is running...",
        ] {
            assert_eq!(patterns().redact(line), line);
        }
    }

    #[test]
    fn test_writer_reports_original_length() -> io::Result<()> {
        let mut sink = Vec::new();
        let input = format!("token {TOKEN}\n");
        {
            let mut writer = RedactingWriter::new(&mut sink, Arc::new(patterns()));
            assert_eq!(writer.write(input.as_bytes())?, input.len());
            writer.flush()?;
        }
        assert_eq!(String::from_utf8_lossy(&sink), "token [DISCORD_TOKEN]\n");
        Ok(())
    }
}
