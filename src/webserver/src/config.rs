use clap::Parser;

use crate::response::StatusMode;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024; // 4 MiB
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// In-memory JSON key/value store served over HTTP.
#[derive(Debug, Clone, Parser)]
#[command(name = "keystore", version)]
pub struct HostConfig {
    /// Address to bind to
    #[arg(env = "KEYSTORE_HOST", default_value = DEFAULT_HOST)]
    pub hostname: String,

    /// Port to listen on
    #[arg(env = "KEYSTORE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Number of HTTP worker threads (defaults to one per core)
    #[arg(long, env = "KEYSTORE_WORKERS", value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    /// Largest accepted request body in bytes
    #[arg(
        long,
        env = "KEYSTORE_MAX_BODY_BYTES",
        default_value_t = DEFAULT_MAX_BODY_BYTES,
        value_parser = parse_body_limit
    )]
    pub max_body_bytes: usize,

    /// Report errors with 400/404/405/500 instead of always 200
    #[arg(long, env = "KEYSTORE_STRICT_STATUS")]
    pub strict_status: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "KEYSTORE_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "KEYSTORE_LOG_JSON")]
    pub log_json: bool,
}

fn parse_body_limit(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("body limit must be at least 1 byte".to_string()),
        Ok(limit) => Ok(limit),
        Err(e) => Err(e.to_string()),
    }
}

impl HostConfig {
    pub fn status_mode(&self) -> StatusMode {
        if self.strict_status {
            StatusMode::Strict
        } else {
            StatusMode::Compat
        }
    }

    pub fn label(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }
}
