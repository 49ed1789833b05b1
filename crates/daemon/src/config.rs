//! Daemon configuration from `WALKIN_*` environment variables

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_DB_PATH: &str = "~/.walkin/counter.db";
const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9630;
const DEFAULT_AUTO_DISPATCH_MS: u64 = 1000;
const DEFAULT_RESET_CHECK_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub db_path: String,
    pub rpc_host: String,
    pub rpc_port: u16,
    pub log_format: LogFormat,
    /// Rolling daily log files are written here when set
    pub log_dir: Option<PathBuf>,
    /// `None` disables the background auto dispatcher
    pub auto_dispatch_interval: Option<Duration>,
    pub reset_check_interval: Duration,
    pub utc_offset_minutes: i64,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = shellexpand::tilde(
            &lookup("WALKIN_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
        )
        .into_owned();

        let log_format = match lookup("WALKIN_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let log_dir = lookup("WALKIN_LOG_DIR")
            .filter(|dir| !dir.is_empty())
            .map(|dir| PathBuf::from(shellexpand::tilde(&dir).into_owned()));

        let dispatch_ms: u64 = parse_or(&lookup, "WALKIN_AUTO_DISPATCH_MS", DEFAULT_AUTO_DISPATCH_MS)?;
        let reset_secs: u64 = parse_or(&lookup, "WALKIN_RESET_CHECK_SECS", DEFAULT_RESET_CHECK_SECS)?;
        if reset_secs == 0 {
            anyhow::bail!("WALKIN_RESET_CHECK_SECS must be greater than 0");
        }

        Ok(Self {
            db_path,
            rpc_host: lookup("WALKIN_RPC_HOST").unwrap_or_else(|| DEFAULT_RPC_HOST.to_string()),
            rpc_port: parse_or(&lookup, "WALKIN_RPC_PORT", DEFAULT_RPC_PORT)?,
            log_format,
            log_dir,
            auto_dispatch_interval: (dispatch_ms > 0).then(|| Duration::from_millis(dispatch_ms)),
            reset_check_interval: Duration::from_secs(reset_secs),
            utc_offset_minutes: parse_or(&lookup, "WALKIN_UTC_OFFSET_MINUTES", 0)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
