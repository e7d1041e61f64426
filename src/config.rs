//! Server configuration from `CIVIC_LEDGER_*` environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::crypto::HashEncoding;
use crate::error::ConfigError;
use crate::ledger::LedgerOptions;

pub const ENV_BIND: &str = "CIVIC_LEDGER_BIND";
pub const ENV_STORE: &str = "CIVIC_LEDGER_STORE";
pub const ENV_DATA_DIR: &str = "CIVIC_LEDGER_DATA_DIR";
pub const ENV_HASH_ENCODING: &str = "CIVIC_LEDGER_HASH_ENCODING";
pub const ENV_APPEND_RETRIES: &str = "CIVIC_LEDGER_APPEND_RETRIES";
pub const ENV_SEED_DEMO: &str = "CIVIC_LEDGER_SEED_DEMO";
pub const ENV_LOG_JSON: &str = "CIVIC_LEDGER_LOG_JSON";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub ledger: LedgerOptions,
    pub seed_demo: bool,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            store: StoreBackend::File(PathBuf::from("data")),
            ledger: LedgerOptions::default(),
            seed_demo: false,
            log_json: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from any variable source; unset or blank variables keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut cfg = ServerConfig::default();

        if let Some(raw) = get(ENV_BIND) {
            cfg.bind_addr = raw
                .trim()
                .parse()
                .map_err(|e: std::net::AddrParseError| invalid(ENV_BIND, &raw, e.to_string()))?;
        }

        let data_dir = get(ENV_DATA_DIR).map_or_else(|| PathBuf::from("data"), PathBuf::from);
        cfg.store = match get(ENV_STORE).as_deref().map(str::trim) {
            None | Some("file") => StoreBackend::File(data_dir),
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(invalid(ENV_STORE, other, "expected `file` or `memory`".into()))
            }
        };

        if let Some(raw) = get(ENV_HASH_ENCODING) {
            cfg.ledger.encoding = raw
                .parse::<HashEncoding>()
                .map_err(|e| invalid(ENV_HASH_ENCODING, &raw, e))?;
        }
        if let Some(raw) = get(ENV_APPEND_RETRIES) {
            cfg.ledger.append_retries = raw
                .trim()
                .parse::<u32>()
                .map_err(|e| invalid(ENV_APPEND_RETRIES, &raw, e.to_string()))?;
        }
        if let Some(raw) = get(ENV_SEED_DEMO) {
            cfg.seed_demo = parse_bool(ENV_SEED_DEMO, &raw)?;
        }
        if let Some(raw) = get(ENV_LOG_JSON) {
            cfg.log_json = parse_bool(ENV_LOG_JSON, &raw)?;
        }
        Ok(cfg)
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Ok(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Ok(false),
        _ => Err(invalid(name, raw, "expected a boolean".into())),
    }
}

fn invalid(name: &'static str, value: &str, reason: String) -> ConfigError {
    ConfigError::InvalidValue {
        name,
        value: value.to_string(),
        reason,
    }
}
