use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context as _, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    pub reset_database: bool,
    pub seeds: Vec<String>,
    pub request_timeout: Duration,
}

impl Config {
    /// Reads configuration from the process environment (after `.env` is loaded).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://todos.db".to_string());
        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(v) => v.parse::<u32>().with_context(|| format!("invalid DB_MAX_CONNECTIONS: {v}"))?,
            None => 5,
        };
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse::<SocketAddr>()
            .context("invalid BIND_ADDR")?;
        let reset_database = match lookup("RESET_DATABASE").as_deref() {
            None | Some("") | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => anyhow::bail!("invalid RESET_DATABASE: {other}"),
        };
        let seeds: Vec<String> = lookup("SEED_TODOS")
            .map(|v| v.split('|').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect())
            .unwrap_or_default();
        let request_timeout = match lookup("REQUEST_TIMEOUT_MS") {
            Some(v) => Duration::from_millis(v.parse::<u64>().with_context(|| format!("invalid REQUEST_TIMEOUT_MS: {v}"))?),
            None => Duration::from_millis(5000),
        };
        Ok(Self { database_url, max_connections, bind_addr, reset_database, seeds, request_timeout })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.database_url, "sqlite://todos.db");
        assert_eq!(cfg.max_connections, 5);
        assert_eq!(cfg.bind_addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert!(!cfg.reset_database);
        assert!(cfg.seeds.is_empty());
        assert_eq!(cfg.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn seeds_keep_order() {
        let cfg = config(&[("RESET_DATABASE", "true"), ("SEED_TODOS", "buy milk| walk dog ||")]).unwrap();
        assert!(cfg.reset_database);
        assert_eq!(cfg.seeds, vec!["buy milk".to_string(), "walk dog".to_string()]);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("RESET_DATABASE", "maybe")]).is_err());
        assert!(config(&[("DB_MAX_CONNECTIONS", "lots")]).is_err());
        assert!(config(&[("BIND_ADDR", "nowhere")]).is_err());
    }
}
