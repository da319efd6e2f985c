//! Runtime configuration.
//!
//! Values come from the process environment (a `.env` file is loaded by the
//! binary through `dotenv`) and fall back to the constants below.

use crate::models::Ipv4;
use std::error::Error;

/// Private blocks handed out to new networks, in preference order.
pub const DEFAULT_CIDR_POOL: [&str; 16] = [
    "10.121.15.0/24",
    "10.121.16.0/24",
    "10.121.17.0/24",
    "10.121.18.0/24",
    "10.121.19.0/24",
    "10.121.20.0/24",
    "10.121.21.0/24",
    "10.121.22.0/24",
    "10.121.23.0/24",
    "10.121.24.0/24",
    "172.25.25.0/24",
    "172.25.26.0/24",
    "172.25.27.0/24",
    "172.25.28.0/24",
    "172.25.29.0/24",
    "172.25.30.0/24",
];

pub const DEFAULT_LOG_CONFIG: &str = "log4rs.yml";
pub const DEFAULT_DUMP_FILE: &str = "controller_dump.json";

pub const ENV_CIDR_POOL: &str = "NETSYNC_CIDR_POOL";
pub const ENV_LOG_CONFIG: &str = "NETSYNC_LOG_CONFIG";
pub const ENV_PREFER_RANDOM: &str = "NETSYNC_PREFER_RANDOM";

#[derive(Debug, Clone)]
pub struct Config {
    /// Candidate pool for the allocator, never empty.
    pub cidr_pool: Vec<Ipv4>,
    /// Path of the log4rs YAML file.
    pub log_config: String,
    /// Pick subnets at random instead of least-used first.
    pub prefer_random: bool,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Config, Box<dyn Error>> {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, Box<dyn Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cidr_pool = match lookup(ENV_CIDR_POOL) {
            Some(list) => parse_cidr_pool(&list)?,
            None => default_cidr_pool()?,
        };

        let log_config = lookup(ENV_LOG_CONFIG).unwrap_or_else(|| DEFAULT_LOG_CONFIG.to_string());

        let prefer_random = match lookup(ENV_PREFER_RANDOM) {
            Some(v) => v
                .trim()
                .parse::<bool>()
                .map_err(|_| format!("{ENV_PREFER_RANDOM} must be true or false, got '{v}'"))?,
            None => false,
        };

        Ok(Config {
            cidr_pool,
            log_config,
            prefer_random,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cidr_pool: DEFAULT_CIDR_POOL
                .iter()
                .filter_map(|c| Ipv4::new(c).ok())
                .collect(),
            log_config: DEFAULT_LOG_CONFIG.to_string(),
            prefer_random: false,
        }
    }
}

/// Parse the built-in candidate pool.
pub fn default_cidr_pool() -> Result<Vec<Ipv4>, Box<dyn Error>> {
    DEFAULT_CIDR_POOL.iter().map(|c| Ipv4::new(c)).collect()
}

/// Parse a comma separated CIDR list. Blank entries are ignored; an empty
/// result is an error.
pub fn parse_cidr_pool(list: &str) -> Result<Vec<Ipv4>, Box<dyn Error>> {
    let pool = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Ipv4::new(s)
                .and_then(|c| c.network())
                .map_err(|e| -> Box<dyn Error> {
                    format!("{ENV_CIDR_POOL}: bad entry '{s}': {e}").into()
                })
        })
        .collect::<Result<Vec<Ipv4>, Box<dyn Error>>>()?;
    if pool.is_empty() {
        return Err(format!("{ENV_CIDR_POOL} does not contain any CIDR").into());
    }
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.cidr_pool.len(), 16);
        assert_eq!(config.cidr_pool[0].to_string(), "10.121.15.0/24");
        assert_eq!(config.log_config, "log4rs.yml");
        assert!(!config.prefer_random);
        assert_eq!(config.cidr_pool, Config::default().cidr_pool);
    }

    #[test]
    fn test_pool_override() {
        let config = Config::from_lookup(lookup(&[
            (ENV_CIDR_POOL, "192.168.50.7/24, ,192.168.51.0/24"),
            (ENV_PREFER_RANDOM, "true"),
        ]))
        .unwrap();
        let pool: Vec<String> = config.cidr_pool.iter().map(|c| c.to_string()).collect();
        assert_eq!(pool, vec!["192.168.50.0/24", "192.168.51.0/24"]);
        assert!(config.prefer_random);
    }

    #[test]
    fn test_bad_values() {
        assert!(Config::from_lookup(lookup(&[(ENV_CIDR_POOL, " , ")])).is_err());
        assert!(Config::from_lookup(lookup(&[(ENV_CIDR_POOL, "10.0.0.0/40")])).is_err());
        assert!(Config::from_lookup(lookup(&[(ENV_PREFER_RANDOM, "yes")])).is_err());
    }
}
