use std::env;

use cm_common::parse_boolean_flag;
use log::*;

const DEFAULT_CM_HOST: &str = "127.0.0.1";
const DEFAULT_CM_PORT: u16 = 8360;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// When true (the default), pending schema migrations are applied at startup.
    pub run_migrations: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CM_HOST.to_string(),
            port: DEFAULT_CM_PORT,
            database_url: String::default(),
            run_migrations: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("CM_HOST").ok().unwrap_or_else(|| DEFAULT_CM_HOST.into());
        let port = env::var("CM_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for CM_PORT. {e} Using the default, {DEFAULT_CM_PORT}, instead.");
                    DEFAULT_CM_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_CM_PORT);
        let database_url = env::var("CM_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ CM_DATABASE_URL is not set. Please set it to the URL for the marketplace database.");
            String::default()
        });
        let run_migrations = parse_boolean_flag(env::var("CM_RUN_MIGRATIONS").ok(), true);
        Self { host, port, database_url, run_migrations }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, DEFAULT_CM_HOST);
        assert_eq!(config.port, DEFAULT_CM_PORT);
        assert!(config.run_migrations);
    }
}
