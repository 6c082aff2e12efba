// ⚙️ Server Configuration
// Read from the environment; `from_lookup` keeps it testable without env vars

use anyhow::{Context as AnyhowContext, Result};
use std::net::SocketAddr;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub verbose: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            verbose: false,
        }
    }
}

impl ServerConfig {
    /// ALEX_HOST, PORT (then ALEX_PORT), ALEX_LOG_VERBOSE
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("ALEX_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        // Hosting platforms set PORT; ALEX_PORT is for local runs
        let port = match lookup("PORT").or_else(|| lookup("ALEX_PORT")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid port: {:?}", raw))?,
            None => DEFAULT_PORT,
        };

        let verbose = lookup("ALEX_LOG_VERBOSE")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(ServerConfig { host, port, verbose })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}
