use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

const CONFIG_ENV: &str = "WIRELINE_CONFIG";
const PORT_ENV: &str = "PORT";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Bytes requested from the socket per read
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    42069
}

fn default_read_buffer_size() -> usize {
    1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            read_buffer_size: default_read_buffer_size(),
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Loads the YAML file named by `WIRELINE_CONFIG` (defaults when unset),
    /// then applies the `PORT` override.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };

        if let Ok(port) = std::env::var(PORT_ENV) {
            cfg.server.port = port
                .parse()
                .with_context(|| format!("invalid {PORT_ENV}: {port}"))?;
        }

        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(s: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(s).context("parsing config")?;
        if cfg.server.read_buffer_size == 0 {
            anyhow::bail!("server.read_buffer_size must be greater than zero");
        }
        Ok(cfg)
    }
}
