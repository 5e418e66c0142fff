mod schema;

pub use schema::{
    Config, ServerSettings, ToolSettings, DEFAULT_BIND_ADDRESS, DEFAULT_PORT,
    DEFAULT_TOOL_PROGRAM,
};

use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

const CONFIG_ENV_VAR: &str = "SIMCTL_BRIDGE_CONFIG";

/// config file location: `$SIMCTL_BRIDGE_CONFIG` or `~/.simctl-bridge/config.json`
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }

    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not find home directory"))?
        .join(".simctl-bridge")
        .join("config.json"))
}

/// resolve the config path, preferring an explicit override
pub fn resolve_path(override_path: Option<&Path>) -> Result<PathBuf> {
    match override_path {
        Some(path) => Ok(path.to_path_buf()),
        None => get_config_path(),
    }
}

/// load config from the given path or the default location
///
/// a missing file yields the defaults; the file is never created
pub fn load_from(override_path: Option<&Path>) -> Result<Config> {
    let path = resolve_path(override_path)?;

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    let errors = validate(&config);
    if !errors.is_empty() {
        return Err(anyhow!(
            "invalid config file {}: {}",
            path.display(),
            errors.join("; ")
        ));
    }

    Ok(config)
}

/// Verify configuration file and return a list of errors
pub fn verify(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(anyhow!("config file not found: {}", path.display()));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            return Err(anyhow!("invalid JSON: {}", e));
        }
    };

    Ok(validate(&config))
}

fn validate(config: &Config) -> Vec<String> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<IpAddr>().is_err() {
        errors.push(format!(
            "server.bind_address: '{}' is not an IP address",
            config.server.bind_address
        ));
    }

    if config.tool.program.trim().is_empty() {
        errors.push("tool.program: must not be empty".to_string());
    }

    errors
}

impl Config {
    /// socket address to listen on, with an optional port override
    pub fn listen_addr(&self, port: Option<u16>) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .bind_address
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.server.bind_address))?;
        Ok(SocketAddr::new(ip, port.unwrap_or(self.server.port)))
    }
}
