use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_TOOL_PROGRAM: &str = "xcrun";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub tool: ToolSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_port")]
    pub port: u16,
    /// address the HTTP listener binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// log every translated command and its outcome
    #[serde(default)]
    pub verbose: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: default_bind_address(),
            verbose: false,
        }
    }
}

/// the external simulator tool
///
/// every translated command line starts with `program` followed by `args`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(default = "default_tool_program")]
    pub program: String,
    #[serde(default = "default_tool_args")]
    pub args: Vec<String>,
}

fn default_tool_program() -> String {
    DEFAULT_TOOL_PROGRAM.to_string()
}

fn default_tool_args() -> Vec<String> {
    vec!["simctl".to_string()]
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            program: default_tool_program(),
            args: default_tool_args(),
        }
    }
}
