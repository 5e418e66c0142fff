//! simulator device listing
//!
//! runs `<tool> list devices --json` once and flattens the per-runtime groups

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::actions::{encode_udid, CommandLine, ExecError, Executor};
use crate::config::ToolSettings;

#[derive(Debug, Error)]
pub enum DeviceListError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("failed to parse device list: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceState {
    Booted,
    Shutdown,
    /// any state simctl reports that is not one of the above
    Other(String),
}

impl From<String> for DeviceState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Booted" => DeviceState::Booted,
            "Shutdown" => DeviceState::Shutdown,
            _ => DeviceState::Other(s),
        }
    }
}

impl From<DeviceState> for String {
    fn from(state: DeviceState) -> Self {
        state.to_string()
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceState::Booted => f.write_str("Booted"),
            DeviceState::Shutdown => f.write_str("Shutdown"),
            DeviceState::Other(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatorDevice {
    pub udid: Uuid,
    pub name: String,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type_identifier: Option<String>,
    pub state: DeviceState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<String>,
}

impl fmt::Display for SimulatorDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<SimulatorDevice[{}]: {} ({})>",
            encode_udid(&self.udid),
            self.name,
            self.state
        )
    }
}

#[derive(Debug, Deserialize)]
struct DeviceListing {
    devices: BTreeMap<String, Vec<SimulatorDevice>>,
}

/// parse the JSON printed by `simctl list devices --json`
///
/// devices come back sorted by name, then udid
pub fn parse(json: &[u8]) -> Result<Vec<SimulatorDevice>, DeviceListError> {
    let listing: DeviceListing = serde_json::from_slice(json)?;
    let mut devices: Vec<SimulatorDevice> = listing.devices.into_values().flatten().collect();
    devices.sort_by(|a, b| a.name.cmp(&b.name).then(a.udid.cmp(&b.udid)));
    Ok(devices)
}

/// command line that lists devices as JSON
pub fn list_command(tool: &ToolSettings) -> CommandLine {
    CommandLine::new(&tool.program)
        .args(tool.args.iter().cloned())
        .args(["list", "devices", "--json"])
}

pub fn list(tool: &ToolSettings, executor: &dyn Executor) -> Result<Vec<SimulatorDevice>, DeviceListError> {
    let output = executor.run(&list_command(tool))?;
    parse(output.as_bytes())
}
