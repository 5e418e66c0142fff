//! action definitions - single source of truth for client and server
//!
//! the client encodes these into HTTP requests, the server decodes requests
//! back into them and translates them into simctl invocations

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::route::{ActionKind, Route};

/// one remote operation addressed to a simulator device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// udid of the target device
    pub device_udid: Uuid,
    /// bundle identifier of the app the request is made on behalf of
    pub bundle_identifier: Option<String>,
    pub command: Command,
}

impl Action {
    pub fn new(device_udid: Uuid, bundle_identifier: Option<String>, command: Command) -> Self {
        Self {
            device_udid,
            bundle_identifier,
            command,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.command.kind()
    }

    pub fn route(&self) -> Route {
        self.kind().route()
    }
}

/// all operations supported by the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// send a push notification to the app
    SendPushNotification(PushNotificationContent),

    /// grant, revoke or reset a privacy permission
    SetPrivacy {
        action: PrivacyAction,
        service: PrivacyService,
    },

    /// rename the device
    RenameDevice { name: String },

    /// terminate an app by bundle identifier
    TerminateApp { bundle_identifier: String },

    /// switch the device UI between light and dark
    SetDeviceAppearance(DeviceAppearance),

    /// trigger an iCloud sync
    TriggerICloudSync,

    /// uninstall an app by bundle identifier
    UninstallApp { bundle_identifier: String },

    /// override parts of the status bar
    SetStatusBarOverrides(StatusBarOverrides),

    /// clear all status bar overrides
    ClearStatusBarOverrides,

    /// open a url on the device
    OpenUrl { url: Url },
}

impl Command {
    pub fn kind(&self) -> ActionKind {
        match self {
            Command::SendPushNotification(_) => ActionKind::SendPushNotification,
            Command::SetPrivacy { .. } => ActionKind::SetPrivacy,
            Command::RenameDevice { .. } => ActionKind::RenameDevice,
            Command::TerminateApp { .. } => ActionKind::TerminateApp,
            Command::SetDeviceAppearance(_) => ActionKind::SetDeviceAppearance,
            Command::TriggerICloudSync => ActionKind::TriggerICloudSync,
            Command::UninstallApp { .. } => ActionKind::UninstallApp,
            Command::SetStatusBarOverrides(_) => ActionKind::SetStatusBarOverrides,
            Command::ClearStatusBarOverrides => ActionKind::ClearStatusBarOverrides,
            Command::OpenUrl { .. } => ActionKind::OpenUrl,
        }
    }

    pub fn method_name(&self) -> &'static str {
        self.kind().method_name()
    }
}

// ==================== Push Notifications ====================

/// content of a push notification
///
/// the payload must be a valid APNs payload with an "aps" key and a top-level
/// "Simulator Target Bundle" matching the target app's bundle identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPushContent", into = "RawPushContent")]
pub enum PushNotificationContent {
    /// path to a .json/.apns payload file on the host machine
    File(String),
    /// inline JSON payload bytes
    JsonPayload(Vec<u8>),
}

/// wire shape of `PushNotificationContent`, payload bytes are base64 encoded
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPushContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    #[serde(default, rename = "jsonPayload", skip_serializing_if = "Option::is_none")]
    json_payload: Option<String>,
}

impl TryFrom<RawPushContent> for PushNotificationContent {
    type Error = String;

    fn try_from(raw: RawPushContent) -> Result<Self, Self::Error> {
        match (raw.file, raw.json_payload) {
            (Some(path), None) => Ok(PushNotificationContent::File(path)),
            (None, Some(encoded)) => STANDARD
                .decode(encoded.as_bytes())
                .map(PushNotificationContent::JsonPayload)
                .map_err(|e| format!("jsonPayload is not valid base64: {}", e)),
            (Some(_), Some(_)) => {
                Err("push content must contain either 'file' or 'jsonPayload', not both".into())
            }
            (None, None) => Err("push content must contain 'file' or 'jsonPayload'".into()),
        }
    }
}

impl From<PushNotificationContent> for RawPushContent {
    fn from(content: PushNotificationContent) -> Self {
        match content {
            PushNotificationContent::File(path) => RawPushContent {
                file: Some(path),
                json_payload: None,
            },
            PushNotificationContent::JsonPayload(data) => RawPushContent {
                file: None,
                json_payload: Some(STANDARD.encode(data)),
            },
        }
    }
}

// ==================== Privacy ====================

/// some permission changes terminate the app if it is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrivacyAction {
    /// grant access without prompting, requires bundle identifier
    Grant,
    /// revoke access, denying all use of the service, requires bundle identifier
    Revoke,
    /// reset access, prompting on next use, bundle identifier optional
    Reset,
}

impl PrivacyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyAction::Grant => "grant",
            PrivacyAction::Revoke => "revoke",
            PrivacyAction::Reset => "reset",
        }
    }
}

impl FromStr for PrivacyAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grant" => Ok(PrivacyAction::Grant),
            "revoke" => Ok(PrivacyAction::Revoke),
            "reset" => Ok(PrivacyAction::Reset),
            _ => Err(format!(
                "invalid privacy action '{}', expected: grant, revoke, reset",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrivacyService {
    /// apply the action to all services
    All,
    Calendar,
    /// basic contact info
    ContactsLimited,
    /// full contact details
    Contacts,
    /// location services while the app is in use
    Location,
    /// location services at all times
    LocationAlways,
    /// adding photos to the library
    PhotosAdd,
    /// full photo library access
    Photos,
    MediaLibrary,
    Microphone,
    /// motion and fitness data
    Motion,
    Reminders,
    Siri,
}

impl PrivacyService {
    pub const ALL: [PrivacyService; 13] = [
        PrivacyService::All,
        PrivacyService::Calendar,
        PrivacyService::ContactsLimited,
        PrivacyService::Contacts,
        PrivacyService::Location,
        PrivacyService::LocationAlways,
        PrivacyService::PhotosAdd,
        PrivacyService::Photos,
        PrivacyService::MediaLibrary,
        PrivacyService::Microphone,
        PrivacyService::Motion,
        PrivacyService::Reminders,
        PrivacyService::Siri,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyService::All => "all",
            PrivacyService::Calendar => "calendar",
            PrivacyService::ContactsLimited => "contacts-limited",
            PrivacyService::Contacts => "contacts",
            PrivacyService::Location => "location",
            PrivacyService::LocationAlways => "location-always",
            PrivacyService::PhotosAdd => "photos-add",
            PrivacyService::Photos => "photos",
            PrivacyService::MediaLibrary => "media-library",
            PrivacyService::Microphone => "microphone",
            PrivacyService::Motion => "motion",
            PrivacyService::Reminders => "reminders",
            PrivacyService::Siri => "siri",
        }
    }
}

impl FromStr for PrivacyService {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|service| service.as_str() == s)
            .ok_or_else(|| format!("invalid privacy service '{}'", s))
    }
}

// ==================== Appearance ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceAppearance {
    Light,
    Dark,
}

impl DeviceAppearance {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceAppearance::Light => "light",
            DeviceAppearance::Dark => "dark",
        }
    }
}

impl FromStr for DeviceAppearance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(DeviceAppearance::Light),
            "dark" => Ok(DeviceAppearance::Dark),
            _ => Err(format!(
                "invalid device appearance '{}', expected: light, dark",
                s
            )),
        }
    }
}

impl fmt::Display for PrivacyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PrivacyService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DeviceAppearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==================== Status Bar ====================

pub const MAX_WIFI_BARS: u8 = 3;
pub const MAX_CELLULAR_BARS: u8 = 4;
pub const MAX_BATTERY_LEVEL: u8 = 100;

/// u8 newtype that only holds values in `0..=MAX`
macro_rules! bounded_u8 {
    ($(#[$meta:meta])* $name:ident, $field:literal, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "u8", into = "u8")]
        pub struct $name(u8);

        impl $name {
            pub const MAX: u8 = $max;

            pub fn get(self) -> u8 {
                self.0
            }
        }

        impl TryFrom<u8> for $name {
            type Error = String;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                if value > Self::MAX {
                    return Err(format!(
                        "{} {} out of range (0-{})",
                        $field,
                        value,
                        Self::MAX
                    ));
                }
                Ok(Self(value))
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

bounded_u8!(
    /// wifi signal strength, 0-3
    WifiBars,
    "wifiBars",
    MAX_WIFI_BARS
);
bounded_u8!(
    /// cellular signal strength, 0-4
    CellularBars,
    "cellularBars",
    MAX_CELLULAR_BARS
);
bounded_u8!(
    /// battery percentage, 0-100
    BatteryLevel,
    "batteryLevel",
    MAX_BATTERY_LEVEL
);

/// a set of status bar overrides
///
/// each directive appears at most once; flags are emitted in field
/// declaration order so equal sets always yield the same command line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StatusBarOverrides {
    /// fixed time string, e.g. "9:41" or an ISO date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_network: Option<DataNetworkType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wifi_mode: Option<WifiMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wifi_bars: Option<WifiBars>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cellular_mode: Option<CellularMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cellular_bars: Option<CellularBars>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_state: Option<BatteryState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<BatteryLevel>,
}

impl StatusBarOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn data_network(mut self, network: DataNetworkType) -> Self {
        self.data_network = Some(network);
        self
    }

    pub fn wifi_mode(mut self, mode: WifiMode) -> Self {
        self.wifi_mode = Some(mode);
        self
    }

    pub fn wifi_bars(mut self, bars: WifiBars) -> Self {
        self.wifi_bars = Some(bars);
        self
    }

    pub fn cellular_mode(mut self, mode: CellularMode) -> Self {
        self.cellular_mode = Some(mode);
        self
    }

    pub fn cellular_bars(mut self, bars: CellularBars) -> Self {
        self.cellular_bars = Some(bars);
        self
    }

    pub fn operator_name(mut self, name: impl Into<String>) -> Self {
        self.operator_name = Some(name.into());
        self
    }

    pub fn battery_state(mut self, state: BatteryState) -> Self {
        self.battery_state = Some(state);
        self
    }

    pub fn battery_level(mut self, level: BatteryLevel) -> Self {
        self.battery_level = Some(level);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// flag/value pairs in declaration order
    pub fn to_flags(&self) -> Vec<(&'static str, String)> {
        let mut flags = Vec::new();
        if let Some(time) = &self.time {
            flags.push(("--time", time.clone()));
        }
        if let Some(network) = self.data_network {
            flags.push(("--dataNetwork", network.as_str().to_string()));
        }
        if let Some(mode) = self.wifi_mode {
            flags.push(("--wifiMode", mode.as_str().to_string()));
        }
        if let Some(bars) = self.wifi_bars {
            flags.push(("--wifiBars", bars.to_string()));
        }
        if let Some(mode) = self.cellular_mode {
            flags.push(("--cellularMode", mode.as_str().to_string()));
        }
        if let Some(bars) = self.cellular_bars {
            flags.push(("--cellularBars", bars.to_string()));
        }
        if let Some(name) = &self.operator_name {
            flags.push(("--operatorName", name.clone()));
        }
        if let Some(state) = self.battery_state {
            flags.push(("--batteryState", state.as_str().to_string()));
        }
        if let Some(level) = self.battery_level {
            flags.push(("--batteryLevel", level.to_string()));
        }
        flags
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataNetworkType {
    #[serde(rename = "hide")]
    Hide,
    #[serde(rename = "wifi")]
    Wifi,
    #[serde(rename = "3g")]
    ThreeG,
    #[serde(rename = "4g")]
    FourG,
    #[serde(rename = "lte")]
    Lte,
    #[serde(rename = "lte-a")]
    LteA,
    #[serde(rename = "lte+")]
    LtePlus,
    #[serde(rename = "5g")]
    FiveG,
    #[serde(rename = "5g+")]
    FiveGPlus,
    #[serde(rename = "5g-uwb")]
    FiveGUwb,
    #[serde(rename = "5g-uc")]
    FiveGUc,
}

impl DataNetworkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataNetworkType::Hide => "hide",
            DataNetworkType::Wifi => "wifi",
            DataNetworkType::ThreeG => "3g",
            DataNetworkType::FourG => "4g",
            DataNetworkType::Lte => "lte",
            DataNetworkType::LteA => "lte-a",
            DataNetworkType::LtePlus => "lte+",
            DataNetworkType::FiveG => "5g",
            DataNetworkType::FiveGPlus => "5g+",
            DataNetworkType::FiveGUwb => "5g-uwb",
            DataNetworkType::FiveGUc => "5g-uc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WifiMode {
    Searching,
    Failed,
    Active,
}

impl WifiMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WifiMode::Searching => "searching",
            WifiMode::Failed => "failed",
            WifiMode::Active => "active",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellularMode {
    NotSupported,
    Searching,
    Failed,
    Active,
}

impl CellularMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellularMode::NotSupported => "notSupported",
            CellularMode::Searching => "searching",
            CellularMode::Failed => "failed",
            CellularMode::Active => "active",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BatteryState {
    Charging,
    Charged,
    Discharging,
}

impl BatteryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatteryState::Charging => "charging",
            BatteryState::Charged => "charged",
            BatteryState::Discharging => "discharging",
        }
    }
}

// ==================== Open URL ====================

/// wire body of an open url request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct UrlContainer {
    pub url: String,
}
