//! wire routes and header keys shared by client and server
//!
//! both sides agree on these tables at compile time; nothing here is mutated at runtime

use std::fmt;
use std::str::FromStr;

/// HTTP methods used on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }

    /// whether requests with this method carry a body
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            _ => Err(format!("unsupported method '{}'", s)),
        }
    }
}

/// server paths, matched case-sensitively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerPath {
    PushNotification,
    Privacy,
    RenameDevice,
    TerminateApp,
    DeviceAppearance,
    ICloudSync,
    UninstallApp,
    StatusBarOverrides,
    OpenUrl,
}

impl ServerPath {
    pub const ALL: [ServerPath; 9] = [
        ServerPath::PushNotification,
        ServerPath::Privacy,
        ServerPath::RenameDevice,
        ServerPath::TerminateApp,
        ServerPath::DeviceAppearance,
        ServerPath::ICloudSync,
        ServerPath::UninstallApp,
        ServerPath::StatusBarOverrides,
        ServerPath::OpenUrl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServerPath::PushNotification => "/simctl/pushNotification",
            ServerPath::Privacy => "/simctl/setPrivacy",
            ServerPath::RenameDevice => "/simctl/renameDevice",
            ServerPath::TerminateApp => "/simctl/terminateApp",
            ServerPath::DeviceAppearance => "/simctl/setDeviceAppearance",
            ServerPath::ICloudSync => "/simctl/iCloudSync",
            ServerPath::UninstallApp => "/simctl/uninstallApp",
            ServerPath::StatusBarOverrides => "/simctl/statusBarOverrides",
            ServerPath::OpenUrl => "/simctl/openUrl",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == path)
    }
}

impl fmt::Display for ServerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// a (path, method) pair identifying exactly one action kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Route {
    pub method: HttpMethod,
    pub path: ServerPath,
}

impl Route {
    pub const fn new(method: HttpMethod, path: ServerPath) -> Self {
        Self { method, path }
    }

    /// inverse of `ActionKind::route`
    pub fn resolve(method: &str, path: &str) -> Option<ActionKind> {
        let method = method.parse::<HttpMethod>().ok()?;
        let path = ServerPath::from_path(path)?;
        let route = Route::new(method, path);
        ActionKind::ALL.into_iter().find(|kind| kind.route() == route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// fieldless mirror of `Command`, one per wire route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    SendPushNotification,
    SetPrivacy,
    RenameDevice,
    TerminateApp,
    SetDeviceAppearance,
    TriggerICloudSync,
    UninstallApp,
    SetStatusBarOverrides,
    ClearStatusBarOverrides,
    OpenUrl,
}

impl ActionKind {
    pub const ALL: [ActionKind; 10] = [
        ActionKind::SendPushNotification,
        ActionKind::SetPrivacy,
        ActionKind::RenameDevice,
        ActionKind::TerminateApp,
        ActionKind::SetDeviceAppearance,
        ActionKind::TriggerICloudSync,
        ActionKind::UninstallApp,
        ActionKind::SetStatusBarOverrides,
        ActionKind::ClearStatusBarOverrides,
        ActionKind::OpenUrl,
    ];

    pub fn route(&self) -> Route {
        use HttpMethod::{Get, Post};

        match self {
            ActionKind::SendPushNotification => Route::new(Post, ServerPath::PushNotification),
            ActionKind::SetPrivacy => Route::new(Get, ServerPath::Privacy),
            ActionKind::RenameDevice => Route::new(Get, ServerPath::RenameDevice),
            ActionKind::TerminateApp => Route::new(Get, ServerPath::TerminateApp),
            ActionKind::SetDeviceAppearance => Route::new(Get, ServerPath::DeviceAppearance),
            ActionKind::TriggerICloudSync => Route::new(Get, ServerPath::ICloudSync),
            ActionKind::UninstallApp => Route::new(Get, ServerPath::UninstallApp),
            ActionKind::SetStatusBarOverrides => Route::new(Post, ServerPath::StatusBarOverrides),
            ActionKind::ClearStatusBarOverrides => Route::new(Get, ServerPath::StatusBarOverrides),
            ActionKind::OpenUrl => Route::new(Post, ServerPath::OpenUrl),
        }
    }

    /// name used in logs
    pub fn method_name(&self) -> &'static str {
        match self {
            ActionKind::SendPushNotification => "push_notification",
            ActionKind::SetPrivacy => "set_privacy",
            ActionKind::RenameDevice => "rename_device",
            ActionKind::TerminateApp => "terminate_app",
            ActionKind::SetDeviceAppearance => "set_device_appearance",
            ActionKind::TriggerICloudSync => "icloud_sync",
            ActionKind::UninstallApp => "uninstall_app",
            ActionKind::SetStatusBarOverrides => "set_status_bar_overrides",
            ActionKind::ClearStatusBarOverrides => "clear_status_bar_overrides",
            ActionKind::OpenUrl => "open_url",
        }
    }
}

/// header field keys
///
/// header names are normalized to lowercase by HTTP stacks, so the keys are
/// lowercase from the start and incoming names are lowercased before matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderFieldKey {
    BundleIdentifier,
    DeviceUdid,
    PrivacyAction,
    PrivacyService,
    DeviceName,
    TargetBundleIdentifier,
    DeviceAppearance,
}

impl HeaderFieldKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderFieldKey::BundleIdentifier => "bundle_identifier",
            HeaderFieldKey::DeviceUdid => "device_udid",
            HeaderFieldKey::PrivacyAction => "privacy_action",
            HeaderFieldKey::PrivacyService => "privacy_service",
            HeaderFieldKey::DeviceName => "device_name",
            HeaderFieldKey::TargetBundleIdentifier => "target_bundle_identifier",
            HeaderFieldKey::DeviceAppearance => "device_appearance",
        }
    }
}

impl fmt::Display for HeaderFieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
