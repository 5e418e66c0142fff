//! HTTP client used from inside a simulated app
//!
//! each call encodes an `Action` for the client's environment, sends it to the
//! configured host and classifies the outcome

use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::actions::{
    Action, Command, DeviceAppearance, PrivacyAction, PrivacyService, PushNotificationContent,
    Route, StatusBarOverrides, WireRequest,
};

/// environment variable the simulator sets for every app it runs
pub const SIMULATOR_UDID_ENV: &str = "SIMULATOR_UDID";

#[derive(Debug, Error)]
pub enum ClientError {
    /// request could not be built or the server could not be reached
    #[error("simctl service unavailable: {0}")]
    Service(String),

    #[error("no HTTP response: {0}")]
    NoHttpResponse(String),

    #[error("{route} returned {status}: {body}")]
    UnexpectedStatusCode {
        route: Route,
        status: u16,
        body: String,
    },

    #[error("response carried no data")]
    NoData,

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// base URL of the bridge server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    base: String,
}

impl Host {
    pub fn new(base: &str) -> Result<Self, ClientError> {
        Url::parse(base)
            .map_err(|e| ClientError::Service(format!("invalid host '{}': {}", base, e)))?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
        })
    }

    /// `http://localhost:<port>`
    pub fn localhost(port: u16) -> Self {
        Self {
            base: format!("http://localhost:{}", port),
        }
    }

    fn join(&self, path: &str) -> Result<Url, ClientError> {
        let url = format!("{}{}", self.base, path);
        Url::parse(&url).map_err(|e| ClientError::Service(format!("invalid url '{}': {}", url, e)))
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

/// identity of the app and device making requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub device_udid: Uuid,
    pub bundle_identifier: Option<String>,
}

impl Environment {
    pub fn new(device_udid: Uuid, bundle_identifier: Option<String>) -> Self {
        Self {
            device_udid,
            bundle_identifier,
        }
    }

    /// read the device udid the simulator exposes to running apps
    pub fn from_process_env(bundle_identifier: Option<String>) -> Option<Self> {
        let udid = std::env::var(SIMULATOR_UDID_ENV).ok()?;
        let device_udid = Uuid::parse_str(udid.trim()).ok()?;
        Some(Self::new(device_udid, bundle_identifier))
    }
}

pub struct SimctlClient {
    client: reqwest::Client,
    host: Host,
    environment: Environment,
}

impl SimctlClient {
    pub fn new(host: Host, environment: Environment) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("simctl-bridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Service(e.to_string()))?;

        Ok(Self {
            client,
            host,
            environment,
        })
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// action for this client's device and app
    pub fn action(&self, command: Command) -> Action {
        Action::new(
            self.environment.device_udid,
            self.environment.bundle_identifier.clone(),
            command,
        )
    }

    /// send an action and return the raw response body
    pub async fn send(&self, action: &Action) -> Result<Vec<u8>, ClientError> {
        let route = action.route();
        let request = self.build_request(&action.encode())?;

        debug!(%route, host = %self.host, "sending");
        let response = self.client.execute(request).await.map_err(classify)?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::NoHttpResponse(e.to_string()))?;

        if status != StatusCode::OK {
            return Err(ClientError::UnexpectedStatusCode {
                route,
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(body.to_vec())
    }

    /// send an action and decode the response body as JSON
    pub async fn send_decoded<T: DeserializeOwned>(&self, action: &Action) -> Result<T, ClientError> {
        let body = self.send(action).await?;
        if body.is_empty() {
            return Err(ClientError::NoData);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    fn build_request(&self, wire: &WireRequest) -> Result<reqwest::Request, ClientError> {
        let method = Method::from_bytes(wire.method.as_bytes())
            .map_err(|e| ClientError::Service(e.to_string()))?;
        let url = self.host.join(&wire.path)?;

        let mut headers = HeaderMap::with_capacity(wire.headers.len());
        for field in &wire.headers {
            let name = HeaderName::from_bytes(field.name.as_bytes())
                .map_err(|e| ClientError::Service(format!("header '{}': {}", field.name, e)))?;
            let value = HeaderValue::from_bytes(field.value.as_bytes())
                .map_err(|e| ClientError::Service(format!("header '{}': {}", field.name, e)))?;
            headers.append(name, value);
        }

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = &wire.body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.clone());
        }
        builder
            .build()
            .map_err(|e| ClientError::Service(e.to_string()))
    }

    async fn run(&self, command: Command) -> Result<String, ClientError> {
        let body = self.send(&self.action(command)).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    // ==================== Convenience operations ====================

    pub async fn send_push_notification(
        &self,
        content: PushNotificationContent,
    ) -> Result<String, ClientError> {
        self.run(Command::SendPushNotification(content)).await
    }

    pub async fn set_privacy(
        &self,
        action: PrivacyAction,
        service: PrivacyService,
    ) -> Result<String, ClientError> {
        self.run(Command::SetPrivacy { action, service }).await
    }

    pub async fn rename_device(&self, name: impl Into<String>) -> Result<String, ClientError> {
        self.run(Command::RenameDevice { name: name.into() }).await
    }

    pub async fn terminate_app(
        &self,
        bundle_identifier: impl Into<String>,
    ) -> Result<String, ClientError> {
        self.run(Command::TerminateApp {
            bundle_identifier: bundle_identifier.into(),
        })
        .await
    }

    pub async fn set_device_appearance(
        &self,
        appearance: DeviceAppearance,
    ) -> Result<String, ClientError> {
        self.run(Command::SetDeviceAppearance(appearance)).await
    }

    pub async fn trigger_icloud_sync(&self) -> Result<String, ClientError> {
        self.run(Command::TriggerICloudSync).await
    }

    pub async fn uninstall_app(
        &self,
        bundle_identifier: impl Into<String>,
    ) -> Result<String, ClientError> {
        self.run(Command::UninstallApp {
            bundle_identifier: bundle_identifier.into(),
        })
        .await
    }

    pub async fn set_status_bar_overrides(
        &self,
        overrides: StatusBarOverrides,
    ) -> Result<String, ClientError> {
        self.run(Command::SetStatusBarOverrides(overrides)).await
    }

    pub async fn clear_status_bar_overrides(&self) -> Result<String, ClientError> {
        self.run(Command::ClearStatusBarOverrides).await
    }

    pub async fn open_url(&self, url: Url) -> Result<String, ClientError> {
        self.run(Command::OpenUrl { url }).await
    }
}

fn classify(e: reqwest::Error) -> ClientError {
    if e.is_connect() || e.is_timeout() || e.is_builder() {
        ClientError::Service(e.to_string())
    } else {
        ClientError::NoHttpResponse(e.to_string())
    }
}
