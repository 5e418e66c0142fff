//! HTTP wire codec for actions
//!
//! `Action::encode` produces the method, path, headers and body a client sends;
//! `WireRequest::decode` turns what a server receives back into the same `Action`.
//! for every action `a`, `a.encode().decode() == Ok(a)`.
//!
//! free-text header values (bundle identifiers, device names) are
//! percent-encoded as UTF-8; HTTP stacks trim whitespace around header values
//! and reject control characters.

use std::str::FromStr;

use reqwest::Url;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::command::*;
use super::error::DecodeError;
use super::route::{ActionKind, HeaderFieldKey, Route};

/// one header as sent or received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    pub name: String,
    pub value: String,
}

impl HeaderField {
    pub fn new(key: HeaderFieldKey, value: impl Into<String>) -> Self {
        Self {
            name: key.as_str().to_string(),
            value: value.into(),
        }
    }
}

/// transport-neutral HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<HeaderField>,
    pub body: Option<Vec<u8>>,
}

impl Action {
    /// encode into the wire request for this action's route
    pub fn encode(&self) -> WireRequest {
        let route = self.route();

        let mut headers = vec![HeaderField::new(
            HeaderFieldKey::DeviceUdid,
            encode_udid(&self.device_udid),
        )];
        if let Some(bundle_id) = &self.bundle_identifier {
            headers.push(HeaderField::new(
                HeaderFieldKey::BundleIdentifier,
                encode_text(bundle_id),
            ));
        }

        let mut body = None;
        match &self.command {
            Command::SendPushNotification(content) => body = Some(to_json(content)),
            Command::SetPrivacy { action, service } => {
                headers.push(HeaderField::new(HeaderFieldKey::PrivacyAction, action.as_str()));
                headers.push(HeaderField::new(HeaderFieldKey::PrivacyService, service.as_str()));
            }
            Command::RenameDevice { name } => {
                headers.push(HeaderField::new(HeaderFieldKey::DeviceName, encode_text(name)));
            }
            Command::TerminateApp { bundle_identifier }
            | Command::UninstallApp { bundle_identifier } => {
                headers.push(HeaderField::new(
                    HeaderFieldKey::TargetBundleIdentifier,
                    encode_text(bundle_identifier),
                ));
            }
            Command::SetDeviceAppearance(appearance) => {
                headers.push(HeaderField::new(
                    HeaderFieldKey::DeviceAppearance,
                    appearance.as_str(),
                ));
            }
            Command::SetStatusBarOverrides(overrides) => body = Some(to_json(overrides)),
            Command::OpenUrl { url } => {
                body = Some(to_json(&UrlContainer {
                    url: url.to_string(),
                }))
            }
            Command::TriggerICloudSync | Command::ClearStatusBarOverrides => {}
        }

        WireRequest {
            method: route.method.as_str().to_string(),
            path: route.path.as_str().to_string(),
            headers,
            body,
        }
    }
}

impl WireRequest {
    /// route of this request, if it is a known one
    pub fn kind(&self) -> Result<ActionKind, DecodeError> {
        Route::resolve(&self.method, &self.path).ok_or_else(|| DecodeError::UnknownRoute {
            method: self.method.clone(),
            path: self.path.clone(),
        })
    }

    /// decode into an action, validating every required field
    pub fn decode(&self) -> Result<Action, DecodeError> {
        let kind = self.kind()?;
        let headers = Headers::new(&self.headers);

        let device_udid = headers
            .get(HeaderFieldKey::DeviceUdid)
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .ok_or(DecodeError::MissingOrInvalidDeviceId)?;
        let bundle_identifier = match headers.get(HeaderFieldKey::BundleIdentifier) {
            Some(value) => Some(
                decode_text(value)
                    .ok_or(DecodeError::MissingOrInvalidField(HeaderFieldKey::BundleIdentifier))?,
            ),
            None => None,
        };

        let command = match kind {
            ActionKind::SendPushNotification => {
                Command::SendPushNotification(self.json_body::<PushNotificationContent>()?)
            }
            ActionKind::SetPrivacy => Command::SetPrivacy {
                action: headers.get_parsed(HeaderFieldKey::PrivacyAction)?,
                service: headers.get_parsed(HeaderFieldKey::PrivacyService)?,
            },
            ActionKind::RenameDevice => Command::RenameDevice {
                name: headers.get_text(HeaderFieldKey::DeviceName)?,
            },
            ActionKind::TerminateApp => Command::TerminateApp {
                bundle_identifier: headers.get_text(HeaderFieldKey::TargetBundleIdentifier)?,
            },
            ActionKind::SetDeviceAppearance => Command::SetDeviceAppearance(
                headers.get_parsed(HeaderFieldKey::DeviceAppearance)?,
            ),
            ActionKind::TriggerICloudSync => Command::TriggerICloudSync,
            ActionKind::UninstallApp => Command::UninstallApp {
                bundle_identifier: headers.get_text(HeaderFieldKey::TargetBundleIdentifier)?,
            },
            ActionKind::SetStatusBarOverrides => {
                Command::SetStatusBarOverrides(self.json_body::<StatusBarOverrides>()?)
            }
            ActionKind::ClearStatusBarOverrides => Command::ClearStatusBarOverrides,
            ActionKind::OpenUrl => {
                let container = self.json_body::<UrlContainer>()?;
                let url = Url::parse(&container.url).map_err(|e| {
                    DecodeError::MalformedBody(format!("invalid url '{}': {}", container.url, e))
                })?;
                Command::OpenUrl { url }
            }
        };

        Ok(Action {
            device_udid,
            bundle_identifier,
            command,
        })
    }

    fn json_body<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        let body = self.body.as_deref().unwrap_or_default();
        if body.is_empty() {
            return Err(DecodeError::MalformedBody("request body is empty".into()));
        }
        serde_json::from_slice(body).map_err(|e| DecodeError::MalformedBody(e.to_string()))
    }
}

/// device udids travel upper-case, as simctl prints them
pub fn encode_udid(udid: &Uuid) -> String {
    udid.hyphenated().to_string().to_uppercase()
}

fn to_json<T: serde::Serialize>(value: &T) -> Vec<u8> {
    // payloads are structs of strings, bounded integers and unit enum
    // variants, none of which serde_json can fail on
    serde_json::to_vec(value).unwrap_or_default()
}

fn encode_text(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// `None` when the escapes do not decode to UTF-8
fn decode_text(value: &str) -> Option<String> {
    urlencoding::decode(value).ok().map(|text| text.into_owned())
}

/// helper for extracting typed values from request headers
struct Headers<'a> {
    fields: &'a [HeaderField],
}

impl<'a> Headers<'a> {
    fn new(fields: &'a [HeaderField]) -> Self {
        Self { fields }
    }

    /// first value whose name matches the key, ignoring case
    fn get(&self, key: HeaderFieldKey) -> Option<&'a str> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(key.as_str()))
            .map(|f| f.value.as_str())
    }

    /// get required percent-encoded text header
    fn get_text(&self, key: HeaderFieldKey) -> Result<String, DecodeError> {
        self.get(key)
            .and_then(decode_text)
            .ok_or(DecodeError::MissingOrInvalidField(key))
    }

    /// get required header parsed into an enumerated value
    fn get_parsed<T: FromStr>(&self, key: HeaderFieldKey) -> Result<T, DecodeError> {
        self.get(key)
            .and_then(|s| s.parse::<T>().ok())
            .ok_or(DecodeError::MissingOrInvalidField(key))
    }
}
