//! translation of actions into simctl invocations
//!
//! every command line is an argument vector; nothing is ever joined into a
//! shell string, so field values cannot change argument boundaries

use std::fmt;

use super::command::{Action, Command, PushNotificationContent};
use super::wire::encode_udid;
use crate::config::ToolSettings;

/// an external program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    /// text written to the program's stdin
    pub stdin: Option<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }
}

/// shell-quoted rendering, for logs only
impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        if let Some(input) = &self.stdin {
            write!(f, " <<< {}", quote(input))?;
        }
        Ok(())
    }
}

fn quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// build the simctl invocation for an action
///
/// the device udid is always the first argument after the subcommand
pub fn to_command_line(action: &Action, tool: &ToolSettings) -> CommandLine {
    let udid = encode_udid(&action.device_udid);
    let simctl = CommandLine::new(&tool.program).args(tool.args.iter().cloned());

    match &action.command {
        // push <device> [<bundle identifier>] (<json file> | -)
        Command::SendPushNotification(content) => {
            let cmd = simctl
                .arg("push")
                .arg(udid)
                .args(action.bundle_identifier.iter().cloned());
            match content {
                PushNotificationContent::File(path) => cmd.arg(path.clone()),
                PushNotificationContent::JsonPayload(data) => {
                    let json = String::from_utf8_lossy(data).replace(['\n', '\r'], "");
                    cmd.arg("-").stdin(json)
                }
            }
        }

        // privacy <device> <action> <service> [<bundle identifier>]
        Command::SetPrivacy { action: privacy, service } => simctl
            .arg("privacy")
            .arg(udid)
            .arg(privacy.as_str())
            .arg(service.as_str())
            .args(action.bundle_identifier.iter().cloned()),

        // rename <device> <name>
        Command::RenameDevice { name } => simctl.arg("rename").arg(udid).arg(name),

        // terminate <device> <app bundle identifier>
        Command::TerminateApp { bundle_identifier } => {
            simctl.arg("terminate").arg(udid).arg(bundle_identifier)
        }

        // ui <device> appearance <light|dark>
        Command::SetDeviceAppearance(appearance) => simctl
            .arg("ui")
            .arg(udid)
            .arg("appearance")
            .arg(appearance.as_str()),

        // icloud_sync <device>
        Command::TriggerICloudSync => simctl.arg("icloud_sync").arg(udid),

        // uninstall <device> <app bundle identifier>
        Command::UninstallApp { bundle_identifier } => {
            simctl.arg("uninstall").arg(udid).arg(bundle_identifier)
        }

        // status_bar <device> override <flags>
        Command::SetStatusBarOverrides(overrides) => {
            let flags = overrides
                .to_flags()
                .into_iter()
                .flat_map(|(flag, value)| [flag.to_string(), value]);
            simctl
                .arg("status_bar")
                .arg(udid)
                .arg("override")
                .args(flags)
        }

        // status_bar <device> clear
        Command::ClearStatusBarOverrides => simctl.arg("status_bar").arg(udid).arg("clear"),

        // openurl <device> <url>
        Command::OpenUrl { url } => simctl.arg("openurl").arg(udid).arg(url.as_str()),
    }
}
