//! action layer shared by the client and the server
//!
//! an `Action` is the single source of truth for one remote simulator
//! operation: the client encodes it onto the wire, the server decodes it back
//! and translates it into a simctl command line

mod command;
mod context;
mod error;
mod exec;
mod route;
mod translate;
mod wire;

pub use command::{
    Action, BatteryLevel, BatteryState, CellularBars, CellularMode, Command, DataNetworkType,
    DeviceAppearance, PrivacyAction, PrivacyService, PushNotificationContent,
    StatusBarOverrides, WifiBars, WifiMode, MAX_BATTERY_LEVEL, MAX_CELLULAR_BARS,
    MAX_WIFI_BARS,
};
pub(crate) use command::UrlContainer;
pub use context::ExecutionContext;
pub use error::{ActionError, DecodeError, ExecError};
pub use exec::{Executor, ProcessExecutor};
pub use route::{ActionKind, HeaderFieldKey, HttpMethod, Route, ServerPath};
pub use translate::{to_command_line, CommandLine};
pub use wire::{encode_udid, HeaderField, WireRequest};

use tracing::{debug, info, warn};

/// translate an action and run it with the context's executor
///
/// this is the entry point every default server handler goes through
pub fn execute(action: &Action, ctx: &ExecutionContext) -> Result<String, ActionError> {
    let cmd = to_command_line(action, &ctx.tool);

    if ctx.verbose {
        info!(action = action.kind().method_name(), "running: {}", cmd);
    } else {
        debug!(action = action.kind().method_name(), "running: {}", cmd);
    }

    match ctx.executor.run(&cmd) {
        Ok(output) => {
            if ctx.verbose {
                info!(action = action.kind().method_name(), "succeeded: {}", output.trim_end());
            }
            Ok(output)
        }
        Err(e) => {
            warn!(action = action.kind().method_name(), "failed: {}", e);
            Err(e.into())
        }
    }
}
