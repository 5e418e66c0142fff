//! exit codes for simctl-bridge commands
//!
//! these follow Unix conventions where 0 = success and non-zero = error
//! specific codes help scripts distinguish between failure types

#![allow(dead_code)]

/// command completed successfully
pub const SUCCESS: i32 = 0;

/// general or unknown error
pub const ERROR: i32 = 1;

/// invalid command-line arguments
pub const INVALID_ARGS: i32 = 4;

/// configuration file error
pub const CONFIG_ERROR: i32 = 5;

/// listening socket could not be bound
pub const BIND_FAILED: i32 = 8;

/// the simulator tool failed or could not be started
pub const TOOL_FAILED: i32 = 9;
