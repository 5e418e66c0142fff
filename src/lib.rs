// library crate for simctl-bridge
// the binary, the in-simulator client and the integration tests all build on it

pub mod actions;
pub mod cli;
pub mod client;
pub mod config;
pub mod devices;
pub mod server;
