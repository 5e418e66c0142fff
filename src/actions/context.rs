//! execution context for actions

use std::sync::Arc;

use super::exec::{Executor, ProcessExecutor};
use crate::config::ToolSettings;

/// everything a handler needs to run an action
///
/// shared across request workers, so it is immutable once built
#[derive(Clone)]
pub struct ExecutionContext {
    /// program and leading arguments of the simulator tool
    pub tool: ToolSettings,
    /// log every command line and its outcome at info level
    pub verbose: bool,
    pub executor: Arc<dyn Executor>,
}

impl ExecutionContext {
    /// context that runs real processes
    pub fn new(tool: ToolSettings, verbose: bool) -> Self {
        Self::with_executor(tool, verbose, Arc::new(ProcessExecutor))
    }

    pub fn with_executor(tool: ToolSettings, verbose: bool, executor: Arc<dyn Executor>) -> Self {
        Self {
            tool,
            verbose,
            executor,
        }
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("tool", &self.tool)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}
