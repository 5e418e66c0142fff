//! route table mapping action kinds to handlers

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::actions::{Action, ActionError, ActionKind, Route, WireRequest};

/// handler invoked with a decoded action
///
/// handlers run concurrently on the blocking pool and must not share mutable state
pub type Handler = Arc<dyn Fn(Action) -> Result<String, ActionError> + Send + Sync>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("a handler is already registered for {0}")]
    DuplicateRoute(Route),
}

/// status and text body of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub const OK: u16 = 200;
    pub const BAD_REQUEST: u16 = 400;
    pub const NOT_FOUND: u16 = 404;

    fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[derive(Default, Clone)]
pub struct Router {
    handlers: HashMap<ActionKind, Handler>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// register a handler; a route can only be registered once
    pub fn register<F>(&mut self, kind: ActionKind, handler: F) -> Result<(), RouterError>
    where
        F: Fn(Action) -> Result<String, ActionError> + Send + Sync + 'static,
    {
        if self.handlers.contains_key(&kind) {
            return Err(RouterError::DuplicateRoute(kind.route()));
        }
        self.handlers.insert(kind, Arc::new(handler));
        Ok(())
    }

    /// register a handler, replacing any existing one for the route
    pub fn replace<F>(&mut self, kind: ActionKind, handler: F) -> Option<Handler>
    where
        F: Fn(Action) -> Result<String, ActionError> + Send + Sync + 'static,
    {
        self.handlers.insert(kind, Arc::new(handler))
    }

    pub fn contains(&self, kind: ActionKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// decode a request, invoke its handler and build the reply
    ///
    /// blocks for as long as the handler runs
    pub fn dispatch(&self, request: &WireRequest) -> Reply {
        let kind = match request.kind() {
            Ok(kind) => kind,
            Err(e) => {
                warn!("{}", e);
                return Reply::new(Reply::NOT_FOUND, e.to_string());
            }
        };

        let Some(handler) = self.handlers.get(&kind) else {
            warn!("no handler registered for {}", kind.route());
            return Reply::new(
                Reply::NOT_FOUND,
                format!("no handler registered for {}", kind.route()),
            );
        };

        let action = match request.decode() {
            Ok(action) => action,
            Err(e) => {
                warn!(route = %kind.route(), "rejected request: {}", e);
                return Reply::new(Reply::BAD_REQUEST, e.to_string());
            }
        };

        debug!(action = kind.method_name(), "dispatching");
        match handler(action) {
            Ok(output) => Reply::new(Reply::OK, output),
            Err(e) => Reply::new(Reply::BAD_REQUEST, e.to_string()),
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&'static str> = self.handlers.keys().map(|k| k.method_name()).collect();
        kinds.sort_unstable();
        f.debug_struct("Router").field("handlers", &kinds).finish()
    }
}
