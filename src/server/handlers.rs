//! default handlers backed by the simulator tool

use std::sync::Arc;

use super::router::{Router, RouterError};
use crate::actions::{self, ActionKind, ExecutionContext};

/// router with every action kind translated and run through `ctx`
pub fn simctl_router(ctx: Arc<ExecutionContext>) -> Result<Router, RouterError> {
    let mut router = Router::new();
    for kind in ActionKind::ALL {
        let ctx = ctx.clone();
        router.register(kind, move |action| actions::execute(&action, &ctx))?;
    }
    Ok(router)
}
