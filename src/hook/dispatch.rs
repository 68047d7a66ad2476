//! Routing hook events to handlers

use super::{HookEvent, HookHandler, HookResult};

/// Ordered set of handlers for one hook invocation
#[derive(Default)]
pub struct HookRegistry {
    handlers: Vec<Box<dyn HookHandler>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, handler: Box<dyn HookHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Run every handler that handles `event`; the first block wins
    pub fn dispatch(&self, event: HookEvent, payload: &serde_json::Value) -> HookResult {
        let mut outcome = HookResult::Allow;

        for handler in self.handlers.iter().filter(|h| h.handles(event)) {
            match handler.handle(event, payload) {
                HookResult::Block { message } => {
                    log::info!("{} blocked {}: {}", handler.name(), event, message);
                    return HookResult::Block { message };
                }
                HookResult::Error { message } => {
                    log::error!("{} failed on {}: {}", handler.name(), event, message);
                    outcome = HookResult::Error { message };
                }
                HookResult::Allow => {}
            }
        }

        outcome
    }
}
