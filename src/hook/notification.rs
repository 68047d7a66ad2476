//! Notification hook: speaks what the assistant wants the user to see

use super::{HookEvent, HookHandler, HookResult};
use crate::notify::{NotificationDispatcher, Outcome};

pub struct NotificationHandler {
    dispatcher: NotificationDispatcher,
    speak: bool,
}

impl NotificationHandler {
    /// `speak` comes from `--notify` or `notify.enabled`
    pub fn new(dispatcher: NotificationDispatcher, speak: bool) -> Self {
        Self { dispatcher, speak }
    }
}

impl HookHandler for NotificationHandler {
    fn name(&self) -> &'static str {
        "notification"
    }

    fn handles(&self, event: HookEvent) -> bool {
        event == HookEvent::Notification
    }

    fn handle(&self, _event: HookEvent, payload: &serde_json::Value) -> HookResult {
        match self.dispatcher.dispatch(payload, self.speak) {
            Outcome::Failed { backend, error } => HookResult::Error {
                message: format!("{} TTS failed: {}", backend.name(), error),
            },
            outcome => {
                log::debug!("Notification outcome: {:?}", outcome);
                HookResult::Allow
            }
        }
    }
}
