use eyre::Result;
use std::io::{self, Read};

use crate::config::Config;
use crate::hook::{HookEvent, HookRegistry, HookResult, NotificationHandler};
use crate::notify::NotificationDispatcher;
use crate::observability::capture::Observed;
use crate::observability::{Forwarder, enable_observability};

/// Run a hook and exit with the code its handlers decided.
///
/// Forwarding happens alongside and never changes the exit code.
pub fn run(name: &str, notify: bool, payload: Option<&str>, config: &Config) -> Result<()> {
    let result = execute(name, notify, payload, config);

    if let HookResult::Block { ref message } = result {
        eprintln!("{}", message);
    }

    std::process::exit(result.exit_code());
}

fn execute(name: &str, notify: bool, payload: Option<&str>, config: &Config) -> HookResult {
    let forwarder = Forwarder::from_config(config);

    let Observed { mut input, pending } = match payload {
        Some(p) => enable_observability(&forwarder, name, p.as_bytes()),
        None => enable_observability(&forwarder, name, io::stdin().lock()),
    };
    log::debug!("Captured {} bytes of {} input", input.as_bytes().len(), name);

    let result = run_handlers(name, &mut input, registry(notify, config));

    if let Some(pending) = pending {
        pending.wait(config.observability.flush_grace());
    }

    result
}

fn registry(notify: bool, config: &Config) -> HookRegistry {
    let speak = notify || config.notify.enabled;
    HookRegistry::new().register(Box::new(NotificationHandler::new(
        NotificationDispatcher::from_config(config),
        speak,
    )))
}

fn run_handlers(name: &str, input: &mut impl Read, registry: HookRegistry) -> HookResult {
    let Some(event) = HookEvent::parse(name) else {
        log::debug!("No handlers for hook '{}'", name);
        return HookResult::Allow;
    };

    let mut raw = Vec::new();
    if let Err(e) = input.read_to_end(&mut raw) {
        log::warn!("Failed to read {} payload: {}", event, e);
        return HookResult::Allow;
    }

    let payload: serde_json::Value = match serde_json::from_slice(&raw) {
        Ok(payload) => payload,
        Err(e) => {
            log::warn!("Ignoring {} payload that is not JSON: {}", event, e);
            return HookResult::Allow;
        }
    };

    log::info!("Dispatching hook event: {}", event);
    log::debug!("Payload: {}", payload);

    registry.dispatch(event, &payload)
}
