//! HTTP forwarding of events to the observability server
//!
//! Forwarding is strictly additive: every failure is logged and dropped, and
//! nothing here ever returns an error to the hook that triggered it.

use eyre::{Context, Result};
use indexmap::IndexMap;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use super::event::Event;
use crate::config::{Config, ObservabilityConfig};

/// Posts [`Event`]s to the configured endpoint with a bounded timeout
#[derive(Clone)]
pub struct Forwarder {
    source_app: String,
    config: ObservabilityConfig,
    agent: ureq::Agent,
}

impl Forwarder {
    pub fn new(source_app: impl Into<String>, config: ObservabilityConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .build()
            .into();

        Self {
            source_app: source_app.into(),
            config,
            agent,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.resolve_app_name(), config.observability.clone())
    }

    pub fn source_app(&self) -> &str {
        &self.source_app
    }

    /// Build an event from explicit arguments and post it, ignoring the outcome
    pub fn send(&self, event_type: &str, data: serde_json::Value, metadata: IndexMap<String, serde_json::Value>) {
        let mut event = Event::new(&self.source_app, event_type, data);
        for (key, value) in metadata {
            event = event.with_metadata(&key, value);
        }
        self.forward(&event);
    }

    /// Post an event, logging and dropping any failure
    pub fn forward(&self, event: &Event) {
        if !self.config.enabled {
            log::debug!("Observability disabled, dropping {} event", event.hook_event_type);
            return;
        }

        match self.post(event) {
            Ok(()) => log::debug!(
                "Forwarded {} event for session {}",
                event.hook_event_type,
                event.session_id
            ),
            Err(e) => log::warn!("Failed to forward {} event: {:#}", event.hook_event_type, e),
        }
    }

    /// Post an event on a detached thread.
    ///
    /// Best effort only: there is no delivery guarantee and the send is lost if
    /// the process exits first. The returned handle lets the caller give it a
    /// bounded amount of time to finish.
    pub fn forward_in_background(&self, event: Event) -> PendingSend {
        if !self.config.enabled {
            return PendingSend::finished();
        }

        let (tx, rx) = mpsc::channel();
        let forwarder = self.clone();

        let spawned = thread::Builder::new()
            .name("hookcast-forward".to_string())
            .spawn(move || {
                forwarder.forward(&event);
                let _ = tx.send(());
            });

        match spawned {
            Ok(_) => PendingSend { done: Some(rx) },
            Err(e) => {
                log::warn!("Failed to spawn forwarding thread: {}", e);
                PendingSend::finished()
            }
        }
    }

    fn post(&self, event: &Event) -> Result<()> {
        let body = serde_json::to_string(event).context("Failed to serialize event")?;

        self.agent
            .post(&self.config.server_url)
            .header("Content-Type", "application/json")
            .send(body.as_bytes())
            .with_context(|| format!("POST {} failed", self.config.server_url))?;

        Ok(())
    }
}

/// Handle to a background send
pub struct PendingSend {
    done: Option<mpsc::Receiver<()>>,
}

impl PendingSend {
    fn finished() -> Self {
        Self { done: None }
    }

    /// Wait up to `grace` for the send to finish. Returns false if it is still in flight.
    pub fn wait(self, grace: Duration) -> bool {
        let Some(rx) = self.done else {
            return true;
        };

        match rx.recv_timeout(grace) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => {
                log::debug!("Background send still in flight after {:?}, abandoning it", grace);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{events_url, expect_event, unreachable_url};
    use serde_json::json;
    use std::time::Instant;

    fn config_for(url: &str) -> ObservabilityConfig {
        ObservabilityConfig {
            enabled: true,
            server_url: url.to_string(),
            timeout_ms: 2000,
            flush_grace_ms: 2000,
        }
    }

    #[test]
    fn test_send_posts_event() {
        let mut server = mockito::Server::new();
        let mock = expect_event(
            &mut server,
            json!({
                "source_app": "test-app",
                "hook_event_type": "Custom",
                "payload": {"answer": 42},
                "metadata": {"origin": "unit"}
            }),
        );
        let forwarder = Forwarder::new("test-app", config_for(&events_url(&server)));

        let mut metadata = IndexMap::new();
        metadata.insert("origin".to_string(), json!("unit"));
        forwarder.send("Custom", json!({"answer": 42}), metadata);

        mock.assert();
    }

    #[test]
    fn test_send_unreachable_returns_quickly() {
        let forwarder = Forwarder::new("test-app", config_for(&unreachable_url()));

        let start = Instant::now();
        forwarder.send("Custom", json!({}), IndexMap::new());
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_send_tolerates_error_status() {
        let mut server = mockito::Server::new();
        let mock = server.mock("POST", "/events").with_status(500).expect(1).create();
        let forwarder = Forwarder::new("test-app", config_for(&events_url(&server)));

        forwarder.send("Custom", json!({}), IndexMap::new());
        mock.assert();
    }

    #[test]
    fn test_disabled_sends_nothing() {
        let mut server = mockito::Server::new();
        let mock = server.mock("POST", "/events").expect(0).create();
        let mut config = config_for(&events_url(&server));
        config.enabled = false;
        let forwarder = Forwarder::new("test-app", config);

        forwarder.send("Custom", json!({}), IndexMap::new());
        assert!(forwarder.forward_in_background(Event::new("a", "b", json!(null))).wait(Duration::ZERO));
        mock.assert();
    }

    #[test]
    fn test_background_send_completes() {
        let mut server = mockito::Server::new();
        let mock = expect_event(&mut server, json!({"session_id": "bg-1", "hook_event_type": "Stop"}));
        let forwarder = Forwarder::new("test-app", config_for(&events_url(&server)));

        let event = Event::from_hook("test-app", "Stop", json!({"session_id": "bg-1"}));
        let pending = forwarder.forward_in_background(event);

        assert!(pending.wait(Duration::from_secs(5)));
        mock.assert();
    }
}
