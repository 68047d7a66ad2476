//! The event record posted to the observability server

use chrono::{Local, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Session id used when the payload doesn't carry one
pub const UNKNOWN_SESSION: &str = "unknown";

/// One lifecycle occurrence, created right before it is posted.
///
/// The wire names (`source_app`, `hook_event_type`, `payload`) are the ones the
/// observability server indexes on. The older `app`/`event_type`/`data` names
/// are still accepted when reading but are never written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Application the event came from
    #[serde(alias = "app")]
    pub source_app: String,
    /// Session identifier
    pub session_id: String,
    /// Event type or hook name
    #[serde(alias = "event_type")]
    pub hook_event_type: String,
    /// Creation time (UTC, RFC 3339)
    pub timestamp: String,
    /// Free-form event data
    #[serde(alias = "data", default)]
    pub payload: serde_json::Value,
    /// Extra key/value pairs supplied by the caller
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: IndexMap<String, serde_json::Value>,
}

impl Event {
    /// Event synthesized from explicit arguments, with a fresh per-call session id
    pub fn new(source_app: &str, event_type: &str, data: serde_json::Value) -> Self {
        Self {
            source_app: source_app.to_string(),
            session_id: Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            hook_event_type: event_type.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            payload: data,
            metadata: IndexMap::new(),
        }
    }

    /// Event for a hook invocation, tagged with the session the host reported
    pub fn from_hook(source_app: &str, hook_name: &str, payload: serde_json::Value) -> Self {
        Self {
            source_app: source_app.to_string(),
            session_id: session_id_of(&payload),
            hook_event_type: hook_name.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            payload,
            metadata: IndexMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// Session id carried by a host payload, or [`UNKNOWN_SESSION`]
pub fn session_id_of(payload: &serde_json::Value) -> String {
    payload
        .get("session_id")
        .or_else(|| payload.get("sessionId"))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_SESSION)
        .to_string()
}
