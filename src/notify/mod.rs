//! Spoken notifications
//!
//! A notification payload is spoken only when its message isn't boilerplate,
//! speech was requested, and some backend is available. Every other case is a
//! quiet no-op.

pub mod filter;
pub mod tts;

use std::path::PathBuf;

use crate::config::Config;
pub use filter::MessageFilter;
pub use tts::{Credentials, ScriptSpeaker, Speaker, TtsBackend, select_backend};

/// What happened to one notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Payload had no message
    NoMessage,
    /// Message matched a skip phrase or pattern
    Filtered,
    /// Speech wasn't requested
    NotRequested,
    /// No backend has both credential and script
    NoBackend,
    Spoken(TtsBackend),
    Failed { backend: TtsBackend, error: String },
}

/// Turns notification payloads into speech
pub struct NotificationDispatcher {
    filter: MessageFilter,
    speaker: Box<dyn Speaker>,
    scripts_dir: PathBuf,
    credentials: Credentials,
    display_name: Option<String>,
}

impl NotificationDispatcher {
    pub fn new(
        filter: MessageFilter,
        speaker: Box<dyn Speaker>,
        scripts_dir: PathBuf,
        credentials: Credentials,
        display_name: Option<String>,
    ) -> Self {
        Self {
            filter,
            speaker,
            scripts_dir,
            credentials,
            display_name: display_name.filter(|n| !n.trim().is_empty()),
        }
    }

    /// Dispatcher wired to the real environment and backend scripts
    pub fn from_config(config: &Config) -> Self {
        let scripts_dir = Config::expand_path(&config.tts.scripts_dir);
        let speaker = ScriptSpeaker::new(scripts_dir.clone(), config.tts.timeout());

        Self::new(
            MessageFilter::from_config(&config.notify),
            Box::new(speaker),
            scripts_dir,
            Credentials::from_env(),
            std::env::var(&config.notify.display_name_env).ok(),
        )
    }

    /// Text actually spoken for a message
    pub fn spoken_text(&self, message: &str) -> String {
        match self.display_name {
            Some(ref name) => format!("{}, {}", name.trim(), message),
            None => message.to_string(),
        }
    }

    pub fn dispatch(&self, payload: &serde_json::Value, requested: bool) -> Outcome {
        let Some(message) = payload.get("message").and_then(|v| v.as_str()) else {
            return Outcome::NoMessage;
        };

        if self.filter.is_suppressed(message) {
            log::debug!("Notification filtered: {}", message);
            return Outcome::Filtered;
        }

        if !requested {
            return Outcome::NotRequested;
        }

        let Some(backend) = select_backend(&self.scripts_dir, &self.credentials) else {
            log::info!("No TTS backend available in {}", self.scripts_dir.display());
            return Outcome::NoBackend;
        };

        match self.speaker.speak(backend, &self.spoken_text(message)) {
            Ok(()) => {
                log::info!("Spoke notification via {}", backend.name());
                Outcome::Spoken(backend)
            }
            Err(e) => {
                log::warn!("TTS via {} failed: {:#}", backend.name(), e);
                Outcome::Failed {
                    backend,
                    error: format!("{:#}", e),
                }
            }
        }
    }
}
