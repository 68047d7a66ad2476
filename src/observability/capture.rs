//! Stdin capture for hooks
//!
//! The host writes each hook's payload to stdin exactly once. Observability
//! has to see that payload without taking it away from the hook, so the stream
//! is drained into memory and handed back as a [`CapturedInput`].

use std::io::{self, Cursor, Read};
use std::path::Path;

use super::event::{Event, session_id_of};
use super::forwarder::{Forwarder, PendingSend};

/// A byte-identical copy of the original input, readable once more
#[derive(Debug)]
pub struct CapturedInput {
    content: Cursor<Vec<u8>>,
}

impl CapturedInput {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            content: Cursor::new(bytes),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.content.get_ref()
    }
}

impl Read for CapturedInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.content.read(buf)
    }
}

/// Result of [`enable_observability`]
pub struct Observed {
    /// The input, restored for the hook's own logic
    pub input: CapturedInput,
    /// The background send, if the input parsed as JSON
    pub pending: Option<PendingSend>,
}

/// Drain `input`, forward it in the background when it parses as JSON, and give it back.
///
/// Never fails: a read error keeps whatever arrived before it, and unparseable
/// input is simply not forwarded.
pub fn enable_observability<R: Read>(forwarder: &Forwarder, hook_name: &str, mut input: R) -> Observed {
    let mut bytes = Vec::new();
    if let Err(e) = input.read_to_end(&mut bytes) {
        log::warn!("Failed to read hook input after {} bytes: {}", bytes.len(), e);
    }

    let pending = match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(payload) => {
            log::debug!("Hook {} for session {}", hook_name, session_id_of(&payload));
            let event = Event::from_hook(forwarder.source_app(), hook_name, payload);
            Some(forwarder.forward_in_background(event))
        }
        Err(e) => {
            log::debug!("Hook {} input is not JSON ({}), not forwarding", hook_name, e);
            None
        }
    };

    Observed {
        input: CapturedInput::new(bytes),
        pending,
    }
}

/// Hook name for an invoked file: its name without directory or extension
pub fn hook_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
}
