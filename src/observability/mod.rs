//! Observability: forwarding hook events to the local observability server
//!
//! - `event` - the record posted for each lifecycle occurrence
//! - `forwarder` - HTTP POST with a bounded timeout, failures swallowed
//! - `capture` - drains a hook's stdin, forwards it, and hands it back

pub mod capture;
pub mod event;
pub mod forwarder;

pub use capture::{enable_observability, hook_name_from_path};
pub use event::Event;
pub use forwarder::Forwarder;
