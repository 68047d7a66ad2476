//! Hook event handling
//!
//! Hooks are events fired by the host assistant at lifecycle points. Each
//! invocation carries one JSON payload on stdin; handlers decide the exit code.
//!
//! The shipped notification handler never blocks. `HookResult::Block` and the
//! first-block short-circuit in [`HookRegistry`] are the host's exit-2 contract,
//! kept for handlers that gate tool use.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod dispatch;
pub mod notification;

pub use dispatch::HookRegistry;
pub use notification::NotificationHandler;

/// Hook event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum HookEvent {
    PreToolUse,
    PostToolUse,
    Stop,
    SessionStart,
    SessionEnd,
    SubagentStop,
    Notification,
    PermissionRequest,
    UserPromptSubmit,
    PreCompact,
}

impl HookEvent {
    /// Accepts `PreToolUse`, `pre_tool_use`, `pre-tool-use` and friends
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "pretooluse" => Some(Self::PreToolUse),
            "posttooluse" => Some(Self::PostToolUse),
            "stop" => Some(Self::Stop),
            "sessionstart" => Some(Self::SessionStart),
            "sessionend" => Some(Self::SessionEnd),
            "subagentstop" => Some(Self::SubagentStop),
            "notification" => Some(Self::Notification),
            "permissionrequest" => Some(Self::PermissionRequest),
            "userpromptsubmit" => Some(Self::UserPromptSubmit),
            "precompact" => Some(Self::PreCompact),
            _ => None,
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Result of a hook handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookResult {
    /// Allow the action to proceed
    Allow,
    /// Block the action (exit code 2)
    #[allow(dead_code)]
    Block { message: String },
    /// Error occurred (logged but allows action)
    Error { message: String },
}

impl HookResult {
    pub fn exit_code(&self) -> i32 {
        match self {
            HookResult::Allow => 0,
            HookResult::Block { .. } => 2,
            HookResult::Error { .. } => 0, // Errors don't block
        }
    }
}

/// A hook handler
pub trait HookHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn handles(&self, event: HookEvent) -> bool;
    fn handle(&self, event: HookEvent, payload: &serde_json::Value) -> HookResult;
}
