//! Run observability as a drainable event stream.
//!
//! Observation is decoupled from control flow: events are emitted
//! fire-and-forget into an unbounded channel the caller drains (or
//! drops). Nothing in the loop ever depends on whether anyone is
//! listening.

use crate::protocol::types::ToolCall;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Notifications emitted while a run is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// One loop iteration classified its model turn.
    Iteration {
        /// 1-based iteration number.
        iteration: u32,
        /// "text" or "tool_call".
        kind: &'static str,
        /// Final-answer content, when `kind` is "text".
        content: Option<String>,
        /// Tool calls executed before this iteration.
        tool_calls_so_far: u32,
    },
    /// A validated, resolved tool call is about to execute.
    ToolCall {
        /// The call.
        call: ToolCall,
    },
    /// A call repeated recent work and the run is stopping.
    DuplicateDetected {
        /// The offending call.
        call: ToolCall,
    },
    /// The run is failing with this error.
    Error {
        /// Error description.
        message: String,
    },
}

/// Fire-and-forget sender side of the event stream.
///
/// A sink without a channel (the default) swallows everything; send
/// failures after the receiver is dropped are ignored.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    sender: Option<UnboundedSender<RunEvent>>,
}

impl EventSink {
    /// A sink that discards all events.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Create a connected sink and the receiver to drain it.
    pub fn channel() -> (Self, UnboundedReceiver<RunEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// Emit an event. Never blocks, never fails.
    pub fn emit(&self, event: RunEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }
}
