//! Notebook kernel handlers.
//!
//! Turns protocol requests into replies and events. Query execution is
//! delegated to a [`QueryRunner`]; everything else here is pure mapping.

pub mod info;
pub mod magic;
pub mod protocol;

pub use magic::{Input, InputRouter, MagicCommand};
pub use protocol::{
    CompleteReply, CompleteRequest, ExecuteReply, ExecuteRequest, InspectReply, InspectRequest,
    IopubEvent, KernelInfoReply, Metadata, Outgoing, ReplyStatus, Request,
};

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::executor::{ExecutionResult, QueryRunner};

/// Placeholder displayed for a successful query with no output.
pub const NO_OUTPUT: &str = "(no output)";

/// Stderr text when a failed result carries no error message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Reply value when a failed result carries no error message.
pub const EXECUTION_FAILED: &str = "Query execution failed";

/// Events and reply produced by one execute request.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteOutcome {
    /// Events to publish before the reply, in order.
    pub events: Vec<IopubEvent>,
    /// The execute reply.
    pub reply: ExecuteReply,
}

impl ExecuteOutcome {
    fn ok(execution_count: u32) -> Self {
        Self {
            events: Vec::new(),
            reply: ExecuteReply::ok(execution_count),
        }
    }

    /// Flattens into the order messages go on the wire.
    pub fn into_messages(self) -> Vec<Outgoing> {
        let mut messages: Vec<Outgoing> = self.events.into_iter().map(Outgoing::from).collect();
        messages.push(Outgoing::ExecuteReply(self.reply));
        messages
    }
}

/// Maps an [`ExecutionResult`] to events and a reply.
///
/// Deterministic: equal inputs give equal outcomes. On failure any partial
/// stdout is displayed before the error so it is not lost.
pub fn translate(result: &ExecutionResult, execution_count: u32) -> ExecuteOutcome {
    if result.success {
        let text = if result.output.is_empty() {
            NO_OUTPUT
        } else {
            result.output.as_str()
        };
        return ExecuteOutcome {
            events: vec![IopubEvent::display_text(text)],
            reply: ExecuteReply::ok(execution_count),
        };
    }

    let error = result.error.as_deref().filter(|e| !e.is_empty());

    let mut events = Vec::with_capacity(2);
    if !result.output.is_empty() {
        events.push(IopubEvent::display_text(result.output.as_str()));
    }
    events.push(IopubEvent::stderr(error.unwrap_or(UNKNOWN_ERROR)));

    ExecuteOutcome {
        events,
        reply: ExecuteReply::error(
            execution_count,
            info::ERROR_NAME,
            error.unwrap_or(EXECUTION_FAILED),
        ),
    }
}

/// The kernel: one per session.
pub struct Kernel {
    runner: Arc<dyn QueryRunner>,
    magic_prefix: String,
    execution_count: u32,
}

impl Kernel {
    /// Creates a kernel with the default `%` magic prefix.
    pub fn new(runner: Arc<dyn QueryRunner>) -> Self {
        Self {
            runner,
            magic_prefix: "%".to_string(),
            execution_count: 0,
        }
    }

    /// Overrides the magic command prefix.
    pub fn with_magic_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.magic_prefix = prefix.into();
        self
    }

    /// Current execution counter.
    pub fn execution_count(&self) -> u32 {
        self.execution_count
    }

    /// Handles an `execute_request`.
    pub async fn execute(&mut self, request: &ExecuteRequest) -> ExecuteOutcome {
        if !request.silent && request.store_history {
            self.execution_count += 1;
        }
        let count = self.execution_count;

        let mut outcome = match InputRouter::parse(&request.code, &self.magic_prefix) {
            Input::Blank => ExecuteOutcome::ok(count),
            Input::Magic(magic) => {
                debug!(name = %magic.name, args = %magic.args, "magic command requested");
                ExecuteOutcome {
                    events: vec![IopubEvent::stdout(magic.placeholder_message())],
                    reply: ExecuteReply::ok(count),
                }
            }
            Input::Query(query) => {
                let result = self.runner.run(&query).await;
                if !result.success {
                    info!(execution_count = count, "query failed");
                }
                translate(&result, count)
            }
        };

        if request.silent {
            outcome.events.clear();
        }
        outcome
    }

    /// Handles a `complete_request`. No completions are offered.
    pub fn complete(&self, request: &CompleteRequest) -> CompleteReply {
        CompleteReply {
            status: ReplyStatus::Ok,
            matches: Vec::new(),
            cursor_start: request.cursor_pos,
            cursor_end: request.cursor_pos,
            metadata: Metadata::new(),
        }
    }

    /// Handles an `inspect_request`. Nothing is ever found.
    pub fn inspect(&self, _request: &InspectRequest) -> InspectReply {
        InspectReply {
            status: ReplyStatus::Ok,
            found: false,
            data: BTreeMap::new(),
            metadata: Metadata::new(),
        }
    }

    /// Handles a `kernel_info_request`.
    pub fn kernel_info(&self) -> KernelInfoReply {
        info::kernel_info()
    }
}
