//! Typed notebook protocol messages.
//!
//! Replies and events carry exactly the fields the notebook host expects.
//! Requests are validated here when they cross the serialization boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form metadata map. Always empty in this kernel.
pub type Metadata = BTreeMap<String, Value>;

/// Reply status for requests that cannot fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    #[default]
    Ok,
}

// === Requests ===

/// Body of an `execute_request`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecuteRequest {
    pub code: String,
    #[serde(default)]
    pub silent: bool,
    #[serde(default = "default_true")]
    pub store_history: bool,
    #[serde(default)]
    pub user_expressions: Metadata,
    #[serde(default)]
    pub allow_stdin: bool,
    /// Host-side queue control. Accepted and ignored: cells run one at a time.
    #[serde(default = "default_true")]
    pub stop_on_error: bool,
}

fn default_true() -> bool {
    true
}

impl ExecuteRequest {
    /// A plain, non-silent request for `code`.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            silent: false,
            store_history: true,
            user_expressions: Metadata::new(),
            allow_stdin: false,
            stop_on_error: true,
        }
    }

    /// Marks the request silent: no events are emitted.
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }
}

/// Body of a `complete_request`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompleteRequest {
    pub code: String,
    pub cursor_pos: usize,
}

/// Body of an `inspect_request`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InspectRequest {
    pub code: String,
    pub cursor_pos: usize,
    #[serde(default)]
    pub detail_level: u8,
}

/// Body of a `shutdown_request`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShutdownRequest {
    #[serde(default)]
    pub restart: bool,
}

/// A request understood by the kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Execute(ExecuteRequest),
    Complete(CompleteRequest),
    Inspect(InspectRequest),
    KernelInfo,
    Shutdown(ShutdownRequest),
}

// === Replies ===

/// Reply to an `execute_request`, tagged on `status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExecuteReply {
    Ok {
        execution_count: u32,
        payload: Vec<Value>,
        user_expressions: Metadata,
    },
    Error {
        execution_count: u32,
        ename: String,
        evalue: String,
        traceback: Vec<String>,
    },
}

impl ExecuteReply {
    /// Successful reply with empty payload and user expressions.
    pub fn ok(execution_count: u32) -> Self {
        Self::Ok {
            execution_count,
            payload: Vec::new(),
            user_expressions: Metadata::new(),
        }
    }

    /// Error reply whose value and one-line traceback are both `message`.
    pub fn error(
        execution_count: u32,
        ename: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        Self::Error {
            execution_count,
            ename: ename.into(),
            evalue: message.clone(),
            traceback: vec![message],
        }
    }

    /// Returns true for `status: ok`.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

/// Reply to a `complete_request`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompleteReply {
    pub status: ReplyStatus,
    pub matches: Vec<String>,
    pub cursor_start: usize,
    pub cursor_end: usize,
    pub metadata: Metadata,
}

/// Reply to an `inspect_request`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReply {
    pub status: ReplyStatus,
    pub found: bool,
    pub data: BTreeMap<String, String>,
    pub metadata: Metadata,
}

/// Language description advertised in `kernel_info_reply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub mimetype: &'static str,
    pub file_extension: &'static str,
    pub codemirror_mode: &'static str,
    pub pygments_lexer: &'static str,
}

/// Reply to a `kernel_info_request`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KernelInfoReply {
    pub status: ReplyStatus,
    pub protocol_version: &'static str,
    pub implementation: &'static str,
    pub implementation_version: &'static str,
    pub language_info: LanguageInfo,
    pub banner: &'static str,
}

/// Reply to a `shutdown_request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShutdownReply {
    pub status: ReplyStatus,
    pub restart: bool,
}

// === Events ===

/// Output bundle keyed by MIME type. Only plain text is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MimeBundle {
    #[serde(rename = "text/plain")]
    pub text_plain: String,
}

/// Body of a `display_data` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayData {
    pub data: MimeBundle,
    pub metadata: Metadata,
}

/// Which stream a `stream` event writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamName {
    Stdout,
    Stderr,
}

/// Body of a `stream` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamContent {
    pub name: StreamName,
    pub text: String,
}

/// Side-channel output emitted while handling an execute request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "msg_type", content = "content", rename_all = "snake_case")]
pub enum IopubEvent {
    DisplayData(DisplayData),
    Stream(StreamContent),
}

impl IopubEvent {
    /// Plain-text display event.
    pub fn display_text(text: impl Into<String>) -> Self {
        Self::DisplayData(DisplayData {
            data: MimeBundle {
                text_plain: text.into(),
            },
            metadata: Metadata::new(),
        })
    }

    /// Stdout stream event.
    pub fn stdout(text: impl Into<String>) -> Self {
        Self::Stream(StreamContent {
            name: StreamName::Stdout,
            text: text.into(),
        })
    }

    /// Stderr stream event.
    pub fn stderr(text: impl Into<String>) -> Self {
        Self::Stream(StreamContent {
            name: StreamName::Stderr,
            text: text.into(),
        })
    }
}

/// Body of a `protocol_error` message for requests that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolError {
    pub message: String,
}

/// Every message the kernel writes, tagged on `msg_type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "msg_type", content = "content", rename_all = "snake_case")]
pub enum Outgoing {
    DisplayData(DisplayData),
    Stream(StreamContent),
    ExecuteReply(ExecuteReply),
    CompleteReply(CompleteReply),
    InspectReply(InspectReply),
    KernelInfoReply(KernelInfoReply),
    ShutdownReply(ShutdownReply),
    ProtocolError(ProtocolError),
}

impl From<IopubEvent> for Outgoing {
    fn from(event: IopubEvent) -> Self {
        match event {
            IopubEvent::DisplayData(d) => Self::DisplayData(d),
            IopubEvent::Stream(s) => Self::Stream(s),
        }
    }
}
