//! JSON-lines session loop.
//!
//! A minimal host: one request per input line, and for each request zero or
//! more event lines followed by exactly one reply line. Lines that fail
//! validation produce a `protocol_error` message and the loop continues.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::error::{KernelError, Result};
use crate::kernel::protocol::{ProtocolError, ShutdownReply};
use crate::kernel::{Kernel, Outgoing, ReplyStatus, Request};

/// Raw message before its content is validated.
#[derive(Debug, Deserialize)]
struct Envelope {
    msg_type: String,
    #[serde(default)]
    content: Value,
}

/// Parses one input line into a [`Request`].
pub fn parse_request(line: &str) -> Result<Request> {
    let Envelope { msg_type, content } = serde_json::from_str(line)
        .map_err(|e| KernelError::protocol(format!("invalid message: {e}")))?;

    match msg_type.as_str() {
        "execute_request" => Ok(Request::Execute(parse_content(&msg_type, content)?)),
        "complete_request" => Ok(Request::Complete(parse_content(&msg_type, content)?)),
        "inspect_request" => Ok(Request::Inspect(parse_content(&msg_type, content)?)),
        "kernel_info_request" => Ok(Request::KernelInfo),
        "shutdown_request" => Ok(Request::Shutdown(parse_content(&msg_type, content)?)),
        other => Err(KernelError::protocol(format!(
            "unsupported msg_type '{other}'"
        ))),
    }
}

/// Validates a message body. A missing body reads as `{}`.
fn parse_content<T: DeserializeOwned>(msg_type: &str, content: Value) -> Result<T> {
    let value = match content {
        Value::Null => Value::Object(Default::default()),
        v => v,
    };
    serde_json::from_value(value)
        .map_err(|e| KernelError::protocol(format!("invalid {msg_type}: {e}")))
}

/// Drives a [`Kernel`] from a stream of requests.
pub struct Session {
    kernel: Kernel,
}

impl Session {
    pub fn new(kernel: Kernel) -> Self {
        Self { kernel }
    }

    /// Handles one request. Returns the messages to write and whether to stop.
    pub async fn handle(&mut self, request: Request) -> (Vec<Outgoing>, bool) {
        match request {
            Request::Execute(req) => (self.kernel.execute(&req).await.into_messages(), false),
            Request::Complete(req) => {
                let reply = self.kernel.complete(&req);
                (vec![Outgoing::CompleteReply(reply)], false)
            }
            Request::Inspect(req) => {
                let reply = self.kernel.inspect(&req);
                (vec![Outgoing::InspectReply(reply)], false)
            }
            Request::KernelInfo => {
                let reply = self.kernel.kernel_info();
                (vec![Outgoing::KernelInfoReply(reply)], false)
            }
            Request::Shutdown(req) => {
                info!(restart = req.restart, "shutdown requested");
                let reply = Outgoing::ShutdownReply(ShutdownReply {
                    status: ReplyStatus::Ok,
                    restart: req.restart,
                });
                (vec![reply], true)
            }
        }
    }

    /// Reads requests from `reader` until EOF or shutdown, writing to `writer`.
    pub async fn run<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let (messages, stop) = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => match parse_request(line) {
                    Ok(request) => {
                        debug!(?request, "request received");
                        self.handle(request).await
                    }
                    Err(e) => rejected(e),
                },
                Err(e) => rejected(KernelError::protocol(format!("invalid UTF-8: {e}"))),
            };

            for message in &messages {
                write_message(&mut writer, message).await?;
            }

            if stop {
                break;
            }
        }

        info!("session ended");
        Ok(())
    }
}

/// Turns a rejected line into a `protocol_error` message without stopping.
fn rejected(e: KernelError) -> (Vec<Outgoing>, bool) {
    warn!("{}: {}", e.category(), e);
    let message = Outgoing::ProtocolError(ProtocolError {
        message: e.to_string(),
    });
    (vec![message], false)
}

/// Writes one message as a JSON line and flushes.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    message: &Outgoing,
) -> Result<()> {
    let mut line = serde_json::to_string(message)
        .map_err(|e| KernelError::internal(format!("failed to serialize message: {e}")))?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
