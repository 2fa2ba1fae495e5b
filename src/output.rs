//! Output formatting for one-shot mode.
//!
//! Provides two formats: plain text (what a notebook cell would show) and
//! JSON (the full message sequence).

use crate::kernel::protocol::StreamName;
use crate::kernel::Outgoing;

/// Output format for one-shot mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Display data and stream text, as a notebook would render it.
    #[default]
    Text,
    /// Every message as pretty-printed JSON.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

/// Rendered text split by destination stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub stdout: String,
    pub stderr: String,
}

/// Formats kernel messages for the terminal.
pub struct MessageOutput {
    format: OutputFormat,
}

impl MessageOutput {
    /// Creates a new output formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the messages according to the configured format.
    pub fn format(&self, messages: &[Outgoing]) -> Rendered {
        match self.format {
            OutputFormat::Text => Self::format_text(messages),
            OutputFormat::Json => Self::format_json(messages),
        }
    }

    fn format_text(messages: &[Outgoing]) -> Rendered {
        let mut rendered = Rendered::default();
        for message in messages {
            match message {
                Outgoing::DisplayData(d) => push_line(&mut rendered.stdout, &d.data.text_plain),
                Outgoing::Stream(s) => match s.name {
                    StreamName::Stdout => push_line(&mut rendered.stdout, &s.text),
                    StreamName::Stderr => push_line(&mut rendered.stderr, &s.text),
                },
                _ => {}
            }
        }
        rendered
    }

    fn format_json(messages: &[Outgoing]) -> Rendered {
        let stdout = serde_json::to_string_pretty(messages)
            .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {}\"}}", e));
        Rendered {
            stdout: format!("{stdout}\n"),
            stderr: String::new(),
        }
    }
}

/// Appends `text`, ending it with a newline if it lacks one.
fn push_line(buf: &mut String, text: &str) {
    buf.push_str(text);
    if !text.ends_with('\n') {
        buf.push('\n');
    }
}
