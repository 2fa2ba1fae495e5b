//! Input routing for the kernel.
//!
//! Splits cell input into blank input, magic commands, and queries for the
//! external tool. Magic commands are reserved for future directives and are
//! not executed.

/// Magic commands planned but not yet available.
pub const PLANNED_MAGICS: &[&str] = &["%set_xsd", "%show_xsd", "%export"];

/// A parsed magic command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicCommand {
    /// First word, including the prefix (e.g. `%set_xsd`).
    pub name: String,
    /// Everything after the first word, trimmed.
    pub args: String,
}

impl MagicCommand {
    /// Informational text shown in place of running the magic.
    pub fn placeholder_message(&self) -> String {
        format!(
            "Magic commands not yet implemented: {}\nFuture features: {}, etc.",
            self.name,
            PLANNED_MAGICS.join(", ")
        )
    }
}

/// Classified cell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Empty or whitespace-only input.
    Blank,
    /// A reserved magic command.
    Magic(MagicCommand),
    /// Text to pass to the external tool, trimmed.
    Query(String),
}

/// Router for classifying cell input.
pub struct InputRouter;

impl InputRouter {
    /// Classifies `input` using `magic_prefix` as the reserved prefix.
    pub fn parse(input: &str, magic_prefix: &str) -> Input {
        let input = input.trim();

        if input.is_empty() {
            return Input::Blank;
        }

        if !magic_prefix.is_empty() && input.starts_with(magic_prefix) {
            let (name, args) = input
                .split_once(char::is_whitespace)
                .map(|(n, a)| (n, a.trim()))
                .unwrap_or((input, ""));
            return Input::Magic(MagicCommand {
                name: name.to_string(),
                args: args.to_string(),
            });
        }

        Input::Query(input.to_string())
    }
}
