//! Static kernel metadata shown to notebook front-ends.

use super::protocol::{KernelInfoReply, LanguageInfo, ReplyStatus};

pub const IMPLEMENTATION: &str = "ExpoCLI";
pub const IMPLEMENTATION_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PROTOCOL_VERSION: &str = "5.3";
pub const LANGUAGE: &str = "expocli-sql";
pub const FILE_EXTENSION: &str = ".eql";

/// Error name used in `execute_reply` errors.
pub const ERROR_NAME: &str = "ExpoCLIError";

/// Banner displayed when a session starts.
pub const BANNER: &str = r#"ExpoCLI Kernel - SQL-like XML Querying

Execute SQL-like queries on XML files directly in Jupyter notebooks.

Example queries:
  SELECT name, price FROM examples/books.xml WHERE price > 30
  SELECT * FROM examples/test.xml ORDER BY price DESC

Special commands:
  help                 - Show ExpoCLI help
  SET XSD <file>       - Set XSD schema
  SHOW XSD             - Show current XSD
  GENERATE XML ...     - Generate XML from schema
  CHECK <file>         - Validate XML against schema"#;

pub fn language_info() -> LanguageInfo {
    LanguageInfo {
        name: LANGUAGE,
        version: "1.0",
        mimetype: "text/x-sql",
        file_extension: FILE_EXTENSION,
        codemirror_mode: "sql",
        pygments_lexer: "sql",
    }
}

pub fn kernel_info() -> KernelInfoReply {
    KernelInfoReply {
        status: ReplyStatus::Ok,
        protocol_version: PROTOCOL_VERSION,
        implementation: IMPLEMENTATION,
        implementation_version: IMPLEMENTATION_VERSION,
        language_info: language_info(),
        banner: BANNER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_info_language() {
        let info = kernel_info();
        assert_eq!(info.language_info.name, "expocli-sql");
        assert_eq!(info.language_info.file_extension, ".eql");
        assert_eq!(info.implementation_version, "1.0.0");
        assert!(info.banner.contains("SELECT name, price"));
    }
}
