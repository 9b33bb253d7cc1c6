use std::fmt;
use std::path::PathBuf;

use crate::token::SourcePos;

/// An unrecoverable parse failure, carrying the position it was detected at.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError(pub SourcePos, pub ErrorKind);

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// Macro expansion exceeded the nesting bound; carries the macro name.
    MacroLoop(String),
    UnexpectedEof,
    UnexpectedToken { expected: &'static str, got: String },
    IncludeCycle(PathBuf),
    /// A sub-parse inside a table cell or bibliography item failed.
    CellParse,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.0)?;
        match &self.1 {
            ErrorKind::MacroLoop(name) => {
                write!(f, "macro expansion loop while expanding \\{name}")
            }
            ErrorKind::UnexpectedEof => write!(f, "unexpected end of input"),
            ErrorKind::UnexpectedToken { expected, got } => {
                write!(f, "expected {expected}, but found \"{got}\"")
            }
            ErrorKind::IncludeCycle(path) => {
                write!(f, "include cycle through \"{}\"", path.display())
            }
            ErrorKind::CellParse => write!(f, "could not parse cell content"),
        }
    }
}

impl std::error::Error for ParseError {}

/// A recoverable condition: the parse continues and the message is
/// accumulated in the parser state, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct LogMessage(pub SourcePos, pub LogKind);

#[derive(Debug, Clone, PartialEq)]
pub enum LogKind {
    /// Unknown or disabled content that was dropped; carries the raw text.
    SkippedContent(String),
    MacroAlreadyDefined(String),
    /// The document ended inside the named unclosed environment or group.
    UnexpectedEndOfDocument(String),
    CouldNotLoadIncludeFile(String),
    /// A special character interpreted literally.
    ParsingUnescaped(char),
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.0)?;
        match &self.1 {
            LogKind::SkippedContent(raw) => write!(f, "skipped \"{raw}\""),
            LogKind::MacroAlreadyDefined(name) => {
                write!(f, "macro \\{name} already defined")
            }
            LogKind::UnexpectedEndOfDocument(env) => {
                write!(f, "unexpected end of document inside \"{env}\"")
            }
            LogKind::CouldNotLoadIncludeFile(path) => {
                write!(f, "could not load include file \"{path}\"")
            }
            LogKind::ParsingUnescaped(c) => {
                write!(f, "parsing unescaped '{c}' literally")
            }
        }
    }
}
