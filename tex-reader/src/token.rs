use std::fmt;

use strum_macros::IntoStaticStr;

/// Line and column of a token's first character, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourcePos {
    pub line: u32,
    pub column: u32,
}

impl SourcePos {
    pub const START: SourcePos = SourcePos { line: 1, column: 1 };
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The kind of a lexical token.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
pub enum TokKind {
    /// A control sequence. The name excludes the backslash and any
    /// trailing horizontal whitespace captured in the raw text.
    #[strum(serialize = "control sequence")]
    CtrlSeq(String),
    #[strum(serialize = "symbol")]
    Symbol,
    #[strum(serialize = "word")]
    Word,
    #[strum(serialize = "spaces")]
    Spaces,
    #[strum(serialize = "newline")]
    Newline,
    #[strum(serialize = "comment")]
    Comment,
    /// A macro parameter `#n`.
    #[strum(serialize = "parameter")]
    Arg(u8),
    /// `^^c`: the character with bit 6 flipped.
    #[strum(serialize = "escape")]
    Esc1,
    /// `^^hh`: two lowercase hex digits.
    #[strum(serialize = "escape")]
    Esc2,
}

/// A token: kind, source position, and the literal text it was read from.
///
/// Concatenating `raw` over a token stream reproduces the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tok {
    pub pos: SourcePos,
    pub kind: TokKind,
    pub raw: String,
}

impl Tok {
    pub fn new(pos: SourcePos, kind: TokKind, raw: impl Into<String>) -> Self {
        Tok {
            pos,
            kind,
            raw: raw.into(),
        }
    }

    pub fn ctrl_name(&self) -> Option<&str> {
        match &self.kind {
            TokKind::CtrlSeq(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_ctrl(&self, name: &str) -> bool {
        self.ctrl_name() == Some(name)
    }

    pub fn is_symbol(&self, c: char) -> bool {
        self.kind == TokKind::Symbol && self.raw.chars().next() == Some(c)
    }

    pub fn symbol_char(&self) -> Option<char> {
        match self.kind {
            TokKind::Symbol => self.raw.chars().next(),
            _ => None,
        }
    }

    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokKind::Word && self.raw == word
    }

    /// `true` for spaces, newlines, and comments.
    pub fn is_whitespace(&self) -> bool {
        matches!(
            self.kind,
            TokKind::Spaces | TokKind::Newline | TokKind::Comment
        )
    }

    /// Decode a `^^`-escape to the character it denotes.
    pub fn decode_escape(&self) -> Option<char> {
        match self.kind {
            TokKind::Esc2 => {
                let hex = self.raw.get(2..4)?;
                let code = u8::from_str_radix(hex, 16).ok()?;
                Some(code as char)
            }
            TokKind::Esc1 => {
                let c = self.raw.chars().nth(2)?;
                let code = c as u32;
                // Flip bit 6: `^^M` is CR, `^^a` is `!`.
                Some(if code >= 64 {
                    char::from_u32(code - 64)?
                } else {
                    char::from_u32(code + 64)?
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_decoding() {
        let esc2 = Tok::new(SourcePos::START, TokKind::Esc2, "^^4e");
        assert_eq!(esc2.decode_escape(), Some('N'));
        let esc1 = Tok::new(SourcePos::START, TokKind::Esc1, "^^M");
        assert_eq!(esc1.decode_escape(), Some('\r'));
        let esc1 = Tok::new(SourcePos::START, TokKind::Esc1, "^^*");
        assert_eq!(esc1.decode_escape(), Some('j'));
    }

    #[test]
    fn ctrl_name_excludes_backslash() {
        let tok = Tok::new(
            SourcePos::START,
            TokKind::CtrlSeq("emph".into()),
            "\\emph ",
        );
        assert!(tok.is_ctrl("emph"));
        assert_eq!(tok.raw, "\\emph ");
    }
}
