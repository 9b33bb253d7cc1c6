//! The tokenizer: raw text to a flat token sequence.
//!
//! Line endings are assumed to be `\n`; callers normalize `\r\n` first.

use memchr::memchr;

use crate::token::{SourcePos, Tok, TokKind};

/// Tokenize the whole input.
pub fn tokenize(input: &str) -> Vec<Tok> {
    let mut lexer = Lexer::new(input);
    let mut toks = Vec::new();
    while let Some(tok) = lexer.next_token() {
        toks.push(tok);
    }
    toks
}

struct Lexer<'source> {
    src: &'source str,
    /// Byte offset of the next unread character.
    cursor: usize,
    line: u32,
    column: u32,
}

fn is_horizontal_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{a0}')
}

fn is_ctrl_word_char(c: char) -> bool {
    c.is_alphabetic() || c == '@'
}

impl<'source> Lexer<'source> {
    fn new(src: &'source str) -> Self {
        Lexer {
            src,
            cursor: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.cursor..].chars().next()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        // The offset may land inside a multi-byte character; that is not
        // the character we are looking for.
        self.src.get(self.cursor + offset..)?.chars().next()
    }

    /// Advance past a run of characters satisfying `pred`, starting at
    /// `self.cursor + skip` bytes, and return the end offset.
    fn run_end(&self, skip: usize, pred: impl Fn(char) -> bool) -> usize {
        let rest = &self.src[self.cursor + skip..];
        let len = rest
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.cursor + skip + len
    }

    fn emit(&mut self, kind: TokKind, end: usize) -> Tok {
        let raw = &self.src[self.cursor..end];
        let tok = Tok::new(
            SourcePos {
                line: self.line,
                column: self.column,
            },
            kind,
            raw,
        );
        self.column += raw.chars().count() as u32;
        self.cursor = end;
        tok
    }

    fn next_token(&mut self) -> Option<Tok> {
        loop {
            let c = self.peek_char()?;
            match c {
                '\n' => {
                    let tok = self.emit(TokKind::Newline, self.cursor + 1);
                    self.line += 1;
                    self.column = 1;
                    return Some(tok);
                }
                _ if is_horizontal_space(c) => {
                    let end = self.run_end(0, is_horizontal_space);
                    return Some(self.emit(TokKind::Spaces, end));
                }
                _ if c.is_alphanumeric() => {
                    let end = self.run_end(0, char::is_alphanumeric);
                    return Some(self.emit(TokKind::Word, end));
                }
                '%' => {
                    // The comment runs to just before the newline.
                    let rest = &self.src.as_bytes()[self.cursor..];
                    let end = match memchr(b'\n', rest) {
                        Some(offset) => self.cursor + offset,
                        None => self.src.len(),
                    };
                    return Some(self.emit(TokKind::Comment, end));
                }
                '\\' => match self.char_at(1) {
                    Some(next) if is_ctrl_word_char(next) => {
                        let name_end = self.run_end(1, is_ctrl_word_char);
                        let name = self.src[self.cursor + 1..name_end].to_string();
                        // The raw text swallows trailing horizontal whitespace,
                        // as TeX does after a control word.
                        let rest = &self.src[name_end..];
                        let trail = rest
                            .char_indices()
                            .find(|&(_, c)| !matches!(c, ' ' | '\t'))
                            .map(|(i, _)| i)
                            .unwrap_or(rest.len());
                        return Some(self.emit(TokKind::CtrlSeq(name), name_end + trail));
                    }
                    Some('\t') | Some('\n') => {
                        // Line continuation: drop the backslash.
                        self.cursor += 1;
                        self.column += 1;
                        continue;
                    }
                    Some(next) => {
                        let end = self.cursor + 1 + next.len_utf8();
                        return Some(self.emit(TokKind::CtrlSeq(next.to_string()), end));
                    }
                    None => {
                        return Some(self.emit(TokKind::Symbol, self.cursor + 1));
                    }
                },
                '#' => {
                    if self.char_at(1).is_some_and(|c| c.is_ascii_digit()) {
                        let end = self.run_end(1, |c| c.is_ascii_digit());
                        let n = self.src[self.cursor + 1..end]
                            .parse::<u8>()
                            .unwrap_or(u8::MAX);
                        return Some(self.emit(TokKind::Arg(n), end));
                    }
                    return Some(self.emit(TokKind::Symbol, self.cursor + 1));
                }
                '^' => {
                    if self.char_at(1) == Some('^') {
                        let c2 = self.char_at(2);
                        let c3 = self.char_at(3);
                        let is_lowerhex =
                            |c: Option<char>| c.is_some_and(|c| matches!(c, '0'..='9' | 'a'..='f'));
                        if is_lowerhex(c2) && is_lowerhex(c3) {
                            return Some(self.emit(TokKind::Esc2, self.cursor + 4));
                        }
                        if let Some(c2) = c2 {
                            if (c2 as u32) < 0x80 {
                                return Some(self.emit(TokKind::Esc1, self.cursor + 3));
                            }
                        }
                    }
                    return Some(self.emit(TokKind::Symbol, self.cursor + 1));
                }
                '$' => {
                    if self.char_at(1) == Some('$') {
                        return Some(self.emit(TokKind::Word, self.cursor + 2));
                    }
                    return Some(self.emit(TokKind::Symbol, self.cursor + 1));
                }
                _ => {
                    let end = self.cursor + c.len_utf8();
                    return Some(self.emit(TokKind::Symbol, end));
                }
            }
        }
    }
}
