//! The table sub-engine: alignment-spec parsing, row and cell splitting,
//! and header detection for the `tabular` family.

use doc_tree::{Alignment, Block, Blocks, Table};

use crate::commands::is_hline_command;
use crate::error::{ErrorKind, ParseError};
use crate::stream::{PResult, Parser};

impl Parser {
    /// A `tabular`-family environment; the begin marker is consumed.
    /// `has_width_arg` covers `tabular*`/`tabularx`, which take a width
    /// before the column spec.
    pub(crate) fn tabular_env(&mut self, name: &str, has_width_arg: bool) -> PResult<Blocks> {
        self.skip_whitespace_raw();
        self.bracketed()?;
        if has_width_arg {
            self.skip_whitespace_raw();
            if self.at_bgroup() {
                self.braced()?;
            }
        }
        self.skip_whitespace_raw();
        let spec_text = if self.at_bgroup() {
            let toks = self.braced()?;
            toks.iter().map(|t| t.raw.as_str()).collect::<String>()
        } else {
            String::new()
        };
        let aligns = parse_alignments(&spec_text);
        let ncols = aligns.len();

        let saved_cell = self.state.in_table_cell;
        self.state.in_table_cell = true;
        let mut rows: Vec<Vec<Blocks>> = Vec::new();
        let mut header: Vec<Blocks> = Vec::new();
        self.consume_hlines()?;
        loop {
            self.skip_whitespace()?;
            match self.peek() {
                None => break,
                Some(t) if t.is_ctrl("end") => break,
                _ => {}
            }
            let before = self.len();
            let (cells, newline_terminated) = self.table_row()?;
            let empty_row = cells.iter().all(|c| c.is_empty());
            if !empty_row {
                rows.push(cells);
            }
            let hlines = self.consume_hlines()?;
            if rows.len() == 1 && header.is_empty() && newline_terminated && hlines > 0 {
                header = rows.remove(0);
            }
            // A row that consumed nothing would never terminate; drop the
            // offending token.
            if self.len() == before {
                if let Some(tok) = self.pop_raw() {
                    self.state
                        .log(tok.pos, crate::error::LogKind::SkippedContent(tok.raw));
                }
                self.expand_head()?;
            }
        }
        self.state.in_table_cell = saved_cell;
        self.expect_env_end(name)?;

        if header.is_empty() {
            header = vec![Vec::new(); ncols];
        } else {
            header.resize(ncols.max(header.len()), Vec::new());
        }
        for row in rows.iter_mut() {
            if row.len() < ncols {
                row.resize(ncols, Vec::new());
            }
        }
        let caption = self.state.caption.take().unwrap_or_default();
        Ok(vec![Block::Table(Table {
            caption,
            widths: vec![0.0; ncols],
            aligns,
            header,
            rows,
        })])
    }

    /// One row: cells split on `&`, terminated by `\\`, `\tabularnewline`,
    /// or the end of the environment. A failing cell aborts with the cell's
    /// position.
    fn table_row(&mut self) -> PResult<(Vec<Blocks>, bool)> {
        let mut cells = Vec::new();
        loop {
            let pos = self.here();
            let cell = self
                .blocks()
                .map_err(|_| ParseError(pos, ErrorKind::CellParse))?;
            cells.push(plainify(cell));
            match self.peek() {
                Some(t) if t.is_symbol('&') => {
                    self.next_tok()?;
                }
                Some(t) if t.is_ctrl("\\") || t.is_ctrl("tabularnewline") => {
                    self.next_tok()?;
                    self.skip_whitespace_raw();
                    self.bracketed()?;
                    return Ok((cells, true));
                }
                _ => return Ok((cells, false)),
            }
        }
    }

    /// Consume a run of row separators (`\hline`, booktabs rules, longtable
    /// header markers), each with an optional `[dim]`, returning how many
    /// were seen.
    fn consume_hlines(&mut self) -> PResult<usize> {
        let mut count = 0;
        loop {
            self.skip_whitespace()?;
            let Some(name) = self.peek().and_then(|t| t.ctrl_name()) else {
                return Ok(count);
            };
            if !is_hline_command(name) {
                return Ok(count);
            }
            let is_cline = name == "cline";
            self.next_tok()?;
            self.skip_whitespace_raw();
            self.bracketed()?;
            if is_cline && self.at_bgroup() {
                self.braced()?;
            }
            count += 1;
        }
    }
}

/// Single-paragraph cells read better as plain content.
fn plainify(mut blocks: Blocks) -> Blocks {
    if blocks.len() == 1 {
        if let Block::Para(inlines) = &mut blocks[0] {
            let inlines = std::mem::take(inlines);
            blocks[0] = Block::Plain(inlines);
        }
    }
    blocks
}

/// Read a column specification character by character. Only `c`, `l`, and
/// `r` carry alignment; width-bearing and exotic column types approximate
/// to left. `*{n}{spec}` repeats, decorations are discarded.
pub(crate) fn parse_alignments(spec: &str) -> Vec<Alignment> {
    let chars: Vec<char> = spec.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    walk_alignment_spec(&chars, &mut i, &mut out, 0);
    out
}

fn walk_alignment_spec(chars: &[char], i: &mut usize, out: &mut Vec<Alignment>, depth: u32) {
    // Bounded recursion through *{n}{spec}.
    if depth > 8 {
        return;
    }
    while *i < chars.len() {
        let c = chars[*i];
        *i += 1;
        match c {
            'c' => out.push(Alignment::Center),
            'l' => out.push(Alignment::Left),
            'r' => out.push(Alignment::Right),
            'p' | 'm' | 'b' => {
                out.push(Alignment::Left);
                skip_braced(chars, i);
            }
            '*' => {
                let count = read_braced(chars, i)
                    .and_then(|s| s.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                let inner: Vec<char> = read_braced(chars, i)
                    .unwrap_or_default()
                    .chars()
                    .collect();
                for _ in 0..count.min(256) {
                    let mut j = 0;
                    walk_alignment_spec(&inner, &mut j, out, depth + 1);
                }
            }
            '@' | '>' | '<' | '!' => {
                skip_braced(chars, i);
            }
            '|' | ':' => {}
            _ if c.is_whitespace() => {}
            '?' => out.push(Alignment::Left),
            _ if c.is_alphabetic() => {
                // X, L, R, C, J, P, and anything else column-like.
                out.push(Alignment::Left);
                skip_braced(chars, i);
            }
            _ => {}
        }
    }
}

fn skip_braced(chars: &[char], i: &mut usize) {
    read_braced(chars, i);
}

/// If a `{...}` group starts at `*i`, consume it and return its content.
fn read_braced(chars: &[char], i: &mut usize) -> Option<String> {
    while *i < chars.len() && chars[*i].is_whitespace() {
        *i += 1;
    }
    if chars.get(*i) != Some(&'{') {
        return None;
    }
    *i += 1;
    let mut depth = 1usize;
    let mut content = String::new();
    while *i < chars.len() {
        let c = chars[*i];
        *i += 1;
        match c {
            '{' => {
                depth += 1;
                content.push(c);
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(content);
                }
                content.push(c);
            }
            _ => content.push(c),
        }
    }
    Some(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_alignments() {
        assert_eq!(
            parse_alignments("lcr"),
            vec![Alignment::Left, Alignment::Center, Alignment::Right]
        );
    }

    #[test]
    fn decorations_are_discarded() {
        assert_eq!(
            parse_alignments("|l||r|"),
            vec![Alignment::Left, Alignment::Right]
        );
        assert_eq!(
            parse_alignments("@{}l@{\\hspace{1em}}c@{}"),
            vec![Alignment::Left, Alignment::Center]
        );
        assert_eq!(
            parse_alignments(">{\\raggedright}l c"),
            vec![Alignment::Left, Alignment::Center]
        );
    }

    #[test]
    fn width_columns_approximate_left() {
        assert_eq!(
            parse_alignments("p{3cm}m{2em}X"),
            vec![Alignment::Left, Alignment::Left, Alignment::Left]
        );
    }

    #[test]
    fn starred_repetition() {
        assert_eq!(
            parse_alignments("*{3}{c}r"),
            vec![
                Alignment::Center,
                Alignment::Center,
                Alignment::Center,
                Alignment::Right
            ]
        );
        assert_eq!(
            parse_alignments("*{2}{lc}"),
            vec![
                Alignment::Left,
                Alignment::Center,
                Alignment::Left,
                Alignment::Center
            ]
        );
    }
}
