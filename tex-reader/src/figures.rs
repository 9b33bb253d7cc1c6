//! Figure and table floats, and the pending-caption slot that connects
//! `\caption{...}` to the surrounding environment's rewriter.

use doc_tree::{trim_inlines, Attr, Blocks, Inline};

use crate::rewrite::{attach_figure_caption, attach_table_caption};
use crate::stream::{PResult, Parser};

impl Parser {
    /// A figure-family environment. Entering resets the caption slot; on
    /// exit a pending caption is attached to images and tikz blocks and
    /// the slot is cleared. `extra_args` consumes the placement/width
    /// arguments of `wrapfigure`.
    pub(crate) fn figure_env(&mut self, name: &str, extra_args: usize) -> PResult<Blocks> {
        self.state.caption = None;
        self.skip_whitespace_raw();
        self.bracketed()?;
        for _ in 0..extra_args {
            self.skip_whitespace_raw();
            if self.at_bgroup() {
                self.braced()?;
            }
        }
        let mut body = self.env_body_blocks(name)?;
        if let Some(caption) = self.state.caption.take() {
            attach_figure_caption(&mut body, &caption);
        }
        self.state.caption = None;
        Ok(body)
    }

    /// A `table` float: the caption attaches to the first table inside.
    pub(crate) fn table_float_env(&mut self, name: &str) -> PResult<Blocks> {
        self.state.caption = None;
        self.skip_whitespace_raw();
        self.bracketed()?;
        let mut body = self.env_body_blocks(name)?;
        if let Some(caption) = self.state.caption.take() {
            attach_table_caption(&mut body, &caption);
        }
        self.state.caption = None;
        Ok(body)
    }

    /// `\caption[short]{...}`, with an immediately following `\label`
    /// absorbed into the caption inlines.
    pub(crate) fn caption_command(&mut self) -> PResult<Blocks> {
        self.next_tok()?;
        self.skip_whitespace_raw();
        self.bracketed()?;
        let mut inlines = trim_inlines(self.tok_arg()?);
        self.skip_whitespace()?;
        if self.peek().is_some_and(|t| t.is_ctrl("label")) {
            self.next_tok()?;
            let id = self.braced_text()?;
            let attr = Attr {
                attributes: vec![("data-label".into(), id)],
                ..Attr::default()
            };
            inlines.push(Inline::Span(attr, Vec::new()));
        }
        self.state.caption = Some(inlines);
        Ok(Vec::new())
    }
}
