//! The universal document tree.
//!
//! Readers produce this tree and writers consume it. The model is
//! deliberately small: a document is a [`Meta`] mapping plus a list of
//! [`Block`]s, and blocks contain [`Inline`]s.
//!
//! # Usage
//!
//! ```rust
//! use doc_tree::{Block, Inline};
//!
//! let para = Block::Para(vec![
//!     Inline::Str("hello".into()),
//!     Inline::Space,
//!     Inline::Emph(vec![Inline::Str("world".into())]),
//! ]);
//! assert_eq!(doc_tree::inlines_to_string(para.inlines().unwrap()), "hello world");
//! ```
//!
//! # Features
//!
//! - `serde`: all tree types implement serde's `Serialize` and `Deserialize`.

mod ast;
mod attr;
mod meta;
mod visitor;

pub use ast::{
    Alignment, Block, Blocks, Citation, CitationMode, Inline, Inlines, MathKind, QuoteKind, Table,
};
pub use attr::{Attr, ListAttrs, ListDelim, ListStyle, Target};
pub use meta::{Document, Meta, MetaValue};
pub use visitor::{walk_blocks_mut, walk_inlines_mut};

/// Flatten inlines to plain text, the way anchors and titles are derived.
pub fn inlines_to_string(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_inlines_text(inlines, &mut out);
    out
}

fn push_inlines_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Str(s) => out.push_str(s),
            Inline::Space | Inline::SoftBreak | Inline::LineBreak => out.push(' '),
            Inline::Emph(inner)
            | Inline::Strong(inner)
            | Inline::Smallcaps(inner)
            | Inline::Strikeout(inner)
            | Inline::Superscript(inner)
            | Inline::Subscript(inner)
            | Inline::Quoted(_, inner)
            | Inline::Cite(_, inner)
            | Inline::Link(_, inner, _)
            | Inline::Image(_, inner, _)
            | Inline::Span(_, inner) => push_inlines_text(inner, out),
            Inline::Code(_, s) | Inline::Math(_, s) => out.push_str(s),
            Inline::Note(_) | Inline::RawInline(_, _) => {}
        }
    }
}

/// Drop leading and trailing whitespace inlines.
pub fn trim_inlines(mut inlines: Inlines) -> Inlines {
    while matches!(
        inlines.first(),
        Some(Inline::Space | Inline::SoftBreak | Inline::LineBreak)
    ) {
        inlines.remove(0);
    }
    while matches!(
        inlines.last(),
        Some(Inline::Space | Inline::SoftBreak | Inline::LineBreak)
    ) {
        inlines.pop();
    }
    inlines
}
