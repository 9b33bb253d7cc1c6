//! Mutable tree walks used by post-parse rewriters.

use crate::ast::{Block, Inline};

/// Apply `f` to every block in the tree, depth-first, children first.
pub fn walk_blocks_mut(blocks: &mut Vec<Block>, f: &mut impl FnMut(&mut Block)) {
    for block in blocks.iter_mut() {
        match block {
            Block::BlockQuote(inner) | Block::Div(_, inner) => walk_blocks_mut(inner, f),
            Block::BulletList(items) | Block::OrderedList(_, items) => {
                for item in items.iter_mut() {
                    walk_blocks_mut(item, f);
                }
            }
            Block::DefinitionList(entries) => {
                for (_, defs) in entries.iter_mut() {
                    for def in defs.iter_mut() {
                        walk_blocks_mut(def, f);
                    }
                }
            }
            Block::Table(table) => {
                for cell in table.header.iter_mut() {
                    walk_blocks_mut(cell, f);
                }
                for row in table.rows.iter_mut() {
                    for cell in row.iter_mut() {
                        walk_blocks_mut(cell, f);
                    }
                }
            }
            Block::Plain(_)
            | Block::Para(_)
            | Block::Header(_, _, _)
            | Block::CodeBlock(_, _)
            | Block::HorizontalRule
            | Block::RawBlock(_, _) => {}
        }
        f(block);
    }
}

/// Apply `f` to every inline in the tree, depth-first, children first.
pub fn walk_inlines_mut(blocks: &mut Vec<Block>, f: &mut impl FnMut(&mut Inline)) {
    walk_blocks_mut(blocks, &mut |block| match block {
        Block::Plain(inlines) | Block::Para(inlines) | Block::Header(_, _, inlines) => {
            walk_inline_vec(inlines, f);
        }
        Block::DefinitionList(entries) => {
            for (term, _) in entries.iter_mut() {
                walk_inline_vec(term, f);
            }
        }
        Block::Table(table) => walk_inline_vec(&mut table.caption, f),
        _ => {}
    });
}

fn walk_inline_vec(inlines: &mut Vec<Inline>, f: &mut impl FnMut(&mut Inline)) {
    for inline in inlines.iter_mut() {
        match inline {
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
            | Inline::Span(_, inner) => walk_inline_vec(inner, f),
            Inline::Note(blocks) => walk_inlines_mut(blocks, f),
            _ => {}
        }
        f(inline);
    }
}
