//! Post-parse tree walks: caption attachment and header-level
//! normalization. Author-affiliation rewriting happens as the meta
//! commands are parsed.

use doc_tree::{walk_blocks_mut, walk_inlines_mut, Attr, Block, Blocks, Inline, Inlines};

/// Attach a pending figure caption: every image whose title does not yet
/// start with `fig:` gets the caption as its alternate text and a `fig:`
/// title prefix; tikz raw blocks are wrapped in a classed div together
/// with a caption paragraph.
pub(crate) fn attach_figure_caption(blocks: &mut Blocks, caption: &Inlines) {
    walk_inlines_mut(blocks, &mut |inline| {
        if let Inline::Image(_, alt, target) = inline {
            if !target.title.starts_with("fig:") {
                *alt = caption.clone();
                target.title = format!("fig:{}", target.title);
            }
        }
    });
    walk_blocks_mut(blocks, &mut |block| {
        let is_tikz = matches!(
            block,
            Block::RawBlock(format, raw)
                if format == "latex" && raw.starts_with("\\begin{tikzpicture}")
        );
        if is_tikz {
            let raw_block = block.clone();
            *block = Block::Div(
                Attr::from_classes(["tikzpicture"]),
                vec![raw_block, Block::Para(caption.clone())],
            );
        }
    });
}

/// Attach a pending caption to the first captionless table.
pub(crate) fn attach_table_caption(blocks: &mut Blocks, caption: &Inlines) {
    let mut done = false;
    walk_blocks_mut(blocks, &mut |block| {
        if done {
            return;
        }
        if let Block::Table(table) = block {
            if table.caption.is_empty() {
                table.caption = caption.clone();
                done = true;
            }
        }
    });
}

/// Shift header levels so the minimum in the document is 1. A document
/// opening with `\part` or `\chapter` otherwise produces levels below 1.
pub(crate) fn normalize_headers(blocks: &mut Blocks) {
    let mut min = i32::MAX;
    walk_blocks_mut(blocks, &mut |block| {
        if let Block::Header(level, _, _) = block {
            min = min.min(*level);
        }
    });
    if min < 1 && min != i32::MAX {
        let shift = 1 - min;
        walk_blocks_mut(blocks, &mut |block| {
            if let Block::Header(level, _, _) = block {
                *level += shift;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_tree::Target;

    #[test]
    fn header_levels_normalize_to_one() {
        let mut blocks = vec![
            Block::Header(-1, Attr::empty(), vec![Inline::Str("part".into())]),
            Block::Header(1, Attr::empty(), vec![Inline::Str("sec".into())]),
        ];
        normalize_headers(&mut blocks);
        assert!(matches!(blocks[0], Block::Header(1, _, _)));
        assert!(matches!(blocks[1], Block::Header(3, _, _)));
    }

    #[test]
    fn headers_already_positive_are_untouched() {
        let mut blocks = vec![Block::Header(2, Attr::empty(), Vec::new())];
        normalize_headers(&mut blocks);
        assert!(matches!(blocks[0], Block::Header(2, _, _)));
    }

    #[test]
    fn caption_attaches_once_per_image() {
        let caption = vec![Inline::Str("Foo".into())];
        let mut blocks = vec![Block::Para(vec![Inline::Image(
            Attr::empty(),
            Vec::new(),
            Target::new("foo.png", ""),
        )])];
        attach_figure_caption(&mut blocks, &caption);
        attach_figure_caption(&mut blocks, &vec![Inline::Str("Bar".into())]);
        match &blocks[0] {
            Block::Para(inlines) => match &inlines[0] {
                Inline::Image(_, alt, target) => {
                    assert_eq!(alt, &caption);
                    assert_eq!(target.title, "fig:");
                }
                other => panic!("expected image, got {other:?}"),
            },
            other => panic!("expected para, got {other:?}"),
        }
    }

    #[test]
    fn tikz_blocks_get_wrapped() {
        let caption = vec![Inline::Str("C".into())];
        let mut blocks = vec![Block::RawBlock(
            "latex".into(),
            "\\begin{tikzpicture}x\\end{tikzpicture}".into(),
        )];
        attach_figure_caption(&mut blocks, &caption);
        match &blocks[0] {
            Block::Div(attr, inner) => {
                assert_eq!(attr.classes, vec!["tikzpicture"]);
                assert_eq!(inner.len(), 2);
            }
            other => panic!("expected div, got {other:?}"),
        }
    }
}
