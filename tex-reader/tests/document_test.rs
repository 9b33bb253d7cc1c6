use doc_tree::{
    Alignment, Attr, Block, CitationMode, Inline, MathKind, MetaValue, QuoteKind,
};
use tex_reader::{LatexReader, ReaderOptions};

fn read_blocks(input: &str) -> Vec<Block> {
    let reader = LatexReader::new(ReaderOptions::default());
    reader.read(input).unwrap().document.blocks
}

#[test]
fn plain_paragraph_with_emphasis() {
    assert_eq!(
        read_blocks("hello \\emph{world}"),
        vec![Block::Para(vec![
            Inline::Str("hello".into()),
            Inline::Space,
            Inline::Emph(vec![Inline::Str("world".into())]),
        ])]
    );
}

#[test]
fn figure_caption_attaches_to_image() {
    let blocks = read_blocks(
        "\\begin{figure}\\includegraphics{foo.png}\\caption{Foo}\\label{fig:foo}\\end{figure}",
    );
    let Block::Para(inlines) = &blocks[0] else {
        panic!("expected para, got {blocks:?}");
    };
    let Inline::Image(_, alt, target) = &inlines[0] else {
        panic!("expected image, got {inlines:?}");
    };
    assert_eq!(target.url, "foo.png");
    assert_eq!(target.title, "fig:");
    assert_eq!(alt[0], Inline::Str("Foo".into()));
    let Inline::Span(attr, _) = &alt[1] else {
        panic!("expected label span, got {alt:?}");
    };
    assert_eq!(
        attr.attributes,
        vec![("data-label".to_string(), "fig:foo".to_string())]
    );
}

#[test]
fn image_outside_figure_keeps_title() {
    let blocks = read_blocks("\\includegraphics{foo.png}");
    let Block::Para(inlines) = &blocks[0] else {
        panic!("expected para");
    };
    let Inline::Image(_, alt, target) = &inlines[0] else {
        panic!("expected image");
    };
    assert!(alt.is_empty());
    assert_eq!(target.title, "");
}

#[test]
fn caption_slot_does_not_leak_between_figures() {
    let blocks = read_blocks(
        "\\begin{figure}\\includegraphics{a.png}\\caption{A}\\end{figure}\
         \\begin{figure}\\includegraphics{b.png}\\end{figure}",
    );
    let mut titles = Vec::new();
    for block in &blocks {
        if let Block::Para(inlines) = block {
            for inline in inlines {
                if let Inline::Image(_, _, target) = inline {
                    titles.push(target.title.clone());
                }
            }
        }
    }
    assert_eq!(titles, vec!["fig:".to_string(), String::new()]);
}

#[test]
fn macro_expansion_in_paragraph() {
    assert_eq!(
        read_blocks("\\newcommand{\\x}[1]{**#1**}\\x{hi}"),
        vec![Block::Para(vec![Inline::Str("**hi**".into())])]
    );
}

#[test]
fn def_macro_with_parameter() {
    assert_eq!(
        read_blocks("\\def\\greet#1{Hi #1!}\\greet{world}"),
        vec![Block::Para(vec![
            Inline::Str("Hi".into()),
            Inline::Space,
            Inline::Str("world!".into()),
        ])]
    );
}

#[test]
fn simple_tabular() {
    let blocks = read_blocks("\\begin{tabular}{lr}a & b\\\\c & d\\end{tabular}");
    let Block::Table(table) = &blocks[0] else {
        panic!("expected table, got {blocks:?}");
    };
    assert_eq!(table.aligns, vec![Alignment::Left, Alignment::Right]);
    assert_eq!(table.widths, vec![0.0, 0.0]);
    // No header row: the header cells are all empty.
    assert!(table.header.iter().all(|cell| cell.is_empty()));
    assert_eq!(
        table.rows,
        vec![
            vec![
                vec![Block::Plain(vec![Inline::Str("a".into())])],
                vec![Block::Plain(vec![Inline::Str("b".into())])],
            ],
            vec![
                vec![Block::Plain(vec![Inline::Str("c".into())])],
                vec![Block::Plain(vec![Inline::Str("d".into())])],
            ],
        ]
    );
}

#[test]
fn tabular_header_detected_after_hline() {
    let blocks =
        read_blocks("\\begin{tabular}{ll}\\hline h1 & h2\\\\\\hline a & b\\\\\\end{tabular}");
    let Block::Table(table) = &blocks[0] else {
        panic!("expected table");
    };
    assert_eq!(
        table.header[0],
        vec![Block::Plain(vec![Inline::Str("h1".into())])]
    );
    assert_eq!(table.rows.len(), 1);
}

#[test]
fn table_float_caption() {
    let blocks = read_blocks(
        "\\begin{table}\\caption{T}\\begin{tabular}{l}x\\end{tabular}\\end{table}",
    );
    let table = blocks
        .iter()
        .find_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
        .expect("table");
    assert_eq!(table.caption, vec![Inline::Str("T".into())]);
}

#[test]
fn citation_with_prefix_suffix() {
    let blocks = read_blocks("\\cite[p.~5]{Foo2000,Bar1999}");
    let Block::Para(inlines) = &blocks[0] else {
        panic!("expected para");
    };
    let Inline::Cite(citations, mirror) = &inlines[0] else {
        panic!("expected cite, got {inlines:?}");
    };
    assert_eq!(citations.len(), 2);
    assert_eq!(citations[0].id, "Foo2000");
    assert_eq!(citations[1].id, "Bar1999");
    assert!(citations.iter().all(|c| c.mode == CitationMode::Normal));
    assert_eq!(
        citations[1].suffix,
        vec![Inline::Str("p.\u{a0}5".into())]
    );
    assert_eq!(
        mirror[0],
        Inline::RawInline("latex".into(), "\\cite[p.~5]{Foo2000,Bar1999}".into())
    );
}

#[test]
fn grouped_blocks_splice_at_top_level() {
    let blocks = read_blocks("{\\section{Intro} body}");
    assert_eq!(blocks.len(), 2);
    assert!(matches!(
        &blocks[0],
        Block::Header(1, attr, _) if attr.identifier == "intro"
    ));
    assert_eq!(blocks[1], Block::Para(vec![Inline::Str("body".into())]));
    // Doubled braces splice identically to single ones.
    assert_eq!(read_blocks("{{a}}"), read_blocks("{a}"));
}

#[test]
fn capitalized_citation_variants() {
    let blocks = read_blocks("\\Citet{Foo2000} and \\Citeauthor{Bar1999}");
    let Block::Para(inlines) = &blocks[0] else {
        panic!("expected para, got {blocks:?}");
    };
    let Inline::Cite(citations, _) = &inlines[0] else {
        panic!("expected cite, got {inlines:?}");
    };
    assert_eq!(citations[0].id, "Foo2000");
    assert_eq!(citations[0].mode, CitationMode::AuthorInText);
    let cite_count = inlines
        .iter()
        .filter(|i| matches!(i, Inline::Cite(_, _)))
        .count();
    assert_eq!(cite_count, 2);
}

#[test]
fn section_with_label() {
    let blocks = read_blocks("\\section{Intro}\\label{sec:intro}");
    assert_eq!(
        blocks,
        vec![Block::Header(
            1,
            Attr::from_id("sec:intro"),
            vec![Inline::Str("Intro".into())]
        )]
    );
}

#[test]
fn starred_section_is_unnumbered() {
    let blocks = read_blocks("\\section*{Notes}");
    let Block::Header(1, attr, _) = &blocks[0] else {
        panic!("expected header");
    };
    assert_eq!(attr.identifier, "notes");
    assert_eq!(attr.classes, vec!["unnumbered"]);
}

#[test]
fn header_levels_normalize_when_chapters_present() {
    let blocks = read_blocks("\\chapter{One}\n\n\\section{Two}");
    let levels: Vec<i32> = blocks
        .iter()
        .filter_map(|b| match b {
            Block::Header(level, _, _) => Some(*level),
            _ => None,
        })
        .collect();
    assert_eq!(levels, vec![1, 2]);
}

#[test]
fn heading_anchors_are_unique() {
    let blocks = read_blocks("\\section{Same}\n\n\\section{Same}");
    let ids: Vec<&str> = blocks
        .iter()
        .filter_map(|b| match b {
            Block::Header(_, attr, _) => Some(attr.identifier.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec!["same", "same-1"]);
}

#[test]
fn preamble_is_ignored_but_meta_kept() {
    let outcome = LatexReader::new(ReaderOptions::default())
        .read(
            "\\documentclass[11pt]{article}\n\\usepackage{nosuchpackage}\n\\title{My Title}\n\
             \\begin{document}\nBody text.\n\\end{document}\nTrailing junk",
        )
        .unwrap();
    assert_eq!(
        outcome.document.blocks,
        vec![Block::Para(vec![
            Inline::Str("Body".into()),
            Inline::Space,
            Inline::Str("text.".into()),
        ])]
    );
    assert_eq!(
        outcome.document.meta.get("title"),
        Some(&MetaValue::Inlines(vec![
            Inline::Str("My".into()),
            Inline::Space,
            Inline::Str("Title".into()),
        ]))
    );
}

#[test]
fn itemize_and_enumerate() {
    let blocks = read_blocks(
        "\\begin{itemize}\\item one\\item two\\end{itemize}\
         \\begin{enumerate}[i.]\\item first\\end{enumerate}",
    );
    let Block::BulletList(items) = &blocks[0] else {
        panic!("expected bullet list, got {blocks:?}");
    };
    assert_eq!(items.len(), 2);
    let Block::OrderedList(attrs, items) = &blocks[1] else {
        panic!("expected ordered list");
    };
    assert_eq!(attrs.style, doc_tree::ListStyle::LowerRoman);
    assert_eq!(attrs.delim, doc_tree::ListDelim::Period);
    assert_eq!(items.len(), 1);
}

#[test]
fn description_list() {
    let blocks =
        read_blocks("\\begin{description}\\item[term] definition\\end{description}");
    let Block::DefinitionList(entries) = &blocks[0] else {
        panic!("expected definition list");
    };
    assert_eq!(entries[0].0, vec![Inline::Str("term".into())]);
}

#[test]
fn verbatim_environment() {
    let blocks = read_blocks("\\begin{verbatim}\nx = 1 % not a comment\n\\end{verbatim}");
    assert_eq!(
        blocks,
        vec![Block::CodeBlock(
            Attr::empty(),
            "x = 1 % not a comment".into()
        )]
    );
}

#[test]
fn lstlisting_language() {
    let blocks =
        read_blocks("\\begin{lstlisting}[language=Python]\nprint(1)\n\\end{lstlisting}");
    let Block::CodeBlock(attr, text) = &blocks[0] else {
        panic!("expected code block");
    };
    assert_eq!(attr.classes, vec!["Python"]);
    assert_eq!(text, "print(1)");
}

#[test]
fn display_math_environment() {
    let blocks = read_blocks("\\begin{align}a &= b\\\\c &= d\\end{align}");
    assert_eq!(
        blocks,
        vec![Block::Para(vec![Inline::Math(
            MathKind::Display,
            "\\begin{align}a &= b\\\\c &= d\\end{align}".into()
        )])]
    );
}

#[test]
fn quote_environment() {
    let blocks = read_blocks("\\begin{quote}wise words\\end{quote}");
    let Block::BlockQuote(inner) = &blocks[0] else {
        panic!("expected block quote");
    };
    assert_eq!(inner.len(), 1);
}

#[test]
fn smart_quotes_in_paragraph() {
    let blocks = read_blocks("she said ``yes''");
    let Block::Para(inlines) = &blocks[0] else {
        panic!("expected para");
    };
    assert_eq!(
        inlines.last(),
        Some(&Inline::Quoted(
            QuoteKind::Double,
            vec![Inline::Str("yes".into())]
        ))
    );
}

#[test]
fn tikzpicture_in_figure_gets_caption_div() {
    let blocks = read_blocks(
        "\\begin{figure}\\begin{tikzpicture}\\draw (0,0);\\end{tikzpicture}\\caption{A plot}\\end{figure}",
    );
    let div = blocks
        .iter()
        .find_map(|b| match b {
            Block::Div(attr, inner) if attr.classes == vec!["tikzpicture"] => Some(inner),
            _ => None,
        })
        .expect("tikzpicture div");
    assert!(matches!(div[0], Block::RawBlock(_, _)));
    assert_eq!(div[1], Block::Para(vec![
        Inline::Str("A".into()),
        Inline::Space,
        Inline::Str("plot".into()),
    ]));
}

#[test]
fn authors_and_affiliations() {
    let outcome = LatexReader::new(ReaderOptions::default())
        .read("\\author{Ada\\inst{1} \\and Grace\\inst{2}}\\institute{Univ A \\and Univ B}x")
        .unwrap();
    let Some(MetaValue::List(authors)) = outcome.document.meta.get("author") else {
        panic!("expected author list");
    };
    assert_eq!(authors.len(), 2);
    // The first-declared affiliation carries superscript 1.
    let MetaValue::Inlines(first) = &authors[0] else {
        panic!("expected inlines");
    };
    let Inline::Span(_, content) = &first[0] else {
        panic!("expected span, got {first:?}");
    };
    assert_eq!(
        content.last(),
        Some(&Inline::Superscript(vec![Inline::Str("1".into())]))
    );
    let Some(MetaValue::List(institutes)) = outcome.document.meta.get("institute") else {
        panic!("expected institute list");
    };
    assert_eq!(institutes.len(), 2);
}

#[test]
fn bibliography_files_in_meta() {
    let outcome = LatexReader::new(ReaderOptions::default())
        .read("\\bibliography{refs,extra.bib}")
        .unwrap();
    let Some(MetaValue::List(files)) = outcome.document.meta.get("bibliography") else {
        panic!("expected bibliography list");
    };
    assert_eq!(
        files,
        &vec![
            MetaValue::Str("refs.bib".into()),
            MetaValue::Str("extra.bib".into()),
        ]
    );
}

#[test]
fn abstract_becomes_meta() {
    let outcome = LatexReader::new(ReaderOptions::default())
        .read("\\begin{abstract}Short summary.\\end{abstract}")
        .unwrap();
    assert!(outcome.document.blocks.is_empty());
    assert!(matches!(
        outcome.document.meta.get("abstract"),
        Some(MetaValue::Blocks(_))
    ));
}

#[test]
fn unknown_environment_passthrough() {
    let blocks = read_blocks("\\begin{mystery}inner text\\end{mystery}");
    assert_eq!(blocks.len(), 1);
    assert!(matches!(blocks[0], Block::Para(_)));

    let mut options = ReaderOptions::default();
    options.extensions.raw_tex = true;
    let blocks = LatexReader::new(options)
        .read("\\begin{mystery}inner text\\end{mystery}")
        .unwrap()
        .document
        .blocks;
    assert_eq!(
        blocks,
        vec![Block::RawBlock(
            "latex".into(),
            "\\begin{mystery}inner text\\end{mystery}".into()
        )]
    );
}
