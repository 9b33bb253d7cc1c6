use doc_tree::{Block, Inline};
use tex_reader::{apply_macros, LatexReader, LogKind, RawContext, ReaderOptions};

fn read_blocks(input: &str) -> Vec<Block> {
    LatexReader::new(ReaderOptions::default())
        .read(input)
        .unwrap()
        .document
        .blocks
}

fn para_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .filter_map(|b| b.inlines())
        .map(doc_tree::inlines_to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn zero_argument_macro() {
    let blocks = read_blocks("\\newcommand{\\pi}{3.14}value: \\pi{}!");
    assert_eq!(para_text(&blocks), "value: 3.14!");
}

#[test]
fn macro_with_optional_default() {
    let blocks = read_blocks("\\newcommand{\\greet}[2][Hello]{#1, #2!}\\greet{world}");
    assert_eq!(para_text(&blocks), "Hello, world!");
    let blocks = read_blocks("\\newcommand{\\greet}[2][Hello]{#1, #2!}\\greet[Hi]{you}");
    assert_eq!(para_text(&blocks), "Hi, you!");
}

#[test]
fn macro_body_is_parsed_not_literal() {
    let blocks = read_blocks("\\newcommand{\\imp}[1]{\\emph{#1}}\\imp{key}");
    assert_eq!(
        blocks,
        vec![Block::Para(vec![Inline::Emph(vec![Inline::Str(
            "key".into()
        )])])]
    );
}

#[test]
fn environment_definition_installs_both_ends() {
    let blocks = read_blocks(
        "\\newenvironment{shout}{[}{]}\\begin{shout}loud\\end{shout}",
    );
    assert_eq!(para_text(&blocks), "[loud]");
}

#[test]
fn def_with_symbol_delimited_argument() {
    let blocks = read_blocks("\\def\\upto#1.{(#1)}\\upto 12. end");
    assert_eq!(para_text(&blocks), "(12) end");
}

#[test]
fn renew_and_provide_semantics() {
    // \renewcommand overwrites.
    let blocks = read_blocks("\\newcommand{\\x}{1}\\renewcommand{\\x}{2}\\x");
    assert_eq!(para_text(&blocks), "2");
    // \providecommand over an existing name is a quiet no-op.
    let outcome = LatexReader::new(ReaderOptions::default())
        .read("\\newcommand{\\x}{1}\\providecommand{\\x}{2}\\x")
        .unwrap();
    assert_eq!(para_text(&outcome.document.blocks), "1");
    assert!(outcome.logs.is_empty());
    // \newcommand over an existing name logs and keeps the old one.
    let outcome = LatexReader::new(ReaderOptions::default())
        .read("\\newcommand{\\x}{1}\\newcommand{\\x}{2}\\x")
        .unwrap();
    assert_eq!(para_text(&outcome.document.blocks), "1");
    assert!(outcome
        .logs
        .iter()
        .any(|log| matches!(&log.1, LogKind::MacroAlreadyDefined(name) if name == "x")));
}

#[test]
fn disabled_extension_leaves_calls_alone() {
    let mut options = ReaderOptions::default();
    options.extensions.latex_macros = false;
    let outcome = LatexReader::new(options)
        .read("\\newcommand{\\x}{1}\\x")
        .unwrap();
    // The definition parses without installing; the call is unknown and
    // skipped.
    assert!(outcome
        .logs
        .iter()
        .any(|log| matches!(log.1, LogKind::SkippedContent(_))));
    assert!(outcome.document.blocks.is_empty());
}

#[test]
fn expansion_is_identity_without_macros() {
    // With an empty macro table, parsing the same input twice is stable.
    let a = read_blocks("some \\emph{simple} text");
    let b = read_blocks("some \\emph{simple} text");
    assert_eq!(a, b);
}

#[test]
fn apply_macros_expands_to_fixpoint() {
    let mut context = RawContext::new(ReaderOptions::default());
    context.macros.insert(
        "inner".into(),
        tex_reader::Macro::FixedArity {
            arity: 0,
            opt_default: None,
            body: tex_reader::tokenize("x"),
        },
    );
    context.macros.insert(
        "outer".into(),
        tex_reader::Macro::FixedArity {
            arity: 0,
            opt_default: None,
            body: tex_reader::tokenize("(\\inner)"),
        },
    );
    assert_eq!(apply_macros(&context, "\\outer{}").unwrap(), "(x){}");
}

#[test]
fn macro_in_math_content() {
    let blocks = read_blocks("\\newcommand{\\half}{\\frac{1}{2}}$1 + \\half$");
    assert_eq!(
        blocks,
        vec![Block::Para(vec![Inline::Math(
            doc_tree::MathKind::Inline,
            "1 + \\frac{1}{2}".into()
        )])]
    );
}
