use insta::assert_snapshot;

use doc_tree::{Block, Inline};
use tex_reader::{ErrorKind, LatexReader, LogKind, ReaderOptions};

fn reader() -> LatexReader {
    LatexReader::new(ReaderOptions::default())
}

#[test]
fn recursive_macro_aborts_with_its_name() {
    let err = reader().read("\\newcommand{\\a}{\\a}\\a").unwrap_err();
    assert_eq!(err.1, ErrorKind::MacroLoop("a".into()));
    assert_snapshot!(
        err.to_string(),
        @r"1:20: macro expansion loop while expanding \a"
    );
}

#[test]
fn mutually_recursive_macros_abort() {
    let err = reader()
        .read("\\newcommand{\\a}{\\b}\\newcommand{\\b}{\\a}\\a")
        .unwrap_err();
    assert!(matches!(err.1, ErrorKind::MacroLoop(_)));
}

#[test]
fn missing_closing_brace_is_recoverable() {
    let outcome = reader().read("\\emph{oops").unwrap();
    assert_eq!(
        outcome.document.blocks,
        vec![Block::Para(vec![Inline::Emph(vec![Inline::Str(
            "oops".into()
        )])])]
    );
    assert!(outcome
        .logs
        .iter()
        .any(|log| matches!(log.1, LogKind::UnexpectedEndOfDocument(_))));
}

#[test]
fn unknown_command_is_logged_not_fatal() {
    let outcome = reader().read("a \\nosuchcmd b").unwrap();
    assert_eq!(outcome.logs.len(), 1);
    let LogKind::SkippedContent(raw) = &outcome.logs[0].1 else {
        panic!("expected skipped content, got {:?}", outcome.logs);
    };
    assert_eq!(raw, "\\nosuchcmd");
    assert_snapshot!(
        outcome.logs[0].to_string(),
        @r#"1:3: skipped "\nosuchcmd""#
    );
}

#[test]
fn end_document_inside_open_environment() {
    let outcome = reader()
        .read("\\begin{document}\\begin{center}x\\end{document}")
        .unwrap();
    assert_eq!(outcome.document.blocks.len(), 1);
    assert!(outcome.logs.iter().any(|log| matches!(
        &log.1,
        LogKind::UnexpectedEndOfDocument(env) if env == "center"
    )));
}

#[test]
fn stray_special_characters_are_literal() {
    let outcome = reader().read("a ^ b").unwrap();
    assert!(outcome
        .logs
        .iter()
        .any(|log| matches!(log.1, LogKind::ParsingUnescaped('^'))));
    assert_eq!(
        outcome.document.blocks,
        vec![Block::Para(vec![
            Inline::Str("a".into()),
            Inline::Space,
            Inline::Str("^".into()),
            Inline::Space,
            Inline::Str("b".into()),
        ])]
    );
}

#[test]
fn log_positions_are_in_source_order() {
    let outcome = reader().read("\\bad{x}\n\n\\worse{y}").unwrap();
    let positions: Vec<_> = outcome.logs.iter().map(|log| log.0).collect();
    let mut sorted = positions.clone();
    sorted.sort();
    assert_eq!(positions, sorted);
}

#[test]
fn include_cycle_is_fatal() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("tex_reader_cycle_{}.tex", std::process::id()));
    std::fs::write(&path, format!("pre \\input{{{}}} post", path.display())).unwrap();
    let err = reader()
        .read(&format!("\\input{{{}}}", path.display()))
        .unwrap_err();
    assert!(matches!(err.1, ErrorKind::IncludeCycle(_)));
    std::fs::remove_file(&path).ok();
}

#[test]
fn missing_include_is_logged() {
    let outcome = reader()
        .read("\\input{/nonexistent/path/file.tex}")
        .unwrap();
    assert!(outcome
        .logs
        .iter()
        .any(|log| matches!(log.1, LogKind::CouldNotLoadIncludeFile(_))));
}
