//! CascadeLang front end: lexer, parser, and diagnostics.

pub mod ast;
mod diagnostics;
pub mod lexer;
pub mod parser;

use diagnostics::diagnostic;
use lexer::LexError;
use serde::Serialize;
use std::fs;

pub const TOOL_NAME: &str = "cascade";
pub const VERSION: &str = "0.1";

pub use diagnostics::{Diagnostic, Position, Span, TraceFrame};

/// Report emitted by `cascadec --json`.
#[derive(Serialize)]
pub struct RunReport {
    pub tool: &'static str,
    pub version: &'static str,
    pub ok: bool,
    pub output: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn parse_path(path: &str) -> Result<ast::Program, Vec<Diagnostic>> {
    let source = load_source(path).map_err(|diag| vec![diag])?;
    parse_source(&source, path)
}

pub fn parse_source(source: &str, file: &str) -> Result<ast::Program, Vec<Diagnostic>> {
    let tokens =
        lexer::lex(source).map_err(|err| vec![diagnostic_from_lex_error(file, err)])?;
    parser::parse(&tokens).map_err(|err| vec![diagnostic_from_parse_error(file, err)])
}

pub fn runtime_diagnostic(
    file: &str,
    code: &'static str,
    message: String,
    span: Option<Span>,
    trace: Vec<TraceFrame>,
) -> Diagnostic {
    let mut diag = diagnostic(
        code,
        "error",
        message,
        file,
        span.unwrap_or_else(default_span),
        vec!["Runtime error".to_string()],
        None,
    );
    diag.trace = trace;
    diag
}

fn load_source(path: &str) -> Result<String, Diagnostic> {
    fs::read_to_string(path).map_err(|err| {
        diagnostic(
            "E0001",
            "error",
            format!("Unable to read file: {err}"),
            path,
            default_span(),
            vec!["IO error".to_string()],
            Some("Ensure the path exists and is readable.".to_string()),
        )
    })
}

fn diagnostic_from_lex_error(path: &str, err: LexError) -> Diagnostic {
    diagnostic(
        err.code,
        "error",
        err.message,
        path,
        err.span,
        vec!["Lexer error".to_string()],
        None,
    )
}

fn diagnostic_from_parse_error(path: &str, err: parser::ParseError) -> Diagnostic {
    diagnostic(
        err.code,
        "error",
        err.message,
        path,
        err.span,
        vec!["Parser error".to_string()],
        None,
    )
}

fn default_span() -> Span {
    Span::new(Position::new(1, 1), Position::new(1, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_source_accepts_scenario_program() {
        let source = "struct N { mandatory id, optional next, }\nlet a = new N { id: 1 }\n";
        assert!(parse_source(source, "<test>").is_ok());
    }

    #[test]
    fn parse_source_reports_lex_error_with_span() {
        let diags = parse_source("let a = @", "<test>").unwrap_err();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, "E0100");
        assert_eq!(diags[0].span.start.line, 1);
    }

    #[test]
    fn parse_source_reports_parse_error() {
        let diags = parse_source("struct { }", "<test>").unwrap_err();
        assert_eq!(diags[0].code, "E0201");
    }

    #[test]
    fn run_report_serializes() {
        let report = RunReport {
            tool: TOOL_NAME,
            version: VERSION,
            ok: true,
            output: Some(String::new()),
            diagnostics: Vec::new(),
        };
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&report).unwrap()).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["tool"], "cascade");
    }
}
