//! Errors raised while lexing and parsing, and the sinks they are reported to.
//!
//! Lexical errors are reported and scanning carries on; a syntax error is reported once where it
//! is detected and then returned up the parser as `Err`.

use thiserror::Error;

#[derive(Debug, PartialEq, Clone, Error)]
pub enum LexError {
    #[error("unexpected character {character:?}")]
    UnexpectedCharacter { character: char, offset: usize },
    #[error("invalid number literal {text:?}")]
    InvalidNumber { text: String, offset: usize },
}

impl LexError {
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnexpectedCharacter { offset, .. } => *offset,
            LexError::InvalidNumber { offset, .. } => *offset,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum ParseErrorKind {
    #[error("expected function name")]
    ExpectedFunctionName,
    #[error("expected '(' after function name")]
    ExpectedOpenParen,
    #[error("expected parameter name")]
    ExpectedParameterName,
    #[error("expected ',' or ')' in parameter list")]
    ExpectedSeparatorOrCloseParen,
    #[error("expected expression")]
    ExpectedExpression,
    #[error("expected ')'")]
    ExpectedCloseParen,
    #[error("expected ')' after argument list")]
    ExpectedCloseParenAfterArguments,
    #[error("expected end of input")]
    TrailingInput,
    #[error("expression nested too deeply")]
    NestingTooDeep,
}

#[derive(Debug, PartialEq, Clone, Error)]
#[error("{kind}, found {found}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// description of the offending token
    pub found: String,
    pub offset: usize,
}

#[derive(Debug, PartialEq, Clone, Error)]
pub enum Diagnostic {
    #[error("lexical error: {0}")]
    Lexical(#[from] LexError),
    #[error("syntax error: {0}")]
    Syntax(#[from] ParseError),
}

impl Diagnostic {
    pub fn offset(&self) -> usize {
        match self {
            Diagnostic::Lexical(err) => err.offset(),
            Diagnostic::Syntax(err) => err.offset,
        }
    }
}

/// Destination for diagnostics emitted while the front-end runs.
pub trait Reporter {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Collects everything, mostly useful in tests.
impl Reporter for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::Lexical(_) => log::warn!("{} (offset {})", diagnostic, diagnostic.offset()),
            Diagnostic::Syntax(_) => log::error!("{} (offset {})", diagnostic, diagnostic.offset()),
        }
    }
}

/// Prints each diagnostic to stderr, pointing at the source it came from.
#[derive(Debug, Clone, Copy)]
pub struct StderrReporter<'s> {
    source: &'s str,
}

impl<'s> StderrReporter<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { source }
    }
}

impl<'s> Reporter for StderrReporter<'s> {
    fn report(&mut self, diagnostic: Diagnostic) {
        eprintln!("{}", render(self.source, &diagnostic));
    }
}

/// Render a diagnostic with the line it occurred on and a marker under the offset.
///
/// ```text
/// error: lexical error: unexpected character '@'
///   |
/// 1 | foo(x) x @
///   | ---------^
/// ```
pub fn render(source: &str, diagnostic: &Diagnostic) -> String {
    let offset = diagnostic.offset().min(source.len());
    let before = source.get(..offset).unwrap_or(source);

    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[line_start..]
        .find('\n')
        .map_or(source.len(), |i| line_start + i);
    let line_number = before.matches('\n').count() + 1;
    let column = before[line_start..].chars().count();

    let line_string = line_number.to_string();
    let padding = line_string.len() + 2;
    let arrows = column + 1;

    format!(
        "error: {}\n{:>padding$}\n{} | {}\n{:>padding$} {:->arrows$}",
        diagnostic,
        "|",
        line_string,
        &source[line_start..line_end],
        "|",
        "^",
        padding = padding,
        arrows = arrows,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn unexpected(character: char, offset: usize) -> Diagnostic {
        LexError::UnexpectedCharacter { character, offset }.into()
    }

    #[test]
    fn messages_read_well() {
        let err = ParseError {
            kind: ParseErrorKind::ExpectedCloseParen,
            found: "end of input".to_string(),
            offset: 4,
        };
        assert_eq!(err.to_string(), "expected ')', found end of input");
        assert_eq!(
            Diagnostic::from(err).to_string(),
            "syntax error: expected ')', found end of input"
        );
        assert_eq!(
            unexpected('@', 0).to_string(),
            "lexical error: unexpected character '@'"
        );
    }

    #[test]
    fn offsets() {
        assert_eq!(unexpected('#', 7).offset(), 7);
        let syntax: Diagnostic = ParseError {
            kind: ParseErrorKind::ExpectedExpression,
            found: "')'".to_string(),
            offset: 3,
        }
        .into();
        assert_eq!(syntax.offset(), 3);
    }

    #[test]
    fn vec_collects() {
        let mut sink = Vec::new();
        sink.report(unexpected('$', 1));
        sink.report(unexpected('%', 2));
        assert_eq!(sink, vec![unexpected('$', 1), unexpected('%', 2)]);
    }

    #[test]
    fn render_single_line() {
        let rendered = render("foo(x) x @", &unexpected('@', 9));
        assert_eq!(
            rendered,
            "error: lexical error: unexpected character '@'\n  |\n1 | foo(x) x @\n  | ---------^"
        );
    }

    #[test]
    fn render_picks_the_right_line() {
        let source = "a(x)\n  x + $";
        let rendered = render(source, &unexpected('$', 11));
        assert_eq!(
            rendered,
            "error: lexical error: unexpected character '$'\n  |\n2 |   x + $\n  | ------^"
        );
    }

    #[test]
    fn render_at_end_of_input() {
        let err: Diagnostic = ParseError {
            kind: ParseErrorKind::ExpectedExpression,
            found: "end of input".to_string(),
            offset: 4,
        }
        .into();
        assert_eq!(
            render("f() ", &err),
            "error: syntax error: expected expression, found end of input\n  |\n1 | f() \n  | ----^"
        );
    }
}
