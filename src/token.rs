use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    Def,
    Extern,
    Identifier,
    Number,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    ArgSeparator,
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Byte range `[start, end)` of a token in its source.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// verbatim lexeme, empty for `EndOfInput`
    pub text: String,
    /// only present on `Number` tokens
    pub value: Option<f64>,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: &str, span: Span) -> Self {
        Self {
            kind,
            text: text.to_string(),
            value: None,
            span,
        }
    }

    pub fn number(text: &str, value: f64, span: Span) -> Self {
        Self {
            kind: TokenKind::Number,
            text: text.to_string(),
            value: Some(value),
            span,
        }
    }

    pub fn end_of_input(offset: usize) -> Self {
        Self::new(TokenKind::EndOfInput, "", Span::new(offset, offset))
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// how the token reads in a diagnostic
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::EndOfInput => "end of input".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.value) {
            (TokenKind::Number, Some(value)) => write!(f, "{} {}", self.kind, value),
            (TokenKind::EndOfInput, _) => write!(f, "{}", self.kind),
            _ => write!(f, "{} {}", self.kind, self.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn describe_works() {
        let ident = Token::new(TokenKind::Identifier, "foo", Span::new(0, 3));
        assert_eq!(ident.describe(), "'foo'");
        assert_eq!(Token::end_of_input(3).describe(), "end of input");
    }

    #[test]
    fn display_works() {
        assert_eq!(
            Token::number("1.5", 1.5, Span::new(0, 3)).to_string(),
            "Number 1.5"
        );
        assert_eq!(
            Token::new(TokenKind::Plus, "+", Span::new(0, 1)).to_string(),
            "Plus +"
        );
        assert_eq!(Token::end_of_input(0).to_string(), "EndOfInput");
    }
}
