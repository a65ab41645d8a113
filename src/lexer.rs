use lazy_static::lazy_static;
use regex::Regex;

use crate::diagnostics::{LexError, Reporter};
use crate::token::{Span, Token, TokenKind};

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(&[
        r"(?P<whitespace>\s+)",
        r"(?P<number>[0-9]+(?:\.[0-9]+)?)",
        r"(?P<ident>[A-Za-z_][A-Za-z0-9_]*)",
        r"(?P<plus>\+)",
        r"(?P<minus>-)",
        r"(?P<star>\*)",
        r"(?P<slash>/)",
        r"(?P<oppar>\()",
        r"(?P<clpar>\))",
        r"(?P<comma>,)",
        r"(?P<unknown>(?s:.))"
    ].join("|"))
    .unwrap();
}

const PUNCTUATION: [(&str, TokenKind); 7] = [
    ("plus", TokenKind::Plus),
    ("minus", TokenKind::Minus),
    ("star", TokenKind::Star),
    ("slash", TokenKind::Slash),
    ("oppar", TokenKind::LParen),
    ("clpar", TokenKind::RParen),
    ("comma", TokenKind::ArgSeparator),
];

fn keyword(ident: &str) -> Option<TokenKind> {
    match ident {
        "def" => Some(TokenKind::Def),
        "extern" => Some(TokenKind::Extern),
        _ => None,
    }
}

/// lex the given input string into tokens in source order, always ending with `EndOfInput`
///
/// Characters that start no token are reported and skipped.
pub fn lex(input: &str, reporter: &mut dyn Reporter) -> Vec<Token> {
    let mut res = Vec::new();

    for cap in TOKEN_RE.captures_iter(input) {
        if cap.name("whitespace").is_some() {
            continue;
        }

        let token = if let Some(inner) = cap.name("number") {
            let span = Span::new(inner.start(), inner.end());
            match inner.as_str().parse::<f64>() {
                Ok(value) => Token::number(inner.as_str(), value, span),
                Err(_) => {
                    reporter.report(
                        LexError::InvalidNumber {
                            text: inner.as_str().to_string(),
                            offset: inner.start(),
                        }
                        .into(),
                    );
                    continue;
                }
            }
        } else if let Some(ident) = cap.name("ident") {
            let kind = keyword(ident.as_str()).unwrap_or(TokenKind::Identifier);
            Token::new(kind, ident.as_str(), Span::new(ident.start(), ident.end()))
        } else if let Some((m, kind)) = PUNCTUATION
            .iter()
            .find_map(|(group, kind)| cap.name(group).map(|m| (m, *kind)))
        {
            Token::new(kind, m.as_str(), Span::new(m.start(), m.end()))
        } else {
            // only the catch-all `unknown` group is left
            let offset = cap.get(0).map_or(input.len(), |m| m.start());
            if let Some(character) = input[offset..].chars().next() {
                log::debug!("skipping {:?} at offset {}", character, offset);
                reporter.report(LexError::UnexpectedCharacter { character, offset }.into());
            }
            continue;
        };

        res.push(token);
    }

    res.push(Token::end_of_input(input.len()));
    log::trace!("lexed {} tokens", res.len());
    res
}
