use std::collections::HashMap;

use crate::ast::{Expression, Function, Operator, Prototype};
use crate::diagnostics::{ParseError, ParseErrorKind, Reporter};
use crate::lexer::lex;
use crate::token::{Token, TokenKind};

pub type PartialParseResult = Result<Expression, ParseError>;

/// Deepest expression tree the parser will build, counting groups, call arguments and every
/// operator in a chain.
pub const MAX_NESTING: usize = 256;

/// Binding strength of each binary operator; higher binds tighter.
#[derive(Debug, Clone, PartialEq)]
pub struct Precedence {
    levels: HashMap<Operator, u32>,
}

impl std::default::Default for Precedence {
    fn default() -> Self {
        let mut levels = HashMap::new();
        levels.insert(Operator::Mul, 20);
        levels.insert(Operator::Div, 20);
        levels.insert(Operator::Add, 10);
        levels.insert(Operator::Sub, 10);
        Self { levels }
    }
}

impl Precedence {
    pub fn set(&mut self, op: Operator, level: u32) {
        self.levels.insert(op, level);
    }

    pub fn get(&self, op: Operator) -> Option<u32> {
        self.levels.get(&op).copied()
    }
}

fn operator(kind: TokenKind) -> Option<Operator> {
    match kind {
        TokenKind::Plus => Some(Operator::Add),
        TokenKind::Minus => Some(Operator::Sub),
        TokenKind::Star => Some(Operator::Mul),
        TokenKind::Slash => Some(Operator::Div),
        _ => None,
    }
}

/// Recursive-descent parser over a token sequence with a single forward cursor.
///
/// The first syntax error is reported where it is found and then propagated as `Err`; nothing
/// parsed up to that point is kept.
pub struct Parser<'r> {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
    precedence: Precedence,
    reporter: &'r mut dyn Reporter,
}

impl<'r> Parser<'r> {
    pub fn new(tokens: Vec<Token>, reporter: &'r mut dyn Reporter) -> Self {
        Self::with_precedence(tokens, Precedence::default(), reporter)
    }

    pub fn with_precedence(
        mut tokens: Vec<Token>,
        precedence: Precedence,
        reporter: &'r mut dyn Reporter,
    ) -> Self {
        if !tokens.last().map_or(false, |t| t.is(TokenKind::EndOfInput)) {
            let offset = tokens.last().map_or(0, |t| t.span.end);
            tokens.push(Token::end_of_input(offset));
        }
        log::debug!("parser created with {} tokens", tokens.len());
        Self {
            tokens,
            current: 0,
            depth: 0,
            precedence,
            reporter,
        }
    }

    fn peek(&self) -> &Token {
        // never empty, and the cursor never moves past the final EndOfInput
        &self.tokens[self.current]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.current].clone();
        if !token.is(TokenKind::EndOfInput) {
            self.current += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().is(kind)
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) && kind != TokenKind::EndOfInput {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, error: ParseErrorKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(error))
        }
    }

    /// build an error against the current token and report it
    fn error(&mut self, kind: ParseErrorKind) -> ParseError {
        let token = self.peek();
        let err = ParseError {
            kind,
            found: token.describe(),
            offset: token.span.start,
        };
        self.reporter.report(err.clone().into());
        err
    }

    pub fn at_end(&self) -> bool {
        self.check(TokenKind::EndOfInput)
    }

    /// `function := prototype expression`
    pub fn parse_function(&mut self) -> Result<Function, ParseError> {
        let prototype = self.parse_prototype()?;
        let body = self.parse_expression()?;
        log::debug!("parsed function {}", prototype.name);
        Ok(Function { prototype, body })
    }

    /// `prototype := Identifier '(' (Identifier (',' Identifier)*)? ')'`
    pub fn parse_prototype(&mut self) -> Result<Prototype, ParseError> {
        let name = self
            .expect(TokenKind::Identifier, ParseErrorKind::ExpectedFunctionName)?
            .text;
        self.expect(TokenKind::LParen, ParseErrorKind::ExpectedOpenParen)?;

        let mut args = Vec::new();
        if !self.matches(TokenKind::RParen) {
            loop {
                let arg = self.expect(
                    TokenKind::Identifier,
                    ParseErrorKind::ExpectedParameterName,
                )?;
                args.push(arg.text);

                if self.matches(TokenKind::RParen) {
                    break;
                }
                if !self.matches(TokenKind::ArgSeparator) {
                    return Err(self.error(ParseErrorKind::ExpectedSeparatorOrCloseParen));
                }
            }
        }

        Ok(Prototype { name, args })
    }

    pub fn parse_expression(&mut self) -> PartialParseResult {
        self.parse_binary(0)
    }

    /// parse every function until the end of input
    pub fn parse_program(&mut self) -> Result<Vec<Function>, ParseError> {
        let mut functions = Vec::new();
        while !self.at_end() {
            functions.push(self.parse_function()?);
        }
        Ok(functions)
    }

    /// fail unless every token has been consumed
    pub fn expect_end(&mut self) -> Result<(), ParseError> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error(ParseErrorKind::TrailingInput))
        }
    }

    fn peek_operator(&self) -> Option<(Operator, u32)> {
        let op = operator(self.peek().kind)?;
        let precedence = self.precedence.get(op)?;
        Some((op, precedence))
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(ParseErrorKind::NestingTooDeep));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_binary(&mut self, min_precedence: u32) -> PartialParseResult {
        let entry = self.depth;
        let res = self.parse_chain(min_precedence);
        self.depth = entry;
        res
    }

    fn parse_chain(&mut self, min_precedence: u32) -> PartialParseResult {
        let mut lhs = self.parse_primary()?;

        loop {
            let (op, precedence) = match self.peek_operator() {
                Some((op, precedence)) if precedence >= min_precedence => (op, precedence),
                _ => break,
            };
            self.advance();
            // each link puts the chain built so far one level further down
            self.descend()?;

            let rhs = match precedence.checked_add(1) {
                Some(next) => self.parse_binary(next)?,
                None => self.parse_primary()?,
            };
            lhs = Expression::binary(op, lhs, rhs);
        }

        Ok(lhs)
    }

    fn parse_primary(&mut self) -> PartialParseResult {
        self.descend()?;
        let res = match self.peek().kind {
            TokenKind::Number => self.parse_number(),
            TokenKind::Identifier => self.parse_identifier(),
            TokenKind::LParen => self.parse_nested(),
            _ => Err(self.error(ParseErrorKind::ExpectedExpression)),
        };
        self.depth -= 1;
        res
    }

    fn parse_number(&mut self) -> PartialParseResult {
        let token = self.advance();
        match token.value {
            Some(value) => Ok(Expression::Literal(value)),
            None => Err(self.error(ParseErrorKind::ExpectedExpression)),
        }
    }

    fn parse_identifier(&mut self) -> PartialParseResult {
        let name = self.advance().text;
        if !self.matches(TokenKind::LParen) {
            return Ok(Expression::Variable(name));
        }

        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.matches(TokenKind::ArgSeparator) {
                    break;
                }
            }
        }
        self.expect(
            TokenKind::RParen,
            ParseErrorKind::ExpectedCloseParenAfterArguments,
        )?;

        Ok(Expression::Call(name, args))
    }

    fn parse_nested(&mut self) -> PartialParseResult {
        self.advance();
        let res = self.parse_expression()?;
        self.expect(TokenKind::RParen, ParseErrorKind::ExpectedCloseParen)?;
        Ok(res)
    }
}

/// lex and parse exactly one function from `source`
pub fn parse_str(source: &str, reporter: &mut dyn Reporter) -> Result<Function, ParseError> {
    let tokens = lex(source, reporter);
    let mut parser = Parser::new(tokens, reporter);
    let function = parser.parse_function()?;
    parser.expect_end()?;
    Ok(function)
}

/// lex and parse a sequence of functions from `source`
pub fn parse_program_str(
    source: &str,
    reporter: &mut dyn Reporter,
) -> Result<Vec<Function>, ParseError> {
    let tokens = lex(source, reporter);
    Parser::new(tokens, reporter).parse_program()
}
