//! Front-end for the metal expression language: source text is lexed into tokens and parsed into
//! functions whose bodies are arithmetic expression trees.

pub mod ast;
pub mod diagnostics;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{Expression, Function, Operator, Prototype, Visitor};
pub use diagnostics::{Diagnostic, LexError, ParseError, ParseErrorKind, Reporter};
pub use parser::{parse_program_str, parse_str, Parser};
