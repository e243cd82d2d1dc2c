//! Parser for the `--semantics Custom` `--semantic_string` grammar.
//!
//! `c1:<off>[<funcs>] & c2:<off>[<funcs>]`, where `<off>` is `+k`, `-k`,
//! or `0`. Produces a [`verifyio_core::CustomWitness`] ready to hand to
//! [`verifyio_core::verify_execution`] via [`verifyio_core::Semantics::Custom`].

pub mod lexer;
pub mod parser;

pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{parse_custom_semantics, ParseError};
