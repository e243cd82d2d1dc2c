//! Logos-based lexer for the `--semantic_string` custom-semantics DSL.
//!
//! # Example input
//!
//! ```text
//! c1:+1[MPI_File_close, MPI_File_sync] & c2:-1[MPI_File_open, MPI_File_sync]
//! ```

use logos::Logos;

/// All token kinds produced by the DSL lexer.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t]+")]
pub enum TokenKind {
    #[token(":")]
    Colon,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token(",")]
    Comma,

    #[token("&")]
    Amp,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[regex(r"[0-9]+")]
    Number,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: core::ops::Range<usize>,
}

/// Tokenizes `input`, returning every token or the byte offset of the
/// first character that does not match any token.
///
/// # Errors
///
/// Returns the byte offset of the first unrecognized character.
pub fn tokenize(input: &str) -> Result<Vec<Token>, usize> {
    let mut lexer = TokenKind::lexer(input);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(kind) => tokens.push(Token {
                kind,
                text: lexer.slice().to_string(),
                span,
            }),
            Err(()) => return Err(span.start),
        }
    }
    Ok(tokens)
}
