//! Recursive-descent parser over the DSL's token stream.
//!
//! Grammar:
//! ```text
//! semantic_string = side "&" side
//! side            = label ":" offset bracket?
//! label           = "c1" | "c2"
//! offset          = "+" NUMBER | "-" NUMBER | "0"
//! bracket         = "[" (IDENT ("," IDENT)*)? "]"
//! ```

use verifyio_core::{CustomWitness, Offset};

use crate::lexer::{tokenize, Token, TokenKind};

/// A parse error with human-readable location information.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "parse error at line {}, column {}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

fn offset_to_line_col(input: &str, offset: usize) -> (usize, usize) {
    let safe_offset = offset.min(input.len());
    let prefix = &input[..safe_offset];
    let line = prefix.bytes().filter(|&b| b == b'\n').count() + 1;
    let column = prefix.rfind('\n').map_or_else(|| prefix.len() + 1, |pos| prefix.len() - pos);
    (line, column)
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    source: &'a str,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos);
        self.pos += 1;
        t
    }

    fn err_here(&self, message: impl Into<String>) -> ParseError {
        let offset = self.peek().map_or(self.source.len(), |t| t.span.start);
        let (line, column) = offset_to_line_col(self.source, offset);
        ParseError { message: message.into(), line, column }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<&Token, ParseError> {
        if self.peek().is_some_and(|t| &t.kind == kind) {
            Ok(self.advance().unwrap())
        } else {
            Err(self.err_here(format!("expected {kind:?}")))
        }
    }

    fn expect_ident(&mut self, text: &str) -> Result<(), ParseError> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Ident && t.text.eq_ignore_ascii_case(text) => {
                self.advance();
                Ok(())
            }
            _ => Err(self.err_here(format!("expected '{text}'"))),
        }
    }

    fn parse_func_list(&mut self) -> Result<Vec<String>, ParseError> {
        if !self.peek().is_some_and(|t| t.kind == TokenKind::BracketOpen) {
            return Ok(Vec::new());
        }
        self.advance();
        let mut funcs = Vec::new();
        if self.peek().is_some_and(|t| t.kind != TokenKind::BracketClose) {
            loop {
                let ident = self.expect(&TokenKind::Ident)?;
                funcs.push(ident.text.clone());
                if self.peek().is_some_and(|t| t.kind == TokenKind::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(&TokenKind::BracketClose)?;
        Ok(funcs)
    }

    fn parse_offset(&mut self) -> Result<Offset, ParseError> {
        match self.peek().map(|t| t.kind.clone()) {
            Some(TokenKind::Plus) => {
                self.advance();
                self.expect(&TokenKind::Number)?;
                let funcs = self.parse_func_list()?;
                Ok(Offset::Next(funcs))
            }
            Some(TokenKind::Minus) => {
                self.advance();
                self.expect(&TokenKind::Number)?;
                let funcs = self.parse_func_list()?;
                Ok(Offset::Prev(funcs))
            }
            Some(TokenKind::Number) => {
                let tok = self.advance().unwrap();
                if tok.text != "0" {
                    return Err(self.err_here("bare offset must be 0"));
                }
                Ok(Offset::Same)
            }
            _ => Err(self.err_here("expected an offset ('+k', '-k', or '0')")),
        }
    }

    fn parse_side(&mut self, label: &str) -> Result<Offset, ParseError> {
        self.expect_ident(label)?;
        self.expect(&TokenKind::Colon)?;
        self.parse_offset()
    }
}

/// Parses a `--semantic_string` value into a [`CustomWitness`].
///
/// # Errors
///
/// Returns a [`ParseError`] with line/column information when `input`
/// does not conform to the grammar.
pub fn parse_custom_semantics(input: &str) -> Result<CustomWitness, ParseError> {
    let tokens = tokenize(input).map_err(|offset| {
        let (line, column) = offset_to_line_col(input, offset);
        ParseError { message: "unrecognized character".to_string(), line, column }
    })?;

    let mut cursor = Cursor { tokens: &tokens, pos: 0, source: input };
    let c1 = cursor.parse_side("c1")?;
    cursor.expect(&TokenKind::Amp)?;
    let c2 = cursor.parse_side("c2")?;

    if cursor.peek().is_some() {
        return Err(cursor.err_here("unexpected trailing input"));
    }

    Ok(CustomWitness { c1, c2 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_custom_semantics() {
        let witness =
            parse_custom_semantics("c1:+1[MPI_File_close, MPI_File_sync] & c2:-1[MPI_File_open, MPI_File_sync]")
                .unwrap();
        assert_eq!(witness.c1, Offset::Next(vec!["MPI_File_close".to_string(), "MPI_File_sync".to_string()]));
        assert_eq!(witness.c2, Offset::Prev(vec!["MPI_File_open".to_string(), "MPI_File_sync".to_string()]));
    }

    #[test]
    fn test_parse_bare_zero_offset() {
        let witness = parse_custom_semantics("c1:0 & c2:0").unwrap();
        assert_eq!(witness.c1, Offset::Same);
        assert_eq!(witness.c2, Offset::Same);
    }

    #[test]
    fn test_parse_reports_line_column() {
        let err = parse_custom_semantics("c1:+1[x] @ c2:-1[y]").unwrap_err();
        assert_eq!(err.line, 1);
    }
}
