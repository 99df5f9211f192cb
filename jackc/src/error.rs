//! Result and errors.
use std::{
    fmt::{self, Display, Formatter},
    io,
    string::FromUtf8Error,
};

use smol_str::SmolStr;

use crate::tokens::{Span, Token};

pub type JackResult<T> = std::result::Result<T, JackError>;

#[derive(Debug)]
pub enum JackError {
    /// Source text could not be split into tokens.
    Lex(LexError),
    /// Token did not fit the grammar at the current position.
    Syntax(SyntaxError),
    /// A name used as a value was declared in neither the
    /// subroutine nor the class scope.
    UndefinedSymbol { name: SmolStr, line: usize },
    /// Output could not be opened or written.
    Io(io::Error),
    /// Input file is not valid UTF-8.
    Utf8(FromUtf8Error),
}

impl Display for JackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(err) => write!(f, "{}", err),
            Self::Syntax(err) => write!(f, "{}", err),
            Self::UndefinedSymbol { name, line } => {
                write!(f, "line {}: undefined symbol '{}'", line, name)
            }
            Self::Io(err) => write!(f, "resource error: {}", err),
            Self::Utf8(err) => write!(f, "source is not valid UTF-8: {}", err),
        }
    }
}

impl std::error::Error for JackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Lex(err) => Some(err),
            Self::Syntax(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Utf8(err) => Some(err),
            Self::UndefinedSymbol { .. } => None,
        }
    }
}

impl From<LexError> for JackError {
    fn from(err: LexError) -> Self {
        JackError::Lex(err)
    }
}

impl From<SyntaxError> for JackError {
    fn from(err: SyntaxError) -> Self {
        JackError::Syntax(err)
    }
}

impl From<io::Error> for JackError {
    fn from(err: io::Error) -> Self {
        JackError::Io(err)
    }
}

impl From<FromUtf8Error> for JackError {
    fn from(err: FromUtf8Error) -> Self {
        JackError::Utf8(err)
    }
}

/// Failure to classify a piece of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// Character that can't start any token.
    UnknownCharacter { c: char, line: usize },
    /// Text that matches no keyword, symbol, number or identifier grammar.
    InvalidToken { fragment: String, line: usize },
    /// Integer literal outside of `0..=32767`.
    IntegerOverflow { fragment: String, line: usize },
    UnterminatedString { line: usize },
    UnterminatedComment { line: usize },
}

impl LexError {
    pub fn line(&self) -> usize {
        match self {
            Self::UnknownCharacter { line, .. }
            | Self::InvalidToken { line, .. }
            | Self::IntegerOverflow { line, .. }
            | Self::UnterminatedString { line }
            | Self::UnterminatedComment { line } => *line,
        }
    }
}

impl Display for LexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "lexical error at line {}: ", self.line())?;
        match self {
            Self::UnknownCharacter { c, .. } => write!(f, "unknown character {:?}", c),
            Self::InvalidToken { fragment, .. } => {
                write!(f, "the token '{}' doesn't have a matching type", fragment)
            }
            Self::IntegerOverflow { fragment, .. } => {
                write!(f, "integer constant {} is out of range 0..=32767", fragment)
            }
            Self::UnterminatedString { .. } => write!(f, "unterminated string constant"),
            Self::UnterminatedComment { .. } => write!(f, "unterminated block comment"),
        }
    }
}

impl std::error::Error for LexError {}

/// Grammar error, with enough context to point at the offending source line.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    pub span: Span,
    pub line: usize,
    pub column: usize,
    pub message: String,
    /// Source line containing the token, without the trailing newline.
    pub excerpt: String,
}

impl SyntaxError {
    pub fn new(source_code: &str, token: &Token, message: impl ToString) -> Self {
        let span = token.span;
        let (line, _) = span.surrounding_line(source_code);

        Self {
            span,
            line: span.line_number(source_code),
            column: span.column(source_code),
            message: message.to_string(),
            excerpt: line.trim_end_matches(|c: char| c == '\r' || c == '\n').to_owned(),
        }
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "syntax error at line {}: {}", self.line, self.message)?;
        writeln!(f, "    {}", self.excerpt)?;
        let width = (self.span.size as usize).max(1);
        write!(f, "    {}{}", " ".repeat(self.column), "^".repeat(width))
    }
}

impl std::error::Error for SyntaxError {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tokens::{Symbol, TokenKind};

    #[test]
    fn test_syntax_error_points_at_token() {
        const CODE: &str = "class Main {\n  let x = 1 }\n";
        let token = Token::new(TokenKind::Symbol(Symbol::RightBrace), Span::new(25, 1));
        assert_eq!(token.span.fragment(CODE), "}");

        let err = SyntaxError::new(CODE, &token, "expected ';'");
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 12);
        assert_eq!(err.excerpt, "  let x = 1 }");
        assert_eq!(
            err.to_string(),
            "syntax error at line 2: expected ';'\n      let x = 1 }\n                ^"
        );
    }
}
