//! Cursor over the lexed token sequence.
use crate::{
    error::{JackResult, SyntaxError},
    lexer::Lexer,
    tokens::{Span, Token, TokenKind},
};

/// Buffered stream of tokens that allows arbitrary look ahead.
///
/// The whole source is lexed up front, so peeking any distance is a
/// plain index into the buffer and never mutates the cursor. The final
/// token is always [`TokenKind::EOF`], and the cursor never moves past it.
pub struct TokenStream<'a> {
    tokens: Vec<Token>,
    /// Index of the next token to be consumed.
    pos: usize,
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    original: &'a str,
}

impl<'a> TokenStream<'a> {
    /// Lex the source and build a stream over the result.
    pub fn new(source_code: &'a str) -> JackResult<Self> {
        let tokens = Lexer::tokenize(source_code)?;
        Ok(Self::from_tokens(source_code, tokens))
    }

    /// Wrap an existing token buffer.
    ///
    /// An `EOF` token is appended if the buffer doesn't end with one.
    pub fn from_tokens(source_code: &'a str, mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EOF) {
            let end = Span::new(source_code.len() as u32, 0);
            tokens.push(Token::new(TokenKind::EOF, end));
        }

        Self {
            tokens,
            pos: 0,
            original: source_code,
        }
    }

    pub fn source_code(&self) -> &'a str {
        self.original
    }

    /// Canonical text of the token.
    ///
    /// For string constants this is the content between the quotes.
    #[inline]
    pub fn text(&self, token: &Token) -> &'a str {
        token.span.fragment(self.original)
    }

    /// Return the current token without advancing the cursor.
    #[inline]
    pub fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    /// Look ahead `n` tokens past the current one without advancing the
    /// cursor. Looking past the end yields the `EOF` token.
    #[inline]
    pub fn peek_nth(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[usize::min(self.pos + n, last)]
    }

    /// Return the current token kind without advancing the cursor.
    #[inline]
    pub fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    /// Consumes the current token regardless of type.
    ///
    /// Returns `None` when the cursor is at the end of the token stream.
    pub fn next_token(&mut self) -> Option<Token> {
        let token = self.peek().clone();
        if token.kind == TokenKind::EOF {
            None
        } else {
            self.pos += 1;
            Some(token)
        }
    }

    /// Consumes the current token if it matches the given token kind.
    ///
    /// Returns true when matched. Returns false when token kinds
    /// do not match, or the token stream is at the end.
    ///
    /// Does not consume the token if the types do not match.
    pub fn match_token(&mut self, token_kind: impl Into<TokenKind>) -> bool {
        let token_kind = token_kind.into();
        if token_kind != TokenKind::EOF && self.peek_kind() == token_kind {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Return the current token and advance the cursor.
    ///
    /// The consumed token must match the given token type, otherwise
    /// a syntax error is returned. The cursor is not advanced if
    /// the token kind does not match.
    pub fn consume(&mut self, token_kind: impl Into<TokenKind>) -> JackResult<Token> {
        let token_kind = token_kind.into();
        self.consume_any(&[token_kind])
    }

    /// Consume the current token if it is any one of the given kinds.
    pub fn consume_any(&mut self, token_kinds: &[TokenKind]) -> JackResult<Token> {
        let kind = self.peek_kind();
        if kind != TokenKind::EOF && token_kinds.contains(&kind) {
            let token = self.peek().clone();
            self.pos += 1;
            return Ok(token);
        }

        let kind_names = token_kinds
            .iter()
            .map(|kind| format!("'{}'", kind))
            .collect::<Vec<_>>();
        let expected = match kind_names.len() {
            1 => kind_names[0].clone(),
            _ => format!("one of {}", kind_names.join(", ")),
        };
        Err(self.unexpected(expected).into())
    }

    /// Consume an identifier token, returning it along with its name.
    pub fn consume_ident(&mut self) -> JackResult<(Token, &'a str)> {
        let token = self.consume(TokenKind::Ident)?;
        let name = self.text(&token);
        Ok((token, name))
    }

    /// Build a syntax error describing what was expected at the current token.
    #[inline(never)]
    #[cold]
    pub fn unexpected(&self, expected: impl AsRef<str>) -> SyntaxError {
        let token = self.peek();
        let message = match token.kind {
            TokenKind::EOF => format!("expected {}, found end-of-file", expected.as_ref()),
            TokenKind::Ident | TokenKind::Str => format!(
                "expected {}, found {} '{}'",
                expected.as_ref(),
                token.kind.class_name(),
                self.text(token)
            ),
            kind => format!("expected {}, found '{}'", expected.as_ref(), kind),
        };
        SyntaxError::new(self.original, token, message)
    }
}
