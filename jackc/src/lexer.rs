//! Lexical analysis
use std::str::CharIndices;

use itertools::{multipeek, MultiPeek};

use crate::{
    constants::INT_MAX,
    error::LexError,
    tokens::{Keyword, Span, Symbol, Token, TokenKind},
};

pub struct Lexer<'a> {
    /// Character scanner
    source: SourceText<'a>,
    /// Start absolute byte position of the current token
    /// in the source.
    start_pos: u32,
    /// Line where the current token starts, for error reporting.
    start_line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        Self {
            source: SourceText::new(source_code),
            start_pos: 0,
            start_line: 1,
        }
    }

    /// Lex the whole source up front.
    ///
    /// The returned sequence always ends with exactly one [`TokenKind::EOF`].
    pub fn tokenize(source_code: &'a str) -> Result<Vec<Token>, LexError> {
        Lexer::new(source_code).into_iter().collect()
    }

    /// Original source code that was passed in during construction.
    pub fn source_code(&self) -> &'a str {
        self.source.original
    }

    /// Scan the source characters and construct the next token.
    ///
    /// Whitespace and comments preceding the token are discarded. Once the
    /// source is exhausted every call returns an `EOF` token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.erase_trivia()?;
        self.start_token();

        match self.source.next_char() {
            Some('"') => self.consume_string(),
            Some(c) if is_digit(c) => self.consume_number(),
            Some(c) if is_letter(c) => Ok(self.consume_ident()),
            Some(c) => match Symbol::parse(c) {
                Some(symbol) => Ok(self.make_token(TokenKind::Symbol(symbol))),
                None => Err(LexError::UnknownCharacter {
                    c,
                    line: self.start_line,
                }),
            },
            None => Ok(self.make_token(TokenKind::EOF)),
        }
    }

    /// Create a span using the starting position of the current token,
    /// and the current offset of the cursor.
    fn make_span(&mut self) -> Span {
        let start = self.start_pos;
        let end = self.source.offset();

        // start and end can be equal, and a token can have 0 size.
        debug_assert!(end >= start);
        Span {
            index: start,
            size: end - start,
        }
    }

    fn fragment(&mut self) -> &'a str {
        let original = self.source.original;
        self.make_span().fragment(original)
    }

    /// Primes the lexer to consume the next token.
    fn start_token(&mut self) {
        self.start_pos = self.source.offset();
        self.start_line = self.source.line;
    }

    fn make_token(&mut self, kind: TokenKind) -> Token {
        Token {
            span: self.make_span(),
            kind,
        }
    }
}

/// Specialised tokens.
impl<'a> Lexer<'a> {
    /// Erase whitespace and all three comment forms until the start
    /// of the next token, or the end of the source.
    fn erase_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.source.peek_char2() {
                (Some(c), _) if is_whitespace(c) => {
                    self.source.next_char();
                }
                (Some('/'), Some('/')) => self.erase_line_comment(),
                (Some('/'), Some('*')) => self.erase_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    /// Erase comment line up to, but not including, the trailing newline.
    fn erase_line_comment(&mut self) {
        while let Some(c) = self.source.peek_char() {
            if is_newline(c) {
                break;
            }
            self.source.next_char();
        }
    }

    /// Erase `/* ... */` and documentation `/** ... */` comments.
    fn erase_block_comment(&mut self) -> Result<(), LexError> {
        let line = self.source.line;

        // Opening `/*`, so `/*/` can't close itself.
        self.source.next_char();
        self.source.next_char();

        loop {
            match self.source.peek_char2() {
                (Some('*'), Some('/')) => {
                    self.source.next_char();
                    self.source.next_char();
                    return Ok(());
                }
                (Some(_), _) => {
                    self.source.next_char();
                }
                (None, _) => return Err(LexError::UnterminatedComment { line }),
            }
        }
    }

    /// Make a string literal token, with the span excluding the quotes.
    fn consume_string(&mut self) -> Result<Token, LexError> {
        // Opening quote was already consumed.
        self.start_pos = self.source.offset();

        loop {
            match self.source.peek_char() {
                Some('"') => break,
                Some(c) if !is_newline(c) => {
                    self.source.next_char();
                }
                _ => {
                    return Err(LexError::UnterminatedString {
                        line: self.start_line,
                    })
                }
            }
        }

        let token = self.make_token(TokenKind::Str);

        // Closing quote
        self.source.next_char();

        Ok(token)
    }

    /// Make an identifier token, or a keyword if the text is reserved.
    fn consume_ident(&mut self) -> Token {
        while let Some(c) = self.source.peek_char() {
            if !is_letter_or_digit(c) {
                break;
            }
            self.source.next_char();
        }

        let token_kind = match Keyword::parse(self.fragment()) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Ident,
        };

        self.make_token(token_kind)
    }

    /// Make an integer literal token.
    ///
    /// Identifier characters glued to the digits are consumed along with
    /// them, so `12abc` is reported as a whole instead of splitting into two
    /// valid tokens.
    fn consume_number(&mut self) -> Result<Token, LexError> {
        while let Some(c) = self.source.peek_char() {
            if !is_letter_or_digit(c) {
                break;
            }
            self.source.next_char();
        }

        let fragment = self.fragment();
        if !fragment.chars().all(is_digit) {
            return Err(LexError::InvalidToken {
                fragment: fragment.to_owned(),
                line: self.start_line,
            });
        }

        match fragment.parse::<u32>() {
            Ok(value) if value <= INT_MAX as u32 => {
                Ok(self.make_token(TokenKind::Int(value as u16)))
            }
            _ => Err(LexError::IntegerOverflow {
                fragment: fragment.to_owned(),
                line: self.start_line,
            }),
        }
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0020}' // space
            | '\u{0009}' // tab
            | '\u{000A}' // line feed
            | '\u{000D}' // carriage return
            | '\u{000C}' // form feed
            | '\u{00A0}' // no-break space
            | '\u{FEFF}' // zero width no-break space
    )
}

fn is_newline(c: char) -> bool {
    matches!(c, '\r' | '\n')
}

#[allow(clippy::manual_is_ascii_check)] // consistency with other functions
fn is_digit(c: char) -> bool {
    matches!(c, '0'..='9')
}

fn is_letter(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

fn is_letter_or_digit(c: char) -> bool {
    is_letter(c) || is_digit(c)
}

impl<'a> IntoIterator for Lexer<'a> {
    type Item = Result<Token, LexError>;
    type IntoIter = LexerIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        LexerIter {
            lexer: self,
            done: false,
        }
    }
}

/// Convenience iterator that wraps the lexer.
///
/// Stops after the `EOF` token or the first error.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct LexerIter<'a> {
    // Track end so an EOF token is emitted once.
    done: bool,
    lexer: Lexer<'a>,
}

impl<'a> Iterator for LexerIter<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.lexer.next_token();
        self.done = !matches!(
            result,
            Ok(Token {
                kind: TokenKind::Ident
                    | TokenKind::Keyword(_)
                    | TokenKind::Symbol(_)
                    | TokenKind::Int(_)
                    | TokenKind::Str,
                ..
            })
        );
        Some(result)
    }
}

/// Wrapper for source code that keeps a cursor position.
///
/// Allows forward lookup via peeking.
struct SourceText<'a> {
    original: &'a str,

    /// An important semantic feature of `MultiPeek` is that peeking advances
    /// the internal peek cursor by 1. Each call will return the next element.
    /// The peek cursor offset is restored to 0 when calling `MultiPeek::next()`
    /// or `MultiPeek::reset_peek()`.
    chars: MultiPeek<CharIndices<'a>>,

    /// Line of the next character to be consumed.
    line: usize,
}

impl<'a> SourceText<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            original: source,
            chars: multipeek(source.char_indices()),
            line: 1,
        }
    }

    /// Advance the cursor and return the consumed character.
    fn next_char(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Peeks the next character in the stream, without consuming it.
    fn peek_char(&mut self) -> Option<char> {
        self.chars.reset_peek();
        let c = self.chars.peek().map(|(_, c)| *c);
        self.chars.reset_peek();
        c
    }

    /// Two character lookahead.
    fn peek_char2(&mut self) -> (Option<char>, Option<char>) {
        self.chars.reset_peek();
        let pair = (
            self.chars.peek().map(|(_, c)| *c),
            self.chars.peek().map(|(_, c)| *c),
        );
        self.chars.reset_peek();
        pair
    }

    /// Byte position of the next character, or the source
    /// length when at the end.
    fn offset(&mut self) -> u32 {
        self.chars.reset_peek();
        let offset = self
            .chars
            .peek()
            .map(|(i, _)| *i)
            .unwrap_or(self.original.len());
        self.chars.reset_peek();
        offset as u32
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_lex_let_statement() {
        use Keyword as K;
        use Symbol as S;
        use TokenKind as TK;

        assert_eq!(
            kinds("let a[i] = 5;"),
            vec![
                TK::Keyword(K::Let),
                TK::Ident,
                TK::Symbol(S::LeftBracket),
                TK::Ident,
                TK::Symbol(S::RightBracket),
                TK::Symbol(S::Eq),
                TK::Int(5),
                TK::Symbol(S::Semicolon),
                TK::EOF,
            ]
        );
    }

    #[test]
    fn test_lex_comments() {
        const CODE: &str = "/** doc\n * comment */\nvar // trailing\n/* block */ int x;";

        let tokens = Lexer::tokenize(CODE).unwrap();
        let fragments = tokens
            .iter()
            .map(|token| token.span.fragment(CODE))
            .collect::<Vec<_>>();
        assert_eq!(fragments, vec!["var", "int", "x", ";", ""]);
    }

    #[test]
    fn test_lex_string_strips_quotes() {
        const CODE: &str = r#"do Output.printString("a, b; (c)");"#;

        let tokens = Lexer::tokenize(CODE).unwrap();
        let string = tokens
            .iter()
            .find(|token| token.kind == TokenKind::Str)
            .unwrap();
        assert_eq!(string.span.fragment(CODE), "a, b; (c)");
        assert_eq!(tokens.len(), 9);
    }

    #[test]
    fn test_lex_keyword_precedence() {
        assert_eq!(
            kinds("this thisx _this"),
            vec![
                TokenKind::Keyword(Keyword::This),
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn test_lex_integer_range() {
        assert_eq!(kinds("0 32767")[..2], [TokenKind::Int(0), TokenKind::Int(32767)]);
        assert_eq!(
            Lexer::tokenize("32768").unwrap_err(),
            LexError::IntegerOverflow {
                fragment: "32768".to_owned(),
                line: 1
            }
        );
        assert!(matches!(
            Lexer::tokenize("99999999999999999999"),
            Err(LexError::IntegerOverflow { .. })
        ));
    }

    #[test]
    fn test_lex_errors() {
        assert_eq!(
            Lexer::tokenize("let x = 1;\nlet y = #;").unwrap_err(),
            LexError::UnknownCharacter { c: '#', line: 2 }
        );
        assert_eq!(
            Lexer::tokenize("12ab").unwrap_err(),
            LexError::InvalidToken {
                fragment: "12ab".to_owned(),
                line: 1
            }
        );
        assert_eq!(
            Lexer::tokenize("\"open\nstring\"").unwrap_err(),
            LexError::UnterminatedString { line: 1 }
        );
        assert_eq!(
            Lexer::tokenize("x\n/* never closed").unwrap_err(),
            LexError::UnterminatedComment { line: 2 }
        );
    }

    #[test]
    fn test_lex_eof_once() {
        let mut iter = Lexer::new("x").into_iter();
        assert_eq!(iter.next().unwrap().unwrap().kind, TokenKind::Ident);
        assert_eq!(iter.next().unwrap().unwrap().kind, TokenKind::EOF);
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_lex_division_is_not_comment() {
        assert_eq!(
            kinds("a / b"),
            vec![
                TokenKind::Ident,
                TokenKind::Symbol(Symbol::Slash),
                TokenKind::Ident,
                TokenKind::EOF,
            ]
        );
    }
}
