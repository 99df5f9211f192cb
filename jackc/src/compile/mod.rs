//! Single pass compiler from source tokens to VM commands.
//!
//! There is no syntax tree. Each grammar rule is a method that consumes
//! exactly the tokens of its production and writes VM commands as it goes,
//! leaving the cursor on the first token of whatever follows.
mod class;
mod expr;
mod stmts;
mod subroutine;

use std::{fmt, io::Write};

use smol_str::SmolStr;

use crate::{
    constants::INT_MAX,
    error::{JackError, JackResult, SyntaxError},
    symbol::{Kind, SymbolTable},
    token_stream::TokenStream,
    tokens::Token,
    vm_writer::{Segment, VmWriter},
};

/// Compiles one class into VM commands.
///
/// The engine owns everything a compilation needs, so independent
/// units can be compiled on separate threads without sharing state.
pub struct CompilationEngine<'a, W: Write> {
    input: TokenStream<'a>,
    symbols: SymbolTable,
    writer: VmWriter<W>,
    /// Name of the class being compiled, qualifies subroutine names.
    class_name: SmolStr,
    /// Running count for `if` and `while` labels, never reset within a unit.
    label_count: u32,
}

impl<'a, W: Write> CompilationEngine<'a, W> {
    /// Lex the source and prepare to write into the given output.
    ///
    /// The next call must be [`CompilationEngine::compile_class`].
    pub fn new(source_code: &'a str, out: W) -> JackResult<Self> {
        Ok(Self {
            input: TokenStream::new(source_code)?,
            symbols: SymbolTable::new(),
            writer: VmWriter::new(out),
            class_name: SmolStr::default(),
            label_count: 0,
        })
    }

    /// Allocate a fresh label name.
    fn next_label(&mut self) -> String {
        let label = format!("L{}", self.label_count);
        self.label_count += 1;
        label
    }

    /// Declare a name in the current scope of its kind.
    fn define(&mut self, token: &Token, name: &str, ty: SmolStr, kind: Kind) -> JackResult<()> {
        match self.symbols.define(name, ty, kind) {
            Some(_) => Ok(()),
            None => {
                let message = format!("more than {} {} declarations", INT_MAX, kind);
                Err(self.error_at(token, message))
            }
        }
    }

    /// Syntax error pointing at an already consumed token.
    #[inline(never)]
    #[cold]
    fn error_at(&self, token: &Token, message: impl ToString) -> JackError {
        SyntaxError::new(self.input.source_code(), token, message).into()
    }

    /// Resolve a variable name to its storage location.
    ///
    /// Names declared in neither scope are an error, since emitting code
    /// for them would reference a segment that doesn't exist.
    fn resolve(&self, token: &Token, name: &str) -> JackResult<(Segment, u16)> {
        match self.symbols.lookup(name) {
            Some(symbol) => Ok((symbol.kind.segment(), symbol.index)),
            None => Err(JackError::UndefinedSymbol {
                name: name.into(),
                line: token.span.line_number(self.input.source_code()),
            }),
        }
    }
}

/// The three flavours of subroutine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineKind {
    /// Allocates the object and binds the receiver before its body runs.
    Constructor,
    /// Plain function without a receiver.
    Function,
    /// Receives the object as a hidden first argument.
    Method,
}

impl fmt::Display for SubroutineKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Constructor => write!(f, "constructor"),
            Self::Function => write!(f, "function"),
            Self::Method => write!(f, "method"),
        }
    }
}
