pub mod compile;
pub mod constants;
mod error;
pub mod lexer;
pub mod symbol;
pub mod token_stream;
pub mod tokens;
pub mod vm_writer;

use std::io::Write;

pub use self::error::{JackError, JackResult, LexError, SyntaxError};

/// Compile the source of one class, writing VM commands into the output.
///
/// The output is flushed and handed back when compilation succeeds. On
/// error, whatever was written before the failure is left in the output.
pub fn compile<W: Write>(source_code: &str, out: W) -> JackResult<W> {
    compile::CompilationEngine::new(source_code, out)?.compile_class()
}

/// Compile the source of one class into VM code text.
pub fn compile_str(source_code: &str) -> JackResult<String> {
    let bytes = compile(source_code, Vec::new())?;
    Ok(String::from_utf8(bytes)?)
}

pub mod prelude {
    pub use super::{
        compile::{CompilationEngine, SubroutineKind},
        error::{JackError, JackResult},
        lexer::Lexer,
        symbol::{Kind, SymbolTable},
        tokens::{Keyword, Span, Symbol, Token, TokenKind},
        vm_writer::{ArithmeticOp, Segment, VmWriter},
    };
}
