//! Textual VM command emitter.
use std::{
    fmt,
    io::{self, Write},
};

#[cfg(feature = "emit_trace")]
use log::trace;

/// Named memory region of the virtual machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl fmt::Display for Segment {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Constant => write!(f, "constant"),
            Self::Argument => write!(f, "argument"),
            Self::Local    => write!(f, "local"),
            Self::Static   => write!(f, "static"),
            Self::This     => write!(f, "this"),
            Self::That     => write!(f, "that"),
            Self::Pointer  => write!(f, "pointer"),
            Self::Temp     => write!(f, "temp"),
        }
    }
}

/// Arithmetic and logical commands operating on the top of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl fmt::Display for ArithmeticOp {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Sub => write!(f, "sub"),
            Self::Neg => write!(f, "neg"),
            Self::Eq  => write!(f, "eq"),
            Self::Gt  => write!(f, "gt"),
            Self::Lt  => write!(f, "lt"),
            Self::And => write!(f, "and"),
            Self::Or  => write!(f, "or"),
            Self::Not => write!(f, "not"),
        }
    }
}

/// Writes one VM command per line into the wrapped output.
///
/// No validation is done on segments, indices or names.
pub struct VmWriter<W: Write> {
    out: W,
}

impl<W: Write> VmWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_push(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        self.write_command(format_args!("push {} {}", segment, index))
    }

    pub fn write_pop(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        self.write_command(format_args!("pop {} {}", segment, index))
    }

    pub fn write_arithmetic(&mut self, op: ArithmeticOp) -> io::Result<()> {
        self.write_command(format_args!("{}", op))
    }

    pub fn write_label(&mut self, label: &str) -> io::Result<()> {
        self.write_command(format_args!("label {}", label))
    }

    pub fn write_goto(&mut self, label: &str) -> io::Result<()> {
        self.write_command(format_args!("goto {}", label))
    }

    pub fn write_if(&mut self, label: &str) -> io::Result<()> {
        self.write_command(format_args!("if-goto {}", label))
    }

    pub fn write_call(&mut self, name: &str, arg_count: u16) -> io::Result<()> {
        self.write_command(format_args!("call {} {}", name, arg_count))
    }

    pub fn write_function(&mut self, name: &str, local_count: u16) -> io::Result<()> {
        self.write_command(format_args!("function {} {}", name, local_count))
    }

    pub fn write_return(&mut self) -> io::Result<()> {
        self.write_command(format_args!("return"))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Flush and hand back the underlying output.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_command(&mut self, command: fmt::Arguments) -> io::Result<()> {
        #[cfg(feature = "emit_trace")]
        trace!("{}", command);

        writeln!(self.out, "{}", command)
    }
}
