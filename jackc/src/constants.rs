//! Constant values of the language and its target machine.

/// Largest integer constant the language accepts.
///
/// The VM works on 16-bit two's complement words, and negative
/// numbers are built by negating a positive literal.
pub const INT_MAX: u16 = 0x7FFF; // 32767

/// File extension of source files.
pub const SOURCE_EXT: &str = "jack";

/// File extension of generated VM code.
pub const OUTPUT_EXT: &str = "vm";

/// Name bound to the receiver object inside methods.
pub const RECEIVER: &str = "this";

// ----------------------------------------------------------------------------
// Operating system routines called by generated code.

/// Allocate a block of memory words, returning its base address.
pub const MEMORY_ALLOC: &str = "Memory.alloc";

/// The VM has no native multiply.
pub const MATH_MULTIPLY: &str = "Math.multiply";

/// The VM has no native divide.
pub const MATH_DIVIDE: &str = "Math.divide";

/// Construct an empty string with the given capacity.
pub const STRING_NEW: &str = "String.new";

/// Append a character code to a string, returning the string.
pub const STRING_APPEND_CHAR: &str = "String.appendChar";
