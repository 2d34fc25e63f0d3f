//! Output emitter.
//!
//! The printer writes to an emitter; tests and the service use the
//! in-memory [`StringEmitter`].

/// Indentation unit, in spaces.
pub const INDENT_WIDTH: usize = 2;

/// Trait for emitting printed output.
pub trait Emitter {
    /// Emit a text fragment.
    fn emit(&mut self, text: &str);

    /// Emit a newline (Unix-style `\n`).
    fn emit_newline(&mut self);

    /// Emit indentation for `level` nesting levels.
    fn emit_indent(&mut self, level: usize);
}

/// String-based emitter for in-memory printing.
#[derive(Default)]
pub struct StringEmitter {
    buffer: String,
}

impl StringEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the printed output.
    pub fn output(self) -> String {
        self.buffer
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

impl Emitter for StringEmitter {
    #[inline]
    fn emit(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    #[inline]
    fn emit_newline(&mut self) {
        self.buffer.push('\n');
    }

    fn emit_indent(&mut self, level: usize) {
        for _ in 0..level * INDENT_WIDTH {
            self.buffer.push(' ');
        }
    }
}
