//! Emission for the `BinaryGenerated` stage.
//!
//! A program is lowered to a [`CompiledUnit`]: a flat summary of its
//! imports, exports, functions and classes. Units are stored as
//!
//! ```text
//! +------+---------+---------------------------+
//! | ARBC | version | bincode(CompiledUnit)     |
//! +------+---------+---------------------------+
//!   4 B     1 B
//! ```

mod codec;
mod unit;

pub use codec::{decode, encode, EmitError, FORMAT_VERSION, MAGIC};
pub use unit::{lower, ClassRecord, CompiledUnit, FunctionRecord, ImportRecord};

#[cfg(test)]
mod tests;
