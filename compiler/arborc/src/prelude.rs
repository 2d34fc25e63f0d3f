//! The implicit standard-library program every program depends on.

/// Module name of the prelude, as an import specifier.
pub const PRELUDE_NAME: &str = "std/prelude";

/// Declarations visible in every program without an import.
pub const PRELUDE_SOURCE: &str = "\
declare function print(value) {}
declare function assert(value) {}
";
