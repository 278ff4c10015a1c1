//! Names with a fixed meaning in LCPL.

pub const MAIN_CLASS: &str = "Main";
pub const MAIN_METHOD: &str = "main";

pub const OBJECT: &str = "Object";
pub const STRING: &str = "String";
pub const IO: &str = "IO";
pub const INT: &str = "Int";

/// Declared return type of a method without a value, and the type name of
/// the `void` literal.
pub const VOID: &str = "void";
/// Type name of expressions without a value.
pub const NO_TYPE: &str = "(none)";

pub const SELF: &str = "self";
