//! Tag names written as the first child of every value node.

pub const NULL: &str = "null";
pub const UNDEFINED: &str = "undefined";
pub const BOOL: &str = "bool";
pub const INT: &str = "int";
pub const FLOAT: &str = "float";
pub const STR: &str = "str";
pub const ARRAY: &str = "array";
pub const OBJECT: &str = "object";
pub const REF: &str = "ref";

pub const TRUE: &str = "true";
pub const FALSE: &str = "false";

pub const NAN: &str = "NaN";
pub const INFINITY: &str = "Infinity";
pub const NEG_INFINITY: &str = "-Infinity";
