//! Implicit conversions between expression types.
use crate::{builtin_types, type_system::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// The value is used as is.
    Keep,
    /// A `Cast` to the given type has to be wrapped around the value.
    Cast(CheckedType),
}

/// How a value of type `from` can be used where `to` is expected, or `None`
/// if it cannot. `Int` converts to `String`, a class converts to any of its
/// ancestors, and the `void` literal is accepted everywhere.
pub fn conversion(type_system: &TypeSystem, from: CheckedType, to: CheckedType) -> Option<Conversion> {
    use self::CheckedType::*;

    if from == to {
        return Some(Conversion::Keep);
    }
    match (from, to) {
        (Null, _) => Some(Conversion::Keep),
        (Int, TypeRef(builtin_types::STRING)) => Some(Conversion::Cast(to)),
        (TypeRef(class), TypeRef(ancestor)) if type_system.is_strict_ancestor(ancestor, class) => {
            Some(Conversion::Cast(to))
        }
        _ => None,
    }
}
