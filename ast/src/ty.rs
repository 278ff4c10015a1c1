use crate::{located::Line, names};
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// A resolved type as recorded in the tree.
///
/// Serialized as its type name, which is also how it is parsed back:
/// `"Int"`, `"(none)"` for [`Ty::NoType`], `"void"` for [`Ty::Null`] and
/// the class name for everything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Ty {
    Int,
    NoType,
    Null,
    Class(String),
}

impl Ty {
    pub fn name(&self) -> &str {
        match self {
            Ty::Int => names::INT,
            Ty::NoType => names::NO_TYPE,
            Ty::Null => names::VOID,
            Ty::Class(name) => name,
        }
    }
}

impl From<Ty> for String {
    fn from(ty: Ty) -> String {
        match ty {
            Ty::Class(name) => name,
            other => other.name().to_owned(),
        }
    }
}

impl From<String> for Ty {
    fn from(name: String) -> Ty {
        match name.as_str() {
            names::INT => Ty::Int,
            names::NO_TYPE => Ty::NoType,
            names::VOID => Ty::Null,
            _ => Ty::Class(name),
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a variable name resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum VarRef {
    Attribute { class: String, name: String },
    Param { name: String },
    /// A `let` binding, identified by the line of its definition.
    Local { name: String, line: Line },
    SelfParam,
}

/// The method a dispatch resolved to, by declaring class and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRef {
    pub class: String,
    pub name: String,
}
