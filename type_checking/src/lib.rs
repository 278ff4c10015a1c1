//! Semantic analysis of LCPL programs.
//!
//! [`check`] validates a [`ast::Program`] and annotates it in place with
//! resolved types, resolved variables and methods, and the implicit
//! conversions (as `Cast` nodes) the program relies on.
#![warn(rust_2018_idioms)]

pub mod builtin_types;
pub mod checker;
pub mod conversion;
pub mod hierarchy;
pub mod method_body_type_checker;
pub mod overload;
pub mod scope;
pub mod semantic_error;
pub mod signatures;
pub mod type_system;

pub use self::{
    checker::check,
    semantic_error::{SemanticError, SemanticResult},
    type_system::{CheckedType, ClassId, TypeSystem},
};
