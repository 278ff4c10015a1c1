//! The LCPL program tree handed to (and annotated by) semantic analysis.
//!
//! Expressions live in a per-program arena and refer to each other by
//! [`ExprId`]. Every node carries the source line it came from. Fields that
//! analysis fills in are optional and skipped on serialization while empty,
//! so loaded and annotated trees share one JSON format.
#![warn(rust_2018_idioms)]

mod arena;
mod expr;
mod located;
pub mod names;
mod program;
mod ty;

pub use self::{
    arena::{ExprArena, ExprId, ExprNode},
    expr::{BinaryOp, Expr, ExprKind, UnaryOp},
    located::{Line, Located},
    program::{Attribute, Class, Feature, FormalParam, Method, Program, ReferenceError},
    ty::{MethodRef, Ty, VarRef},
};
