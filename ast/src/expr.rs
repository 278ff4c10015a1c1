use crate::{
    arena::ExprId,
    ty::{MethodRef, Ty, VarRef},
};
use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display, EnumDiscriminants};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumDiscriminants)]
#[strum_discriminants(name(ExprKind), derive(Display, Hash))]
#[serde(tag = "kind")]
pub enum Expr {
    Block {
        exprs: Vec<ExprId>,
    },
    /// `let name : type_name <- init in scope`
    LocalDefinition {
        name: String,
        type_name: String,
        init: Option<ExprId>,
        scope: Option<ExprId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variable_type: Option<Ty>,
    },
    /// A call on `object`, or on `self` when there is no receiver.
    BaseDispatch {
        object: Option<ExprId>,
        name: String,
        args: Vec<ExprId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<MethodRef>,
    },
    /// `object.static_type::name(args)`: the method is looked up in
    /// `static_type` instead of the receiver's own class.
    StaticDispatch {
        object: ExprId,
        static_type: String,
        name: String,
        args: Vec<ExprId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        self_type: Option<Ty>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<MethodRef>,
    },
    IfStatement {
        condition: ExprId,
        then_expr: ExprId,
        else_expr: Option<ExprId>,
    },
    WhileStatement {
        condition: ExprId,
        body: ExprId,
    },
    Cast {
        type_name: String,
        expr: ExprId,
    },
    NewObject {
        type_name: String,
    },
    /// `string[start, end]`
    SubString {
        string: ExprId,
        start: ExprId,
        end: ExprId,
    },
    /// `symbol <- expr`, where `symbol` may be qualified as `Class.attr`.
    Assignment {
        symbol: String,
        expr: ExprId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variable: Option<VarRef>,
    },
    Addition {
        lhs: ExprId,
        rhs: ExprId,
    },
    BinaryOp {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    UnaryOp {
        op: UnaryOp,
        expr: ExprId,
    },
    EqualComparison {
        lhs: ExprId,
        rhs: ExprId,
    },
    Symbol {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variable: Option<VarRef>,
    },
    IntConstant {
        value: i64,
    },
    StringConstant {
        value: String,
    },
    VoidConstant,
}

/// Integer operators other than `+`.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    #[strum(serialize = "*")]
    Multiplication,
    #[strum(serialize = "/")]
    Division,
    #[strum(serialize = "-")]
    Subtraction,
    #[strum(serialize = "<")]
    LessThan,
    #[strum(serialize = "<=")]
    LessThanEqual,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    #[strum(serialize = "-")]
    Minus,
    #[strum(serialize = "!")]
    Not,
}

impl Expr {
    pub fn kind(&self) -> ExprKind {
        ExprKind::from(self)
    }

    /// Direct children in evaluation order.
    pub fn children(&self) -> Vec<ExprId> {
        match self {
            Expr::Block { exprs } => exprs.clone(),
            Expr::LocalDefinition { init, scope, .. } => init.iter().chain(scope).cloned().collect(),
            Expr::BaseDispatch { object, args, .. } => {
                object.iter().chain(args).cloned().collect()
            }
            Expr::StaticDispatch { object, args, .. } => {
                std::iter::once(object).chain(args).cloned().collect()
            }
            Expr::IfStatement {
                condition,
                then_expr,
                else_expr,
            } => vec![*condition, *then_expr]
                .into_iter()
                .chain(*else_expr)
                .collect(),
            Expr::WhileStatement { condition, body } => vec![*condition, *body],
            Expr::SubString { string, start, end } => vec![*string, *start, *end],
            Expr::Cast { expr, .. } | Expr::Assignment { expr, .. } | Expr::UnaryOp { expr, .. } => {
                vec![*expr]
            }
            Expr::Addition { lhs, rhs }
            | Expr::BinaryOp { lhs, rhs, .. }
            | Expr::EqualComparison { lhs, rhs } => vec![*lhs, *rhs],
            Expr::NewObject { .. }
            | Expr::Symbol { .. }
            | Expr::IntConstant { .. }
            | Expr::StringConstant { .. }
            | Expr::VoidConstant => vec![],
        }
    }

    pub fn int(value: i64) -> Self {
        Expr::IntConstant { value }
    }

    pub fn string(value: &str) -> Self {
        Expr::StringConstant {
            value: value.to_owned(),
        }
    }

    pub fn symbol(name: &str) -> Self {
        Expr::Symbol {
            name: name.to_owned(),
            variable: None,
        }
    }

    pub fn new_object(type_name: &str) -> Self {
        Expr::NewObject {
            type_name: type_name.to_owned(),
        }
    }

    pub fn cast(type_name: &str, expr: ExprId) -> Self {
        Expr::Cast {
            type_name: type_name.to_owned(),
            expr,
        }
    }

    pub fn assign(symbol: &str, expr: ExprId) -> Self {
        Expr::Assignment {
            symbol: symbol.to_owned(),
            expr,
            variable: None,
        }
    }

    pub fn local(
        name: &str,
        type_name: &str,
        init: Option<ExprId>,
        scope: Option<ExprId>,
    ) -> Self {
        Expr::LocalDefinition {
            name: name.to_owned(),
            type_name: type_name.to_owned(),
            init,
            scope,
            variable_type: None,
        }
    }

    pub fn dispatch(object: Option<ExprId>, name: &str, args: Vec<ExprId>) -> Self {
        Expr::BaseDispatch {
            object,
            name: name.to_owned(),
            args,
            method: None,
        }
    }

    pub fn static_dispatch(
        object: ExprId,
        static_type: &str,
        name: &str,
        args: Vec<ExprId>,
    ) -> Self {
        Expr::StaticDispatch {
            object,
            static_type: static_type.to_owned(),
            name: name.to_owned(),
            args,
            self_type: None,
            method: None,
        }
    }
}
