use crate::{expr::Expr, located::Line, ty::Ty};
use derive_more::Display;
use serde_derive::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Stable handle of an expression node inside its program's [`ExprArena`].
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[display(fmt = "#{}", _0)]
#[serde(transparent)]
pub struct ExprId(usize);

impl ExprId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprNode {
    pub line: Line,
    pub expr: Expr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<Ty>,
}

/// Owns every expression of a program. Nodes are only ever appended, so an
/// `ExprId` stays valid for the arena's lifetime. Rewriting the tree means
/// allocating a node and pointing the parent's slot at it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExprArena {
    nodes: Vec<ExprNode>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, line: Line, expr: Expr) -> ExprId {
        self.nodes.push(ExprNode {
            line,
            expr,
            ty: None,
        });
        ExprId(self.nodes.len() - 1)
    }

    pub fn contains(&self, id: ExprId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExprId, &ExprNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (ExprId(idx), node))
    }
}

impl Index<ExprId> for ExprArena {
    type Output = ExprNode;

    fn index(&self, id: ExprId) -> &ExprNode {
        &self.nodes[id.0]
    }
}

impl IndexMut<ExprId> for ExprArena {
    fn index_mut(&mut self, id: ExprId) -> &mut ExprNode {
        &mut self.nodes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_handed_out_in_order() {
        let mut arena = ExprArena::new();
        let a = arena.alloc(1, Expr::int(1));
        let b = arena.alloc(2, Expr::VoidConstant);
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(arena[b].line, 2);
        assert_eq!(arena[a].ty, None);
        assert!(!arena.contains(ExprId(2)));
        assert_eq!(format!("{}", b), "#1");
    }

    #[test]
    fn unannotated_nodes_omit_type() {
        let mut arena = ExprArena::new();
        let id = arena.alloc(4, Expr::int(7));
        let json = serde_json::to_value(&arena).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "line": 4, "expr": { "kind": "IntConstant", "value": 7 } }])
        );
        arena[id].ty = Some(Ty::Int);
        let json = serde_json::to_value(&arena).unwrap();
        assert_eq!(json[0]["ty"], "Int");
    }
}
