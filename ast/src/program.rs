use crate::{
    arena::{ExprArena, ExprId},
    expr::Expr,
    located::Line,
    ty::Ty,
};
use failure::Fail;
use serde_derive::{Deserialize, Serialize};

/// A whole LCPL program: the user classes in declaration order plus the
/// arena that owns all their expressions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub line: Line,
    pub classes: Vec<Class>,
    #[serde(default)]
    pub exprs: ExprArena,
    /// `Object`, `String` and `IO` as analysis sees them. Rewritten on every
    /// run, never read back.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub builtins: Vec<Class>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub line: Line,
    pub name: String,
    /// Declared parent; `None` means `Object`.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub features: Vec<Feature>,
    /// Parent after resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Feature {
    Method(Method),
    Attribute(Attribute),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub line: Line,
    pub name: String,
    #[serde(default)]
    pub params: Vec<FormalParam>,
    pub return_type: String,
    #[serde(default)]
    pub body: Option<ExprId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type_data: Option<Ty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_param: Option<FormalParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub line: Line,
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub init: Option<ExprId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_data: Option<Ty>,
    /// `self` as seen from the initializer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_self: Option<FormalParam>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormalParam {
    pub line: Line,
    pub name: String,
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<Ty>,
}

/// The expressions of a loaded program do not form a tree.
#[derive(Debug, Fail, PartialEq, Eq)]
pub enum ReferenceError {
    #[fail(display = "expression {} refers to missing expression {}", parent, child)]
    Dangling { parent: String, child: ExprId },
    #[fail(
        display = "expression {} is reached a second time from {}",
        child, parent
    )]
    Shared { parent: String, child: ExprId },
}

impl Program {
    pub fn new(line: Line) -> Self {
        Program {
            line,
            ..Program::default()
        }
    }

    /// Allocate an expression node in this program's arena.
    pub fn expr(&mut self, line: Line, expr: Expr) -> ExprId {
        self.exprs.alloc(line, expr)
    }

    pub fn add_class(&mut self, class: Class) -> &mut Self {
        self.classes.push(class);
        self
    }

    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes.iter().find(|class| class.name == name)
    }

    /// Makes sure every `ExprId` stored in the tree points into the arena
    /// and every node hangs off exactly one parent slot or root. Trees built
    /// through this crate always pass; loaded ones might not.
    pub fn check_references(&self) -> Result<(), ReferenceError> {
        let mut roots = vec![];
        for class in self.classes.iter().chain(&self.builtins) {
            for feature in &class.features {
                let (name, root) = match feature {
                    Feature::Method(method) => (&method.name, method.body),
                    Feature::Attribute(attr) => (&attr.name, attr.init),
                };
                if let Some(root) = root {
                    roots.push((format!("{}.{}", class.name, name), root));
                }
            }
        }

        let dangling = |parent: &str, child: ExprId| {
            if self.exprs.contains(child) {
                Ok(())
            } else {
                Err(ReferenceError::Dangling {
                    parent: parent.to_owned(),
                    child,
                })
            }
        };
        for (parent, root) in &roots {
            dangling(parent, *root)?;
        }
        for (id, node) in self.exprs.iter() {
            for child in node.expr.children() {
                dangling(&id.to_string(), child)?;
            }
        }

        let mut seen = vec![false; self.exprs.len()];
        let mut pending = roots;
        while let Some((parent, id)) = pending.pop() {
            if std::mem::replace(&mut seen[id.index()], true) {
                return Err(ReferenceError::Shared { parent, child: id });
            }
            pending.extend(
                self.exprs[id]
                    .expr
                    .children()
                    .into_iter()
                    .map(|child| (id.to_string(), child)),
            );
        }
        Ok(())
    }
}

impl Class {
    pub fn new(line: Line, name: &str, parent: Option<&str>) -> Self {
        Class {
            line,
            name: name.to_owned(),
            parent: parent.map(str::to_owned),
            features: Vec::new(),
            parent_data: None,
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.features.push(Feature::Method(method));
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.features.push(Feature::Attribute(attribute));
        self
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.features.iter().filter_map(|feature| match feature {
            Feature::Method(method) => Some(method),
            Feature::Attribute(_) => None,
        })
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.features.iter().filter_map(|feature| match feature {
            Feature::Attribute(attr) => Some(attr),
            Feature::Method(_) => None,
        })
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods().find(|method| method.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes().find(|attr| attr.name == name)
    }
}

impl Method {
    pub fn new(
        line: Line,
        name: &str,
        params: Vec<FormalParam>,
        return_type: &str,
        body: Option<ExprId>,
    ) -> Self {
        Method {
            line,
            name: name.to_owned(),
            params,
            return_type: return_type.to_owned(),
            body,
            return_type_data: None,
            self_param: None,
            owner: None,
        }
    }
}

impl Attribute {
    pub fn new(line: Line, name: &str, type_name: &str, init: Option<ExprId>) -> Self {
        Attribute {
            line,
            name: name.to_owned(),
            type_name: type_name.to_owned(),
            init,
            type_data: None,
            init_self: None,
        }
    }
}

impl FormalParam {
    pub fn new(line: Line, name: &str, type_name: &str) -> Self {
        FormalParam {
            line,
            name: name.to_owned(),
            type_name: type_name.to_owned(),
            variable_type: None,
        }
    }
}
