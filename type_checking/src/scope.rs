use crate::type_system::*;
use ast::{Line, VarRef};
use std::collections::HashMap;
use symtab::Scoped;

#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    pub ty: CheckedType,
    pub var: VarRef,
}

/// Name resolution inside one method body or attribute initializer.
///
/// Lookup order: `let`/branch scopes from the innermost outwards, then the
/// method's formal parameters, then the attributes of the current class and
/// its ancestors.
pub struct SymbolScopeStack<'ts> {
    type_system: &'ts TypeSystem,
    class: ClassId,
    locals: Scoped<String, VarDef>,
    params: HashMap<String, VarDef>,
}

impl<'ts> SymbolScopeStack<'ts> {
    pub fn new(type_system: &'ts TypeSystem, class: ClassId, params: &[MethodParamDef]) -> Self {
        let params = params
            .iter()
            .map(|param| {
                let def = VarDef {
                    ty: param.ty,
                    var: VarRef::Param {
                        name: param.name.clone(),
                    },
                };
                (param.name.clone(), def)
            })
            .collect();

        Self {
            type_system,
            class,
            locals: Scoped::new(),
            params,
        }
    }

    pub fn enter_scope(&mut self) {
        self.locals.enter_scope();
    }

    pub fn leave_scope(&mut self) {
        self.locals
            .leave_scope()
            .expect("scopes are entered and left in pairs");
    }

    /// Binds a `let` variable in the innermost scope.
    pub fn define_local(&mut self, name: &str, line: Line, ty: CheckedType) {
        let var = VarRef::Local {
            name: name.to_owned(),
            line,
        };
        self.locals.define(name.to_owned(), VarDef { ty, var });
    }

    pub fn lookup(&self, name: &str) -> Option<VarDef> {
        self.locals
            .visible_definition(name)
            .or_else(|| self.params.get(name))
            .cloned()
            .or_else(|| self.lookup_attribute(name))
    }

    /// Only the attribute tables of the current class and its ancestors.
    pub fn lookup_attribute(&self, name: &str) -> Option<VarDef> {
        self.type_system
            .lookup_attribute(self.class, name)
            .map(|attr| VarDef {
                ty: attr.ty,
                var: VarRef::Attribute {
                    class: self.type_system.class(attr.owner).name.clone(),
                    name: attr.name.clone(),
                },
            })
    }

    pub fn depth(&self) -> usize {
        self.locals.depth()
    }
}
