//! Class names, parent links, inheritance cycles and the program entry point.
use crate::{
    builtin_types,
    semantic_error::{SemanticError, SemanticResult},
    type_system::*,
};
use ast::{names, Program};
use log::debug;
use std::collections::HashSet;

pub struct ClassHierarchyValidator<'ts> {
    type_system: &'ts mut TypeSystem,
}

impl<'ts> ClassHierarchyValidator<'ts> {
    pub fn new(type_system: &'ts mut TypeSystem) -> Self {
        Self { type_system }
    }

    /// Registers every user class. Names are unique across user classes and
    /// the built-ins, which must already be registered.
    pub fn register_classes(&mut self, program: &Program) -> SemanticResult<()> {
        for (idx, class) in program.classes.iter().enumerate() {
            let def = ClassDef::new(
                &class.name,
                class.line,
                ClassOrigin::Declared(idx),
                class.parent.as_ref().map(String::as_str),
            );
            self.type_system.add_class_def(def).map_err(|_| {
                SemanticError::DuplicateClass {
                    class: class.name.clone(),
                }
                .at(class.line)
            })?;
        }
        debug!("registered {} user classes", program.classes.len());
        Ok(())
    }

    /// Links each user class to its parent. A missing parent means `Object`.
    pub fn resolve_parents(&mut self) -> SemanticResult<()> {
        let declared: Vec<ClassId> = self
            .type_system
            .declared_classes()
            .map(|(id, _)| id)
            .collect();

        for id in declared {
            let class = self.type_system.class(id);
            let parent = match &class.declared_parent {
                None => builtin_types::OBJECT,
                Some(name) => self.type_system.lookup_class(name).ok_or_else(|| {
                    SemanticError::ClassNotFound {
                        class: name.clone(),
                    }
                    .at(class.line)
                })?,
            };
            if parent == builtin_types::STRING {
                return Err(SemanticError::CannotInheritString.at(class.line));
            }
            self.type_system.class_mut(id).parent = Some(parent);
        }
        Ok(())
    }

    /// Fails on the first class, in registration order, whose parent chain
    /// leads back to itself.
    pub fn check_cycles(&self) -> SemanticResult<()> {
        for id in self.type_system.class_ids() {
            let mut seen = HashSet::new();
            let mut current = self.type_system.class(id).parent;
            while let Some(ancestor) = current {
                if ancestor == id {
                    let class = self.type_system.class(id);
                    return Err(SemanticError::InheritanceCycle {
                        class: class.name.clone(),
                    }
                    .at(class.line));
                }
                if !seen.insert(ancestor) {
                    // a cycle further up that does not include `id`
                    break;
                }
                current = self.type_system.class(ancestor).parent;
            }
        }
        Ok(())
    }

    /// `Main` must exist and define or inherit a `main()` without
    /// parameters. Both failures are reported at the program.
    pub fn check_main(&self, program: &Program) -> SemanticResult<()> {
        let main_class = self.type_system.lookup_class(names::MAIN_CLASS).ok_or_else(|| {
            SemanticError::ClassNotFound {
                class: names::MAIN_CLASS.to_owned(),
            }
            .at(program.line)
        })?;

        match self.type_system.lookup_method(main_class, names::MAIN_METHOD) {
            Some(main) if main.params.is_empty() => Ok(()),
            _ => Err(SemanticError::MethodNotFound {
                method: names::MAIN_METHOD.to_owned(),
                class: names::MAIN_CLASS.to_owned(),
            }
            .at(program.line)),
        }
    }
}
