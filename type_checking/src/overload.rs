//! Overriding rules: a redefined method keeps its ancestor's signature, an
//! attribute is never redefined.
use crate::{
    semantic_error::{SemanticError, SemanticResult},
    type_system::*,
};
use itertools::Itertools;

pub struct OverloadValidator<'ts> {
    type_system: &'ts TypeSystem,
}

impl<'ts> OverloadValidator<'ts> {
    pub fn new(type_system: &'ts TypeSystem) -> Self {
        Self { type_system }
    }

    /// Compares `class.method` against the nearest ancestor method of the
    /// same name, by parameter count, then return type name, then parameter
    /// type names.
    pub fn check_method(&self, class: ClassId, method: &str) -> SemanticResult<()> {
        let own = self
            .type_system
            .class(class)
            .own_method(method)
            .expect("method was registered by the signature pass");
        let inherited = match self.type_system.overridden_method(class, method) {
            Some(inherited) => inherited,
            None => return Ok(()),
        };

        if own.params.len() != inherited.params.len() {
            return Err(SemanticError::OverrideArityMismatch.at(own.line));
        }
        if own.return_type_name != inherited.return_type_name {
            return Err(SemanticError::OverrideReturnTypeMismatch.at(own.line));
        }
        let changed = own
            .params
            .iter()
            .zip_eq(&inherited.params)
            .find(|(mine, theirs)| mine.type_name != theirs.type_name);
        if let Some((param, _)) = changed {
            return Err(SemanticError::OverrideParamTypeMismatch {
                param: param.name.clone(),
            }
            .at(own.line));
        }
        Ok(())
    }

    /// Fails if any strict ancestor of `class` declares `attribute`.
    pub fn check_attribute(&self, class: ClassId, attribute: &str) -> SemanticResult<()> {
        let redefined = self
            .type_system
            .ancestors(class)
            .any(|id| self.type_system.class(id).own_attribute(attribute).is_some());
        if redefined {
            Err(SemanticError::AttributeRedefined {
                attribute: attribute.to_owned(),
            }
            .at(self.type_system.class(class).line))
        } else {
            Ok(())
        }
    }
}
