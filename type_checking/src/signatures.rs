//! First pass over class bodies: register every method and attribute with
//! resolved types, so that bodies can refer to features declared later.
use crate::{
    semantic_error::{SemanticError, SemanticResult},
    type_system::*,
};
use ast::{names, Attribute, Class, Feature, Method};
use log::{trace, warn};

pub struct FeatureSignatureResolver<'ts> {
    type_system: &'ts mut TypeSystem,
}

impl<'ts> FeatureSignatureResolver<'ts> {
    pub fn new(type_system: &'ts mut TypeSystem) -> Self {
        Self { type_system }
    }

    /// Methods are registered before attributes.
    pub fn resolve_class(&mut self, class_id: ClassId, class: &mut Class) -> SemanticResult<()> {
        for feature in &mut class.features {
            if let Feature::Method(method) = feature {
                self.resolve_method(class_id, method)?;
            }
        }
        for feature in &mut class.features {
            if let Feature::Attribute(attribute) = feature {
                self.resolve_attribute(class_id, attribute)?;
            }
        }
        Ok(())
    }

    pub fn resolve_method(
        &mut self,
        class_id: ClassId,
        method: &mut Method,
    ) -> SemanticResult<()> {
        let class_name = self.type_system.class(class_id).name.clone();
        if self.type_system.class(class_id).own_method(&method.name).is_some() {
            return Err(SemanticError::DuplicateMethod {
                class: class_name,
                method: method.name.clone(),
            }
            .at(method.line));
        }

        method.owner = Some(class_name.clone());
        method.self_param = Some(self.type_system.self_param(class_id, method.line));

        let mut params = Vec::with_capacity(method.params.len());
        for param in &mut method.params {
            let ty = self.resolve_declared(&param.type_name, param.line)?;
            param.variable_type = Some(self.type_system.annotation(ty));
            params.push(MethodParamDef::new(&param.name, &param.type_name, ty));
        }

        let return_ty = if method.return_type == names::VOID {
            Some(CheckedType::NoType)
        } else {
            self.type_system.resolve_type(&method.return_type)
        };
        match return_ty {
            Some(ty) => method.return_type_data = Some(self.type_system.annotation(ty)),
            None => warn!(
                "return type {} of {}.{} does not resolve, leaving it unchecked",
                method.return_type, class_name, method.name
            ),
        }

        trace!("method {}.{}", class_name, method.name);
        self.type_system
            .class_mut(class_id)
            .add_method(ClassMethodDef {
                name: method.name.clone(),
                line: method.line,
                owner: class_id,
                params,
                return_type_name: method.return_type.clone(),
                return_ty,
            })
            .expect("checked for duplicates above");
        Ok(())
    }

    pub fn resolve_attribute(
        &mut self,
        class_id: ClassId,
        attribute: &mut Attribute,
    ) -> SemanticResult<()> {
        let ty = self.resolve_declared(&attribute.type_name, attribute.line)?;
        attribute.type_data = Some(self.type_system.annotation(ty));

        let def = ClassAttributeDef {
            name: attribute.name.clone(),
            owner: class_id,
            type_name: attribute.type_name.clone(),
            ty,
        };
        let class = self.type_system.class_mut(class_id);
        class.add_attribute(def).map_err(|_| {
            SemanticError::DuplicateAttribute {
                class: class.name.clone(),
                attribute: attribute.name.clone(),
            }
            .at(attribute.line)
        })
    }

    fn resolve_declared(&self, type_name: &str, line: ast::Line) -> SemanticResult<CheckedType> {
        self.type_system.resolve_type(type_name).ok_or_else(|| {
            SemanticError::ClassNotFound {
                class: type_name.to_owned(),
            }
            .at(line)
        })
    }
}
