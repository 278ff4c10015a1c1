use crate::{
    builtin_types::BuiltinTypes,
    hierarchy::ClassHierarchyValidator,
    method_body_type_checker::MethodBodyTypeChecker,
    overload::OverloadValidator,
    semantic_error::SemanticResult,
    signatures::FeatureSignatureResolver,
    type_system::*,
};
use ast::{names, Feature, Program};
use log::debug;

/// Runs semantic analysis on `program`, annotating it in place.
///
/// Phases, each of which aborts the whole analysis on its first error:
/// built-in classes (also stored in `program.builtins`), class registration
/// and parent resolution, feature signatures, inheritance cycles, class
/// bodies, and finally the `Main` entry point. On error the tree keeps whatever annotations were made up to
/// that point.
///
/// The expressions of `program` must form a tree, see
/// [`Program::check_references`].
pub fn check(program: &mut Program) -> SemanticResult<TypeSystem> {
    let mut type_system = TypeSystem::new();
    BuiltinTypes::add_to(&mut type_system);
    program.builtins = BuiltinTypes::classes(&type_system);

    {
        let mut hierarchy = ClassHierarchyValidator::new(&mut type_system);
        hierarchy.register_classes(program)?;
        hierarchy.resolve_parents()?;
    }
    debug!("class hierarchy resolved");

    let declared: Vec<(ClassId, usize)> = type_system.declared_classes().collect();
    for &(class_id, decl_idx) in &declared {
        let parent = type_system
            .class(class_id)
            .parent
            .map(|parent| type_system.class(parent).name.clone());
        program.classes[decl_idx].parent_data = parent;
    }

    {
        let mut resolver = FeatureSignatureResolver::new(&mut type_system);
        for &(class_id, decl_idx) in &declared {
            resolver.resolve_class(class_id, &mut program.classes[decl_idx])?;
        }
    }
    debug!("feature signatures resolved");

    ClassHierarchyValidator::new(&mut type_system).check_cycles()?;
    debug!("no inheritance cycles");

    for &(class_id, decl_idx) in &declared {
        check_class_body(&type_system, program, class_id, decl_idx)?;
    }
    debug!("class bodies checked");

    ClassHierarchyValidator::new(&mut type_system).check_main(program)?;
    debug!("found {}.{}", names::MAIN_CLASS, names::MAIN_METHOD);

    Ok(type_system)
}

/// Attribute initializers first, then method bodies.
fn check_class_body(
    type_system: &TypeSystem,
    program: &mut Program,
    class_id: ClassId,
    decl_idx: usize,
) -> SemanticResult<()> {
    let Program { classes, exprs, .. } = program;
    let class = &mut classes[decl_idx];
    let class_def = type_system.class(class_id);
    let validator = OverloadValidator::new(type_system);
    debug!("checking body of class {}", class.name);

    for feature in &mut class.features {
        let attribute = match feature {
            Feature::Attribute(attribute) => attribute,
            Feature::Method(_) => continue,
        };
        validator.check_attribute(class_id, &attribute.name)?;

        if let Some(init) = attribute.init {
            let def = class_def
                .own_attribute(&attribute.name)
                .expect("attribute was registered by the signature pass");
            attribute.init_self = Some(type_system.self_param(class_id, attribute.line));

            let mut checker =
                MethodBodyTypeChecker::new(type_system, exprs, class_id, attribute.line, &[]);
            attribute.init = Some(checker.check_and_convert(init, def.ty, attribute.line)?);
        }
    }

    for feature in &mut class.features {
        let method = match feature {
            Feature::Method(method) => method,
            Feature::Attribute(_) => continue,
        };
        validator.check_method(class_id, &method.name)?;

        let body = match method.body {
            Some(body) => body,
            None => continue,
        };
        let def = class_def
            .own_method(&method.name)
            .expect("method was registered by the signature pass");
        let mut checker =
            MethodBodyTypeChecker::new(type_system, exprs, class_id, method.line, &def.params);
        let body = match def.return_ty {
            // nothing to convert to
            None | Some(CheckedType::NoType) => {
                checker.check_expr(body)?;
                body
            }
            Some(return_ty) => checker.check_method_body(body, return_ty, method.line)?,
        };
        method.body = Some(body);
    }
    Ok(())
}
