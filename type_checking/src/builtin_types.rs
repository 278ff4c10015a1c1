//! `Object`, `String` and `IO`, with their native methods.
use crate::type_system::*;
use ast::{names, Class, FormalParam, Method};

pub const OBJECT: ClassId = ClassId(0);
pub const STRING: ClassId = ClassId(1);
pub const IO: ClassId = ClassId(2);

/// Native methods are declared on line 0.
const NATIVE_LINE: ast::Line = 0;

pub struct BuiltinTypes;

impl BuiltinTypes {
    /// Registers the built-in classes. Must run on an empty type system so
    /// that they receive the ids `OBJECT`, `STRING` and `IO`.
    pub fn add_to(type_system: &mut TypeSystem) {
        debug_assert!(type_system.is_empty());
        let string_ty = CheckedType::TypeRef(STRING);

        let object_id = {
            let mut object = ClassDef::new(names::OBJECT, NATIVE_LINE, ClassOrigin::Builtin, None);
            let methods = vec![
                native(OBJECT, "abort", vec![], names::VOID, CheckedType::NoType),
                native(OBJECT, "typeName", vec![], names::STRING, string_ty),
                native(
                    OBJECT,
                    "copy",
                    vec![],
                    names::OBJECT,
                    CheckedType::TypeRef(OBJECT),
                ),
            ];
            for method in methods {
                object
                    .add_method(method)
                    .expect("native method names are unique");
            }
            type_system
                .add_class_def(object)
                .expect("built-ins are registered first")
        };

        let string_id = {
            let mut string = ClassDef::new(
                names::STRING,
                NATIVE_LINE,
                ClassOrigin::Builtin,
                Some(names::OBJECT),
            );
            string.parent = Some(OBJECT);
            for name in &["length", "toInt"] {
                string
                    .add_method(native(STRING, name, vec![], names::INT, CheckedType::Int))
                    .expect("native method names are unique");
            }
            type_system
                .add_class_def(string)
                .expect("built-ins are registered first")
        };

        let io_id = {
            let mut io = ClassDef::new(
                names::IO,
                NATIVE_LINE,
                ClassOrigin::Builtin,
                Some(names::OBJECT),
            );
            io.parent = Some(OBJECT);
            let msg = MethodParamDef::new("msg", names::STRING, string_ty);
            io.add_method(native(
                IO,
                "out",
                vec![msg],
                names::IO,
                CheckedType::TypeRef(IO),
            ))
            .expect("native method names are unique");
            io.add_method(native(IO, "in", vec![], names::STRING, string_ty))
                .expect("native method names are unique");
            type_system
                .add_class_def(io)
                .expect("built-ins are registered first")
        };

        debug_assert_eq!((object_id, string_id, io_id), (OBJECT, STRING, IO));
    }

    /// The built-in classes as program classes, annotated like user classes
    /// after analysis. Native methods have no body.
    pub fn classes(type_system: &TypeSystem) -> Vec<Class> {
        type_system
            .class_ids()
            .filter(|&id| type_system.class(id).is_builtin())
            .map(|id| {
                let def = type_system.class(id);
                let mut class = Class::new(def.line, &def.name, def.declared_parent.as_deref());
                class.parent_data = def.parent.map(|parent| type_system.class(parent).name.clone());
                def.methods()
                    .fold(class, |class, method| class.with_method(native_method(type_system, method)))
            })
            .collect()
    }
}

fn native_method(type_system: &TypeSystem, def: &ClassMethodDef) -> Method {
    let params = def
        .params
        .iter()
        .map(|param| {
            let mut formal = FormalParam::new(def.line, &param.name, &param.type_name);
            formal.variable_type = Some(type_system.annotation(param.ty));
            formal
        })
        .collect();

    let mut method = Method::new(def.line, &def.name, params, &def.return_type_name, None);
    method.return_type_data = def.return_ty.map(|ty| type_system.annotation(ty));
    method.self_param = Some(type_system.self_param(def.owner, def.line));
    method.owner = Some(type_system.class(def.owner).name.clone());
    method
}

fn native(
    owner: ClassId,
    name: &str,
    params: Vec<MethodParamDef>,
    return_type_name: &str,
    return_ty: CheckedType,
) -> ClassMethodDef {
    ClassMethodDef {
        name: name.to_owned(),
        line: NATIVE_LINE,
        owner,
        params,
        return_type_name: return_type_name.to_owned(),
        return_ty: Some(return_ty),
    }
}
