//! Whole-program checks: build a tree, run the analysis, inspect the
//! annotated tree or the single error.

use ast::{
    Attribute, BinaryOp, Class, Expr, ExprId, FormalParam, Method, MethodRef, Program, Ty,
    UnaryOp, VarRef,
};
use type_checking::{check, SemanticError};
use utils::assert_matches;

fn class_ty(name: &str) -> Ty {
    Ty::Class(name.to_owned())
}

/// `class Main { main() : void { <body> } }`, plus `extra` classes before it.
fn program_with_main<F>(extra: Vec<Class>, body: F) -> (Program, ExprId)
where
    F: FnOnce(&mut Program) -> ExprId,
{
    let mut program = Program::new(1);
    let body = body(&mut program);
    program.classes = extra;
    program.add_class(
        Class::new(20, "Main", None).with_method(Method::new(21, "main", vec![], "void", Some(body))),
    );
    (program, body)
}

fn ty_of(program: &Program, id: ExprId) -> Ty {
    program.exprs[id]
        .ty
        .clone()
        .unwrap_or_else(|| panic!("{} was not annotated", id))
}

fn check_err(program: &mut Program) -> (u32, SemanticError) {
    let err = check(program).expect_err("analysis should fail");
    (err.line, err.data)
}

/// The expression a slot points to after analysis, unwrapping one `Cast`.
fn cast_target(program: &Program, id: ExprId) -> Option<(String, ExprId)> {
    match &program.exprs[id].expr {
        Expr::Cast { type_name, expr } => Some((type_name.clone(), *expr)),
        _ => None,
    }
}

fn base_and_derived() -> Vec<Class> {
    vec![
        Class::new(2, "Base", None),
        Class::new(3, "Derived", Some("Base")),
    ]
}

#[test]
fn hello_world() {
    let mut dispatch = None;
    let (mut program, _) = program_with_main(vec![], |p| {
        let io = p.expr(22, Expr::new_object("IO"));
        let msg = p.expr(22, Expr::string("Hello"));
        let call = p.expr(22, Expr::dispatch(Some(io), "out", vec![msg]));
        dispatch = Some(call);
        call
    });
    let ts = check(&mut program).expect("hello world is valid");
    let call = dispatch.unwrap();

    assert_eq!(ty_of(&program, call), class_ty("IO"));
    assert_matches!(
        &program.exprs[call].expr,
        Expr::BaseDispatch { method: Some(MethodRef { .. }), .. }
    );
    let main = program.class("Main").unwrap();
    assert_eq!(main.parent_data.as_ref().map(String::as_str), Some("Object"));
    assert_eq!(main.method("main").unwrap().return_type_data, Some(Ty::NoType));
    assert!(ts.lookup_class("Main").is_some());
}

#[test]
fn int_is_cast_to_string_in_addition() {
    let mut ids = None;
    let (mut program, _) = program_with_main(vec![], |p| {
        let lhs = p.expr(22, Expr::string("a"));
        let rhs = p.expr(22, Expr::int(1));
        let add = p.expr(22, Expr::Addition { lhs, rhs });
        ids = Some((add, rhs));
        add
    });
    check(&mut program).unwrap();
    let (add, int) = ids.unwrap();

    assert_eq!(ty_of(&program, add), class_ty("String"));
    let rhs = match &program.exprs[add].expr {
        Expr::Addition { rhs, .. } => *rhs,
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(cast_target(&program, rhs), Some(("String".to_owned(), int)));
    assert_eq!(ty_of(&program, rhs), class_ty("String"));
}

#[test]
fn addition_of_class_and_string() {
    let (mut program, _) = program_with_main(vec![], |p| {
        let lhs = p.expr(23, Expr::new_object("IO"));
        let rhs = p.expr(24, Expr::string("x"));
        p.expr(24, Expr::Addition { lhs, rhs })
    });
    assert_eq!(
        check_err(&mut program),
        (
            23,
            SemanticError::CannotConvert {
                from: "IO".to_owned(),
                to: "String".to_owned()
            }
        )
    );

    let (mut program, _) = program_with_main(vec![], |p| {
        let lhs = p.expr(23, Expr::int(1));
        let rhs = p.expr(24, Expr::new_object("IO"));
        p.expr(24, Expr::Addition { lhs, rhs })
    });
    assert_eq!(check_err(&mut program), (24, SemanticError::CannotConvertAddition));
}

#[test]
fn missing_main_class() {
    let mut program = Program::new(1);
    program.add_class(Class::new(3, "A", None));
    assert_eq!(
        check_err(&mut program),
        (
            1,
            SemanticError::ClassNotFound {
                class: "Main".to_owned()
            }
        )
    );
}

#[test]
fn missing_main_method() {
    let mut program = Program::new(1);
    program.add_class(Class::new(3, "Main", None).with_method(Method::new(
        4,
        "main",
        vec![FormalParam::new(4, "argc", "Int")],
        "void",
        None,
    )));
    assert_eq!(
        check_err(&mut program),
        (
            1,
            SemanticError::MethodNotFound {
                method: "main".to_owned(),
                class: "Main".to_owned()
            }
        )
    );
}

#[test]
fn override_with_different_arity() {
    let base = Class::new(2, "Base", None).with_method(Method::new(
        3,
        "m",
        vec![FormalParam::new(3, "x", "Int")],
        "Int",
        None,
    ));
    let derived =
        Class::new(5, "Derived", Some("Base")).with_method(Method::new(6, "m", vec![], "Int", None));
    let (mut program, _) =
        program_with_main(vec![base, derived], |p| p.expr(22, Expr::VoidConstant));
    assert_eq!(check_err(&mut program), (6, SemanticError::OverrideArityMismatch));
}

#[test]
fn attribute_redefinition() {
    let base = Class::new(2, "Base", None).with_attribute(Attribute::new(3, "x", "Int", None));
    let derived =
        Class::new(4, "Derived", Some("Base")).with_attribute(Attribute::new(5, "x", "Int", None));
    let (mut program, _) = program_with_main(vec![base, derived], |p| p.expr(22, Expr::int(0)));
    assert_eq!(
        check_err(&mut program),
        (
            4,
            SemanticError::AttributeRedefined {
                attribute: "x".to_owned()
            }
        )
    );
}

#[test]
fn argument_is_upcast_to_parameter_type() {
    let mut ids = None;
    let (mut program, _) = program_with_main(base_and_derived(), |p| {
        let arg = p.expr(22, Expr::new_object("Derived"));
        let call = p.expr(22, Expr::dispatch(None, "take", vec![arg]));
        ids = Some((call, arg));
        call
    });
    program.classes[2] = program.classes[2].clone().with_method(Method::new(
        25,
        "take",
        vec![FormalParam::new(25, "b", "Base")],
        "Int",
        None,
    ));
    check(&mut program).unwrap();
    let (call, arg) = ids.unwrap();

    match &program.exprs[call].expr {
        Expr::BaseDispatch {
            object: Some(object),
            args,
            method,
            ..
        } => {
            assert_eq!(cast_target(&program, args[0]), Some(("Base".to_owned(), arg)));
            assert_eq!(ty_of(&program, args[0]), class_ty("Base"));
            // implicit receiver
            assert_eq!(
                program.exprs[*object].expr,
                Expr::Symbol {
                    name: "self".to_owned(),
                    variable: Some(VarRef::SelfParam)
                }
            );
            assert_eq!(program.exprs[*object].line, 21);
            assert_eq!(ty_of(&program, *object), class_ty("Main"));
            assert_eq!(
                method,
                &Some(MethodRef {
                    class: "Main".to_owned(),
                    name: "take".to_owned()
                })
            );
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(ty_of(&program, call), Ty::Int);
}

#[test]
fn argument_count() {
    let (mut program, _) = program_with_main(vec![], |p| {
        let io = p.expr(22, Expr::new_object("IO"));
        p.expr(23, Expr::dispatch(Some(io), "out", vec![]))
    });
    assert_eq!(
        check_err(&mut program),
        (
            23,
            SemanticError::NotEnoughArguments {
                method: "out".to_owned()
            }
        )
    );

    let (mut program, _) = program_with_main(vec![], |p| {
        let s = p.expr(22, Expr::string("s"));
        let extra = p.expr(22, Expr::int(3));
        p.expr(24, Expr::dispatch(Some(s), "length", vec![extra]))
    });
    assert_eq!(
        check_err(&mut program),
        (
            24,
            SemanticError::TooManyArguments {
                method: "length".to_owned()
            }
        )
    );
}

#[test]
fn argument_of_wrong_type() {
    let (mut program, _) = program_with_main(vec![], |p| {
        let io = p.expr(22, Expr::new_object("IO"));
        let arg = p.expr(22, Expr::new_object("Object"));
        p.expr(26, Expr::dispatch(Some(io), "out", vec![arg]))
    });
    assert_eq!(
        check_err(&mut program),
        (
            26,
            SemanticError::CannotConvert {
                from: "Object".to_owned(),
                to: "String".to_owned()
            }
        )
    );
}

#[test]
fn void_literal_is_a_valid_argument() {
    let (mut program, _) = program_with_main(vec![], |p| {
        let io = p.expr(22, Expr::new_object("IO"));
        let arg = p.expr(22, Expr::VoidConstant);
        p.expr(22, Expr::dispatch(Some(io), "out", vec![arg]))
    });
    check(&mut program).unwrap();
}

#[test]
fn undefined_symbol() {
    let (mut program, _) = program_with_main(vec![], |p| p.expr(30, Expr::symbol("ghost")));
    assert_eq!(
        check_err(&mut program),
        (
            30,
            SemanticError::AttributeNotFound {
                attribute: "ghost".to_owned(),
                class: "Main".to_owned()
            }
        )
    );
}

#[test]
fn conditions_must_be_int() {
    let (mut program, _) = program_with_main(vec![], |p| {
        let condition = p.expr(31, Expr::string("yes"));
        let then_expr = p.expr(31, Expr::int(1));
        p.expr(
            31,
            Expr::IfStatement {
                condition,
                then_expr,
                else_expr: None,
            },
        )
    });
    assert_eq!(
        check_err(&mut program),
        (31, SemanticError::ConditionMustBeInt { construct: "If" })
    );

    let (mut program, _) = program_with_main(vec![], |p| {
        let condition = p.expr(32, Expr::VoidConstant);
        let body = p.expr(32, Expr::int(1));
        p.expr(32, Expr::WhileStatement { condition, body })
    });
    assert_eq!(
        check_err(&mut program),
        (32, SemanticError::ConditionMustBeInt { construct: "While" })
    );
}

fn if_type(classes: Vec<Class>, then_expr: Expr, else_expr: Option<Expr>) -> Ty {
    let mut if_id = None;
    let (mut program, _) = program_with_main(classes, |p| {
        let condition = p.expr(22, Expr::int(1));
        let then_expr = p.expr(22, then_expr);
        let else_expr = else_expr.map(|e| p.expr(22, e));
        let id = p.expr(
            22,
            Expr::IfStatement {
                condition,
                then_expr,
                else_expr,
            },
        );
        if_id = Some(id);
        id
    });
    check(&mut program).unwrap();
    ty_of(&program, if_id.unwrap())
}

#[test]
fn if_branch_types_are_joined() {
    assert_eq!(if_type(vec![], Expr::int(1), Some(Expr::int(2))), Ty::Int);
    assert_eq!(if_type(vec![], Expr::int(1), None), Ty::NoType);
    assert_eq!(if_type(vec![], Expr::int(1), Some(Expr::string("a"))), Ty::NoType);
    assert_eq!(
        if_type(vec![], Expr::VoidConstant, Some(Expr::string("a"))),
        class_ty("String")
    );
    assert_eq!(
        if_type(
            base_and_derived(),
            Expr::new_object("Derived"),
            Some(Expr::new_object("Base"))
        ),
        class_ty("Base")
    );
    assert_eq!(
        if_type(
            base_and_derived(),
            Expr::new_object("Base"),
            Some(Expr::new_object("IO"))
        ),
        Ty::NoType
    );
}

#[test]
fn while_has_no_type() {
    let mut id = None;
    let (mut program, _) = program_with_main(vec![], |p| {
        let condition = p.expr(22, Expr::int(0));
        let body = p.expr(22, Expr::string("loop"));
        let w = p.expr(22, Expr::WhileStatement { condition, body });
        id = Some(w);
        w
    });
    check(&mut program).unwrap();
    assert_eq!(ty_of(&program, id.unwrap()), Ty::NoType);
}

#[test]
fn equality_between_int_and_object_is_rejected() {
    let (mut program, _) = program_with_main(vec![], |p| {
        let lhs = p.expr(33, Expr::int(1));
        let rhs = p.expr(33, Expr::new_object("IO"));
        p.expr(33, Expr::EqualComparison { lhs, rhs })
    });
    assert_eq!(
        check_err(&mut program),
        (33, SemanticError::InvalidTypeOfParameters { operator: "==" })
    );
}

#[test]
fn equality_widens_one_side_to_object() {
    let mut ids = None;
    let (mut program, _) = program_with_main(base_and_derived(), |p| {
        let lhs = p.expr(22, Expr::new_object("Base"));
        let rhs = p.expr(22, Expr::new_object("IO"));
        let eq = p.expr(22, Expr::EqualComparison { lhs, rhs });
        ids = Some((eq, lhs, rhs));
        eq
    });
    check(&mut program).unwrap();
    let (eq, lhs, rhs) = ids.unwrap();

    assert_eq!(ty_of(&program, eq), Ty::Int);
    match &program.exprs[eq].expr {
        Expr::EqualComparison { lhs: new_lhs, rhs: new_rhs } => {
            assert_eq!(cast_target(&program, *new_lhs), Some(("Object".to_owned(), lhs)));
            assert_eq!(*new_rhs, rhs);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn equality_with_void_widens_the_class_side() {
    let mut ids = None;
    let (mut program, _) = program_with_main(vec![], |p| {
        let lhs = p.expr(22, Expr::VoidConstant);
        let rhs = p.expr(22, Expr::new_object("IO"));
        let eq = p.expr(22, Expr::EqualComparison { lhs, rhs });
        ids = Some((eq, lhs, rhs));
        eq
    });
    let before = program.exprs.len();
    check(&mut program).unwrap();
    assert_eq!(program.exprs.len(), before + 1);
    let (eq, lhs, rhs) = ids.unwrap();
    match &program.exprs[eq].expr {
        Expr::EqualComparison { lhs: new_lhs, rhs: new_rhs } => {
            assert_eq!(*new_lhs, lhs);
            assert_eq!(cast_target(&program, *new_rhs), Some(("Object".to_owned(), rhs)));
            assert_eq!(ty_of(&program, *new_rhs), class_ty("Object"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn equality_with_object_needs_no_cast() {
    let (mut program, _) = program_with_main(vec![], |p| {
        let lhs = p.expr(22, Expr::new_object("Object"));
        let rhs = p.expr(22, Expr::new_object("IO"));
        p.expr(22, Expr::EqualComparison { lhs, rhs })
    });
    let before = program.exprs.len();
    check(&mut program).unwrap();
    assert_eq!(program.exprs.len(), before);
}

#[test]
fn static_dispatch_needs_an_ancestor() {
    let (mut program, _) = program_with_main(base_and_derived(), |p| {
        let object = p.expr(40, Expr::new_object("Base"));
        p.expr(40, Expr::static_dispatch(object, "Derived", "copy", vec![]))
    });
    assert_eq!(
        check_err(&mut program),
        (
            40,
            SemanticError::CannotConvertInStaticDispatch {
                from: "Base".to_owned(),
                to: "Derived".to_owned()
            }
        )
    );
}

#[test]
fn static_dispatch_is_typed_as_the_named_class() {
    let mut id = None;
    let (mut program, _) = program_with_main(base_and_derived(), |p| {
        let object = p.expr(22, Expr::new_object("Derived"));
        let call = p.expr(22, Expr::static_dispatch(object, "Object", "typeName", vec![]));
        id = Some(call);
        call
    });
    check(&mut program).unwrap();
    let call = id.unwrap();
    assert_eq!(ty_of(&program, call), class_ty("Object"));
    match &program.exprs[call].expr {
        Expr::StaticDispatch {
            self_type, method, ..
        } => {
            assert_eq!(self_type, &Some(class_ty("Object")));
            assert_eq!(method.as_ref().unwrap().class, "Object");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn static_dispatch_to_unknown_class() {
    let (mut program, _) = program_with_main(vec![], |p| {
        let object = p.expr(41, Expr::new_object("IO"));
        p.expr(41, Expr::static_dispatch(object, "Nowhere", "copy", vec![]))
    });
    assert_eq!(
        check_err(&mut program),
        (
            41,
            SemanticError::ClassNotFound {
                class: "Nowhere".to_owned()
            }
        )
    );
}

#[test]
fn let_binding_is_scoped() {
    let mut ids = None;
    let (mut program, _) = program_with_main(vec![], |p| {
        let init = p.expr(22, Expr::int(4));
        let x = p.expr(23, Expr::symbol("x"));
        let local = p.expr(22, Expr::local("x", "String", Some(init), Some(x)));
        ids = Some((local, init, x));
        p.expr(22, Expr::Block { exprs: vec![local] })
    });
    check(&mut program).unwrap();
    let (local, init, x) = ids.unwrap();

    assert_eq!(ty_of(&program, local), class_ty("String"));
    assert_eq!(ty_of(&program, x), class_ty("String"));
    match &program.exprs[local].expr {
        Expr::LocalDefinition {
            init: Some(new_init),
            variable_type,
            ..
        } => {
            assert_eq!(cast_target(&program, *new_init), Some(("String".to_owned(), init)));
            assert_eq!(variable_type, &Some(class_ty("String")));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(
        program.exprs[x].expr,
        Expr::Symbol {
            name: "x".to_owned(),
            variable: Some(VarRef::Local {
                name: "x".to_owned(),
                line: 22
            })
        }
    );

    // the binding is gone after the `let`
    let (mut program, _) = program_with_main(vec![], |p| {
        let scope = p.expr(22, Expr::int(0));
        let local = p.expr(22, Expr::local("x", "Int", None, Some(scope)));
        let after = p.expr(27, Expr::symbol("x"));
        p.expr(22, Expr::Block { exprs: vec![local, after] })
    });
    assert_matches!(check_err(&mut program), (27, SemanticError::AttributeNotFound { .. }));
}

#[test]
fn let_init_cannot_see_its_own_binding() {
    let (mut program, _) = program_with_main(vec![], |p| {
        let init = p.expr(22, Expr::symbol("x"));
        let scope = p.expr(22, Expr::symbol("x"));
        p.expr(22, Expr::local("x", "Int", Some(init), Some(scope)))
    });
    assert_matches!(check_err(&mut program), (22, SemanticError::AttributeNotFound { .. }));
}

#[test]
fn let_with_unknown_type() {
    let (mut program, _) = program_with_main(vec![], |p| {
        p.expr(28, Expr::local("x", "Ghost", None, None))
    });
    assert_eq!(
        check_err(&mut program),
        (
            28,
            SemanticError::ClassNotFound {
                class: "Ghost".to_owned()
            }
        )
    );
}

#[test]
fn block_takes_type_of_last_expression() {
    let mut id = None;
    let (mut program, _) = program_with_main(vec![], |p| {
        let a = p.expr(22, Expr::int(1));
        let b = p.expr(23, Expr::string("b"));
        let block = p.expr(22, Expr::Block { exprs: vec![a, b] });
        id = Some(block);
        block
    });
    check(&mut program).unwrap();
    assert_eq!(ty_of(&program, id.unwrap()), class_ty("String"));

    let (mut program, empty) =
        program_with_main(vec![], |p| p.expr(22, Expr::Block { exprs: vec![] }));
    check(&mut program).unwrap();
    assert_eq!(ty_of(&program, empty), Ty::NoType);
}

#[test]
fn int_cannot_be_constructed() {
    let (mut program, _) = program_with_main(vec![], |p| p.expr(35, Expr::new_object("Int")));
    assert_eq!(
        check_err(&mut program),
        (
            35,
            SemanticError::IllegalConstruction {
                class: "Int".to_owned()
            }
        )
    );
}

#[test]
fn qualified_assignment_targets_attribute() {
    let mut ids = None;
    let (mut program, _) = program_with_main(vec![], |p| {
        let value = p.expr(22, Expr::int(3));
        let assign = p.expr(22, Expr::assign("Main.count", value));
        ids = Some(assign);
        assign
    });
    let main = program.classes.pop().unwrap();
    program.add_class(main.with_attribute(Attribute::new(24, "count", "String", None)));
    check(&mut program).unwrap();
    let assign = ids.unwrap();

    assert_eq!(ty_of(&program, assign), class_ty("String"));
    match &program.exprs[assign].expr {
        Expr::Assignment {
            symbol,
            variable,
            expr,
        } => {
            assert_eq!(symbol, "count");
            assert_eq!(
                variable,
                &Some(VarRef::Attribute {
                    class: "Main".to_owned(),
                    name: "count".to_owned()
                })
            );
            assert_eq!(ty_of(&program, *expr), class_ty("String"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn assignment_to_unknown_name() {
    let (mut program, _) = program_with_main(vec![], |p| {
        let value = p.expr(36, Expr::int(3));
        p.expr(36, Expr::assign("nothing", value))
    });
    assert_eq!(
        check_err(&mut program),
        (
            36,
            SemanticError::AttributeNotFound {
                attribute: "nothing".to_owned(),
                class: "Main".to_owned()
            }
        )
    );
}

#[test]
fn assignment_to_parameter_with_wrong_type() {
    let mut program = Program::new(1);
    let value = program.expr(11, Expr::string("text"));
    let assign = program.expr(11, Expr::assign("n", value));
    let main_body = program.expr(21, Expr::VoidConstant);
    program.add_class(
        Class::new(10, "Main", None)
            .with_method(Method::new(
                11,
                "set",
                vec![FormalParam::new(11, "n", "Int")],
                "Int",
                Some(assign),
            ))
            .with_method(Method::new(21, "main", vec![], "void", Some(main_body))),
    );
    assert_eq!(
        check_err(&mut program),
        (
            11,
            SemanticError::CannotConvert {
                from: "String".to_owned(),
                to: "Int".to_owned()
            }
        )
    );
}

#[test]
fn method_body_is_converted_to_return_type() {
    let mut program = Program::new(1);
    let as_string = program.expr(12, Expr::int(7));
    let as_base = program.expr(15, Expr::new_object("Derived"));
    let main_body = program.expr(21, Expr::VoidConstant);
    program.classes = base_and_derived();
    program.add_class(
        Class::new(10, "Main", None)
            .with_method(Method::new(11, "text", vec![], "String", Some(as_string)))
            .with_method(Method::new(14, "base", vec![], "Base", Some(as_base)))
            .with_method(Method::new(21, "main", vec![], "void", Some(main_body))),
    );
    check(&mut program).unwrap();

    let main = program.class("Main").unwrap();
    let text_body = main.method("text").unwrap().body.unwrap();
    assert_eq!(cast_target(&program, text_body), Some(("String".to_owned(), as_string)));
    assert_eq!(program.exprs[text_body].line, 11);
    let base_body = main.method("base").unwrap().body.unwrap();
    assert_eq!(cast_target(&program, base_body), Some(("Base".to_owned(), as_base)));
    assert_eq!(program.exprs[base_body].line, 15);
}

#[test]
fn builtin_classes_are_part_of_the_result() {
    let (mut program, _) = program_with_main(base_and_derived(), |p| p.expr(21, Expr::VoidConstant));
    let classes = program.classes.clone();
    check(&mut program).unwrap();

    let names: Vec<&str> = program.builtins.iter().map(|class| class.name.as_str()).collect();
    assert_eq!(names, ["Object", "String", "IO"]);
    assert_eq!(program.classes.len(), classes.len());
    assert!(program.class("IO").is_none());

    let io = &program.builtins[2];
    assert_eq!(io.parent_data.as_deref(), Some("Object"));
    let out = io.method("out").unwrap();
    assert_eq!(out.body, None);
    assert_eq!(out.owner.as_deref(), Some("IO"));
    assert_eq!(out.return_type_data, Some(class_ty("IO")));
    assert_eq!(out.self_param.as_ref().unwrap().variable_type, Some(class_ty("IO")));
    assert_eq!(out.params[0].variable_type, Some(class_ty("String")));
}

#[test]
fn builtin_classes_are_recorded_even_when_analysis_fails() {
    let mut program = Program::new(1);
    program.add_class(Class::new(3, "A", None));
    check(&mut program).unwrap_err();
    assert_eq!(program.builtins.len(), 3);
}

#[test]
fn method_body_of_wrong_type() {
    let mut program = Program::new(1);
    let body = program.expr(12, Expr::string("seven"));
    let main_body = program.expr(21, Expr::VoidConstant);
    program.add_class(
        Class::new(10, "Main", None)
            .with_method(Method::new(11, "number", vec![], "Int", Some(body)))
            .with_method(Method::new(21, "main", vec![], "void", Some(main_body))),
    );
    assert_eq!(
        check_err(&mut program),
        (
            12,
            SemanticError::CannotConvert {
                from: "String".to_owned(),
                to: "Int".to_owned()
            }
        )
    );
}

#[test]
fn attribute_initializer_may_use_self() {
    let mut program = Program::new(1);
    let receiver = program.expr(11, Expr::symbol("self"));
    let init = program.expr(11, Expr::dispatch(Some(receiver), "typeName", vec![]));
    let main_body = program.expr(21, Expr::VoidConstant);
    program.add_class(
        Class::new(10, "Main", None)
            .with_attribute(Attribute::new(11, "name", "String", Some(init)))
            .with_method(Method::new(21, "main", vec![], "void", Some(main_body))),
    );
    check(&mut program).unwrap();

    let attribute = program.class("Main").unwrap().attribute("name").unwrap();
    assert_eq!(attribute.init, Some(init));
    assert_eq!(attribute.type_data, Some(class_ty("String")));
    assert_eq!(
        attribute.init_self.as_ref().unwrap().variable_type,
        Some(class_ty("Main"))
    );
    assert_eq!(ty_of(&program, receiver), class_ty("Main"));
}

#[test]
fn inherited_attribute_is_visible() {
    let base = Class::new(2, "Base", None).with_attribute(Attribute::new(3, "n", "Int", None));
    let mut id = None;
    let (mut program, _) = program_with_main(vec![base], |p| {
        let n = p.expr(22, Expr::symbol("n"));
        id = Some(n);
        n
    });
    program.classes[1].parent = Some("Base".to_owned());
    check(&mut program).unwrap();
    assert_eq!(ty_of(&program, id.unwrap()), Ty::Int);
}

#[test]
fn integer_operators() {
    let mut id = None;
    let (mut program, _) = program_with_main(vec![], |p| {
        let lhs = p.expr(22, Expr::int(1));
        let rhs = p.expr(22, Expr::int(2));
        let lt = p.expr(
            22,
            Expr::BinaryOp {
                op: BinaryOp::LessThan,
                lhs,
                rhs,
            },
        );
        let neg = p.expr(22, Expr::UnaryOp { op: UnaryOp::Minus, expr: lt });
        id = Some(neg);
        neg
    });
    check(&mut program).unwrap();
    assert_eq!(ty_of(&program, id.unwrap()), Ty::Int);

    let (mut program, _) = program_with_main(vec![], |p| {
        let lhs = p.expr(22, Expr::int(1));
        let rhs = p.expr(22, Expr::string("2"));
        p.expr(
            37,
            Expr::BinaryOp {
                op: BinaryOp::Multiplication,
                lhs,
                rhs,
            },
        )
    });
    assert_eq!(
        check_err(&mut program),
        (
            37,
            SemanticError::CannotConvert {
                from: "String".to_owned(),
                to: "Int".to_owned()
            }
        )
    );
}

#[test]
fn permissive_cases_do_not_fail() {
    let mut ids = None;
    let (mut program, _) = program_with_main(vec![], |p| {
        let s = p.expr(22, Expr::string("abc"));
        let unknown = p.expr(22, Expr::cast("Ghost", s));
        let text = p.expr(22, Expr::string("x"));
        let not = p.expr(22, Expr::UnaryOp { op: UnaryOp::Not, expr: text });
        let subject = p.expr(22, Expr::string("abc"));
        let start = p.expr(22, Expr::string("0"));
        let end = p.expr(22, Expr::int(1));
        let sub = p.expr(22, Expr::SubString { string: subject, start, end });
        ids = Some((unknown, not, sub));
        p.expr(22, Expr::Block { exprs: vec![unknown, not, sub] })
    });
    check(&mut program).unwrap();
    let (unknown, not, sub) = ids.unwrap();
    assert_eq!(ty_of(&program, unknown), Ty::NoType);
    assert_eq!(ty_of(&program, not), Ty::Int);
    assert_eq!(ty_of(&program, sub), class_ty("String"));
}

#[test]
fn first_error_stops_analysis() {
    let (mut program, _) = program_with_main(vec![], |p| {
        let first = p.expr(50, Expr::symbol("a"));
        let second = p.expr(51, Expr::symbol("b"));
        p.expr(50, Expr::Block { exprs: vec![first, second] })
    });
    let (line, _) = check_err(&mut program);
    assert_eq!(line, 50);
}

#[test]
fn cycle_is_reported_before_bodies() {
    let (mut program, _) = program_with_main(
        vec![Class::new(2, "A", Some("B")), Class::new(3, "B", Some("A"))],
        |p| p.expr(22, Expr::symbol("undefined")),
    );
    assert_eq!(
        check_err(&mut program),
        (
            2,
            SemanticError::InheritanceCycle {
                class: "A".to_owned()
            }
        )
    );
}

fn rich_program() -> Program {
    let mut program = Program::new(1);
    let lhs = program.expr(22, Expr::string("n = "));
    let rhs = program.expr(22, Expr::int(1));
    let text = program.expr(22, Expr::Addition { lhs, rhs });
    let io = program.expr(22, Expr::new_object("IO"));
    let out = program.expr(22, Expr::dispatch(Some(io), "out", vec![text]));
    let a = program.expr(23, Expr::new_object("Derived"));
    let b = program.expr(23, Expr::new_object("IO"));
    let eq = program.expr(23, Expr::EqualComparison { lhs: a, rhs: b });
    let arg = program.expr(24, Expr::new_object("Derived"));
    let call = program.expr(24, Expr::dispatch(None, "take", vec![arg]));
    let body = program.expr(22, Expr::Block { exprs: vec![out, eq, call] });
    let take_body = program.expr(26, Expr::int(5));

    program.classes = base_and_derived();
    program.add_class(
        Class::new(20, "Main", None)
            .with_method(Method::new(21, "main", vec![], "void", Some(body)))
            .with_method(Method::new(
                25,
                "take",
                vec![FormalParam::new(25, "b", "Base")],
                "String",
                Some(take_body),
            )),
    );
    program
}

#[test]
fn analysis_is_deterministic() {
    let mut first = rich_program();
    let mut second = rich_program();
    check(&mut first).unwrap();
    check(&mut second).unwrap();
    assert_eq!(first, second);
}

#[test]
fn analysing_an_analysed_tree_changes_nothing() {
    let mut program = rich_program();
    check(&mut program).unwrap();
    let analysed = program.clone();
    check(&mut program).unwrap();
    assert_eq!(program, analysed);
}

#[test]
fn every_reachable_expression_is_annotated() {
    let mut program = rich_program();
    check(&mut program).unwrap();

    let mut pending: Vec<ExprId> = program
        .classes
        .iter()
        .flat_map(|class| class.methods().filter_map(|m| m.body))
        .collect();
    while let Some(id) = pending.pop() {
        let node = &program.exprs[id];
        assert!(node.ty.is_some(), "{} ({:?}) has no type", id, node.expr);
        pending.extend(node.expr.children());
    }
}
