use crate::{
    builtin_types,
    conversion::{conversion, Conversion},
    scope::SymbolScopeStack,
    semantic_error::{SemanticError, SemanticResult},
    type_system::*,
};
use ast::{names, Expr, ExprArena, ExprId, Line, MethodRef, VarRef};
use itertools::Itertools;
use log::{trace, warn};

/// Types one method body or attribute initializer, annotating every node it
/// visits. Wherever a value has to be converted, a `Cast` node is allocated
/// in the arena and the parent's slot is pointed at it.
pub struct MethodBodyTypeChecker<'ts, 'a> {
    type_system: &'ts TypeSystem,
    exprs: &'a mut ExprArena,
    current_class: ClassId,
    /// Line of the method or attribute being checked.
    feature_line: Line,
    scopes: SymbolScopeStack<'ts>,
}

impl<'ts, 'a> MethodBodyTypeChecker<'ts, 'a> {
    pub fn new(
        type_system: &'ts TypeSystem,
        exprs: &'a mut ExprArena,
        current_class: ClassId,
        feature_line: Line,
        params: &[MethodParamDef],
    ) -> Self {
        Self {
            type_system,
            exprs,
            current_class,
            feature_line,
            scopes: SymbolScopeStack::new(type_system, current_class, params),
        }
    }

    /// Checks `root` and converts its value to `expected`. Returns the node
    /// the owning slot has to point to afterwards.
    pub fn check_and_convert(
        &mut self,
        root: ExprId,
        expected: CheckedType,
        site: Line,
    ) -> SemanticResult<ExprId> {
        let ty = self.check_expr(root)?;
        self.convert(root, ty, expected, site)
    }

    /// Like [`check_and_convert`](Self::check_and_convert) for the body of a
    /// method declared in `method_line`. A cast from `Int` is placed at the
    /// method; upcasts and errors stay at the body.
    pub fn check_method_body(
        &mut self,
        body: ExprId,
        return_ty: CheckedType,
        method_line: Line,
    ) -> SemanticResult<ExprId> {
        let ty = self.check_expr(body)?;
        let body_line = self.exprs[body].line;
        match conversion(self.type_system, ty, return_ty) {
            Some(Conversion::Cast(target)) if ty == CheckedType::Int => {
                Ok(self.insert_cast(body, target, method_line))
            }
            _ => self.convert(body, ty, return_ty, body_line),
        }
    }

    pub fn check_expr(&mut self, id: ExprId) -> SemanticResult<CheckedType> {
        let line = self.exprs[id].line;
        let mut expr = self.exprs[id].expr.clone();
        trace!("{} {} in line {}", expr.kind(), id, line);

        let ty = self.check_expr_internal(line, &mut expr)?;

        let annotation = self.type_system.annotation(ty);
        let node = &mut self.exprs[id];
        node.expr = expr;
        node.ty = Some(annotation);
        Ok(ty)
    }

    fn check_expr_internal(&mut self, line: Line, expr: &mut Expr) -> SemanticResult<CheckedType> {
        use self::CheckedType::*;
        let string = TypeRef(builtin_types::STRING);

        match expr {
            Expr::Block { exprs } => {
                let mut ty = NoType;
                for &item in exprs.iter() {
                    ty = self.check_expr(item)?;
                }
                Ok(ty)
            }
            Expr::LocalDefinition {
                name,
                type_name,
                init,
                scope,
                variable_type,
            } => {
                let declared = self.resolve_type(type_name, line)?;
                *variable_type = Some(self.type_system.annotation(declared));
                if let Some(init) = init {
                    *init = self.check_and_convert(*init, declared, line)?;
                }

                self.scopes.enter_scope();
                self.scopes.define_local(name, line, declared);
                let ty = match *scope {
                    Some(scope) => self.check_expr(scope),
                    None => Ok(NoType),
                };
                self.scopes.leave_scope();
                ty
            }
            Expr::BaseDispatch {
                object,
                name,
                args,
                method,
            } => {
                let receiver = match *object {
                    Some(object) => self.check_expr(object)?,
                    None => {
                        *object = Some(self.synthesize_self());
                        TypeRef(self.current_class)
                    }
                };
                let def = self.check_method_invocation(line, receiver, name, args)?;
                *method = Some(self.method_ref(def));
                Ok(def.return_ty.unwrap_or(NoType))
            }
            Expr::StaticDispatch {
                object,
                static_type,
                name,
                args,
                self_type,
                method,
            } => {
                let receiver = self.check_expr(*object)?;
                let target = self.resolve_type(static_type, line)?;
                if target != receiver && !self.is_strict_ancestor(target, receiver) {
                    return Err(SemanticError::CannotConvertInStaticDispatch {
                        from: self.name(receiver),
                        to: static_type.clone(),
                    }
                    .at(line));
                }
                *self_type = Some(self.type_system.annotation(target));

                let def = self.check_method_invocation(line, target, name, args)?;
                *method = Some(self.method_ref(def));
                Ok(target)
            }
            Expr::IfStatement {
                condition,
                then_expr,
                else_expr,
            } => {
                self.check_condition(*condition, "If", line)?;
                let then_ty = self.check_in_new_scope(*then_expr)?;
                match *else_expr {
                    Some(else_expr) => {
                        let else_ty = self.check_in_new_scope(else_expr)?;
                        Ok(self.join(then_ty, else_ty))
                    }
                    None => Ok(NoType),
                }
            }
            Expr::WhileStatement { condition, body } => {
                self.check_condition(*condition, "While", line)?;
                self.check_in_new_scope(*body)?;
                Ok(NoType)
            }
            Expr::Cast { type_name, expr } => match self.type_system.resolve_type(type_name) {
                Some(target) => {
                    self.check_expr(*expr)?;
                    Ok(target)
                }
                None => {
                    warn!("line {}: cast to unknown type {} is not checked", line, type_name);
                    Ok(NoType)
                }
            },
            Expr::NewObject { type_name } => match self.resolve_type(type_name, line)? {
                Int => Err(SemanticError::IllegalConstruction {
                    class: type_name.clone(),
                }
                .at(line)),
                ty => Ok(ty),
            },
            Expr::SubString { string: subject, start, end } => {
                self.check_expr(*subject)?;
                let start_ty = self.check_expr(*start)?;
                let end_ty = self.check_expr(*end)?;
                if start_ty != Int || end_ty != Int {
                    warn!("line {}: substring bounds are not Int", line);
                }
                Ok(string)
            }
            Expr::Assignment {
                symbol,
                expr,
                variable,
            } => {
                let var = match symbol.split_once('.') {
                    Some((_class, attribute)) => {
                        *symbol = attribute.to_owned();
                        self.scopes.lookup_attribute(symbol)
                    }
                    None => self.scopes.lookup(symbol),
                };
                let var = var.ok_or_else(|| self.attribute_not_found(symbol, line))?;

                *expr = self.check_and_convert(*expr, var.ty, line)?;
                *variable = Some(var.var);
                Ok(var.ty)
            }
            Expr::Addition { lhs, rhs } => {
                let lhs_ty = self.check_expr(*lhs)?;
                let rhs_ty = self.check_expr(*rhs)?;
                if lhs_ty == rhs_ty {
                    return Ok(lhs_ty);
                }

                let int_or_string = |ty: CheckedType| ty == Int || ty == string;
                if lhs_ty == Int && rhs_ty == string {
                    *lhs = self.insert_cast(*lhs, string, line);
                    Ok(string)
                } else if lhs_ty == string && rhs_ty == Int {
                    *rhs = self.insert_cast(*rhs, string, line);
                    Ok(string)
                } else if !int_or_string(lhs_ty) {
                    Err(self.addition_error(lhs_ty, rhs_ty, self.exprs[*lhs].line))
                } else {
                    debug_assert!(!int_or_string(rhs_ty));
                    Err(self.addition_error(rhs_ty, lhs_ty, self.exprs[*rhs].line))
                }
            }
            Expr::BinaryOp { lhs, rhs, op } => {
                let lhs_ty = self.check_expr(*lhs)?;
                let rhs_ty = self.check_expr(*rhs)?;
                trace!("operator {} in line {}", op, line);
                for &ty in &[lhs_ty, rhs_ty] {
                    if ty != Int {
                        return Err(SemanticError::CannotConvert {
                            from: self.name(ty),
                            to: names::INT.to_owned(),
                        }
                        .at(line));
                    }
                }
                Ok(Int)
            }
            Expr::UnaryOp { op, expr } => {
                if self.check_expr(*expr)? != Int {
                    warn!("line {}: operand of unary {} is not Int", line, op);
                }
                Ok(Int)
            }
            Expr::EqualComparison { lhs, rhs } => {
                let lhs_ty = self.check_expr(*lhs)?;
                let rhs_ty = self.check_expr(*rhs)?;
                if lhs_ty == rhs_ty {
                    return Ok(Int);
                }

                if lhs_ty == Int && rhs_ty == string {
                    *lhs = self.insert_cast(*lhs, string, line);
                } else if lhs_ty == string && rhs_ty == Int {
                    *rhs = self.insert_cast(*rhs, string, line);
                } else if lhs_ty == Int || rhs_ty == Int {
                    return Err(SemanticError::InvalidTypeOfParameters { operator: "==" }.at(line));
                } else {
                    self.widen_to_object(lhs, lhs_ty, rhs, rhs_ty);
                }
                Ok(Int)
            }
            Expr::Symbol { name, variable } => match self.scopes.lookup(name) {
                Some(def) => {
                    *variable = Some(def.var);
                    Ok(def.ty)
                }
                None if name.as_str() == names::SELF => {
                    *variable = Some(VarRef::SelfParam);
                    Ok(TypeRef(self.current_class))
                }
                None => Err(self.attribute_not_found(name, line)),
            },
            Expr::IntConstant { .. } => Ok(Int),
            Expr::StringConstant { .. } => Ok(string),
            Expr::VoidConstant => Ok(Null),
        }
    }

    /// Resolves the method on `receiver`, then checks the argument count and
    /// converts every argument to its parameter's type.
    fn check_method_invocation(
        &mut self,
        line: Line,
        receiver: CheckedType,
        name: &str,
        args: &mut Vec<ExprId>,
    ) -> SemanticResult<&'ts ClassMethodDef> {
        let type_system = self.type_system;
        let def = receiver
            .class_id()
            .and_then(|class| type_system.lookup_method(class, name))
            .ok_or_else(|| {
                SemanticError::MethodNotFound {
                    method: name.to_owned(),
                    class: self.name(receiver),
                }
                .at(line)
            })?;

        if args.len() < def.params.len() {
            return Err(SemanticError::NotEnoughArguments {
                method: name.to_owned(),
            }
            .at(line));
        }
        if args.len() > def.params.len() {
            return Err(SemanticError::TooManyArguments {
                method: name.to_owned(),
            }
            .at(line));
        }

        for (arg, param) in args.iter_mut().zip_eq(&def.params) {
            let arg_ty = self.check_expr(*arg)?;
            *arg = self.convert(*arg, arg_ty, param.ty, line)?;
        }
        Ok(def)
    }

    fn check_condition(&mut self, condition: ExprId, construct: &'static str, line: Line) -> SemanticResult<()> {
        if self.check_expr(condition)? == CheckedType::Int {
            Ok(())
        } else {
            Err(SemanticError::ConditionMustBeInt { construct }.at(line))
        }
    }

    fn check_in_new_scope(&mut self, id: ExprId) -> SemanticResult<CheckedType> {
        self.scopes.enter_scope();
        let ty = self.check_expr(id);
        self.scopes.leave_scope();
        ty
    }

    /// Type of an `if` whose branches have the given types.
    fn join(&self, a: CheckedType, b: CheckedType) -> CheckedType {
        use self::CheckedType::*;
        match (a, b) {
            _ if a == b => a,
            (Null, other) | (other, Null) => other,
            (TypeRef(x), TypeRef(y)) if self.type_system.is_strict_ancestor(x, y) => a,
            (TypeRef(x), TypeRef(y)) if self.type_system.is_strict_ancestor(y, x) => b,
            _ => NoType,
        }
    }

    /// Unless one side already is `Object`, casts the first class-typed side
    /// to `Object`. Against `void` that is the other side.
    fn widen_to_object(
        &mut self,
        lhs: &mut ExprId,
        lhs_ty: CheckedType,
        rhs: &mut ExprId,
        rhs_ty: CheckedType,
    ) {
        let object = CheckedType::TypeRef(builtin_types::OBJECT);
        if lhs_ty == object || rhs_ty == object {
            return;
        }

        let side = if lhs_ty.class_id().is_some() {
            lhs
        } else if rhs_ty.class_id().is_some() {
            rhs
        } else {
            return;
        };
        let line = self.exprs[*side].line;
        *side = self.insert_cast(*side, object, line);
    }

    fn convert(
        &mut self,
        expr: ExprId,
        from: CheckedType,
        to: CheckedType,
        site: Line,
    ) -> SemanticResult<ExprId> {
        match conversion(self.type_system, from, to) {
            Some(Conversion::Keep) => Ok(expr),
            Some(Conversion::Cast(target)) => {
                let line = if from == CheckedType::Int {
                    site
                } else {
                    self.exprs[expr].line
                };
                Ok(self.insert_cast(expr, target, line))
            }
            None => Err(SemanticError::CannotConvert {
                from: self.name(from),
                to: self.name(to),
            }
            .at(site)),
        }
    }

    fn insert_cast(&mut self, expr: ExprId, target: CheckedType, line: Line) -> ExprId {
        let type_system = self.type_system;
        let type_name = type_system.type_name(target);
        let cast = self.exprs.alloc(line, Expr::cast(type_name, expr));
        self.exprs[cast].ty = Some(type_system.annotation(target));
        trace!("cast {} to {} around {}", cast, type_name, expr);
        cast
    }

    fn synthesize_self(&mut self) -> ExprId {
        let ty = CheckedType::TypeRef(self.current_class);
        let id = self.exprs.alloc(
            self.feature_line,
            Expr::Symbol {
                name: names::SELF.to_owned(),
                variable: Some(VarRef::SelfParam),
            },
        );
        self.exprs[id].ty = Some(self.type_system.annotation(ty));
        id
    }

    fn resolve_type(&self, type_name: &str, line: Line) -> SemanticResult<CheckedType> {
        self.type_system.resolve_type(type_name).ok_or_else(|| {
            SemanticError::ClassNotFound {
                class: type_name.to_owned(),
            }
            .at(line)
        })
    }

    fn is_strict_ancestor(&self, ancestor: CheckedType, ty: CheckedType) -> bool {
        match (ancestor.class_id(), ty.class_id()) {
            (Some(ancestor), Some(class)) => self.type_system.is_strict_ancestor(ancestor, class),
            _ => false,
        }
    }

    fn method_ref(&self, def: &ClassMethodDef) -> MethodRef {
        MethodRef {
            class: self.type_system.class(def.owner).name.clone(),
            name: def.name.clone(),
        }
    }

    fn addition_error(
        &self,
        offending: CheckedType,
        other: CheckedType,
        line: Line,
    ) -> ast::Located<SemanticError> {
        let err = if other == CheckedType::TypeRef(builtin_types::STRING) {
            SemanticError::CannotConvert {
                from: self.name(offending),
                to: names::STRING.to_owned(),
            }
        } else {
            SemanticError::CannotConvertAddition
        };
        err.at(line)
    }

    fn attribute_not_found(&self, name: &str, line: Line) -> ast::Located<SemanticError> {
        SemanticError::AttributeNotFound {
            attribute: name.to_owned(),
            class: self.type_system.class(self.current_class).name.clone(),
        }
        .at(line)
    }

    fn name(&self, ty: CheckedType) -> String {
        self.type_system.type_name(ty).to_owned()
    }
}
