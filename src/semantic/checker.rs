use super::builtins::signature;
use super::scope::{Declaration, Scopes};
use super::types::{TypeEnv, BOOL, FLOAT, INT, JSON, STR};
use crate::errors::{CompileError, CompileResult, InternalError};
use crate::syntax::{
    traverse, AssignmentStmt, BinaryExpr, ElifSection, Expr, Func, FuncCall, IfStmt, JsonExpr,
    NodeKind, PrintStmt, Ref, ReturnStmt, Source, TypeRef, UnaryExpr, UpdateStmt, Visitor,
};
use log::debug;

/// The type of a declaration when its name is used as a value.
pub fn declaration_type(declaration: &Declaration) -> CompileResult<String> {
    let ty = match declaration {
        Declaration::LocalVariable(var) => var.type_ref.name.clone(),
        Declaration::Parameter(param) => param.type_ref.name.clone(),
        Declaration::GlobalVariable(var) => var.type_ref.name.clone(),
        Declaration::EnumConstant(constant) => constant.enum_name.clone(),
        Declaration::BuiltinConst(constant) => constant.r#type.to_string(),
        Declaration::BuiltinFunc(func) => func.signature(),
        Declaration::Func(sig) => signature(
            sig.params.iter().map(|ty| ty.name.as_str()),
            sig.return_type.as_ref().map(|ty| ty.name.as_str()),
        ),
        Declaration::Enum(_) => {
            return Err(InternalError::new("enumeration used as a value")
                .with_context("declaration", declaration)
                .into())
        }
    };

    Ok(ty)
}

/// The type of an expression whose children are already checked.
///
/// Operator and call nodes must carry an annotated type; reading one which
/// doesn't is an internal error.
pub fn get_type(expr: &Expr, scopes: &Scopes) -> CompileResult<String> {
    match expr {
        Expr::Bool(_) => Ok(BOOL.to_string()),
        Expr::Int(_) => Ok(INT.to_string()),
        Expr::Float(_) => Ok(FLOAT.to_string()),
        Expr::Str(_) => Ok(STR.to_string()),
        Expr::Ref(node) => declaration_type(node.resolve(scopes)?),
        Expr::Unary(expr) => expr.r#type().map(str::to_string),
        Expr::Binary(expr) => expr.r#type().map(str::to_string),
        Expr::Call(call) => call.r#type().map(str::to_string),
        Expr::Json(expr) => Ok(expr.target.name.clone()),
    }
}

pub(super) struct TypeChecker<'a> {
    env: TypeEnv,
    scopes: &'a Scopes,
    funcs: Vec<&'a Func>,
}

impl<'a> TypeChecker<'a> {
    pub fn check(source: &'a Source) -> CompileResult<()> {
        let scopes = source.scopes()?;
        let mut env = TypeEnv::new();

        for declaration in scopes.frame(scopes.root())?.entries() {
            if let Declaration::Enum(ty) = declaration {
                debug!("[types] enum {}", ty.name);
                env.add_type(&ty.name);
            }
        }

        let mut checker = Self {
            env,
            scopes,
            funcs: vec![],
        };
        traverse(&mut checker, NodeKind::from(source))
    }

    fn type_of(&self, expr: &Expr) -> CompileResult<String> {
        get_type(expr, self.scopes)
    }

    /// The declared type of an assignable variable.
    fn target(&self, lvalue: &Ref) -> CompileResult<&'a TypeRef> {
        match lvalue.resolve(self.scopes)? {
            Declaration::LocalVariable(var) => Ok(&var.type_ref),
            Declaration::Parameter(param) => Ok(&param.type_ref),
            Declaration::GlobalVariable(var) => Ok(&var.type_ref),
            declaration => Err(CompileError::type_error(format!(
                "Can't assign to {}",
                declaration
            ))),
        }
    }
}

impl<'a> Visitor<'a> for TypeChecker<'a> {
    fn enter_func(&mut self, func: &'a Func) -> CompileResult<()> {
        self.funcs.push(func);
        Ok(())
    }

    fn exit_func(&mut self, _func: &'a Func) -> CompileResult<()> {
        self.funcs.pop();
        Ok(())
    }

    fn exit_type_ref(&mut self, type_ref: &'a TypeRef) -> CompileResult<()> {
        self.env.check_type_ref(&type_ref.name)
    }

    fn exit_ref(&mut self, node: &'a Ref) -> CompileResult<()> {
        node.resolve(self.scopes).map(|_| ())
    }

    fn exit_unary_expr(&mut self, expr: &'a UnaryExpr) -> CompileResult<()> {
        let arg_type = self.type_of(&expr.arg)?;

        expr.assign_type(self.env.check_unary(&expr.op, &arg_type)?)
    }

    fn exit_binary_expr(&mut self, expr: &'a BinaryExpr) -> CompileResult<()> {
        let type1 = self.type_of(&expr.left)?;
        let type2 = self.type_of(&expr.right)?;

        expr.assign_type(self.env.check_binary(&expr.op, &type1, &type2)?)
    }

    fn exit_func_call(&mut self, call: &'a FuncCall) -> CompileResult<()> {
        let declaration = call.func.resolve(self.scopes)?;
        let (ptypes, rtype): (Vec<&str>, Option<&str>) = match declaration {
            Declaration::BuiltinFunc(func) => (func.ptypes.to_vec(), Some(func.rtype)),
            Declaration::Func(sig) => (
                sig.params.iter().map(|ty| ty.name.as_str()).collect(),
                sig.return_type.as_ref().map(|ty| ty.name.as_str()),
            ),
            _ => {
                return Err(CompileError::type_error(format!(
                    "{} is not callable",
                    declaration
                )))
            }
        };

        if ptypes.len() != call.args.len() {
            return Err(CompileError::type_error(format!(
                "{} takes {} arguments but {} were given",
                declaration,
                ptypes.len(),
                call.args.len()
            )));
        }

        for (i, (ptype, arg)) in ptypes.iter().zip(&call.args).enumerate() {
            let atype = self.type_of(arg)?;

            if !self.env.is_convertible(&atype, ptype) {
                return Err(CompileError::type_error(format!(
                    "Argument {} of {} must be convertible to {}, but it is {}",
                    i + 1,
                    declaration,
                    ptype,
                    atype
                ))
                .or_position(arg.position()));
            }
        }

        let rtype = rtype.ok_or_else(|| {
            CompileError::type_error(format!(
                "{} has no return value and can't be used as a value",
                declaration
            ))
        })?;

        debug!("[types] {}(...) : {}", call.func.name, rtype);
        call.assign_type(rtype)
    }

    fn exit_json_expr(&mut self, expr: &'a JsonExpr) -> CompileResult<()> {
        let jtype = declaration_type(expr.jvar.resolve(self.scopes)?)?;

        if jtype != JSON {
            return Err(CompileError::type_error(format!(
                "{} is not a json value but {}",
                expr.jvar.name, jtype
            )));
        }

        for idx in &expr.idxs {
            let ty = self.type_of(idx)?;

            if ty != STR && !self.env.is_convertible(&ty, INT) {
                return Err(CompileError::type_error(format!(
                    "json index must be str or int, but it is {}",
                    ty
                ))
                .or_position(idx.position()));
            }
        }
        Ok(())
    }

    fn exit_assignment_stmt(&mut self, stmt: &'a AssignmentStmt) -> CompileResult<()> {
        let type_ref = self.target(&stmt.lvalue)?;

        if type_ref.is_const && !stmt.is_declaration() {
            return Err(CompileError::type_error("Can't assign to constants"));
        }

        let rtype = self.type_of(&stmt.rvalue)?;
        self.env.check_assign(&type_ref.name, &rtype)
    }

    fn exit_update_stmt(&mut self, stmt: &'a UpdateStmt) -> CompileResult<()> {
        let type_ref = self.target(&stmt.lvalue)?;

        if type_ref.is_const {
            return Err(CompileError::type_error("Can't assign to constants"));
        }

        let rtype = self.type_of(&stmt.rvalue)?;
        self.env.check_update(&stmt.op, &type_ref.name, &rtype)
    }

    fn exit_if_stmt(&mut self, stmt: &'a IfStmt) -> CompileResult<()> {
        let ty = self.type_of(&stmt.condition)?;

        self.env
            .check_condition(&ty)
            .map_err(|err| err.or_position(stmt.condition.position()))
    }

    fn exit_elif_section(&mut self, section: &'a ElifSection) -> CompileResult<()> {
        let ty = self.type_of(&section.condition)?;

        self.env
            .check_condition(&ty)
            .map_err(|err| err.or_position(section.condition.position()))
    }

    /// Any value prints. A function name is not a value.
    fn exit_print_stmt(&mut self, stmt: &'a PrintStmt) -> CompileResult<()> {
        for arg in &stmt.args {
            if let Expr::Ref(node) = arg {
                let declaration = node.resolve(self.scopes)?;

                if let Declaration::Func(_) | Declaration::BuiltinFunc(_) = declaration {
                    return Err(CompileError::type_error(format!("Can't print {}", declaration))
                        .or_position(arg.position()));
                }
            }
        }
        Ok(())
    }

    fn exit_return_stmt(&mut self, stmt: &'a ReturnStmt) -> CompileResult<()> {
        let func = self.funcs.last().ok_or_else(|| {
            InternalError::new("return statement outside of a function").with_context("node", stmt)
        })?;

        match (&func.return_type, &stmt.value) {
            (Some(return_type), Some(value)) => {
                let vtype = self.type_of(value)?;

                if self.env.is_convertible(&vtype, &return_type.name) {
                    Ok(())
                } else {
                    Err(CompileError::type_error(format!(
                        "Can't return expression of type {} from function `{}` returning {}",
                        vtype, func.name, return_type.name
                    )))
                }
            }
            (Some(return_type), None) => Err(CompileError::type_error(format!(
                "function `{}` must return a value of type {}",
                func.name, return_type.name
            ))),
            (None, Some(_)) => Err(CompileError::type_error(format!(
                "function `{}` has no return type but returns a value",
                func.name
            ))),
            (None, None) => Ok(()),
        }
    }
}
