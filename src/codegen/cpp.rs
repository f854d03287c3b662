//! C++ (OpenMP, CPU) backend.
//!
//! Expressions lower to inline C++ text. Statements and declarations lower to
//! render requests whose code parameters are the already generated text of
//! their children.
use super::render::{ParamSlot, Prototype, RenderRequest, Renderer, VariableSlot};
use crate::errors::{CompileError, CompileResult, InternalError};
use crate::semantic::{Declaration, Scopes, STR};
use crate::syntax::{
    Block, ElifSection, ElseSection, EnumDecl, Expr, Func, IfStmt, Item, JsonExpr, LocalVariable,
    Position, Ref, Source, Stmt, TypeRef,
};
use log::debug;
use std::collections::BTreeSet;

pub fn mangle(name: &str) -> String {
    format!("_{}", name)
}

fn primitive_type(name: &str) -> Option<&'static str> {
    let ty = match name {
        "int" => "std::int64_t",
        "uint" => "std::uint64_t",
        "float" => "double",
        "bool" => "bool",
        "u8" => "std::uint8_t",
        "u16" => "std::uint16_t",
        "u32" => "std::uint32_t",
        "u64" => "std::uint64_t",
        "i8" => "std::int8_t",
        "i16" => "std::int16_t",
        "i32" => "std::int32_t",
        "i64" => "std::int64_t",
        "f32" => "float",
        "f64" => "double",
        "str" => "std::string",
        _ => return None,
    };

    Some(ty)
}

/// The C++ spelling of a built-in function or constant.
pub fn native_name(name: &str) -> Option<&'static str> {
    let native = match name {
        "sqrt" => "std::sqrt",
        "exp" => "std::exp",
        "log" => "std::log",
        "sin" => "std::sin",
        "cos" => "std::cos",
        "tan" => "std::tan",
        "abs" => "std::fabs",
        "floor" => "std::floor",
        "ceil" => "std::ceil",
        "min" => "std::fmin",
        "max" => "std::fmax",
        "pow" => "std::pow",
        "CONFIG" => "CONFIG",
        _ => return None,
    };

    Some(native)
}

/// Escapes `value` for a C++ string literal, quotes included.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);

    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Files making up a generated project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub main_cpp: String,
    pub cmake_lists: String,
}

pub struct Generator<'a, R: Renderer> {
    scopes: &'a Scopes,
    enums: BTreeSet<String>,
    renderer: &'a mut R,
}

impl<'a, R: Renderer> Generator<'a, R> {
    /// `source` must have been analyzed.
    pub fn new(source: &'a Source, renderer: &'a mut R) -> CompileResult<Self> {
        let scopes = source.scopes()?;
        let enums = scopes
            .frame(scopes.root())?
            .entries()
            .filter_map(|declaration| match declaration {
                Declaration::Enum(ty) => Some(ty.name.clone()),
                _ => None,
            })
            .collect();

        Ok(Self {
            scopes,
            enums,
            renderer,
        })
    }

    fn render(&mut self, request: RenderRequest) -> CompileResult<String> {
        debug!("[codegen] render {}", request.name());
        self.renderer.render(request).map_err(CompileError::from)
    }

    pub fn cpp_type(&self, type_ref: &TypeRef) -> CompileResult<String> {
        if let Some(ty) = primitive_type(&type_ref.name) {
            Ok(ty.to_string())
        } else if self.enums.contains(&type_ref.name) {
            Ok(mangle(&type_ref.name))
        } else {
            Err(InternalError::new(format!("no C++ type for `{}`", type_ref.name))
                .with_context("type", type_ref)
                .into())
        }
    }

    pub fn cpp_init(&self, type_ref: &TypeRef) -> &'static str {
        if type_ref.name == STR {
            "\"\""
        } else if self.enums.contains(&type_ref.name) {
            "{}"
        } else {
            "0"
        }
    }

    fn variable_slot(&self, name: &str, type_ref: &TypeRef) -> CompileResult<VariableSlot> {
        Ok(VariableSlot {
            name: mangle(name),
            r#type: self.cpp_type(type_ref)?,
            init: self.cpp_init(type_ref).to_string(),
        })
    }

    fn lvar_slots(&self, lvars: &[LocalVariable]) -> CompileResult<Vec<VariableSlot>> {
        lvars
            .iter()
            .map(|var| self.variable_slot(&var.name, &var.type_ref))
            .collect()
    }

    fn native(&self, declaration: &Declaration) -> CompileResult<String> {
        native_name(declaration.name()).map(str::to_string).ok_or_else(|| {
            InternalError::new(format!("no native name for {}", declaration))
                .with_context("declaration", declaration)
                .into()
        })
    }

    fn reference(&self, node: &Ref) -> CompileResult<String> {
        let declaration = node.resolve(self.scopes)?;

        match declaration {
            Declaration::BuiltinFunc(_) | Declaration::BuiltinConst(_) => self.native(declaration),
            Declaration::EnumConstant(constant) => Ok(format!(
                "{}::{}",
                mangle(&constant.enum_name),
                mangle(&constant.name)
            )),
            Declaration::Enum(_) => Err(InternalError::new("enumeration used as a value")
                .with_context("node", node)
                .into()),
            _ => Ok(mangle(&node.name)),
        }
    }

    pub fn expr(&self, expr: &Expr) -> CompileResult<String> {
        let code = match expr {
            Expr::Bool(lit) => (if lit.value { "true" } else { "false" }).to_string(),
            Expr::Int(lit) => lit.value.to_string(),
            // `{:?}` keeps the fractional part (`1.0`) so the literal stays a double.
            Expr::Float(lit) => format!("{:?}", lit.value),
            Expr::Str(lit) => quote(&lit.value),
            Expr::Ref(node) => self.reference(node)?,
            Expr::Unary(expr) => format!("( {} ({}) )", expr.op, self.expr(&expr.arg)?),
            Expr::Binary(expr) => {
                let left = self.expr(&expr.left)?;
                let right = self.expr(&expr.right)?;

                if expr.op == "**" {
                    format!("std::pow( ({}), ({}) )", left, right)
                } else {
                    format!("( ({}) {} ({}) )", left, expr.op, right)
                }
            }
            Expr::Call(call) => {
                let args = call
                    .args
                    .iter()
                    .map(|arg| self.expr(arg))
                    .collect::<CompileResult<Vec<_>>>()?;

                format!("{}({})", self.reference(&call.func)?, args.join(", "))
            }
            Expr::Json(expr) => self.json_expr(expr)?,
        };

        Ok(code)
    }

    /// An immediately invoked lambda which turns an access failure into a
    /// runtime error pointing at the source expression.
    fn json_expr(&self, expr: &JsonExpr) -> CompileResult<String> {
        let jvar = match expr.jvar.resolve(self.scopes)? {
            declaration @ Declaration::BuiltinConst(_) => self.native(declaration)?,
            declaration => {
                return Err(InternalError::new("unexpected json variable")
                    .with_context("declaration", declaration)
                    .into())
            }
        };

        let mut access = jvar;
        for idx in &expr.idxs {
            access.push_str(&format!("[{}]", self.expr(idx)?));
        }

        let Position { file, line, column } = &expr.position;
        Ok(format!(
            "[&]() {{ try {{ return {}.template get<{}>(); }} \
             catch (const nlohmann::json::exception& e) {{ \
             throw std::runtime_error(fmt::format(\"bad json expression:{{}}:{{}}:{{}}: {{}}\", {}, {}, {}, e.what())); \
             }} }}()",
            access,
            self.cpp_type(&expr.target)?,
            quote(file),
            line,
            column
        ))
    }

    fn block(&mut self, block: &Block) -> CompileResult<Vec<String>> {
        block.stmts.iter().map(|stmt| self.stmt(stmt)).collect()
    }

    pub fn stmt(&mut self, stmt: &Stmt) -> CompileResult<String> {
        let request = match stmt {
            Stmt::Pass(stmt) => RenderRequest::PassStmt {
                pos: stmt.position.clone(),
            },
            Stmt::Assignment(stmt) => RenderRequest::AssignmentStmt {
                lvalue: self.reference(&stmt.lvalue)?,
                rvalue: self.expr(&stmt.rvalue)?,
                pos: stmt.position.clone(),
            },
            Stmt::Update(stmt) => RenderRequest::UpdateStmt {
                lvalue: self.reference(&stmt.lvalue)?,
                op: stmt.op.clone(),
                rvalue: self.expr(&stmt.rvalue)?,
                pos: stmt.position.clone(),
            },
            Stmt::Print(stmt) => {
                let args = stmt
                    .args
                    .iter()
                    .map(|arg| self.expr(arg))
                    .collect::<CompileResult<Vec<_>>>()?;

                RenderRequest::PrintStmt {
                    format_string: vec!["{}"; args.len()].join(" "),
                    args,
                    pos: stmt.position.clone(),
                }
            }
            Stmt::Return(stmt) => RenderRequest::ReturnStmt {
                value: stmt.value.as_ref().map(|value| self.expr(value)).transpose()?,
                pos: stmt.position.clone(),
            },
            Stmt::If(stmt) => return self.if_stmt(stmt),
        };

        self.render(request)
    }

    fn if_stmt(&mut self, stmt: &IfStmt) -> CompileResult<String> {
        let condition = self.expr(&stmt.condition)?;
        let stmts = self.block(&stmt.block)?;
        let elifs = stmt
            .elifs
            .iter()
            .map(|section| self.elif_section(section))
            .collect::<CompileResult<Vec<_>>>()?;
        let else_ = stmt
            .else_section
            .as_ref()
            .map(|section| self.else_section(section))
            .transpose()?;

        self.render(RenderRequest::IfStmt {
            condition,
            stmts,
            elifs,
            else_,
            pos: stmt.position.clone(),
        })
    }

    fn elif_section(&mut self, section: &ElifSection) -> CompileResult<String> {
        let condition = self.expr(&section.condition)?;
        let stmts = self.block(&section.block)?;

        self.render(RenderRequest::ElifSection {
            condition,
            stmts,
            pos: section.position.clone(),
        })
    }

    fn else_section(&mut self, section: &ElseSection) -> CompileResult<String> {
        let stmts = self.block(&section.block)?;

        self.render(RenderRequest::ElseSection {
            stmts,
            pos: section.position.clone(),
        })
    }

    fn enum_decl(&mut self, decl: &EnumDecl) -> CompileResult<String> {
        self.render(RenderRequest::EnumDecl {
            name: mangle(&decl.name),
            constants: decl.constants.iter().map(|c| mangle(&c.name)).collect(),
            pos: decl.position.clone(),
        })
    }

    fn prototype(&self, func: &Func) -> CompileResult<Prototype> {
        let params = func
            .params
            .iter()
            .map(|param| -> CompileResult<ParamSlot> {
                Ok(ParamSlot {
                    name: mangle(&param.name),
                    r#type: self.cpp_type(&param.type_ref)?,
                })
            })
            .collect::<CompileResult<Vec<_>>>()?;
        let return_type = match func.return_type {
            Some(ref type_ref) => self.cpp_type(type_ref)?,
            None => "void".to_string(),
        };

        Ok(Prototype {
            name: mangle(&func.name),
            params,
            return_type,
        })
    }

    fn func(&mut self, func: &Func) -> CompileResult<String> {
        let Prototype {
            name,
            params,
            return_type,
        } = self.prototype(func)?;
        let lvars = self.lvar_slots(func.lvars()?)?;
        let stmts = self.block(&func.body)?;

        self.render(RenderRequest::Function {
            name,
            params,
            return_type,
            lvars,
            stmts,
            pos: func.position.clone(),
        })
    }

    /// Renders the translation unit. Enums, prototypes, function bodies and
    /// top-level statements each keep source order, so a body may call a
    /// function or name an enum declared after it.
    pub fn program(&mut self, source: &Source) -> CompileResult<String> {
        let prototypes = source
            .items
            .iter()
            .filter_map(|item| match item {
                Item::Func(func) => Some(self.prototype(func)),
                _ => None,
            })
            .collect::<CompileResult<Vec<_>>>()?;

        let mut enums = vec![];
        let mut decls = vec![];
        let mut globals = vec![];
        let mut stmts = vec![];

        for item in &source.items {
            match item {
                Item::GlobalVariable(var) => {
                    globals.push(self.variable_slot(&var.name, &var.type_ref)?)
                }
                Item::Enum(decl) => enums.push(self.enum_decl(decl)?),
                Item::Func(func) => decls.push(self.func(func)?),
                Item::Stmt(stmt) => stmts.push(self.stmt(stmt)?),
            }
        }

        let lvars = self.lvar_slots(source.lvars()?)?;
        self.render(RenderRequest::MainCpp {
            enums,
            prototypes,
            decls,
            globals,
            lvars,
            stmts,
        })
    }

    pub fn project(&mut self, source: &Source, module: &str) -> CompileResult<Project> {
        let main_cpp = self.program(source)?;
        let cmake_lists = self.render(RenderRequest::CMakeLists {
            module: module.to_string(),
        })?;

        Ok(Project {
            main_cpp,
            cmake_lists,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{RenderError, RequestLog};
    use crate::semantic::analyze;
    use crate::semantic::builtins::{BuiltinFunc, BUILTIN_CONSTS, BUILTIN_FUNCS};
    use crate::syntax::fixtures::*;
    use assert_matches::assert_matches;

    fn requests(source: &Source) -> Vec<RenderRequest> {
        analyze(source).unwrap();

        let mut log = RequestLog::new();
        Generator::new(source, &mut log)
            .unwrap()
            .project(source, "fire")
            .unwrap();
        log.into_requests()
    }

    fn expr_text(source: &Source) -> String {
        analyze(source).unwrap();

        let mut log = RequestLog::new();
        let generator = Generator::new(source, &mut log).unwrap();
        match source.items.last() {
            Some(Item::Stmt(Stmt::Assignment(stmt))) => generator.expr(&stmt.rvalue).unwrap(),
            _ => panic!("expected an assignment last"),
        }
    }

    #[test]
    fn operators() {
        let source = main(vec![
            declare(1, "s", ty("float"), float(2.0)),
            declare(2, "a", ty("float"), binary(unary("-", var("s")), "**", float(2.0))),
        ]);
        assert_eq!(expr_text(&source), "std::pow( (( - (_s) )), (2.0) )");

        let source = main(vec![declare(
            1,
            "b",
            ty("bool"),
            binary(binary(int(1), "<", int(2)), "and", boolean(false)),
        )]);
        assert_eq!(expr_text(&source), "( (( (1) < (2) )) and (false) )");
    }

    #[test]
    fn builtin_calls_use_native_names() {
        let source = main(vec![declare(
            1,
            "m",
            ty("float"),
            call("min", vec![call("sqrt", vec![int(2)]), float(1.5)]),
        )]);

        assert_eq!(expr_text(&source), "std::fmin(std::sqrt(2), 1.5)");
    }

    #[test]
    fn string_literals_are_escaped() {
        let source = main(vec![declare(1, "s", ty("str"), string("say \"hi\"\n"))]);

        assert_eq!(expr_text(&source), r#""say \"hi\"\n""#);
    }

    #[test]
    fn json_access_is_guarded() {
        let source = main(vec![declare(
            4,
            "w",
            ty("float"),
            json("CONFIG", vec![string("wind"), int(0)], "float"),
        )]);

        let text = expr_text(&source);
        assert!(text.starts_with("[&]() { try { return CONFIG[\"wind\"][0].template get<double>(); }"));
        assert!(text.contains("catch (const nlohmann::json::exception& e)"));
        assert!(text.contains("\"bad json expression:{}:{}:{}: {}\", \"test.ffs\", 4, 9, e.what()"));
        assert!(text.ends_with("}()"));
    }

    #[test]
    fn enum_constants_are_scoped() {
        let source = program(vec![
            enumeration("Cell", &["EMPTY", "FIRE"]),
            Item::Stmt(declare(1, "c", ty("Cell"), var("FIRE"))),
        ]);

        assert_eq!(expr_text(&source), "_Cell::_FIRE");
    }

    #[test]
    fn statement_requests() {
        let source = main(vec![
            declare(1, "n", ty("int"), int(0)),
            update("n", "+=", int(2)),
            if_stmt(
                binary(var("n"), ">", int(1)),
                vec![print(vec![string("n ="), var("n")])],
                vec![(binary(var("n"), "==", int(1)), vec![pass()])],
                Some(vec![pass()]),
            ),
        ]);

        let requests = requests(&source);
        let names: Vec<_> = requests.iter().map(RenderRequest::name).collect();
        assert_eq!(
            names,
            vec![
                "openmp-cpu:assignment_stmt",
                "openmp-cpu:update_stmt",
                "openmp-cpu:print_stmt",
                "openmp-cpu:pass_stmt",
                "openmp-cpu:elif_section",
                "openmp-cpu:pass_stmt",
                "openmp-cpu:else_section",
                "openmp-cpu:if_stmt",
                "openmp-cpu:main.cpp",
                "openmp-cpu:CMakeLists.txt",
            ]
        );

        assert_matches!(&requests[2], RenderRequest::PrintStmt { format_string, args, .. } => {
            assert_eq!(format_string, "{} {}");
            assert_eq!(args, &vec!["\"n =\"".to_string(), "_n".to_string()]);
        });
        assert_matches!(&requests[7], RenderRequest::IfStmt { stmts, elifs, else_, .. } => {
            assert_eq!(stmts, &vec![RequestLog::placeholder(2)]);
            assert_eq!(elifs, &vec![RequestLog::placeholder(4)]);
            assert_eq!(else_, &Some(RequestLog::placeholder(6)));
        });
        assert_matches!(&requests[8], RenderRequest::MainCpp { enums, prototypes, lvars, stmts, decls, globals } => {
            assert!(enums.is_empty());
            assert!(prototypes.is_empty());
            assert!(decls.is_empty());
            assert!(globals.is_empty());
            assert_eq!(stmts.len(), 3);
            assert_eq!(lvars, &vec![VariableSlot {
                name: "_n".to_string(),
                r#type: "std::int64_t".to_string(),
                init: "0".to_string(),
            }]);
        });
        assert_matches!(&requests[9], RenderRequest::CMakeLists { module } => {
            assert_eq!(module, "fire");
        });
    }

    #[test]
    fn declarations() {
        let source = program(vec![
            enumeration("Cell", &["EMPTY", "FIRE"]),
            global("label", "str"),
            func(
                "spread",
                &[("p", "f32"), ("c", "Cell")],
                Some("bool"),
                vec![
                    declare(3, "r", ty("float"), call("sqrt", vec![var("p")])),
                    ret(Some(binary(var("r"), "<", int(1)))),
                ],
            ),
            func("noop", &[], None, vec![ret(None)]),
            Item::Stmt(declare(9, "cell", ty("Cell"), var("EMPTY"))),
        ]);

        let requests = requests(&source);

        assert_matches!(&requests[0], RenderRequest::EnumDecl { name, constants, .. } => {
            assert_eq!(name, "_Cell");
            assert_eq!(constants, &vec!["_EMPTY".to_string(), "_FIRE".to_string()]);
        });
        assert_matches!(&requests[3], RenderRequest::Function { name, params, return_type, lvars, stmts, .. } => {
            assert_eq!(name, "_spread");
            assert_eq!(return_type, "bool");
            assert_eq!(params, &vec![
                ParamSlot { name: "_p".to_string(), r#type: "float".to_string() },
                ParamSlot { name: "_c".to_string(), r#type: "_Cell".to_string() },
            ]);
            assert_eq!(lvars.len(), 1);
            assert_eq!(stmts.len(), 2);
        });
        assert_matches!(&requests[4], RenderRequest::ReturnStmt { value: None, .. });
        assert_matches!(&requests[5], RenderRequest::Function { return_type, .. } => {
            assert_eq!(return_type, "void");
        });
        assert_matches!(&requests[7], RenderRequest::MainCpp { enums, prototypes, decls, globals, lvars, .. } => {
            assert_eq!(enums, &vec![RequestLog::placeholder(0)]);
            assert_eq!(decls, &vec![RequestLog::placeholder(3), RequestLog::placeholder(5)]);
            assert_eq!(prototypes[0].name, "_spread");
            assert_eq!(prototypes[1], Prototype {
                name: "_noop".to_string(),
                params: vec![],
                return_type: "void".to_string(),
            });
            assert_eq!(globals[0].init, "\"\"");
            assert_eq!(globals[0].r#type, "std::string");
            assert_eq!(lvars[0].init, "{}");
            assert_eq!(lvars[0].r#type, "_Cell");
        });
    }

    #[test]
    fn later_declarations_have_prototypes() {
        let source = program(vec![
            func(
                "ping",
                &[("n", "int")],
                Some("int"),
                vec![ret(Some(call("pong", vec![var("n")])))],
            ),
            func(
                "pong",
                &[("n", "int")],
                Some("int"),
                vec![ret(Some(call("ping", vec![var("n")])))],
            ),
            func(
                "first",
                &[],
                Some("bool"),
                vec![ret(Some(binary(call("ping", vec![int(1)]), "<", int(2))))],
            ),
            enumeration("Cell", &["EMPTY"]),
            Item::Stmt(pass()),
        ]);

        let requests = requests(&source);

        assert_matches!(&requests[0], RenderRequest::ReturnStmt { value: Some(value), .. } => {
            assert_eq!(value, "_pong(_n)");
        });
        assert_matches!(requests.iter().find(|r| r.name() == "openmp-cpu:main.cpp"),
            Some(RenderRequest::MainCpp { enums, prototypes, decls, .. }) => {
                let names: Vec<_> = prototypes.iter().map(|p| p.name.as_str()).collect();
                assert_eq!(names, vec!["_ping", "_pong", "_first"]);
                assert_eq!(prototypes[1].params, vec![ParamSlot {
                    name: "_n".to_string(),
                    r#type: "std::int64_t".to_string(),
                }]);
                assert_eq!(prototypes[1].return_type, "std::int64_t");
                assert_eq!(enums, &vec![RequestLog::placeholder(6)]);
                assert_eq!(decls.len(), 3);
            }
        );
    }

    #[test]
    fn every_builtin_has_native_name() {
        let names = BUILTIN_FUNCS
            .iter()
            .map(|func| func.name)
            .chain(BUILTIN_CONSTS.iter().map(|constant| constant.name));

        for name in names {
            assert!(native_name(name).is_some(), "no native name for {}", name);
        }
    }

    #[test]
    fn unmapped_builtin_is_internal_error() {
        static ERF: BuiltinFunc = BuiltinFunc {
            name: "erf",
            ptypes: &["float"],
            rtype: "float",
        };
        let source = main(vec![pass()]);
        analyze(&source).unwrap();

        let mut log = RequestLog::new();
        let generator = Generator::new(&source, &mut log).unwrap();

        assert!(generator.native(&Declaration::BuiltinFunc(&ERF)).unwrap_err().is_internal());
    }

    struct Refusing;

    impl Renderer for Refusing {
        fn render(&mut self, request: RenderRequest) -> Result<String, RenderError> {
            Err(RenderError::UnknownTemplate(request.name().to_string()))
        }
    }

    #[test]
    fn renderer_errors_abort_generation() {
        let source = main(vec![pass()]);
        analyze(&source).unwrap();

        let mut renderer = Refusing;
        let err = Generator::new(&source, &mut renderer)
            .unwrap()
            .program(&source)
            .unwrap_err();

        assert_matches!(err, CompileError::Render(RenderError::UnknownTemplate(name)) => {
            assert_eq!(name, "openmp-cpu:pass_stmt");
        });
    }

    #[test]
    fn unannotated_tree_is_internal_error() {
        let source = main(vec![pass()]);
        let mut log = RequestLog::new();

        assert!(Generator::new(&source, &mut log).err().unwrap().is_internal());
    }
}
