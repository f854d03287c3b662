//! Terse constructors for building trees in tests.
use super::*;

pub const FILE: &str = "test.ffs";

pub fn p(line: u32, column: u32) -> Position {
    Position::new(FILE, line, column)
}

pub fn int(value: i64) -> Expr {
    Expr::Int(IntLiteral::new(p(1, 1), value))
}

pub fn float(value: f64) -> Expr {
    Expr::Float(FloatLiteral::new(p(1, 1), value))
}

pub fn boolean(value: bool) -> Expr {
    Expr::Bool(BoolLiteral::new(p(1, 1), value))
}

pub fn string(value: &str) -> Expr {
    Expr::Str(StrLiteral::new(p(1, 1), value.to_string()))
}

pub fn var(name: &str) -> Expr {
    Expr::Ref(Ref::new(p(1, 1), name))
}

pub fn unary(op: &str, arg: Expr) -> Expr {
    Expr::Unary(UnaryExpr::new(p(1, 1), op, arg))
}

pub fn binary(left: Expr, op: &str, right: Expr) -> Expr {
    Expr::Binary(BinaryExpr::new(p(1, 1), left, op, right))
}

pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Call(FuncCall::new(p(1, 1), Ref::new(p(1, 1), name), args))
}

pub fn json(name: &str, idxs: Vec<Expr>, target: &str) -> Expr {
    Expr::Json(JsonExpr::new(
        p(4, 9),
        Ref::new(p(4, 9), name),
        idxs,
        ty(target),
    ))
}

pub fn ty(name: &str) -> TypeRef {
    TypeRef::new(p(1, 1), name, false)
}

pub fn const_ty(name: &str) -> TypeRef {
    TypeRef::new(p(1, 1), name, true)
}

/// The declaring occurrence `name: ty = value` on `line`.
pub fn declare(line: u32, name: &str, type_ref: TypeRef, value: Expr) -> Stmt {
    Stmt::Assignment(AssignmentStmt::new(
        p(line, 1),
        Ref::new(p(line, 1), name),
        value,
        Some(LocalVariable::new(p(line, 1), name, type_ref)),
    ))
}

pub fn assign(line: u32, name: &str, value: Expr) -> Stmt {
    Stmt::Assignment(AssignmentStmt::new(
        p(line, 1),
        Ref::new(p(line, 1), name),
        value,
        None,
    ))
}

pub fn update(name: &str, op: &str, value: Expr) -> Stmt {
    Stmt::Update(UpdateStmt::new(p(1, 1), Ref::new(p(1, 1), name), op, value))
}

pub fn print(args: Vec<Expr>) -> Stmt {
    Stmt::Print(PrintStmt::new(p(1, 1), args))
}

pub fn pass() -> Stmt {
    Stmt::Pass(PassStmt::new(p(1, 1)))
}

pub fn ret(value: Option<Expr>) -> Stmt {
    Stmt::Return(ReturnStmt::new(p(1, 1), value))
}

pub fn block(stmts: Vec<Stmt>) -> Block {
    Block::new(p(1, 1), stmts)
}

pub fn if_stmt(
    condition: Expr,
    then: Vec<Stmt>,
    elifs: Vec<(Expr, Vec<Stmt>)>,
    otherwise: Option<Vec<Stmt>>,
) -> Stmt {
    let elifs = elifs
        .into_iter()
        .map(|(condition, stmts)| ElifSection::new(p(1, 1), condition, block(stmts)))
        .collect();
    let else_section = otherwise.map(|stmts| ElseSection::new(p(1, 1), block(stmts)));

    Stmt::If(IfStmt::new(
        p(1, 1),
        condition,
        block(then),
        elifs,
        else_section,
    ))
}

pub fn func(name: &str, params: &[(&str, &str)], return_type: Option<&str>, body: Vec<Stmt>) -> Item {
    let params = params
        .iter()
        .map(|(name, type_name)| Parameter::new(p(1, 1), *name, ty(type_name)))
        .collect();

    Item::Func(Func::new(
        p(1, 1),
        name,
        params,
        return_type.map(ty),
        block(body),
    ))
}

pub fn global(name: &str, type_name: &str) -> Item {
    Item::GlobalVariable(GlobalVariable::new(p(1, 1), name, ty(type_name)))
}

pub fn enumeration(name: &str, constants: &[&str]) -> Item {
    let constants = constants
        .iter()
        .map(|constant| EnumConstant::new(p(1, 1), *constant, name))
        .collect();

    Item::Enum(EnumDecl::new(p(1, 1), name, constants))
}

pub fn program(items: Vec<Item>) -> Source {
    Source::new(p(1, 1), items)
}

/// A program made of top-level statements only.
pub fn main(stmts: Vec<Stmt>) -> Source {
    program(stmts.into_iter().map(Item::Stmt).collect())
}
