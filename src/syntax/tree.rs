//! Abstract syntax tree
//! --------------------
//!
//! The tree is built once by the front end. Structural fields never change
//! afterwards; the only mutation is annotation through the write-once slots
//! (`OnceCell`), each of which is filled by exactly one pass.
//!
//! ```ignore
//! Source        := Item*
//! Item          := GlobalVariable | EnumDecl | Func | Stmt
//! GlobalVariable:= "global" Id ":" TypeRef
//! EnumDecl      := "enum" Id "{" EnumConstant ("," EnumConstant)* "}"
//! Func          := "fn" Id "(" (Parameter ",")* Parameter? ")" ("->" TypeRef)? Block
//! Parameter     := Id ":" TypeRef
//! Stmt          := PassStmt | AssignmentStmt | UpdateStmt | PrintStmt | IfStmt | ReturnStmt
//! AssignmentStmt:= Ref (":" TypeRef)? "=" Expr
//! UpdateStmt    := Ref ("+=" | "-=" | "*=" | "/=") Expr
//! IfStmt        := "if" Expr Block ElifSection* ElseSection?
//! Expr          := Bool | Int | Float | Str | Ref | UnaryExpr | BinaryExpr | FuncCall | JsonExpr
//! JsonExpr      := Ref ("[" Expr "]")+ "as" TypeRef
//! TypeRef       := "const"? Id
//! ```
use super::Position;
use crate::errors::{CompileError, CompileResult, InternalError};
use crate::semantic::{Capabilities, Declaration, FrameId, FuncId, ReturnSite, Scopes};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::fmt;

fn assign_once<T: fmt::Debug>(cell: &OnceCell<T>, value: T, what: &str) -> CompileResult<()> {
    cell.set(value).map_err(|value| {
        InternalError::new(format!("{} was already assigned", what))
            .with_context("rejected value", &value)
            .into()
    })
}

fn annotation<'a, T>(cell: &'a OnceCell<T>, what: &str) -> CompileResult<&'a T> {
    cell.get()
        .ok_or_else(|| CompileError::internal(format!("{} is not annotated yet", what)))
}

// --- Program structure

#[derive(Debug, Serialize, Deserialize)]
pub struct Source {
    pub position: Position,
    pub items: Vec<Item>,
    #[serde(skip)]
    scopes: OnceCell<Scopes>,
    #[serde(skip)]
    lvars: OnceCell<Vec<LocalVariable>>,
}

impl Source {
    pub fn new(position: Position, items: Vec<Item>) -> Self {
        Self {
            position,
            items,
            scopes: OnceCell::new(),
            lvars: OnceCell::new(),
        }
    }

    /// The frame arena built by the scope-building pass.
    pub fn scopes(&self) -> CompileResult<&Scopes> {
        annotation(&self.scopes, "scope chain of the program")
    }

    pub fn assign_scopes(&self, scopes: Scopes) -> CompileResult<()> {
        assign_once(&self.scopes, scopes, "scope chain of the program")
    }

    /// Local variables of the top-level statements, in declaration order.
    pub fn lvars(&self) -> CompileResult<&[LocalVariable]> {
        annotation(&self.lvars, "local variables of the program").map(Vec::as_slice)
    }

    pub fn assign_lvars(&self, lvars: Vec<LocalVariable>) -> CompileResult<()> {
        assign_once(&self.lvars, lvars, "local variables of the program")
    }

    pub fn functions(&self) -> impl Iterator<Item = &Func> + '_ {
        self.items.iter().filter_map(|item| match item {
            Item::Func(func) => Some(func),
            _ => None,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub enum Item {
    GlobalVariable(GlobalVariable),
    Enum(EnumDecl),
    Func(Func),
    Stmt(Stmt),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalVariable {
    pub position: Position,
    pub name: String,
    pub type_ref: TypeRef,
}

impl GlobalVariable {
    pub fn new<S: Into<String>>(position: Position, name: S, type_ref: TypeRef) -> Self {
        Self {
            position,
            name: name.into(),
            type_ref,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EnumDecl {
    pub position: Position,
    pub name: String,
    pub constants: Vec<EnumConstant>,
}

impl EnumDecl {
    pub fn new<S: Into<String>>(position: Position, name: S, constants: Vec<EnumConstant>) -> Self {
        Self {
            position,
            name: name.into(),
            constants,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumConstant {
    pub position: Position,
    pub name: String,
    /// The enumeration this constant belongs to, which is also its type.
    pub enum_name: String,
}

impl EnumConstant {
    pub fn new<S: Into<String>, E: Into<String>>(position: Position, name: S, enum_name: E) -> Self {
        Self {
            position,
            name: name.into(),
            enum_name: enum_name.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Func {
    pub position: Position,
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeRef>,
    pub body: Block,
    #[serde(skip)]
    id: OnceCell<FuncId>,
    #[serde(skip)]
    frame: OnceCell<FrameId>,
    #[serde(skip)]
    lvars: OnceCell<Vec<LocalVariable>>,
    #[serde(skip)]
    return_stmts: OnceCell<Vec<ReturnSite>>,
    #[serde(skip)]
    capabilities: OnceCell<Capabilities>,
}

impl Func {
    pub fn new<S: Into<String>>(
        position: Position,
        name: S,
        params: Vec<Parameter>,
        return_type: Option<TypeRef>,
        body: Block,
    ) -> Self {
        Self {
            position,
            name: name.into(),
            params,
            return_type,
            body,
            id: OnceCell::new(),
            frame: OnceCell::new(),
            lvars: OnceCell::new(),
            return_stmts: OnceCell::new(),
            capabilities: OnceCell::new(),
        }
    }

    pub fn id(&self) -> CompileResult<FuncId> {
        annotation(&self.id, "function id").copied()
    }

    pub fn assign_id(&self, id: FuncId) -> CompileResult<()> {
        assign_once(&self.id, id, "function id")
    }

    /// The private frame opened for this function's body.
    pub fn frame(&self) -> CompileResult<FrameId> {
        annotation(&self.frame, "function frame").copied()
    }

    pub fn assign_frame(&self, frame: FrameId) -> CompileResult<()> {
        assign_once(&self.frame, frame, "function frame")
    }

    pub fn lvars(&self) -> CompileResult<&[LocalVariable]> {
        annotation(&self.lvars, "local variables").map(Vec::as_slice)
    }

    pub fn assign_lvars(&self, lvars: Vec<LocalVariable>) -> CompileResult<()> {
        assign_once(&self.lvars, lvars, "local variables")
    }

    pub fn return_stmts(&self) -> CompileResult<&[ReturnSite]> {
        annotation(&self.return_stmts, "return statements").map(Vec::as_slice)
    }

    pub fn assign_return_stmts(&self, sites: Vec<ReturnSite>) -> CompileResult<()> {
        assign_once(&self.return_stmts, sites, "return statements")
    }

    pub fn capabilities(&self) -> CompileResult<&Capabilities> {
        annotation(&self.capabilities, "capabilities")
    }

    pub fn assign_capabilities(&self, capabilities: Capabilities) -> CompileResult<()> {
        assign_once(&self.capabilities, capabilities, "capabilities")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub position: Position,
    pub name: String,
    pub type_ref: TypeRef,
}

impl Parameter {
    pub fn new<S: Into<String>>(position: Position, name: S, type_ref: TypeRef) -> Self {
        Self {
            position,
            name: name.into(),
            type_ref,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalVariable {
    pub position: Position,
    pub name: String,
    pub type_ref: TypeRef,
}

impl LocalVariable {
    pub fn new<S: Into<String>>(position: Position, name: S, type_ref: TypeRef) -> Self {
        Self {
            position,
            name: name.into(),
            type_ref,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub position: Position,
    pub name: String,
    pub is_const: bool,
}

impl TypeRef {
    pub fn new<S: Into<String>>(position: Position, name: S, is_const: bool) -> Self {
        Self {
            position,
            name: name.into(),
            is_const,
        }
    }
}

// --- Statements

#[derive(Debug, Serialize, Deserialize)]
pub struct Block {
    pub position: Position,
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(position: Position, stmts: Vec<Stmt>) -> Self {
        Self { position, stmts }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub enum Stmt {
    Pass(PassStmt),
    Assignment(AssignmentStmt),
    Update(UpdateStmt),
    Print(PrintStmt),
    If(IfStmt),
    Return(ReturnStmt),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PassStmt {
    pub position: Position,
}

impl PassStmt {
    pub fn new(position: Position) -> Self {
        Self { position }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssignmentStmt {
    pub position: Position,
    pub lvalue: Ref,
    pub rvalue: Expr,
    /// `Some` only on the declaring occurrence of the variable.
    pub var: Option<LocalVariable>,
}

impl AssignmentStmt {
    pub fn new(position: Position, lvalue: Ref, rvalue: Expr, var: Option<LocalVariable>) -> Self {
        Self {
            position,
            lvalue,
            rvalue,
            var,
        }
    }

    pub fn is_declaration(&self) -> bool {
        self.var.is_some()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateStmt {
    pub position: Position,
    pub lvalue: Ref,
    pub op: String,
    pub rvalue: Expr,
}

impl UpdateStmt {
    pub fn new<S: Into<String>>(position: Position, lvalue: Ref, op: S, rvalue: Expr) -> Self {
        Self {
            position,
            lvalue,
            op: op.into(),
            rvalue,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PrintStmt {
    pub position: Position,
    pub args: Vec<Expr>,
}

impl PrintStmt {
    pub fn new(position: Position, args: Vec<Expr>) -> Self {
        Self { position, args }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IfStmt {
    pub position: Position,
    pub condition: Expr,
    pub block: Block,
    pub elifs: Vec<ElifSection>,
    pub else_section: Option<ElseSection>,
}

impl IfStmt {
    pub fn new(
        position: Position,
        condition: Expr,
        block: Block,
        elifs: Vec<ElifSection>,
        else_section: Option<ElseSection>,
    ) -> Self {
        Self {
            position,
            condition,
            block,
            elifs,
            else_section,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ElifSection {
    pub position: Position,
    pub condition: Expr,
    pub block: Block,
}

impl ElifSection {
    pub fn new(position: Position, condition: Expr, block: Block) -> Self {
        Self {
            position,
            condition,
            block,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ElseSection {
    pub position: Position,
    pub block: Block,
}

impl ElseSection {
    pub fn new(position: Position, block: Block) -> Self {
        Self { position, block }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReturnStmt {
    pub position: Position,
    pub value: Option<Expr>,
    #[serde(skip)]
    func: OnceCell<FuncId>,
}

impl ReturnStmt {
    pub fn new(position: Position, value: Option<Expr>) -> Self {
        Self {
            position,
            value,
            func: OnceCell::new(),
        }
    }

    /// The function this statement returns from.
    pub fn func(&self) -> CompileResult<FuncId> {
        annotation(&self.func, "owner of return statement").copied()
    }

    pub fn assign_func(&self, func: FuncId) -> CompileResult<()> {
        assign_once(&self.func, func, "owner of return statement")
    }
}

// --- Expressions

#[derive(Debug, Serialize, Deserialize)]
pub enum Expr {
    Bool(BoolLiteral),
    Int(IntLiteral),
    Float(FloatLiteral),
    Str(StrLiteral),
    Ref(Ref),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Call(FuncCall),
    Json(JsonExpr),
}

impl Expr {
    pub fn position(&self) -> &Position {
        NodeKind::from(self).position()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoolLiteral {
    pub position: Position,
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntLiteral {
    pub position: Position,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatLiteral {
    pub position: Position,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrLiteral {
    pub position: Position,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Ref {
    pub position: Position,
    pub name: String,
    #[serde(skip)]
    frame: OnceCell<FrameId>,
}

impl Ref {
    pub fn new<S: Into<String>>(position: Position, name: S) -> Self {
        Self {
            position,
            name: name.into(),
            frame: OnceCell::new(),
        }
    }

    /// The frame which was active at this reference's site.
    pub fn frame(&self) -> CompileResult<FrameId> {
        annotation(&self.frame, "reference frame").copied()
    }

    pub fn bind(&self, frame: FrameId) -> CompileResult<()> {
        assign_once(&self.frame, frame, "reference frame")
    }

    /// Looks this name up through the chain starting at the recorded frame.
    pub fn resolve<'s>(&self, scopes: &'s Scopes) -> CompileResult<&'s Declaration> {
        scopes.resolve(self.frame()?, &self.name)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub position: Position,
    pub op: String,
    pub arg: Box<Expr>,
    #[serde(skip)]
    r#type: OnceCell<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub position: Position,
    pub left: Box<Expr>,
    pub op: String,
    pub right: Box<Expr>,
    #[serde(skip)]
    r#type: OnceCell<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FuncCall {
    pub position: Position,
    pub func: Ref,
    pub args: Vec<Expr>,
    #[serde(skip)]
    r#type: OnceCell<String>,
}

/// Indexing into a schema-less value. The author declares the result type.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonExpr {
    pub position: Position,
    pub jvar: Ref,
    pub idxs: Vec<Expr>,
    pub target: TypeRef,
}

impl JsonExpr {
    pub fn new(position: Position, jvar: Ref, idxs: Vec<Expr>, target: TypeRef) -> Self {
        Self {
            position,
            jvar,
            idxs,
            target,
        }
    }
}

macro_rules! literal_constructor {
    ($node:ident, $ty:ty) => {
        impl $node {
            pub fn new(position: Position, value: $ty) -> Self {
                Self { position, value }
            }
        }
    };
}

literal_constructor!(BoolLiteral, bool);
literal_constructor!(IntLiteral, i64);
literal_constructor!(FloatLiteral, f64);
literal_constructor!(StrLiteral, String);

/// Write-once type slot shared by operator and call expressions.
macro_rules! typed_expression {
    ($node:ident) => {
        impl $node {
            pub fn r#type(&self) -> CompileResult<&str> {
                self.r#type
                    .get()
                    .map(String::as_str)
                    .ok_or_else(|| {
                        InternalError::new("expression type is not annotated yet")
                            .with_context("node", self)
                            .into()
                    })
            }

            /// Assigning the same type again is a no-op. A different type means
            /// the checker derived two answers for one node.
            pub fn assign_type<S: Into<String>>(&self, ty: S) -> CompileResult<()> {
                let ty = ty.into();

                if let Some(assigned) = self.r#type.get() {
                    if *assigned == ty {
                        return Ok(());
                    }
                    return Err(InternalError::new(format!(
                        "type of expression changed from `{}` to `{}`",
                        assigned, ty
                    ))
                    .with_context("node", self)
                    .into());
                }
                assign_once(&self.r#type, ty, "expression type")
            }
        }
    };
}

typed_expression!(UnaryExpr);
typed_expression!(BinaryExpr);
typed_expression!(FuncCall);

impl UnaryExpr {
    pub fn new<S: Into<String>>(position: Position, op: S, arg: Expr) -> Self {
        Self {
            position,
            op: op.into(),
            arg: Box::new(arg),
            r#type: OnceCell::new(),
        }
    }
}

impl BinaryExpr {
    pub fn new<S: Into<String>>(position: Position, left: Expr, op: S, right: Expr) -> Self {
        Self {
            position,
            left: Box::new(left),
            op: op.into(),
            right: Box::new(right),
            r#type: OnceCell::new(),
        }
    }
}

impl FuncCall {
    pub fn new(position: Position, func: Ref, args: Vec<Expr>) -> Self {
        Self {
            position,
            func,
            args,
            r#type: OnceCell::new(),
        }
    }
}

// --- Generic traversal

/// A borrowed view of any node, used for variant-agnostic tree walks.
#[derive(Debug, Clone, Copy)]
pub enum NodeKind<'a> {
    Source(&'a Source),
    GlobalVariable(&'a GlobalVariable),
    EnumDecl(&'a EnumDecl),
    EnumConstant(&'a EnumConstant),
    Func(&'a Func),
    Parameter(&'a Parameter),
    LocalVariable(&'a LocalVariable),
    TypeRef(&'a TypeRef),
    Block(&'a Block),
    PassStmt(&'a PassStmt),
    AssignmentStmt(&'a AssignmentStmt),
    UpdateStmt(&'a UpdateStmt),
    PrintStmt(&'a PrintStmt),
    IfStmt(&'a IfStmt),
    ElifSection(&'a ElifSection),
    ElseSection(&'a ElseSection),
    ReturnStmt(&'a ReturnStmt),
    Bool(&'a BoolLiteral),
    Int(&'a IntLiteral),
    Float(&'a FloatLiteral),
    Str(&'a StrLiteral),
    Ref(&'a Ref),
    UnaryExpr(&'a UnaryExpr),
    BinaryExpr(&'a BinaryExpr),
    FuncCall(&'a FuncCall),
    JsonExpr(&'a JsonExpr),
}

impl<'a> NodeKind<'a> {
    pub fn position(&self) -> &'a Position {
        match *self {
            NodeKind::Source(node) => &node.position,
            NodeKind::GlobalVariable(node) => &node.position,
            NodeKind::EnumDecl(node) => &node.position,
            NodeKind::EnumConstant(node) => &node.position,
            NodeKind::Func(node) => &node.position,
            NodeKind::Parameter(node) => &node.position,
            NodeKind::LocalVariable(node) => &node.position,
            NodeKind::TypeRef(node) => &node.position,
            NodeKind::Block(node) => &node.position,
            NodeKind::PassStmt(node) => &node.position,
            NodeKind::AssignmentStmt(node) => &node.position,
            NodeKind::UpdateStmt(node) => &node.position,
            NodeKind::PrintStmt(node) => &node.position,
            NodeKind::IfStmt(node) => &node.position,
            NodeKind::ElifSection(node) => &node.position,
            NodeKind::ElseSection(node) => &node.position,
            NodeKind::ReturnStmt(node) => &node.position,
            NodeKind::Bool(node) => &node.position,
            NodeKind::Int(node) => &node.position,
            NodeKind::Float(node) => &node.position,
            NodeKind::Str(node) => &node.position,
            NodeKind::Ref(node) => &node.position,
            NodeKind::UnaryExpr(node) => &node.position,
            NodeKind::BinaryExpr(node) => &node.position,
            NodeKind::FuncCall(node) => &node.position,
            NodeKind::JsonExpr(node) => &node.position,
        }
    }

    /// Child nodes in source order.
    pub fn children(&self) -> Vec<NodeKind<'a>> {
        match *self {
            NodeKind::Source(source) => source.items.iter().map(NodeKind::from).collect(),
            NodeKind::GlobalVariable(var) => vec![NodeKind::TypeRef(&var.type_ref)],
            NodeKind::EnumDecl(decl) => decl.constants.iter().map(NodeKind::EnumConstant).collect(),
            NodeKind::Func(func) => {
                let mut children: Vec<_> = func.params.iter().map(NodeKind::Parameter).collect();

                if let Some(ref return_type) = func.return_type {
                    children.push(NodeKind::TypeRef(return_type));
                }
                children.push(NodeKind::Block(&func.body));
                children
            }
            NodeKind::Parameter(param) => vec![NodeKind::TypeRef(&param.type_ref)],
            NodeKind::LocalVariable(var) => vec![NodeKind::TypeRef(&var.type_ref)],
            NodeKind::Block(block) => block.stmts.iter().map(NodeKind::from).collect(),
            NodeKind::AssignmentStmt(stmt) => {
                let mut children = vec![];

                if let Some(ref var) = stmt.var {
                    children.push(NodeKind::LocalVariable(var));
                }
                children.push(NodeKind::Ref(&stmt.lvalue));
                children.push(NodeKind::from(&stmt.rvalue));
                children
            }
            NodeKind::UpdateStmt(stmt) => {
                vec![NodeKind::Ref(&stmt.lvalue), NodeKind::from(&stmt.rvalue)]
            }
            NodeKind::PrintStmt(stmt) => stmt.args.iter().map(NodeKind::from).collect(),
            NodeKind::IfStmt(stmt) => {
                let mut children = vec![NodeKind::from(&stmt.condition), NodeKind::Block(&stmt.block)];

                children.extend(stmt.elifs.iter().map(NodeKind::ElifSection));
                if let Some(ref section) = stmt.else_section {
                    children.push(NodeKind::ElseSection(section));
                }
                children
            }
            NodeKind::ElifSection(section) => {
                vec![NodeKind::from(&section.condition), NodeKind::Block(&section.block)]
            }
            NodeKind::ElseSection(section) => vec![NodeKind::Block(&section.block)],
            NodeKind::ReturnStmt(stmt) => stmt.value.iter().map(NodeKind::from).collect(),
            NodeKind::UnaryExpr(expr) => vec![NodeKind::from(&*expr.arg)],
            NodeKind::BinaryExpr(expr) => {
                vec![NodeKind::from(&*expr.left), NodeKind::from(&*expr.right)]
            }
            NodeKind::FuncCall(call) => {
                let mut children = vec![NodeKind::Ref(&call.func)];

                children.extend(call.args.iter().map(NodeKind::from));
                children
            }
            NodeKind::JsonExpr(expr) => {
                let mut children = vec![NodeKind::Ref(&expr.jvar)];

                children.extend(expr.idxs.iter().map(NodeKind::from));
                children.push(NodeKind::TypeRef(&expr.target));
                children
            }
            NodeKind::EnumConstant(_)
            | NodeKind::TypeRef(_)
            | NodeKind::PassStmt(_)
            | NodeKind::Bool(_)
            | NodeKind::Int(_)
            | NodeKind::Float(_)
            | NodeKind::Str(_)
            | NodeKind::Ref(_) => vec![],
        }
    }
}

impl<'a> From<&'a Item> for NodeKind<'a> {
    fn from(item: &'a Item) -> Self {
        match item {
            Item::GlobalVariable(var) => NodeKind::GlobalVariable(var),
            Item::Enum(decl) => NodeKind::EnumDecl(decl),
            Item::Func(func) => NodeKind::Func(func),
            Item::Stmt(stmt) => NodeKind::from(stmt),
        }
    }
}

impl<'a> From<&'a Stmt> for NodeKind<'a> {
    fn from(stmt: &'a Stmt) -> Self {
        match stmt {
            Stmt::Pass(stmt) => NodeKind::PassStmt(stmt),
            Stmt::Assignment(stmt) => NodeKind::AssignmentStmt(stmt),
            Stmt::Update(stmt) => NodeKind::UpdateStmt(stmt),
            Stmt::Print(stmt) => NodeKind::PrintStmt(stmt),
            Stmt::If(stmt) => NodeKind::IfStmt(stmt),
            Stmt::Return(stmt) => NodeKind::ReturnStmt(stmt),
        }
    }
}

impl<'a> From<&'a Expr> for NodeKind<'a> {
    fn from(expr: &'a Expr) -> Self {
        match expr {
            Expr::Bool(lit) => NodeKind::Bool(lit),
            Expr::Int(lit) => NodeKind::Int(lit),
            Expr::Float(lit) => NodeKind::Float(lit),
            Expr::Str(lit) => NodeKind::Str(lit),
            Expr::Ref(node) => NodeKind::Ref(node),
            Expr::Unary(expr) => NodeKind::UnaryExpr(expr),
            Expr::Binary(expr) => NodeKind::BinaryExpr(expr),
            Expr::Call(call) => NodeKind::FuncCall(call),
            Expr::Json(expr) => NodeKind::JsonExpr(expr),
        }
    }
}

impl<'a> From<&'a Source> for NodeKind<'a> {
    fn from(source: &'a Source) -> Self {
        NodeKind::Source(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::fixtures::*;
    use assert_matches::assert_matches;

    #[test]
    fn children_follow_source_order() {
        let stmt = declare(1, "x", ty("int"), binary(int(1), "+", var("y")));
        let node = NodeKind::from(&stmt);
        let children = node.children();

        assert_eq!(children.len(), 3);
        assert_matches!(children[0], NodeKind::LocalVariable(var) => {
            assert_eq!(var.name, "x");
        });
        assert_matches!(children[1], NodeKind::Ref(lvalue) => {
            assert_eq!(lvalue.name, "x");
        });
        assert_matches!(children[2], NodeKind::BinaryExpr(_));
    }

    #[test]
    fn if_children_include_sections() {
        let stmt = if_stmt(
            boolean(true),
            vec![pass()],
            vec![(boolean(false), vec![pass()])],
            Some(vec![pass()]),
        );
        let children = NodeKind::from(&stmt).children();

        assert_eq!(children.len(), 4);
        assert_matches!(children[2], NodeKind::ElifSection(_));
        assert_matches!(children[3], NodeKind::ElseSection(_));
    }

    #[test]
    fn type_slot_is_write_once() {
        let expr = BinaryExpr::new(p(1, 1), int(1), "+", int(2));

        assert!(expr.r#type().unwrap_err().is_internal());
        expr.assign_type("int").unwrap();
        expr.assign_type("int").unwrap();
        assert_eq!(expr.r#type().unwrap(), "int");
        assert!(expr.assign_type("float").unwrap_err().is_internal());
    }

    #[test]
    fn deserialized_tree_is_unannotated() {
        let source = program(vec![Item::Stmt(declare(1, "x", ty("int"), int(1)))]);
        let json = serde_json::to_string(&source).unwrap();
        let source: Source = serde_json::from_str(&json).unwrap();

        assert!(source.scopes().is_err());
        assert!(source.lvars().is_err());
        assert_eq!(source.items.len(), 1);
    }
}
