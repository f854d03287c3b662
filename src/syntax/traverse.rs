use super::tree::*;
use crate::errors::CompileResult;

/// Hooks invoked by [`traverse`]. `enter_*` runs before the children of a
/// node are visited (pre-order), `exit_*` after all of them (post-order).
#[allow(unused_variables)]
pub trait Visitor<'a> {
    fn enter_source(&mut self, source: &'a Source) -> CompileResult<()> {
        Ok(())
    }
    fn exit_source(&mut self, source: &'a Source) -> CompileResult<()> {
        Ok(())
    }

    fn enter_global_variable(&mut self, var: &'a GlobalVariable) -> CompileResult<()> {
        Ok(())
    }
    fn exit_global_variable(&mut self, var: &'a GlobalVariable) -> CompileResult<()> {
        Ok(())
    }

    fn enter_enum_decl(&mut self, decl: &'a EnumDecl) -> CompileResult<()> {
        Ok(())
    }
    fn exit_enum_decl(&mut self, decl: &'a EnumDecl) -> CompileResult<()> {
        Ok(())
    }

    fn enter_enum_constant(&mut self, constant: &'a EnumConstant) -> CompileResult<()> {
        Ok(())
    }
    fn exit_enum_constant(&mut self, constant: &'a EnumConstant) -> CompileResult<()> {
        Ok(())
    }

    fn enter_func(&mut self, func: &'a Func) -> CompileResult<()> {
        Ok(())
    }
    fn exit_func(&mut self, func: &'a Func) -> CompileResult<()> {
        Ok(())
    }

    fn enter_parameter(&mut self, param: &'a Parameter) -> CompileResult<()> {
        Ok(())
    }
    fn exit_parameter(&mut self, param: &'a Parameter) -> CompileResult<()> {
        Ok(())
    }

    fn enter_local_variable(&mut self, var: &'a LocalVariable) -> CompileResult<()> {
        Ok(())
    }
    fn exit_local_variable(&mut self, var: &'a LocalVariable) -> CompileResult<()> {
        Ok(())
    }

    fn enter_type_ref(&mut self, type_ref: &'a TypeRef) -> CompileResult<()> {
        Ok(())
    }
    fn exit_type_ref(&mut self, type_ref: &'a TypeRef) -> CompileResult<()> {
        Ok(())
    }

    fn enter_block(&mut self, block: &'a Block) -> CompileResult<()> {
        Ok(())
    }
    fn exit_block(&mut self, block: &'a Block) -> CompileResult<()> {
        Ok(())
    }

    fn enter_pass_stmt(&mut self, stmt: &'a PassStmt) -> CompileResult<()> {
        Ok(())
    }
    fn exit_pass_stmt(&mut self, stmt: &'a PassStmt) -> CompileResult<()> {
        Ok(())
    }

    fn enter_assignment_stmt(&mut self, stmt: &'a AssignmentStmt) -> CompileResult<()> {
        Ok(())
    }
    fn exit_assignment_stmt(&mut self, stmt: &'a AssignmentStmt) -> CompileResult<()> {
        Ok(())
    }

    fn enter_update_stmt(&mut self, stmt: &'a UpdateStmt) -> CompileResult<()> {
        Ok(())
    }
    fn exit_update_stmt(&mut self, stmt: &'a UpdateStmt) -> CompileResult<()> {
        Ok(())
    }

    fn enter_print_stmt(&mut self, stmt: &'a PrintStmt) -> CompileResult<()> {
        Ok(())
    }
    fn exit_print_stmt(&mut self, stmt: &'a PrintStmt) -> CompileResult<()> {
        Ok(())
    }

    fn enter_if_stmt(&mut self, stmt: &'a IfStmt) -> CompileResult<()> {
        Ok(())
    }
    fn exit_if_stmt(&mut self, stmt: &'a IfStmt) -> CompileResult<()> {
        Ok(())
    }

    fn enter_elif_section(&mut self, section: &'a ElifSection) -> CompileResult<()> {
        Ok(())
    }
    fn exit_elif_section(&mut self, section: &'a ElifSection) -> CompileResult<()> {
        Ok(())
    }

    fn enter_else_section(&mut self, section: &'a ElseSection) -> CompileResult<()> {
        Ok(())
    }
    fn exit_else_section(&mut self, section: &'a ElseSection) -> CompileResult<()> {
        Ok(())
    }

    fn enter_return_stmt(&mut self, stmt: &'a ReturnStmt) -> CompileResult<()> {
        Ok(())
    }
    fn exit_return_stmt(&mut self, stmt: &'a ReturnStmt) -> CompileResult<()> {
        Ok(())
    }

    fn enter_ref(&mut self, node: &'a Ref) -> CompileResult<()> {
        Ok(())
    }
    fn exit_ref(&mut self, node: &'a Ref) -> CompileResult<()> {
        Ok(())
    }

    fn enter_unary_expr(&mut self, expr: &'a UnaryExpr) -> CompileResult<()> {
        Ok(())
    }
    fn exit_unary_expr(&mut self, expr: &'a UnaryExpr) -> CompileResult<()> {
        Ok(())
    }

    fn enter_binary_expr(&mut self, expr: &'a BinaryExpr) -> CompileResult<()> {
        Ok(())
    }
    fn exit_binary_expr(&mut self, expr: &'a BinaryExpr) -> CompileResult<()> {
        Ok(())
    }

    fn enter_func_call(&mut self, call: &'a FuncCall) -> CompileResult<()> {
        Ok(())
    }
    fn exit_func_call(&mut self, call: &'a FuncCall) -> CompileResult<()> {
        Ok(())
    }

    fn enter_json_expr(&mut self, expr: &'a JsonExpr) -> CompileResult<()> {
        Ok(())
    }
    fn exit_json_expr(&mut self, expr: &'a JsonExpr) -> CompileResult<()> {
        Ok(())
    }
}

/// Walks `node` and its descendants depth-first, calling `visitor`'s hooks.
///
/// A user code error escaping a hook, or a subtree, without a position is
/// tagged with the position of the node being visited.
pub fn traverse<'a, V: Visitor<'a>>(visitor: &mut V, node: NodeKind<'a>) -> CompileResult<()> {
    let position = node.position();

    on_enter(visitor, node).map_err(|err| err.or_position(position))?;

    for child in node.children() {
        traverse(visitor, child).map_err(|err| err.or_position(position))?;
    }

    on_exit(visitor, node).map_err(|err| err.or_position(position))
}

fn on_enter<'a, V: Visitor<'a>>(visitor: &mut V, node: NodeKind<'a>) -> CompileResult<()> {
    match node {
        NodeKind::Source(node) => visitor.enter_source(node),
        NodeKind::GlobalVariable(node) => visitor.enter_global_variable(node),
        NodeKind::EnumDecl(node) => visitor.enter_enum_decl(node),
        NodeKind::EnumConstant(node) => visitor.enter_enum_constant(node),
        NodeKind::Func(node) => visitor.enter_func(node),
        NodeKind::Parameter(node) => visitor.enter_parameter(node),
        NodeKind::LocalVariable(node) => visitor.enter_local_variable(node),
        NodeKind::TypeRef(node) => visitor.enter_type_ref(node),
        NodeKind::Block(node) => visitor.enter_block(node),
        NodeKind::PassStmt(node) => visitor.enter_pass_stmt(node),
        NodeKind::AssignmentStmt(node) => visitor.enter_assignment_stmt(node),
        NodeKind::UpdateStmt(node) => visitor.enter_update_stmt(node),
        NodeKind::PrintStmt(node) => visitor.enter_print_stmt(node),
        NodeKind::IfStmt(node) => visitor.enter_if_stmt(node),
        NodeKind::ElifSection(node) => visitor.enter_elif_section(node),
        NodeKind::ElseSection(node) => visitor.enter_else_section(node),
        NodeKind::ReturnStmt(node) => visitor.enter_return_stmt(node),
        NodeKind::Ref(node) => visitor.enter_ref(node),
        NodeKind::UnaryExpr(node) => visitor.enter_unary_expr(node),
        NodeKind::BinaryExpr(node) => visitor.enter_binary_expr(node),
        NodeKind::FuncCall(node) => visitor.enter_func_call(node),
        NodeKind::JsonExpr(node) => visitor.enter_json_expr(node),
        NodeKind::Bool(_) | NodeKind::Int(_) | NodeKind::Float(_) | NodeKind::Str(_) => Ok(()),
    }
}

fn on_exit<'a, V: Visitor<'a>>(visitor: &mut V, node: NodeKind<'a>) -> CompileResult<()> {
    match node {
        NodeKind::Source(node) => visitor.exit_source(node),
        NodeKind::GlobalVariable(node) => visitor.exit_global_variable(node),
        NodeKind::EnumDecl(node) => visitor.exit_enum_decl(node),
        NodeKind::EnumConstant(node) => visitor.exit_enum_constant(node),
        NodeKind::Func(node) => visitor.exit_func(node),
        NodeKind::Parameter(node) => visitor.exit_parameter(node),
        NodeKind::LocalVariable(node) => visitor.exit_local_variable(node),
        NodeKind::TypeRef(node) => visitor.exit_type_ref(node),
        NodeKind::Block(node) => visitor.exit_block(node),
        NodeKind::PassStmt(node) => visitor.exit_pass_stmt(node),
        NodeKind::AssignmentStmt(node) => visitor.exit_assignment_stmt(node),
        NodeKind::UpdateStmt(node) => visitor.exit_update_stmt(node),
        NodeKind::PrintStmt(node) => visitor.exit_print_stmt(node),
        NodeKind::IfStmt(node) => visitor.exit_if_stmt(node),
        NodeKind::ElifSection(node) => visitor.exit_elif_section(node),
        NodeKind::ElseSection(node) => visitor.exit_else_section(node),
        NodeKind::ReturnStmt(node) => visitor.exit_return_stmt(node),
        NodeKind::Ref(node) => visitor.exit_ref(node),
        NodeKind::UnaryExpr(node) => visitor.exit_unary_expr(node),
        NodeKind::BinaryExpr(node) => visitor.exit_binary_expr(node),
        NodeKind::FuncCall(node) => visitor.exit_func_call(node),
        NodeKind::JsonExpr(node) => visitor.exit_json_expr(node),
        NodeKind::Bool(_) | NodeKind::Int(_) | NodeKind::Float(_) | NodeKind::Str(_) => Ok(()),
    }
}
