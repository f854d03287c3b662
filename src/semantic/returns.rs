use super::scope::FuncId;
use crate::errors::{CompileResult, InternalError};
use crate::syntax::{traverse, Func, NodeKind, Position, ReturnStmt, Source, Visitor};
use serde::Serialize;

/// A return statement as recorded on its function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnSite {
    pub position: Position,
    pub has_value: bool,
}

/// Links every return statement with the innermost function enclosing it.
#[derive(Debug, Default)]
pub(super) struct ReturnLinker {
    stack: Vec<(FuncId, Vec<ReturnSite>)>,
}

impl ReturnLinker {
    pub fn link(source: &Source) -> CompileResult<()> {
        traverse(&mut Self::default(), NodeKind::from(source))
    }
}

impl<'a> Visitor<'a> for ReturnLinker {
    fn enter_func(&mut self, func: &'a Func) -> CompileResult<()> {
        self.stack.push((func.id()?, vec![]));
        Ok(())
    }

    fn exit_func(&mut self, func: &'a Func) -> CompileResult<()> {
        match self.stack.pop() {
            Some((_, sites)) => func.assign_return_stmts(sites),
            None => Err(InternalError::new("unbalanced function stack")
                .with_context("function", &func.name)
                .into()),
        }
    }

    fn enter_return_stmt(&mut self, stmt: &'a ReturnStmt) -> CompileResult<()> {
        // The grammar only accepts `return` inside a function body.
        let (id, sites) = self.stack.last_mut().ok_or_else(|| {
            InternalError::new("return statement outside of a function").with_context("node", stmt)
        })?;

        stmt.assign_func(*id)?;
        sites.push(ReturnSite {
            position: stmt.position.clone(),
            has_value: stmt.value.is_some(),
        });
        Ok(())
    }
}
