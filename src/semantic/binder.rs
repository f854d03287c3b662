use super::scope::{Declaration, EnumType, FrameId, FuncId, FuncSignature, Scopes};
use crate::errors::{CompileError, CompileResult};
use crate::syntax::{
    traverse, EnumConstant, EnumDecl, Func, GlobalVariable, LocalVariable, NodeKind, Parameter,
    Ref, Source, Visitor,
};
use log::debug;

/// Builds the scope chain: registers every declaration into the frame active
/// at its site and records that frame on every reference.
#[derive(Debug)]
pub(super) struct ScopeBuilder {
    scopes: Scopes,
    stack: Vec<FrameId>,
    funcs: usize,
}

impl ScopeBuilder {
    pub fn new() -> Self {
        let scopes = Scopes::prelude();
        let root = scopes.root();

        Self {
            scopes,
            stack: vec![root],
            funcs: 0,
        }
    }

    pub fn build(source: &Source) -> CompileResult<()> {
        let mut builder = Self::new();

        traverse(&mut builder, NodeKind::from(source))?;
        source.assign_scopes(builder.scopes)
    }

    fn current(&self) -> CompileResult<FrameId> {
        self.stack
            .last()
            .copied()
            .ok_or_else(|| CompileError::internal("scope stack is empty"))
    }

    fn define(&mut self, declaration: Declaration) -> CompileResult<()> {
        let frame = self.current()?;

        debug!("[scope] define {} in frame {:?}", declaration, frame);
        self.scopes.define(frame, declaration)
    }
}

impl<'a> Visitor<'a> for ScopeBuilder {
    fn enter_func(&mut self, func: &'a Func) -> CompileResult<()> {
        let id = FuncId(self.funcs);

        self.funcs += 1;
        self.define(Declaration::Func(FuncSignature {
            id,
            position: func.position.clone(),
            name: func.name.clone(),
            params: func.params.iter().map(|p| p.type_ref.clone()).collect(),
            return_type: func.return_type.clone(),
        }))?;

        let parent = self.current()?;
        let frame = self.scopes.open(format!("fn {}", func.name), parent);

        func.assign_id(id)?;
        func.assign_frame(frame)?;
        self.stack.push(frame);
        Ok(())
    }

    fn exit_func(&mut self, _func: &'a Func) -> CompileResult<()> {
        self.stack.pop();
        Ok(())
    }

    fn enter_parameter(&mut self, param: &'a Parameter) -> CompileResult<()> {
        self.define(Declaration::Parameter(param.clone()))
    }

    fn enter_local_variable(&mut self, var: &'a LocalVariable) -> CompileResult<()> {
        self.define(Declaration::LocalVariable(var.clone()))
    }

    fn enter_global_variable(&mut self, var: &'a GlobalVariable) -> CompileResult<()> {
        self.define(Declaration::GlobalVariable(var.clone()))
    }

    fn enter_enum_decl(&mut self, decl: &'a EnumDecl) -> CompileResult<()> {
        self.define(Declaration::Enum(EnumType {
            position: decl.position.clone(),
            name: decl.name.clone(),
        }))
    }

    fn enter_enum_constant(&mut self, constant: &'a EnumConstant) -> CompileResult<()> {
        self.define(Declaration::EnumConstant(constant.clone()))
    }

    fn enter_ref(&mut self, node: &'a Ref) -> CompileResult<()> {
        node.bind(self.current()?)
    }
}
