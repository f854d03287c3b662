use super::scope::{Declaration, FrameId, Scopes};
use crate::errors::{CompileError, CompileResult};
use crate::syntax::{traverse, Func, LocalVariable, NodeKind, Source, Visitor};
use log::debug;

/// Copies the local variables of every function frame (and of the root frame,
/// for top-level statements) into one ordered list on the owning node.
#[derive(Debug, Default)]
pub(super) struct LocalVariableHarvester<'a> {
    scopes: Option<&'a Scopes>,
}

impl<'a> LocalVariableHarvester<'a> {
    pub fn harvest(source: &'a Source) -> CompileResult<()> {
        traverse(&mut Self::default(), NodeKind::from(source))
    }

    fn collect(&self, frame: FrameId) -> CompileResult<Vec<LocalVariable>> {
        let scopes = self
            .scopes
            .ok_or_else(|| CompileError::internal("harvesting outside of a program"))?;

        Ok(scopes
            .frame(frame)?
            .entries()
            .filter_map(|declaration| match declaration {
                Declaration::LocalVariable(var) => Some(var.clone()),
                _ => None,
            })
            .collect())
    }
}

impl<'a> Visitor<'a> for LocalVariableHarvester<'a> {
    fn enter_source(&mut self, source: &'a Source) -> CompileResult<()> {
        let scopes = source.scopes()?;

        self.scopes = Some(scopes);
        source.assign_lvars(self.collect(scopes.root())?)
    }

    fn enter_func(&mut self, func: &'a Func) -> CompileResult<()> {
        let lvars = self.collect(func.frame()?)?;

        debug!("[lvars] fn {}: {} local variables", func.name, lvars.len());
        func.assign_lvars(lvars)
    }
}
