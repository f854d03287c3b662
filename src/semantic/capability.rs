use super::scope::{Declaration, FuncId, Scopes};
use crate::errors::{CompileError, CompileResult, InternalError};
use crate::syntax::{
    traverse, Func, FuncCall, JsonExpr, NodeKind, PrintStmt, Source, Visitor,
};
use log::debug;
use serde::Serialize;
use std::collections::BTreeSet;

/// What a function does directly, without looking into its callees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub contains_print: bool,
    pub contains_dynamic_index: bool,
    /// User functions called, one entry per call site.
    pub calls: Vec<FuncId>,
}

#[derive(Debug, Default)]
pub(super) struct CapabilityAnalyzer<'a> {
    scopes: Option<&'a Scopes>,
    stack: Vec<Capabilities>,
}

impl<'a> CapabilityAnalyzer<'a> {
    pub fn analyze(source: &'a Source) -> CompileResult<()> {
        traverse(&mut Self::default(), NodeKind::from(source))
    }
}

impl<'a> Visitor<'a> for CapabilityAnalyzer<'a> {
    fn enter_source(&mut self, source: &'a Source) -> CompileResult<()> {
        self.scopes = Some(source.scopes()?);
        Ok(())
    }

    fn enter_func(&mut self, _func: &'a Func) -> CompileResult<()> {
        self.stack.push(Capabilities::default());
        Ok(())
    }

    fn exit_func(&mut self, func: &'a Func) -> CompileResult<()> {
        let capabilities = self.stack.pop().ok_or_else(|| {
            InternalError::new("unbalanced function stack").with_context("function", &func.name)
        })?;

        debug!("[capability] fn {}: {:?}", func.name, capabilities);
        func.assign_capabilities(capabilities)
    }

    fn enter_print_stmt(&mut self, _stmt: &'a PrintStmt) -> CompileResult<()> {
        if let Some(capabilities) = self.stack.last_mut() {
            capabilities.contains_print = true;
        }
        Ok(())
    }

    fn enter_json_expr(&mut self, _expr: &'a JsonExpr) -> CompileResult<()> {
        if let Some(capabilities) = self.stack.last_mut() {
            capabilities.contains_dynamic_index = true;
        }
        Ok(())
    }

    fn enter_func_call(&mut self, call: &'a FuncCall) -> CompileResult<()> {
        let scopes = self
            .scopes
            .ok_or_else(|| CompileError::internal("call outside of a program"))?;

        if let Some(capabilities) = self.stack.last_mut() {
            // Non-callable callees are reported by the type checker.
            if let Declaration::Func(signature) = call.func.resolve(scopes)? {
                capabilities.calls.push(signature.id);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallGraphNode {
    pub id: FuncId,
    pub name: String,
    pub contains_print: bool,
    pub contains_dynamic_index: bool,
    pub callees: BTreeSet<FuncId>,
}

/// Call graph of user functions, as an adjacency list indexed by [`FuncId`].
/// It may contain cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallGraph {
    nodes: Vec<CallGraphNode>,
}

impl CallGraph {
    pub fn build(source: &Source) -> CompileResult<Self> {
        let mut nodes: Vec<CallGraphNode> = vec![];

        for func in source.functions() {
            let capabilities = func.capabilities()?;

            nodes.push(CallGraphNode {
                id: func.id()?,
                name: func.name.clone(),
                contains_print: capabilities.contains_print,
                contains_dynamic_index: capabilities.contains_dynamic_index,
                callees: capabilities.calls.iter().copied().collect(),
            });
        }

        nodes.sort_by_key(|node| node.id);
        for (i, node) in nodes.iter().enumerate() {
            if node.id != FuncId(i) {
                return Err(InternalError::new("function ids are not contiguous")
                    .with_context("node", node)
                    .into());
            }
        }

        let graph = Self { nodes };
        for node in &graph.nodes {
            for callee in &node.callees {
                graph.node(*callee)?;
            }
        }

        Ok(graph)
    }

    pub fn nodes(&self) -> &[CallGraphNode] {
        &self.nodes
    }

    pub fn node(&self, id: FuncId) -> CompileResult<&CallGraphNode> {
        self.nodes.get(id.0).ok_or_else(|| {
            CompileError::internal(format!("function {} is not in the call graph", id))
        })
    }

    pub fn callees(&self, id: FuncId) -> CompileResult<&BTreeSet<FuncId>> {
        self.node(id).map(|node| &node.callees)
    }

    /// Every function reachable from `id` through one or more calls.
    pub fn reachable(&self, id: FuncId) -> CompileResult<BTreeSet<FuncId>> {
        let mut visited = BTreeSet::new();
        let mut pending: Vec<FuncId> = self.callees(id)?.iter().copied().collect();

        while let Some(next) = pending.pop() {
            if visited.insert(next) {
                pending.extend(self.callees(next)?.iter().copied());
            }
        }

        Ok(visited)
    }

    pub fn is_recursive(&self, id: FuncId) -> CompileResult<bool> {
        Ok(self.reachable(id)?.contains(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::binder::ScopeBuilder;
    use crate::syntax::fixtures::*;
    use crate::syntax::Item;

    fn analyzed(source: &Source) -> CallGraph {
        ScopeBuilder::build(source).unwrap();
        CapabilityAnalyzer::analyze(source).unwrap();
        CallGraph::build(source).unwrap()
    }

    #[test]
    fn flags_and_edges() {
        let source = program(vec![
            func("quiet", &[], Some("float"), vec![ret(Some(call("sqrt", vec![int(2)])))]),
            func(
                "loud",
                &[],
                None,
                vec![
                    print(vec![call("quiet", vec![])]),
                    declare(2, "w", ty("float"), json("CONFIG", vec![string("wind")], "float")),
                ],
            ),
            Item::Stmt(print(vec![call("quiet", vec![])])),
        ]);

        let graph = analyzed(&source);
        let funcs: Vec<_> = source.functions().collect();

        let quiet = funcs[0].capabilities().unwrap();
        assert!(!quiet.contains_print);
        assert!(!quiet.contains_dynamic_index);
        assert!(quiet.calls.is_empty());

        let loud = funcs[1].capabilities().unwrap();
        assert!(loud.contains_print);
        assert!(loud.contains_dynamic_index);
        assert_eq!(loud.calls, vec![FuncId(0)]);

        assert!(graph.callees(FuncId(0)).unwrap().is_empty());
        assert_eq!(graph.reachable(FuncId(1)).unwrap().len(), 1);
    }

    #[test]
    fn mutual_recursion_terminates() {
        let source = program(vec![
            func("ping", &[], None, vec![print(vec![call("pong", vec![])])]),
            func("pong", &[], None, vec![print(vec![call("ping", vec![])])]),
            func("idle", &[], None, vec![print(vec![call("ping", vec![])])]),
        ]);

        let graph = analyzed(&source);

        assert!(graph.is_recursive(FuncId(0)).unwrap());
        assert!(graph.is_recursive(FuncId(1)).unwrap());
        assert!(!graph.is_recursive(FuncId(2)).unwrap());
        assert_eq!(
            graph.reachable(FuncId(2)).unwrap(),
            vec![FuncId(0), FuncId(1)].into_iter().collect()
        );
    }
}
