#![deny(unused, nonstandard_style, rust_2018_idioms)]

pub mod codegen;
pub mod compiler;
pub mod errors;
pub mod semantic;
pub mod syntax;

use codegen::{Generator, Renderer};
use errors::{CompileError, CompileResult};
use semantic::CallGraph;
use syntax::Source;

#[derive(Debug, Default)]
pub struct CompilerPasses {
    call_graph: Option<CallGraph>,
}

impl CompilerPasses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_graph(&self) -> CompileResult<&CallGraph> {
        self.call_graph
            .as_ref()
            .ok_or_else(|| CompileError::internal("compiler passes have not been applied"))
    }

    /// Runs every analysis pass over `source`, each to completion.
    pub fn apply(&mut self, source: &Source) -> CompileResult<()> {
        semantic::analyze(source)?;
        self.call_graph = Some(CallGraph::build(source)?);
        Ok(())
    }
}

/// Analyzes `source` and lowers it through `renderer`. Returns the rendered
/// program root.
pub fn compile<R: Renderer>(source: &Source, renderer: &mut R, module: &str) -> CompileResult<String> {
    CompilerPasses::new().apply(source)?;

    let project = Generator::new(source, renderer)?.project(source, module)?;
    Ok(project.main_cpp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{RenderRequest, RequestLog};
    use crate::errors::{CodeError, CodeErrorKind};
    use crate::semantic::FuncId;
    use crate::syntax::fixtures::*;
    use crate::syntax::Item;
    use assert_matches::assert_matches;

    fn forest_fire() -> Source {
        program(vec![
            enumeration("Cell", &["EMPTY", "TREE", "FIRE"]),
            global("burnt", "uint"),
            func(
                "ignites",
                &[("neighbors", "int")],
                Some("bool"),
                vec![
                    declare(
                        4,
                        "p",
                        const_ty("float"),
                        json("CONFIG", vec![string("ignition")], "float"),
                    ),
                    ret(Some(binary(
                        binary(var("neighbors"), "*", var("p")),
                        ">",
                        float(0.5),
                    ))),
                ],
            ),
            Item::Stmt(declare(8, "cell", ty("Cell"), var("TREE"))),
            Item::Stmt(if_stmt(
                call("ignites", vec![int(3)]),
                vec![
                    assign(10, "cell", var("FIRE")),
                    update("burnt", "+=", boolean(true)),
                ],
                vec![],
                Some(vec![pass()]),
            )),
            Item::Stmt(print(vec![string("burnt:"), var("burnt")])),
        ])
    }

    #[test]
    fn compile_program() {
        let source = forest_fire();
        let mut log = RequestLog::new();

        let root = compile(&source, &mut log, "forest").unwrap();

        let requests = log.requests();
        let main_index = requests
            .iter()
            .position(|r| r.name() == "openmp-cpu:main.cpp")
            .unwrap();
        assert_eq!(root, RequestLog::placeholder(main_index));
        assert_eq!(requests.len(), main_index + 2);
        assert_matches!(requests.last(), Some(RenderRequest::CMakeLists { module }) => {
            assert_eq!(module, "forest");
        });
    }

    #[test]
    fn passes_expose_call_graph() {
        let source = forest_fire();
        let mut passes = CompilerPasses::new();

        assert!(passes.call_graph().unwrap_err().is_internal());
        passes.apply(&source).unwrap();

        let graph = passes.call_graph().unwrap();
        assert_eq!(graph.nodes().len(), 1);
        assert!(graph.node(FuncId(0)).unwrap().contains_dynamic_index);
        assert!(!graph.is_recursive(FuncId(0)).unwrap());
    }

    #[test]
    fn no_output_on_user_error() {
        let source = main(vec![
            declare(1, "y", const_ty("int"), int(5)),
            assign(2, "y", int(6)),
        ]);
        let mut log = RequestLog::new();

        let err = compile(&source, &mut log, "main").unwrap_err();

        assert_matches!(err, CompileError::Code(CodeError { kind: CodeErrorKind::Type, .. }));
        assert!(log.requests().is_empty());
    }
}
