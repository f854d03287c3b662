//! Name resolution, auxiliary per-function facts and type checking.
//!
//! Every pass is a full walk over the tree and annotates it through the
//! write-once slots. A pass runs to completion before the next one starts.
mod binder;
pub mod builtins;
mod capability;
mod checker;
mod lvars;
mod returns;
mod scope;
mod types;

pub use capability::{CallGraph, CallGraphNode, Capabilities};
pub use checker::{declaration_type, get_type};
pub use returns::ReturnSite;
pub use scope::{Declaration, EnumType, Frame, FrameId, FuncId, FuncSignature, Scopes};
pub use types::{TypeEnv, BOOL, FLOAT, INT, JSON, STR, UINT};

use crate::errors::CompileResult;
use crate::syntax::Source;
use binder::ScopeBuilder;
use capability::CapabilityAnalyzer;
use checker::TypeChecker;
use log::debug;
use lvars::LocalVariableHarvester;
use returns::ReturnLinker;

pub fn analyze(source: &Source) -> CompileResult<()> {
    ScopeBuilder::build(source)?;
    debug!("[semantic] scope chain built");

    LocalVariableHarvester::harvest(source)?;
    ReturnLinker::link(source)?;
    CapabilityAnalyzer::analyze(source)?;
    debug!("[semantic] auxiliary passes finished");

    TypeChecker::check(source)?;
    debug!("[semantic] type checking finished");
    Ok(())
}
