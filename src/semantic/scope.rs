use super::builtins::{BuiltinConst, BuiltinFunc, BUILTIN_CONSTS, BUILTIN_FUNCS};
use crate::errors::{CompileError, CompileResult, InternalError};
use crate::syntax::{EnumConstant, GlobalVariable, LocalVariable, Parameter, Position, TypeRef};
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Index of a frame in [`Scopes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FrameId(usize);

/// Identifies a user function, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FuncId(pub usize);

impl fmt::Display for FuncId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a name in a frame stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    LocalVariable(LocalVariable),
    Parameter(Parameter),
    GlobalVariable(GlobalVariable),
    EnumConstant(EnumConstant),
    Enum(EnumType),
    Func(FuncSignature),
    BuiltinFunc(&'static BuiltinFunc),
    BuiltinConst(&'static BuiltinConst),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub position: Position,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncSignature {
    pub id: FuncId,
    pub position: Position,
    pub name: String,
    pub params: Vec<TypeRef>,
    pub return_type: Option<TypeRef>,
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::LocalVariable(var) => &var.name,
            Declaration::Parameter(param) => &param.name,
            Declaration::GlobalVariable(var) => &var.name,
            Declaration::EnumConstant(constant) => &constant.name,
            Declaration::Enum(ty) => &ty.name,
            Declaration::Func(sig) => &sig.name,
            Declaration::BuiltinFunc(func) => func.name,
            Declaration::BuiltinConst(constant) => constant.name,
        }
    }

    /// Built-ins have no position in the source.
    pub fn position(&self) -> Option<&Position> {
        match self {
            Declaration::LocalVariable(var) => Some(&var.position),
            Declaration::Parameter(param) => Some(&param.position),
            Declaration::GlobalVariable(var) => Some(&var.position),
            Declaration::EnumConstant(constant) => Some(&constant.position),
            Declaration::Enum(ty) => Some(&ty.position),
            Declaration::Func(sig) => Some(&sig.position),
            Declaration::BuiltinFunc(_) | Declaration::BuiltinConst(_) => None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.position().is_none()
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::LocalVariable(_) => write!(f, "local variable `{}`", self.name()),
            Declaration::Parameter(_) => write!(f, "function parameter `{}`", self.name()),
            Declaration::GlobalVariable(_) => write!(f, "global variable `{}`", self.name()),
            Declaration::EnumConstant(_) => write!(f, "enum constant `{}`", self.name()),
            Declaration::Enum(_) => write!(f, "enum `{}`", self.name()),
            Declaration::Func(_) => write!(f, "function `{}`", self.name()),
            Declaration::BuiltinFunc(_) => write!(f, "builtin function `{}`", self.name()),
            Declaration::BuiltinConst(_) => write!(f, "builtin constant `{}`", self.name()),
        }
    }
}

/// One level of the scope chain.
#[derive(Debug)]
pub struct Frame {
    name: String,
    parent: Option<FrameId>,
    // Insertion order is significant: harvested variables keep it.
    entries: IndexMap<String, Declaration>,
}

impl Frame {
    fn new(name: String, parent: Option<FrameId>) -> Self {
        Self {
            name,
            parent,
            entries: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<FrameId> {
        self.parent
    }

    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.entries.get(name)
    }

    /// Declarations of this frame only, in definition order.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &Declaration> + '_ {
        self.entries.values()
    }

    fn insert(&mut self, declaration: Declaration) {
        self.entries.insert(declaration.name().to_string(), declaration);
    }
}

/// Arena of frames. Frames refer to their parent by index so references in
/// the tree can record a frame without borrowing it.
#[derive(Debug)]
pub struct Scopes {
    frames: Vec<Frame>,
}

impl Scopes {
    /// Creates the arena with a root frame seeded with the built-ins.
    pub fn prelude() -> Self {
        let mut root = Frame::new("<root>".to_string(), None);

        for func in BUILTIN_FUNCS {
            root.insert(Declaration::BuiltinFunc(func));
        }
        for constant in BUILTIN_CONSTS {
            root.insert(Declaration::BuiltinConst(constant));
        }

        Self { frames: vec![root] }
    }

    pub fn root(&self) -> FrameId {
        FrameId(0)
    }

    /// Opens an empty frame whose parent is `parent`.
    pub fn open<S: Into<String>>(&mut self, name: S, parent: FrameId) -> FrameId {
        let id = FrameId(self.frames.len());

        self.frames.push(Frame::new(name.into(), Some(parent)));
        id
    }

    pub fn frame(&self, id: FrameId) -> CompileResult<&Frame> {
        self.frames.get(id.0).ok_or_else(|| {
            InternalError::new(format!("no frame {:?}", id))
                .with_context("frames", &self.frames.len())
                .into()
        })
    }

    fn frame_mut(&mut self, id: FrameId) -> CompileResult<&mut Frame> {
        let len = self.frames.len();

        self.frames.get_mut(id.0).ok_or_else(|| {
            InternalError::new(format!("no frame {:?}", id))
                .with_context("frames", &len)
                .into()
        })
    }

    /// Adds `declaration` to the frame `id`. A name may shadow one of an outer
    /// frame, but not one of the same frame.
    pub fn define(&mut self, id: FrameId, declaration: Declaration) -> CompileResult<()> {
        let frame = self.frame_mut(id)?;

        match frame.entries.entry(declaration.name().to_string()) {
            Entry::Occupied(existing) => Err(CompileError::reference_error(format!(
                "{} has been already defined as {}",
                existing.key(),
                existing.get()
            ))),
            Entry::Vacant(slot) => {
                slot.insert(declaration);
                Ok(())
            }
        }
    }

    /// Finds the nearest declaration of `name`, starting at frame `id`.
    pub fn lookup(&self, id: FrameId, name: &str) -> CompileResult<Option<&Declaration>> {
        let mut current = Some(id);

        while let Some(id) = current {
            let frame = self.frame(id)?;

            if let Some(declaration) = frame.get(name) {
                return Ok(Some(declaration));
            }
            current = frame.parent();
        }

        Ok(None)
    }

    pub fn resolve(&self, id: FrameId, name: &str) -> CompileResult<&Declaration> {
        self.lookup(id, name)?
            .ok_or_else(|| CompileError::reference_error(format!("{} not defined", name)))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
