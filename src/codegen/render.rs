use crate::syntax::Position;
use serde::Serialize;
use thiserror::Error;

/// A storage slot allocated up front: `type name = init;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableSlot {
    pub name: String,
    pub r#type: String,
    pub init: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamSlot {
    pub name: String,
    pub r#type: String,
}

/// A function signature, so the translation unit can declare every function
/// before any body calls it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<ParamSlot>,
    pub return_type: String,
}

/// One invocation of a named template. Every parameter that stands for code
/// is already generated target text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "template", content = "params")]
pub enum RenderRequest {
    #[serde(rename = "openmp-cpu:pass_stmt")]
    PassStmt { pos: Position },

    #[serde(rename = "openmp-cpu:assignment_stmt")]
    AssignmentStmt {
        lvalue: String,
        rvalue: String,
        pos: Position,
    },

    #[serde(rename = "openmp-cpu:update_stmt")]
    UpdateStmt {
        lvalue: String,
        op: String,
        rvalue: String,
        pos: Position,
    },

    #[serde(rename = "openmp-cpu:print_stmt")]
    PrintStmt {
        format_string: String,
        args: Vec<String>,
        pos: Position,
    },

    #[serde(rename = "openmp-cpu:return_stmt")]
    ReturnStmt { value: Option<String>, pos: Position },

    #[serde(rename = "openmp-cpu:if_stmt")]
    IfStmt {
        condition: String,
        stmts: Vec<String>,
        elifs: Vec<String>,
        else_: Option<String>,
        pos: Position,
    },

    #[serde(rename = "openmp-cpu:elif_section")]
    ElifSection {
        condition: String,
        stmts: Vec<String>,
        pos: Position,
    },

    #[serde(rename = "openmp-cpu:else_section")]
    ElseSection { stmts: Vec<String>, pos: Position },

    #[serde(rename = "openmp-cpu:enum_decl")]
    EnumDecl {
        name: String,
        constants: Vec<String>,
        pos: Position,
    },

    #[serde(rename = "openmp-cpu:function")]
    Function {
        name: String,
        params: Vec<ParamSlot>,
        return_type: String,
        lvars: Vec<VariableSlot>,
        stmts: Vec<String>,
        pos: Position,
    },

    #[serde(rename = "openmp-cpu:main.cpp")]
    MainCpp {
        enums: Vec<String>,
        prototypes: Vec<Prototype>,
        decls: Vec<String>,
        globals: Vec<VariableSlot>,
        lvars: Vec<VariableSlot>,
        stmts: Vec<String>,
    },

    #[serde(rename = "openmp-cpu:CMakeLists.txt")]
    CMakeLists { module: String },
}

impl RenderRequest {
    /// The template this request is addressed to.
    pub fn name(&self) -> &'static str {
        match self {
            RenderRequest::PassStmt { .. } => "openmp-cpu:pass_stmt",
            RenderRequest::AssignmentStmt { .. } => "openmp-cpu:assignment_stmt",
            RenderRequest::UpdateStmt { .. } => "openmp-cpu:update_stmt",
            RenderRequest::PrintStmt { .. } => "openmp-cpu:print_stmt",
            RenderRequest::ReturnStmt { .. } => "openmp-cpu:return_stmt",
            RenderRequest::IfStmt { .. } => "openmp-cpu:if_stmt",
            RenderRequest::ElifSection { .. } => "openmp-cpu:elif_section",
            RenderRequest::ElseSection { .. } => "openmp-cpu:else_section",
            RenderRequest::EnumDecl { .. } => "openmp-cpu:enum_decl",
            RenderRequest::Function { .. } => "openmp-cpu:function",
            RenderRequest::MainCpp { .. } => "openmp-cpu:main.cpp",
            RenderRequest::CMakeLists { .. } => "openmp-cpu:CMakeLists.txt",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    #[error("failed to render {template}: {message}")]
    Failed { template: String, message: String },
}

/// The template engine, which lives outside of the compiler.
pub trait Renderer {
    fn render(&mut self, request: RenderRequest) -> Result<String, RenderError>;
}

/// Records requests in the order they were issued. Each one renders to a
/// placeholder naming its index, so an engine replaying the log can stitch
/// nested outputs together.
#[derive(Debug, Default)]
pub struct RequestLog {
    requests: Vec<RenderRequest>,
}

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placeholder(index: usize) -> String {
        format!("{{{{render:{}}}}}", index)
    }

    pub fn requests(&self) -> &[RenderRequest] {
        &self.requests
    }

    pub fn into_requests(self) -> Vec<RenderRequest> {
        self.requests
    }
}

impl Renderer for RequestLog {
    fn render(&mut self, request: RenderRequest) -> Result<String, RenderError> {
        let placeholder = Self::placeholder(self.requests.len());

        self.requests.push(request);
        Ok(placeholder)
    }
}
