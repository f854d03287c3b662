//! Lowering of an analyzed tree into render requests for the target
//! templates.
mod cpp;
mod render;

pub use cpp::{mangle, native_name, Generator, Project};
pub use render::{
    ParamSlot, Prototype, RenderError, RenderRequest, Renderer, RequestLog, VariableSlot,
};
