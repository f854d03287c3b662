mod position;
mod traverse;
mod tree;

#[cfg(test)]
pub(crate) mod fixtures;

pub use position::Position;
pub use traverse::{traverse, Visitor};
pub use tree::*;
