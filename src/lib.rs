//! Block Compiler - Core engine for the visual Velo block editor
//!
//! This crate provides the typed block model behind the visual editor,
//! including the expression type system, the block-kind registry, the code
//! generator that turns block trees into Velo page code, and the filter
//! adapter that lets general logic blocks double as dataset query predicates.

pub mod core;
pub mod categories;
pub mod compiler;
pub mod filter;
pub mod project;
mod tests;

// Re-export commonly used types
pub use crate::compiler::{Compilation, CompileError, Compiler, Diagnostic};
pub use crate::core::block::{Block, BlockGroup, BlockPiece, BlockType, Capability, Property};
pub use crate::core::registry::{registry, BlockKind, BlockRegistry};
pub use crate::core::types::{can_assign, ExpressionType, TypeKey};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
