//! Block-kind tags and the process-wide kind registry
//!
//! The registry maps every [`BlockKind`] to its one [`BlockType`]
//! implementation. It is built once on first use and is read-only after
//! that; concurrent first callers share a single build because the
//! `OnceLock` memoizes the in-flight initialization itself. Code paths that must
//! not trigger the build use [`BlockRegistry::peek`] and treat an unresolved
//! registry as "kind unknown".

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::categories::{control, crm, events, fields, logic, values};
use crate::core::block::{Block, BlockType};
use crate::core::types::ExpressionType;
use crate::filter;

/// Discriminant tag of every known block kind. Tags serialize with the
/// camelCase names the editor stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    IfBlock,
    OnReady,
    ElementEvent,
    Comparison,
    Unary,
    LogicGate,
    Literal,
    Callable,
    MultiCallable,
    FieldAccess,
    MultiFieldAccess,
    FieldSetter,
    MultiFieldSetter,
    CreateFilter,
    SetFilter,
    SendTriggeredEmail,
    Error,
}

impl BlockKind {
    /// Every kind the registry knows about.
    pub const ALL: [BlockKind; 17] = [
        BlockKind::IfBlock,
        BlockKind::OnReady,
        BlockKind::ElementEvent,
        BlockKind::Comparison,
        BlockKind::Unary,
        BlockKind::LogicGate,
        BlockKind::Literal,
        BlockKind::Callable,
        BlockKind::MultiCallable,
        BlockKind::FieldAccess,
        BlockKind::MultiFieldAccess,
        BlockKind::FieldSetter,
        BlockKind::MultiFieldSetter,
        BlockKind::CreateFilter,
        BlockKind::SetFilter,
        BlockKind::SendTriggeredEmail,
        BlockKind::Error,
    ];

    /// Wire-format tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::IfBlock => "ifBlock",
            BlockKind::OnReady => "onReady",
            BlockKind::ElementEvent => "elementEvent",
            BlockKind::Comparison => "comparison",
            BlockKind::Unary => "unary",
            BlockKind::LogicGate => "logicGate",
            BlockKind::Literal => "literal",
            BlockKind::Callable => "callable",
            BlockKind::MultiCallable => "multiCallable",
            BlockKind::FieldAccess => "fieldAccess",
            BlockKind::MultiFieldAccess => "multiFieldAccess",
            BlockKind::FieldSetter => "fieldSetter",
            BlockKind::MultiFieldSetter => "multiFieldSetter",
            BlockKind::CreateFilter => "createFilter",
            BlockKind::SetFilter => "setFilter",
            BlockKind::SendTriggeredEmail => "sendTriggeredEmail",
            BlockKind::Error => "error",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read-only table from kind tag to implementation.
pub struct BlockRegistry {
    kinds: HashMap<BlockKind, Box<dyn BlockType>>,
}

static REGISTRY: OnceLock<BlockRegistry> = OnceLock::new();

/// The process-wide registry, built on first access.
pub fn registry() -> &'static BlockRegistry {
    REGISTRY.get_or_init(BlockRegistry::build)
}

impl BlockRegistry {
    fn build() -> Self {
        let kinds = BlockKind::ALL
            .iter()
            .map(|&kind| (kind, instantiate(kind)))
            .collect();
        Self { kinds }
    }

    /// The registry if it has already been built. Callers that cannot afford
    /// to trigger the build treat `None` as "kind unknown".
    pub fn peek() -> Option<&'static BlockRegistry> {
        REGISTRY.get()
    }

    /// Implementation of `kind`. The table covers every variant of the
    /// closed enum, so the lookup cannot miss.
    pub fn get(&self, kind: BlockKind) -> &dyn BlockType {
        self.kinds[&kind].as_ref()
    }
}

/// Exhaustive kind → implementation mapping. A new `BlockKind` variant does
/// not compile until it is given an implementation here.
fn instantiate(kind: BlockKind) -> Box<dyn BlockType> {
    match kind {
        BlockKind::IfBlock => Box::new(control::IfBlock),
        BlockKind::OnReady => Box::new(events::OnReady),
        BlockKind::ElementEvent => Box::new(events::ElementEvent),
        BlockKind::Comparison => Box::new(logic::Comparison),
        BlockKind::Unary => Box::new(logic::UnaryOperation),
        BlockKind::LogicGate => Box::new(logic::BinaryLogicGate),
        BlockKind::Literal => Box::new(values::LiteralValue),
        BlockKind::Callable => Box::new(fields::CallableBlock),
        BlockKind::MultiCallable => Box::new(fields::MultiCallableBlock),
        BlockKind::FieldAccess => Box::new(fields::FieldAccessBlock),
        BlockKind::MultiFieldAccess => Box::new(fields::MultiFieldAccessBlock),
        BlockKind::FieldSetter => Box::new(fields::FieldSetterBlock),
        BlockKind::MultiFieldSetter => Box::new(fields::MultiFieldSetterBlock),
        BlockKind::CreateFilter => Box::new(filter::CreateFilter),
        BlockKind::SetFilter => Box::new(filter::SetFilter),
        BlockKind::SendTriggeredEmail => Box::new(crm::SendTriggeredEmail),
        BlockKind::Error => Box::new(values::ErrorBlock),
    }
}

/// Whether another block may be stacked directly below `block`.
pub fn can_connect_below(block: &Block) -> bool {
    registry().get(block.kind).capability().connects_below()
}

/// Whether another block may be stacked directly above `block`.
pub fn can_connect_above(block: &Block) -> bool {
    registry().get(block.kind).capability().connects_above()
}

/// Whether `block` produces a value.
pub fn is_expression(block: &Block) -> bool {
    registry().get(block.kind).capability().is_expression()
}

/// Result type of `block` when it is an expression, `void` otherwise.
pub fn result_type(block: &Block) -> ExpressionType {
    registry()
        .get(block.kind)
        .result_type(&block.data)
        .unwrap_or(ExpressionType::Void)
}
