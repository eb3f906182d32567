//! Core block abstractions and types
//!
//! This module defines the expression type system, the block/slot/group data
//! shapes, and the block-kind registry that together form the foundation of
//! the block compiler.

pub mod block;
pub mod registry;
pub mod types;

use serde::{Deserialize, Serialize};

use self::types::ExpressionType;

/// An option in a selection dropdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Human-readable option label
    pub label: String,
    /// Value stored when the option is chosen
    pub value: String,
    /// Whether the option is shown but not selectable
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
}

impl SelectOption {
    /// Create an enabled option
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            disabled: false,
        }
    }
}

/// A selection option that also carries the expression type of the value it
/// stands for (used by the multi-field access/setter blocks)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedSelectOption {
    pub label: String,
    pub value: String,
    #[serde(rename = "type")]
    pub ty: ExpressionType,
}

impl TypedSelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>, ty: ExpressionType) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            ty,
        }
    }
}

pub(crate) fn is_false(flag: &bool) -> bool {
    !*flag
}
