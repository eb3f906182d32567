//! Text-manipulation palette built on the multi-function call block

use crate::core::block::{Block, Property};
use crate::core::registry::BlockKind;
use crate::core::types::ExpressionType;

use super::fields::{FunctionOption, MultiCallableData};
use super::prop;

/// The callable text functions. The trailing index parameters are optional
/// and skipped when unbound.
pub fn string_functions() -> Vec<FunctionOption> {
    vec![
        FunctionOption {
            value: "toLowerCase".to_string(),
            label: "Convert to lower case".to_string(),
            ty: ExpressionType::Text,
            params: Vec::new(),
        },
        FunctionOption {
            value: "toUpperCase".to_string(),
            label: "Convert to Upper Case".to_string(),
            ty: ExpressionType::Text,
            params: Vec::new(),
        },
        FunctionOption {
            value: "startsWith".to_string(),
            label: "Starts With".to_string(),
            ty: ExpressionType::Boolean,
            params: vec![
                prop("String to Match", ExpressionType::Text),
                Property::optional("Start Index", ExpressionType::number()),
            ],
        },
        FunctionOption {
            value: "endsWith".to_string(),
            label: "Ends With".to_string(),
            ty: ExpressionType::Boolean,
            params: vec![
                prop("String to Match", ExpressionType::Text),
                Property::optional("End Index", ExpressionType::number()),
            ],
        },
        FunctionOption {
            value: "includes".to_string(),
            label: "Contains".to_string(),
            ty: ExpressionType::Boolean,
            params: vec![
                prop("String to Match", ExpressionType::Text),
                Property::optional("Start Index", ExpressionType::number()),
            ],
        },
    ]
}

/// Palette templates for the Text category.
pub fn palette() -> Vec<Block> {
    let functions = string_functions();
    let selected = functions[0].clone();
    vec![Block::new(
        BlockKind::MultiCallable,
        MultiCallableData {
            target: prop("String", ExpressionType::Text),
            functions,
            selected,
        },
    )]
}
