//! Comparison, negation, and boolean-combinator blocks

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::compiler::{payload, CompileError, Compiler};
use crate::core::block::{
    Block, BlockAction, BlockPiece, BlockType, Capability, Property, Selection,
};
use crate::core::registry::BlockKind;
use crate::core::types::ExpressionType;
use crate::core::SelectOption;

use super::{decode, malformed, prop};

/// A comparison operator together with its display label and negation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operand {
    pub value: String,
    pub label: String,
    /// Operator the "Negate" action swaps to
    pub opposite: String,
}

fn operand(value: &str, label: &str, opposite: &str) -> Operand {
    Operand {
        value: value.to_string(),
        label: label.to_string(),
        opposite: opposite.to_string(),
    }
}

/// The comparison operators, in palette order.
pub fn operands() -> Vec<Operand> {
    vec![
        operand(">", ">", "<"),
        operand(">=", "≥", "<="),
        operand("<", "<", ">"),
        operand("<=", "≤", ">="),
        operand("==", "=", "!="),
        operand("!=", "≠", "=="),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonData {
    pub left: Property,
    pub right: Property,
    pub operand: Operand,
}

/// `left <op> right`, parenthesizing nested comparisons.
pub struct Comparison;

impl Comparison {
    fn write_side(ctx: &mut Compiler, side: &mut Property) -> Result<(), CompileError> {
        let nested = side
            .value
            .as_ref()
            .is_some_and(|value| value.kind == BlockKind::Comparison);
        if nested {
            ctx.write("(");
        }
        ctx.write_property(side, true)?;
        if nested {
            ctx.write(")");
        }
        Ok(())
    }
}

impl BlockType for Comparison {
    fn capability(&self) -> Capability {
        Capability::Expression
    }

    fn color(&self) -> &'static str {
        "bg-green-400"
    }

    fn render(&self, data: &JsonValue) -> Vec<BlockPiece> {
        let Some(data) = decode::<ComparisonData>(data) else {
            return malformed();
        };
        let options = operands()
            .into_iter()
            .map(|op| SelectOption::new(op.label, op.value))
            .collect();
        let selection =
            Selection::new(data.operand.value, options).with_change(|value, block| {
                match operands().into_iter().find(|op| op.value == value) {
                    Some(op) => block.with_data(json!({ "operand": op })),
                    None => block.clone(),
                }
            });
        vec![data.left.into(), selection.into(), data.right.into()]
    }

    fn result_type(&self, _data: &JsonValue) -> Option<ExpressionType> {
        Some(ExpressionType::Boolean)
    }

    fn compile(&self, ctx: &mut Compiler, data: &JsonValue) -> Result<(), CompileError> {
        let mut data: ComparisonData = payload(data)?;
        Self::write_side(ctx, &mut data.left)?;
        ctx.write(&format!(" {} ", data.operand.value));
        Self::write_side(ctx, &mut data.right)
    }

    fn actions(&self, data: &JsonValue) -> Vec<BlockAction> {
        let Some(data) = decode::<ComparisonData>(data) else {
            return Vec::new();
        };
        let opposite = data.operand.opposite.clone();
        vec![
            BlockAction::new("Swap Left & Right", |block| {
                let Some(data) = decode::<ComparisonData>(&block.data) else {
                    return block.clone();
                };
                let mut left = data.left.clone();
                let mut right = data.right.clone();
                left.value = data.right.value;
                right.value = data.left.value;
                block.with_data(json!({ "left": left, "right": right }))
            }),
            BlockAction::new("Negate", move |block| {
                match operands().into_iter().find(|op| op.value == opposite) {
                    Some(op) => block.with_data(json!({ "operand": op })),
                    None => block.clone(),
                }
            }),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnaryData {
    pub value: Property,
    pub label: String,
    pub operand: String,
    pub result_type: ExpressionType,
}

/// A prefix operator, e.g. boolean negation.
pub struct UnaryOperation;

impl BlockType for UnaryOperation {
    fn capability(&self) -> Capability {
        Capability::Expression
    }

    fn color(&self) -> &'static str {
        "bg-red-300"
    }

    fn render(&self, data: &JsonValue) -> Vec<BlockPiece> {
        let Some(data) = decode::<UnaryData>(data) else {
            return malformed();
        };
        vec![data.label.into(), data.value.into()]
    }

    fn result_type(&self, data: &JsonValue) -> Option<ExpressionType> {
        decode::<UnaryData>(data).map(|data| data.result_type)
    }

    fn compile(&self, ctx: &mut Compiler, data: &JsonValue) -> Result<(), CompileError> {
        let mut data: UnaryData = payload(data)?;
        ctx.write(&data.operand);
        let nested = data
            .value
            .value
            .as_ref()
            .is_some_and(|value| value.kind == BlockKind::Comparison);
        if nested {
            ctx.write("(");
        }
        ctx.write_property(&mut data.value, true)?;
        if nested {
            ctx.write(")");
        }
        Ok(())
    }

    fn actions(&self, _data: &JsonValue) -> Vec<BlockAction> {
        vec![BlockAction::new("Remove Negation", |block| {
            decode::<UnaryData>(&block.data)
                .and_then(|data| data.value.value.map(|inner| *inner))
                .unwrap_or_else(|| block.clone())
        })]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryGateData {
    pub left: Property,
    pub right: Property,
    pub label: String,
    pub operand: String,
}

fn logic_gates() -> Vec<SelectOption> {
    vec![
        SelectOption::new("And", "&&"),
        SelectOption::new("Or", "||"),
    ]
}

/// `left && right` / `left || right`, parenthesizing nested gates.
pub struct BinaryLogicGate;

impl BinaryLogicGate {
    fn write_side(ctx: &mut Compiler, side: &mut Property) -> Result<(), CompileError> {
        let nested = side
            .value
            .as_ref()
            .is_some_and(|value| value.kind == BlockKind::LogicGate);
        if nested {
            ctx.write("(");
        }
        ctx.write_property(side, true)?;
        if nested {
            ctx.write(")");
        }
        Ok(())
    }
}

impl BlockType for BinaryLogicGate {
    fn capability(&self) -> Capability {
        Capability::Expression
    }

    fn color(&self) -> &'static str {
        "bg-green-500"
    }

    fn render(&self, data: &JsonValue) -> Vec<BlockPiece> {
        let Some(data) = decode::<BinaryGateData>(data) else {
            return malformed();
        };
        let selection =
            Selection::new(data.operand, logic_gates()).with_change(|value, block| {
                let label = logic_gates()
                    .into_iter()
                    .find(|gate| gate.value == value)
                    .map(|gate| gate.label)
                    .unwrap_or_default();
                block.with_data(json!({ "operand": value, "label": label }))
            });
        vec![data.left.into(), selection.into(), data.right.into()]
    }

    fn result_type(&self, _data: &JsonValue) -> Option<ExpressionType> {
        Some(ExpressionType::Boolean)
    }

    fn compile(&self, ctx: &mut Compiler, data: &JsonValue) -> Result<(), CompileError> {
        let mut data: BinaryGateData = payload(data)?;
        Self::write_side(ctx, &mut data.left)?;
        ctx.write(&format!(" {} ", data.operand));
        Self::write_side(ctx, &mut data.right)
    }

    fn actions(&self, _data: &JsonValue) -> Vec<BlockAction> {
        vec![
            BlockAction::new("Swap Left & Right", |block| {
                let Some(data) = decode::<BinaryGateData>(&block.data) else {
                    return block.clone();
                };
                let mut left = data.left.clone();
                let mut right = data.right.clone();
                left.value = data.right.value;
                right.value = data.left.value;
                block.with_data(json!({ "left": left, "right": right }))
            }),
            BlockAction::new("Add Negation", |block| {
                Block::new(
                    BlockKind::Unary,
                    UnaryData {
                        value: Property::new("Value", ExpressionType::Any)
                            .holding(block.clone()),
                        label: "Not".to_string(),
                        operand: "!".to_string(),
                        result_type: ExpressionType::Boolean,
                    },
                )
            }),
        ]
    }
}

/// Palette templates for the Logic category.
pub fn palette() -> Vec<Block> {
    let first_operand = operands().remove(0);
    vec![
        Block::new(
            BlockKind::Comparison,
            ComparisonData {
                left: prop("Value", ExpressionType::Any),
                right: prop("Value", ExpressionType::Any),
                operand: first_operand,
            },
        ),
        Block::new(
            BlockKind::Unary,
            UnaryData {
                value: prop("Value", ExpressionType::Any),
                label: "Not".to_string(),
                operand: "!".to_string(),
                result_type: ExpressionType::Boolean,
            },
        ),
        Block::new(
            BlockKind::LogicGate,
            BinaryGateData {
                left: prop("Value", ExpressionType::Boolean),
                right: prop("Value", ExpressionType::Boolean),
                label: "And".to_string(),
                operand: "&&".to_string(),
            },
        ),
    ]
}
