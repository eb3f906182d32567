//! Control-flow blocks

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::compiler::{payload, CompileError, Compiler};
use crate::core::block::{Block, BlockAction, BlockGroup, BlockPiece, BlockType, Capability, Property};
use crate::core::registry::BlockKind;
use crate::core::types::ExpressionType;

use super::{decode, malformed, prop};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IfData {
    pub cond: Property,
    pub then: BlockGroup,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "else")]
    pub else_branch: Option<BlockGroup>,
}

/// `if (cond) { ... }` with an optional else branch.
pub struct IfBlock;

impl BlockType for IfBlock {
    fn capability(&self) -> Capability {
        Capability::Statement
    }

    fn color(&self) -> &'static str {
        "bg-blue-400"
    }

    fn render(&self, data: &JsonValue) -> Vec<BlockPiece> {
        let Some(data) = decode::<IfData>(data) else {
            return malformed();
        };
        let mut pieces: Vec<BlockPiece> = vec!["If".into(), data.cond.into(), data.then.into()];
        if let Some(else_branch) = data.else_branch {
            pieces.push("Or Else".into());
            pieces.push(else_branch.into());
        }
        pieces
    }

    fn compile(&self, ctx: &mut Compiler, data: &JsonValue) -> Result<(), CompileError> {
        let mut data: IfData = payload(data)?;
        ctx.write("if (");
        ctx.write_property(&mut data.cond, true)?;
        ctx.write(") ");
        ctx.write_group(&data.then)?;
        if let Some(else_branch) = &data.else_branch {
            ctx.write(" else ");
            ctx.write_group(else_branch)?;
        }
        Ok(())
    }

    fn actions(&self, data: &JsonValue) -> Vec<BlockAction> {
        let Some(data) = decode::<IfData>(data) else {
            return Vec::new();
        };
        let has_else = data.else_branch.is_some();
        let label = if has_else { "Remove Else" } else { "Add Else" };
        vec![BlockAction::new(label, move |block| {
            if has_else {
                block.with_data(json!({ "else": null }))
            } else {
                block.with_data(json!({ "else": BlockGroup::default() }))
            }
        })]
    }
}

/// Palette templates for the Control category.
pub fn palette() -> Vec<Block> {
    vec![Block::new(
        BlockKind::IfBlock,
        IfData {
            cond: prop("Condition", ExpressionType::Boolean),
            then: BlockGroup::default(),
            else_branch: None,
        },
    )]
}
