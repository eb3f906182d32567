//! Literal values and the error placeholder block

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::compiler::{payload, CompileError, Compiler, PLACEHOLDER};
use crate::core::block::{Block, BlockPiece, BlockType, Capability};
use crate::core::registry::BlockKind;
use crate::core::types::ExpressionType;

use super::decode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiteralData {
    #[serde(rename = "type")]
    pub ty: ExpressionType,
    pub value: JsonValue,
}

/// A constant typed by the slot it was typed into.
pub struct LiteralValue;

impl BlockType for LiteralValue {
    fn capability(&self) -> Capability {
        Capability::Expression
    }

    fn color(&self) -> &'static str {
        "bg-red-500"
    }

    fn render(&self, data: &JsonValue) -> Vec<BlockPiece> {
        let Some(data) = decode::<LiteralData>(data) else {
            return super::malformed();
        };
        let text = match &data.value {
            JsonValue::String(text) => text.clone(),
            other => other.to_string(),
        };
        vec![text.into()]
    }

    fn result_type(&self, data: &JsonValue) -> Option<ExpressionType> {
        decode::<LiteralData>(data).map(|data| data.ty)
    }

    fn compile(&self, ctx: &mut Compiler, data: &JsonValue) -> Result<(), CompileError> {
        let data: LiteralData = payload(data)?;
        ctx.write(&literal_text(&data.value));
        Ok(())
    }
}

/// Render a literal payload value as source text.
fn literal_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(text) => quote(text),
        JsonValue::Bool(flag) => flag.to_string(),
        JsonValue::Number(number) => number.to_string(),
        JsonValue::Null => PLACEHOLDER.to_string(),
        // arrays and objects serialize as JSON, which is valid source
        other => other.to_string(),
    }
}

/// Single-quoted string literal with escapes.
fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            other => quoted.push(other),
        }
    }
    quoted.push('\'');
    quoted
}

/// Literal template used by the editor when a value is typed into a slot.
pub fn literal(ty: ExpressionType, value: impl Into<JsonValue>) -> Block {
    Block::new(
        BlockKind::Literal,
        LiteralData {
            ty,
            value: value.into(),
        },
    )
}

/// Stand-in for a block that could not be restored from a stored project.
/// Renders its message and compiles to a harmless placeholder.
pub struct ErrorBlock;

impl BlockType for ErrorBlock {
    fn capability(&self) -> Capability {
        Capability::Computation
    }

    fn color(&self) -> &'static str {
        "bg-red-500"
    }

    fn render(&self, data: &JsonValue) -> Vec<BlockPiece> {
        let message = data.as_str().unwrap_or("<unknown error>");
        vec![message.into()]
    }

    fn result_type(&self, _data: &JsonValue) -> Option<ExpressionType> {
        Some(ExpressionType::Any)
    }

    fn compile(&self, ctx: &mut Compiler, _data: &JsonValue) -> Result<(), CompileError> {
        ctx.write(PLACEHOLDER);
        Ok(())
    }
}
