//! Event blocks: program roots that own a deferred body
//!
//! Everything below an event root is compiled into a captured body before
//! the event block itself runs; the event block wraps the body in its
//! registration syntax and flushes the result to the ready list.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::compiler::{payload, CompileError, Compiler};
use crate::core::block::{Block, BlockAction, BlockPiece, BlockType, Capability, Property};
use crate::core::registry::BlockKind;

use super::{decode, element_prop, malformed};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    /// Registration method on the element (e.g. `onClick`)
    pub key: String,
    /// Past-tense display label (e.g. "Clicked")
    pub label: String,
    pub element: Property,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opposite_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opposite_label: Option<String>,
}

/// Program-ready root: its body flushes straight into the program-entry
/// wrapper.
pub struct OnReady;

impl BlockType for OnReady {
    fn capability(&self) -> Capability {
        Capability::Event
    }

    fn color(&self) -> &'static str {
        "bg-orange-400"
    }

    fn render(&self, _data: &JsonValue) -> Vec<BlockPiece> {
        vec!["When the page is loaded".into()]
    }

    fn compile(&self, ctx: &mut Compiler, _data: &JsonValue) -> Result<(), CompileError> {
        ctx.write_event_body();
        if ctx.take_async() {
            ctx.mark_ready_async();
        }
        ctx.flush_to_ready();
        Ok(())
    }
}

/// Handler registration on a page element:
/// `$w('#id').onClick(() => { ... })`.
pub struct ElementEvent;

impl BlockType for ElementEvent {
    fn capability(&self) -> Capability {
        Capability::Event
    }

    fn color(&self) -> &'static str {
        "bg-orange-400"
    }

    fn render(&self, data: &JsonValue) -> Vec<BlockPiece> {
        let Some(data) = decode::<EventData>(data) else {
            return malformed();
        };
        vec![
            "When".into(),
            data.element.into(),
            "was".into(),
            data.label.into(),
        ]
    }

    fn compile(&self, ctx: &mut Compiler, data: &JsonValue) -> Result<(), CompileError> {
        let mut data: EventData = payload(data)?;
        let handler_async = ctx.take_async();
        ctx.write_property(&mut data.element, true)?;
        ctx.write_line(&format!(
            ".{}({}() => {{",
            data.key,
            if handler_async { "async " } else { "" }
        ));
        ctx.indent(|ctx| {
            ctx.write_event_body();
            Ok(())
        })?;
        ctx.write_line("");
        ctx.write("})");
        ctx.flush_to_ready();
        Ok(())
    }

    fn actions(&self, data: &JsonValue) -> Vec<BlockAction> {
        let Some(data) = decode::<EventData>(data) else {
            return Vec::new();
        };
        let (Some(opposite_key), Some(opposite_label)) = (data.opposite_key, data.opposite_label)
        else {
            return Vec::new();
        };
        vec![BlockAction::new(
            format!("Change to {opposite_label}"),
            move |block| {
                let Some(current) = decode::<EventData>(&block.data) else {
                    return block.clone();
                };
                block.with_data(json!({
                    "key": opposite_key,
                    "label": opposite_label,
                    "oppositeKey": current.key,
                    "oppositeLabel": current.label,
                }))
            },
        )]
    }
}

/// Palette templates for the Events category.
pub fn palette() -> Vec<Block> {
    vec![
        Block::bare(BlockKind::OnReady),
        Block::new(
            BlockKind::ElementEvent,
            EventData {
                key: "onClick".to_string(),
                label: "Clicked".to_string(),
                element: element_prop(),
                opposite_key: None,
                opposite_label: None,
            },
        ),
        Block::new(
            BlockKind::ElementEvent,
            EventData {
                key: "onFocus".to_string(),
                label: "Focused".to_string(),
                element: element_prop(),
                opposite_key: Some("onBlur".to_string()),
                opposite_label: Some("Unfocused".to_string()),
            },
        ),
    ]
}
