//! Concrete block-kind implementations and the palette catalog
//!
//! Each submodule implements one family of block kinds; the helpers here
//! build the payload templates the palette hands to the editor. Everything
//! the palette produces goes through the same typed payload structs the kind
//! implementations decode at render and compile time.

pub mod buttons;
pub mod control;
pub mod crm;
pub mod elements;
pub mod events;
pub mod fields;
pub mod inputs;
pub mod logic;
pub mod strings;
pub mod values;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::core::block::{Block, BlockPiece, Property};
use crate::core::registry::BlockKind;
use crate::core::types::ExpressionType;
use crate::core::TypedSelectOption;

use self::fields::{
    CallableData, FieldAccessData, FieldSetterData, MultiFieldAccessData, MultiFieldSetterData,
};

/// A named palette group of block templates.
#[derive(Debug, Clone)]
pub struct PaletteCategory {
    pub name: &'static str,
    pub blocks: Vec<Block>,
}

/// The full palette, in display order.
pub fn palette_categories() -> Vec<PaletteCategory> {
    vec![
        PaletteCategory {
            name: "Control",
            blocks: control::palette(),
        },
        PaletteCategory {
            name: "Events",
            blocks: events::palette(),
        },
        PaletteCategory {
            name: "Logic",
            blocks: logic::palette(),
        },
        PaletteCategory {
            name: "Text",
            blocks: strings::palette(),
        },
        PaletteCategory {
            name: "Elements",
            blocks: elements::palette(),
        },
        PaletteCategory {
            name: "Buttons",
            blocks: buttons::palette(),
        },
        PaletteCategory {
            name: "Inputs",
            blocks: inputs::palette(),
        },
        PaletteCategory {
            name: "Data",
            blocks: crate::filter::palette(),
        },
        PaletteCategory {
            name: "CRM",
            blocks: crm::palette(),
        },
    ]
}

/// Typed, empty slot.
pub fn prop(label: &str, ty: ExpressionType) -> Property {
    Property::new(label, ty)
}

/// The element-target slot shared by the element-manipulation blocks.
pub fn element_prop() -> Property {
    Property::new("Element", ExpressionType::Element)
}

/// Matching getter and setter blocks for one element field.
pub fn read_write_element_field(
    key: &str,
    label: &str,
    ty: ExpressionType,
    opposite_label: Option<&str>,
) -> Vec<Block> {
    vec![
        Block::new(
            BlockKind::FieldAccess,
            FieldAccessData {
                target: element_prop(),
                key: key.to_string(),
                label: label.to_string(),
                ty: ty.clone(),
                opposite_label: opposite_label.map(str::to_string),
                negated: false,
            },
        ),
        Block::new(
            BlockKind::FieldSetter,
            FieldSetterData {
                target: element_prop(),
                key: key.to_string(),
                label: label.to_string(),
                value: Property::new(label, ty.clone()),
                toggleable: (ty == ExpressionType::Boolean).then(|| label.to_string()),
                toggling: false,
            },
        ),
    ]
}

/// Getter and setter blocks over a dropdown of element fields.
pub fn read_write_multi_element_fields(fields: Vec<TypedSelectOption>) -> Vec<Block> {
    // the first field is the default selection
    let selected = fields[0].clone();
    vec![
        Block::new(
            BlockKind::MultiFieldAccess,
            MultiFieldAccessData {
                target: element_prop(),
                fields: fields.clone(),
                selected: selected.clone(),
            },
        ),
        Block::new(
            BlockKind::MultiFieldSetter,
            MultiFieldSetterData {
                target: element_prop(),
                fields,
                selected: selected.clone(),
                value: Property::new(selected.label, selected.ty),
            },
        ),
    ]
}

/// A method-pair state change (e.g. Focus/Unfocus) as one callable block.
pub fn toggleable_element_state(true_label: &str, false_label: &str) -> Block {
    Block::new(
        BlockKind::Callable,
        CallableData {
            target: element_prop(),
            key: true_label.to_lowercase(),
            label: true_label.to_string(),
            params: Vec::new(),
            return_type: ExpressionType::Void,
            opposite_key: Some(false_label.to_lowercase()),
            opposite_label: Some(false_label.to_string()),
            toggleable: None,
            toggling: false,
        },
    )
}

/// A method-pair state change whose state is also readable through a boolean
/// getter (e.g. Expand/Collapse with Collapsed).
pub fn toggleable_and_getter_element_state(
    true_label: &str,
    false_label: &str,
    getter_label: &str,
    opposite_label: &str,
) -> Vec<Block> {
    vec![
        Block::new(
            BlockKind::Callable,
            CallableData {
                target: element_prop(),
                key: false_label.to_lowercase(),
                label: false_label.to_string(),
                params: Vec::new(),
                return_type: ExpressionType::Void,
                opposite_key: Some(true_label.to_lowercase()),
                opposite_label: Some(true_label.to_string()),
                toggleable: Some(getter_label.to_string()),
                toggling: false,
            },
        ),
        Block::new(
            BlockKind::FieldAccess,
            FieldAccessData {
                target: element_prop(),
                key: getter_label.to_lowercase(),
                label: getter_label.to_string(),
                ty: ExpressionType::Boolean,
                opposite_label: Some(opposite_label.to_string()),
                negated: false,
            },
        ),
    ]
}

/// A boolean element getter with a negated reading.
pub fn bool_element_prop(key: &str, label: &str, opposite_label: &str) -> Block {
    Block::new(
        BlockKind::FieldAccess,
        FieldAccessData {
            target: element_prop(),
            key: key.to_string(),
            label: label.to_string(),
            ty: ExpressionType::Boolean,
            opposite_label: Some(opposite_label.to_string()),
            negated: false,
        },
    )
}

/// Decode a payload for rendering; `None` means the stored shape no longer
/// matches the kind.
pub(crate) fn decode<T: DeserializeOwned>(data: &JsonValue) -> Option<T> {
    serde_json::from_value(data.clone()).ok()
}

/// Placeholder pieces for a payload that failed to decode.
pub(crate) fn malformed() -> Vec<BlockPiece> {
    vec![BlockPiece::Label("<malformed block>".to_string())]
}
