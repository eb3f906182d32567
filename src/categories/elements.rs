//! General element-manipulation palette

use crate::core::block::Block;
use crate::core::types::ExpressionType;
use crate::core::TypedSelectOption;

use super::{
    read_write_element_field, read_write_multi_element_fields,
    toggleable_and_getter_element_state,
};

/// Palette templates for the Elements category.
pub fn palette() -> Vec<Block> {
    let mut blocks = Vec::new();
    blocks.extend(toggleable_and_getter_element_state(
        "Expand", "Collapse", "Collapsed", "Expanded",
    ));
    blocks.extend(toggleable_and_getter_element_state(
        "Show", "Hide", "Hidden", "Shown",
    ));
    blocks.extend(read_write_multi_element_fields(vec![
        TypedSelectOption::new(
            "Background Color",
            "style.backgroundColor",
            ExpressionType::Color,
        ),
        TypedSelectOption::new("Text Color", "style.color", ExpressionType::Color),
        TypedSelectOption::new(
            "Border Width",
            "style.borderWidth",
            ExpressionType::suffixed_number("px"),
        ),
        TypedSelectOption::new(
            "Border Radius",
            "style.borderRadius",
            ExpressionType::suffixed_number("px"),
        ),
        TypedSelectOption::new(
            "Foreground Color",
            "style.foregroundColor",
            ExpressionType::Color,
        ),
    ]));
    blocks.extend(read_write_element_field(
        "label",
        "Label",
        ExpressionType::Text,
        None,
    ));
    blocks
}
