//! Button-specific palette

use crate::core::block::Block;
use crate::core::types::ExpressionType;

use super::{read_write_element_field, toggleable_and_getter_element_state};

/// Palette templates for the Buttons category.
pub fn palette() -> Vec<Block> {
    let mut blocks = Vec::new();
    blocks.extend(read_write_element_field(
        "icon",
        "Icon of Button",
        ExpressionType::Image,
        None,
    ));
    blocks.extend(read_write_element_field(
        "link",
        "Button Link",
        ExpressionType::Link,
        None,
    ));
    blocks.extend(toggleable_and_getter_element_state(
        "Expand Icon",
        "Collapse Icon",
        "Icon Collapsed",
        "Icon Expanded",
    ));
    blocks
}
