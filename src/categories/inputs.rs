//! Input-element palette

use crate::core::block::Block;
use crate::core::types::ExpressionType;
use crate::core::SelectOption;

use super::{
    bool_element_prop, read_write_element_field, toggleable_and_getter_element_state,
    toggleable_element_state,
};

/// Palette templates for the Inputs category.
pub fn palette() -> Vec<Block> {
    let mut blocks = Vec::new();
    blocks.extend(read_write_element_field(
        "value",
        "Value",
        ExpressionType::Any,
        None,
    ));
    blocks.extend(read_write_element_field(
        "placeholder",
        "Placeholder",
        ExpressionType::Text,
        None,
    ));
    blocks.extend(read_write_element_field(
        "required",
        "Required",
        ExpressionType::Boolean,
        None,
    ));
    blocks.extend(toggleable_and_getter_element_state(
        "Disable", "Enable", "Enabled", "Disabled",
    ));
    blocks.push(bool_element_prop("valid", "Valid", "Invalid"));
    blocks.extend(read_write_element_field(
        "inputType",
        "Input Type",
        ExpressionType::Enum {
            name: "Input Type".to_string(),
            options: vec![
                SelectOption::new("Text", "text"),
                SelectOption::new("Password", "password"),
                SelectOption::new("Number", "number"),
                SelectOption::new("Email", "email"),
                SelectOption::new("URL", "url"),
                SelectOption::new("Phone Number", "tel"),
            ],
        },
        None,
    ));
    blocks.push(toggleable_element_state("Focus", "Unfocus"));
    blocks
}
