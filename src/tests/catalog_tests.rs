//! Tests for the palette catalog, block actions, and connectivity rules

use serde_json::json;

use crate::categories::control::IfData;
use crate::categories::events::EventData;
use crate::categories::fields::{CallableData, FieldAccessData, FieldSetterData};
use crate::categories::logic::{operands, ComparisonData, UnaryData};
use crate::categories::values::literal;
use crate::categories::{bool_element_prop, palette_categories, prop, toggleable_element_state};
use crate::core::block::{Block, BlockPiece, Capability, Property};
use crate::core::registry::{
    can_connect_above, can_connect_below, is_expression, registry, result_type, BlockKind,
};
use crate::core::types::ExpressionType;

/// Every palette template renders through its registered implementation.
#[test]
fn every_palette_block_renders() {
    let categories = palette_categories();
    assert_eq!(categories.len(), 9);
    for category in categories {
        assert!(
            !category.blocks.is_empty(),
            "category {} should not be empty",
            category.name
        );
        for block in &category.blocks {
            let pieces = registry().get(block.kind).render(&block.data);
            assert!(!pieces.is_empty());
            for piece in pieces {
                if let BlockPiece::Label(label) = piece {
                    assert_ne!(
                        label, "<malformed block>",
                        "palette {:?} payload should decode",
                        block.kind
                    );
                }
            }
        }
    }
}

#[test]
fn palette_category_order_matches_editor() {
    let names: Vec<&str> = palette_categories()
        .iter()
        .map(|category| category.name)
        .collect();
    assert_eq!(
        names,
        [
            "Control", "Events", "Logic", "Text", "Elements", "Buttons", "Inputs", "Data", "CRM",
        ]
    );
}

#[test]
fn capabilities_drive_connectivity() {
    registry();
    let if_block = Block::new(
        BlockKind::IfBlock,
        json!({ "cond": prop("Condition", ExpressionType::Boolean), "then": { "blocks": [] } }),
    );
    assert!(can_connect_below(&if_block));
    assert!(can_connect_above(&if_block));
    assert!(!is_expression(&if_block));

    // an event may start a stack but never sits below another block
    let on_ready = Block::bare(BlockKind::OnReady);
    assert!(can_connect_below(&on_ready));
    assert!(!can_connect_above(&on_ready));

    // a pure expression lives in slots, not in statement stacks
    let five = literal(ExpressionType::number(), 5);
    assert!(!can_connect_below(&five));
    assert!(!can_connect_above(&five));
    assert!(is_expression(&five));

    // a computation is both a value and a statement
    let focus = toggleable_element_state("Focus", "Unfocus");
    assert!(can_connect_below(&focus));
    assert!(can_connect_above(&focus));
    assert!(is_expression(&focus));
}

#[test]
fn result_types_fall_back_to_void() {
    registry();
    let comparison = crate::categories::logic::palette().remove(0);
    assert_eq!(result_type(&comparison), ExpressionType::Boolean);

    let if_block = crate::categories::control::palette().remove(0);
    assert_eq!(result_type(&if_block), ExpressionType::Void);
}

#[test]
fn capability_predicates_are_consistent() {
    assert!(Capability::Computation.is_expression());
    assert!(Capability::Expression.is_expression());
    assert!(!Capability::Statement.is_expression());
    assert!(!Capability::Event.connects_above());
    assert!(Capability::Event.connects_below());
}

#[test]
fn slot_acceptance_checks_result_types() {
    registry();
    let condition = prop("Condition", ExpressionType::Boolean);
    let comparison = crate::categories::logic::palette().remove(0);
    assert!(condition.accepts(&comparison).is_ok());

    let err = condition
        .accepts(&literal(ExpressionType::Text, "x"))
        .unwrap_err();
    assert_eq!(err, "Text cannot be used as Boolean");

    let err = condition
        .accepts(&crate::categories::control::palette().remove(0))
        .unwrap_err();
    assert!(err.contains("does not produce a value"));

    // bucket members flow into any-typed slots
    let any_slot = prop("Value", ExpressionType::Any);
    assert!(any_slot.accepts(&literal(ExpressionType::Text, "x")).is_ok());
}

#[test]
fn with_data_overlays_and_clears() {
    let block = Block::new(BlockKind::Literal, json!({ "a": 1, "b": 2 }));
    let patched = block.with_data(json!({ "a": 5 }));
    assert_eq!(patched.data, json!({ "a": 5, "b": 2 }));

    let cleared = patched.with_data(json!({ "b": null }));
    assert_eq!(cleared.data, json!({ "a": 5 }));
}

#[test]
fn if_block_gains_and_loses_else() {
    registry();
    let if_block = crate::categories::control::palette().remove(0);
    let actions = registry().get(if_block.kind).actions(&if_block.data);
    assert_eq!(actions[0].label, "Add Else");

    let with_else = actions[0].run(&if_block);
    let data: IfData = serde_json::from_value(with_else.data.clone()).unwrap();
    assert!(data.else_branch.is_some());

    let actions = registry().get(with_else.kind).actions(&with_else.data);
    assert_eq!(actions[0].label, "Remove Else");
    let without_else = actions[0].run(&with_else);
    let data: IfData = serde_json::from_value(without_else.data).unwrap();
    assert!(data.else_branch.is_none());
}

#[test]
fn comparison_negate_swaps_operator() {
    registry();
    let comparison = crate::categories::logic::palette().remove(0);
    let actions = registry().get(comparison.kind).actions(&comparison.data);
    let negate = actions
        .iter()
        .find(|action| action.label == "Negate")
        .unwrap();
    let negated = negate.run(&comparison);
    let data: ComparisonData = serde_json::from_value(negated.data).unwrap();
    assert_eq!(data.operand.value, "<");
}

#[test]
fn comparison_swap_moves_held_values() {
    registry();
    let block = Block::new(
        BlockKind::Comparison,
        ComparisonData {
            left: prop("Value", ExpressionType::Any)
                .holding(literal(ExpressionType::number(), 5)),
            right: prop("Value", ExpressionType::Any)
                .holding(literal(ExpressionType::number(), 3)),
            operand: operands()[0].clone(),
        },
    );
    let actions = registry().get(block.kind).actions(&block.data);
    let swapped = actions[0].run(&block);
    let data: ComparisonData = serde_json::from_value(swapped.data).unwrap();
    assert_eq!(
        data.left.value.unwrap().data["value"],
        json!(3),
        "labels stay, held values swap"
    );
    assert_eq!(data.right.value.unwrap().data["value"], json!(5));
    assert_eq!(data.left.label, "Value");
}

#[test]
fn element_event_switches_to_opposite() {
    registry();
    let focused = crate::categories::events::palette().remove(2);
    let actions = registry().get(focused.kind).actions(&focused.data);
    assert_eq!(actions[0].label, "Change to Unfocused");

    let unfocused = actions[0].run(&focused);
    let data: EventData = serde_json::from_value(unfocused.data).unwrap();
    assert_eq!(data.key, "onBlur");
    assert_eq!(data.label, "Unfocused");
    assert_eq!(data.opposite_key.as_deref(), Some("onFocus"));
    assert_eq!(data.opposite_label.as_deref(), Some("Focused"));
}

#[test]
fn boolean_field_access_negates() {
    registry();
    let valid = bool_element_prop("valid", "Valid", "Invalid");
    let actions = registry().get(valid.kind).actions(&valid.data);
    assert_eq!(actions[0].label, "Change to Invalid");

    let negated = actions[0].run(&valid);
    let data: FieldAccessData = serde_json::from_value(negated.data.clone()).unwrap();
    assert!(data.negated);

    let actions = registry().get(negated.kind).actions(&negated.data);
    assert_eq!(actions[0].label, "Change to Valid");
}

#[test]
fn unary_remove_negation_unwraps_inner_block() {
    registry();
    let inner = crate::categories::logic::palette().remove(0);
    let negation = Block::new(
        BlockKind::Unary,
        UnaryData {
            value: prop("Value", ExpressionType::Any).holding(inner.clone()),
            label: "Not".to_string(),
            operand: "!".to_string(),
            result_type: ExpressionType::Boolean,
        },
    );
    let actions = registry().get(negation.kind).actions(&negation.data);
    assert_eq!(actions[0].label, "Remove Negation");
    assert_eq!(actions[0].run(&negation), inner);
}

#[test]
fn logic_gate_add_negation_wraps_itself() {
    registry();
    let gate = crate::categories::logic::palette().remove(2);
    let actions = registry().get(gate.kind).actions(&gate.data);
    let add_negation = actions
        .iter()
        .find(|action| action.label == "Add Negation")
        .unwrap();
    let wrapped = add_negation.run(&gate);
    assert_eq!(wrapped.kind, BlockKind::Unary);
    let data: UnaryData = serde_json::from_value(wrapped.data).unwrap();
    assert_eq!(data.value.value.as_deref(), Some(&gate));
}

#[test]
fn callable_switches_to_opposite_method() {
    registry();
    let focus = toggleable_element_state("Focus", "Unfocus");
    let actions = registry().get(focus.kind).actions(&focus.data);
    assert_eq!(actions[0].label, "Change to Unfocus");

    let unfocus = actions[0].run(&focus);
    let data: CallableData = serde_json::from_value(unfocus.data).unwrap();
    assert_eq!(data.key, "unfocus");
    assert_eq!(data.label, "Unfocus");
    assert_eq!(data.opposite_key.as_deref(), Some("focus"));
    assert_eq!(data.opposite_label.as_deref(), Some("Focus"));
}

#[test]
fn field_setter_toggle_round_trips() {
    registry();
    let setter = crate::categories::read_write_element_field(
        "required",
        "Required",
        ExpressionType::Boolean,
        None,
    )
    .remove(1);
    let actions = registry().get(setter.kind).actions(&setter.data);
    assert_eq!(actions[0].label, "Toggle Required state");

    let toggling = actions[0].run(&setter);
    let data: FieldSetterData = serde_json::from_value(toggling.data.clone()).unwrap();
    assert!(data.toggling);

    let actions = registry().get(toggling.kind).actions(&toggling.data);
    assert_eq!(actions[0].label, "Set manual value");
}

/// Stored blocks survive a serde round trip, callbacks excluded.
#[test]
fn block_trees_round_trip_through_serde() {
    let block = Block::new(
        BlockKind::Comparison,
        ComparisonData {
            left: prop("Value", ExpressionType::Any)
                .holding(literal(ExpressionType::number(), 5)),
            right: prop("Value", ExpressionType::Any),
            operand: operands()[0].clone(),
        },
    );
    let json = serde_json::to_string(&block).unwrap();
    assert!(json.contains("\"type\":\"comparison\""));
    let restored: Block = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, block);

    let slot: Property = serde_json::from_value(block.data["left"].clone()).unwrap();
    assert_eq!(slot.label, "Value");
    assert!(slot.value.is_some());
}
