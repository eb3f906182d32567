//! Tests for the filter adapter: recognition, restrict/revert, and the
//! composite filter block

use serde_json::json;

use crate::categories::fields::MultiCallableData;
use crate::categories::logic::{operands, ComparisonData, UnaryData};
use crate::categories::strings::string_functions;
use crate::categories::values::literal;
use crate::categories::prop;
use crate::compiler::Compiler;
use crate::core::block::{Block, BlockPiece, Property};
use crate::core::registry::{registry, BlockKind};
use crate::core::types::ExpressionType;
use crate::filter::{
    is_partial_match, recognize, restrict_block, revert_block, FilterKind,
};

fn equality_comparison() -> Block {
    Block::new(
        BlockKind::Comparison,
        ComparisonData {
            left: prop("Value", ExpressionType::Any),
            right: prop("Value", ExpressionType::Any),
            operand: operands()[4].clone(),
        },
    )
}

fn starts_with_call() -> Block {
    let functions = string_functions();
    let mut selected = functions[2].clone();
    selected.params[0] = selected.params[0]
        .clone()
        .holding(literal(ExpressionType::Text, "A"));
    Block::new(
        BlockKind::MultiCallable,
        MultiCallableData {
            target: prop("String", ExpressionType::Text),
            functions,
            selected,
        },
    )
}

fn decode<T: serde::de::DeserializeOwned>(block: &Block) -> T {
    serde_json::from_value(block.data.clone()).unwrap()
}

#[test]
fn partial_match_requires_every_exemplar_key() {
    let pattern = json!({ "operand": { "value": "==" } });
    assert!(is_partial_match(
        &json!({ "operand": { "value": "==", "label": "=" }, "left": {} }),
        &pattern
    ));
    assert!(!is_partial_match(&json!({ "operand": { "value": ">" } }), &pattern));
    assert!(!is_partial_match(&json!({ "left": {} }), &pattern));
}

/// Extra candidate keys are tolerated at every level; exemplar keys are
/// required recursively.
#[test]
fn partial_match_recurses_into_nested_objects() {
    let pattern = json!({ "target": { "type": "string" }, "selected": { "value": "includes" } });
    let candidate = json!({
        "target": { "type": "string", "label": "Property Name", "extra": 1 },
        "selected": { "value": "includes", "label": "Contains", "params": [] },
        "functions": [],
    });
    assert!(is_partial_match(&candidate, &pattern));

    let wrong_selection = json!({
        "target": { "type": "string" },
        "selected": { "value": "startsWith" },
    });
    assert!(!is_partial_match(&wrong_selection, &pattern));
}

#[test]
fn recognition_maps_blocks_to_filter_kinds() {
    registry();
    assert_eq!(
        recognize(&equality_comparison()).map(|e| e.kind),
        Some(FilterKind::Eq)
    );
    assert_eq!(
        recognize(&starts_with_call()).map(|e| e.kind),
        Some(FilterKind::StartsWith)
    );

    let negation = Block::new(
        BlockKind::Unary,
        UnaryData {
            value: prop("Value", ExpressionType::Any),
            label: "Not".to_string(),
            operand: "!".to_string(),
            result_type: ExpressionType::Boolean,
        },
    );
    assert_eq!(recognize(&negation).map(|e| e.kind), Some(FilterKind::Not));

    // a case call is a multiCallable but not one of the three filter functions
    let functions = string_functions();
    let to_upper = Block::new(
        BlockKind::MultiCallable,
        MultiCallableData {
            target: prop("String", ExpressionType::Text),
            selected: functions[1].clone(),
            functions,
        },
    );
    assert!(recognize(&to_upper).is_none());

    assert!(recognize(&literal(ExpressionType::Text, "x")).is_none());
}

/// Restricting then reverting an equality comparison returns its operand
/// labels to their generic values.
#[test]
fn comparison_restrict_revert_round_trips() {
    let block = equality_comparison();
    let restricted = restrict_block(&block);
    let data: ComparisonData = decode(&restricted);
    assert_eq!(data.left.label, "Property Name");
    assert_eq!(data.right.label, "Value");

    let reverted = revert_block(&restricted);
    let data: ComparisonData = decode(&reverted);
    assert_eq!(data.left.label, "Value");
    assert_eq!(data.right.label, "Value");
}

#[test]
fn text_function_restrict_narrows_and_trims() {
    let restricted = restrict_block(&starts_with_call());
    let data: MultiCallableData = decode(&restricted);
    assert_eq!(data.target.label, "Property Name");
    assert_eq!(data.functions.len(), 3);
    assert!(data
        .functions
        .iter()
        .all(|function| function.params.len() == 1));
    // the bound match string survives the trim
    assert_eq!(data.selected.params.len(), 1);
    assert!(data.selected.params[0].value.is_some());
}

#[test]
fn text_function_revert_restores_full_table() {
    let restricted = restrict_block(&starts_with_call());
    let reverted = revert_block(&restricted);
    let data: MultiCallableData = decode(&reverted);
    assert_eq!(data.target.label, "String");
    assert_eq!(data.functions.len(), string_functions().len());
    assert_eq!(data.selected.params.len(), 2);
    // the bound match string is still there after the round trip
    assert!(data.selected.params[0].value.is_some());
    assert!(data.selected.params[1].value.is_none());
}

/// A block that matches no exemplar reverts as a no-op passthrough.
#[test]
fn revert_of_unrecognized_block_is_passthrough() {
    let block = literal(ExpressionType::Text, "x");
    assert_eq!(revert_block(&block), block);
}

fn render_filter(owner: &Block) -> Vec<BlockPiece> {
    registry().get(owner.kind).render(&owner.data)
}

fn open_slot(pieces: &[BlockPiece]) -> Property {
    let Some(BlockPiece::Slot(slot)) = pieces.last() else {
        panic!("expected the trailing open slot");
    };
    slot.clone()
}

/// Scenario: attaching a "starts with" call renames its target label, drops
/// the optional index parameter, and appends a clause; removing the clause
/// restores the original labels and parameters.
#[test]
fn filter_attach_detach_round_trip() {
    let owner = Block::new(BlockKind::CreateFilter, json!({ "filters": [] }));
    let pieces = render_filter(&owner);
    let open = open_slot(&pieces);

    let candidate = starts_with_call();
    assert!(open.accepts(&candidate).is_ok());

    let owner = open.attached(&owner, candidate.clone());
    let clauses = owner.data["filters"].as_array().unwrap();
    assert_eq!(clauses.len(), 1);
    let clause: Property = serde_json::from_value(clauses[0].clone()).unwrap();
    let attached: MultiCallableData =
        serde_json::from_value(clause.value.as_ref().unwrap().data.clone()).unwrap();
    assert_eq!(attached.target.label, "Property Name");
    assert_eq!(attached.selected.params.len(), 1);

    // detach through the clause slot's reaction
    let pieces = render_filter(&owner);
    let BlockPiece::Slot(clause_slot) = &pieces[1] else {
        panic!("expected the clause slot after the heading");
    };
    let held = clause_slot.value.as_deref().unwrap().clone();
    let update = clause_slot.detached(&owner, &held);
    assert!(update.owner.data["filters"].as_array().unwrap().is_empty());

    let detached: MultiCallableData =
        serde_json::from_value(update.detached.unwrap().data).unwrap();
    assert_eq!(detached.target.label, "String");
    assert_eq!(detached.selected.params.len(), 2);
    assert!(detached.selected.params[0].value.is_some());
}

/// An unrecognized block is rejected at the validation callback with a
/// human-readable reason and no state change.
#[test]
fn filter_rejects_unrecognized_blocks() {
    let owner = Block::new(BlockKind::CreateFilter, json!({ "filters": [] }));
    let open = open_slot(&render_filter(&owner));
    let reason = open
        .accepts(&literal(ExpressionType::Text, "x"))
        .unwrap_err();
    assert_eq!(reason, "This block cannot be used as a Filter");
}

/// The set-filter statement accepts only the composite filter or a boolean
/// combinator.
#[test]
fn set_filter_value_slot_is_guarded() {
    registry();
    let set_filter = crate::filter::palette().remove(1);
    let pieces = registry().get(set_filter.kind).render(&set_filter.data);
    let Some(BlockPiece::Slot(value_slot)) = pieces.last() else {
        panic!("expected the value slot");
    };

    let create_filter = Block::new(BlockKind::CreateFilter, json!({ "filters": [] }));
    assert!(value_slot.accepts(&create_filter).is_ok());

    let gate = crate::categories::logic::palette().remove(2);
    assert!(value_slot.accepts(&gate).is_ok());

    let reason = value_slot
        .accepts(&literal(ExpressionType::Any, 1))
        .unwrap_err();
    assert_eq!(reason, "This block cannot be used as a Filter");
}

/// A composite filter compiles to a `wixData.filter()` builder chain with a
/// default-alias import.
#[test]
fn create_filter_compiles_to_query_chain() {
    registry();
    let eq = Block::new(
        BlockKind::Comparison,
        ComparisonData {
            left: prop("Value", ExpressionType::Any)
                .holding(literal(ExpressionType::Text, "age")),
            right: prop("Value", ExpressionType::Any)
                .holding(literal(ExpressionType::number(), 21)),
            operand: operands()[4].clone(),
        },
    );
    let starts = {
        let functions = string_functions();
        let mut selected = functions[2].clone();
        selected.params[0] = selected.params[0]
            .clone()
            .holding(literal(ExpressionType::Text, "A"));
        Block::new(
            BlockKind::MultiCallable,
            MultiCallableData {
                target: prop("String", ExpressionType::Text)
                    .holding(literal(ExpressionType::Text, "name")),
                functions,
                selected,
            },
        )
    };
    let filter = Block::new(
        BlockKind::CreateFilter,
        json!({
            "filters": [
                prop("Filter", ExpressionType::Void).holding(restrict_block(&eq)),
                prop("Filter", ExpressionType::Void).holding(restrict_block(&starts)),
            ],
        }),
    );

    let mut compiler = Compiler::new();
    compiler.write_block(&filter).unwrap();
    assert_eq!(
        compiler.lines(),
        ["wixData.filter().eq('age', 21).startsWith('name', 'A')"]
    );
    assert!(compiler
        .create_output()
        .starts_with("import wixData from 'wix-data';\n"));
}

/// `setFilter` compiles to an awaited dataset call.
#[test]
fn set_filter_compiles_to_awaited_call() {
    registry();
    let filter = Block::new(BlockKind::CreateFilter, json!({ "filters": [] }));
    let set_filter = crate::filter::palette().remove(1).with_data(json!({
        "target": crate::categories::element_prop()
            .holding(literal(ExpressionType::Element, "#dataset1")),
        "value": prop("Filter", ExpressionType::Any).holding(filter),
    }));
    let mut compiler = Compiler::new();
    compiler.write_block(&set_filter).unwrap();
    assert_eq!(
        compiler.lines(),
        ["await $w('#dataset1').setFilter(wixData.filter())"]
    );
}
