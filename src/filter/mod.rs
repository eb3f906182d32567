//! The filter sub-DSL: general logic blocks doubling as query predicates
//!
//! A fixed set of expression blocks (comparisons, boolean negation, and the
//! three filter-eligible text functions) can be attached to a composite
//! "create filter" expression. Recognition is structural: each exemplar
//! pairs a block-kind tag with a partial payload the candidate must contain.
//! On attachment the clause payload is rewritten for filter presentation
//! (relabeled operands, trimmed parameters); on detachment the rewrite is
//! undone.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::sync::{Arc, OnceLock};

use crate::categories::fields::{FieldSetterData, MultiCallableData};
use crate::categories::logic::{ComparisonData, UnaryData};
use crate::categories::strings::string_functions;
use crate::categories::{decode, malformed, prop};
use crate::compiler::{payload, CompileError, Compiler};
use crate::core::block::{
    AttachUpdate, Block, BlockPiece, BlockType, Capability, Property,
};
use crate::core::registry::BlockKind;
use crate::core::types::ExpressionType;

/// Canonical filter clause kinds, in recognition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Eq,
    Gt,
    Ge,
    Lt,
    Le,
    Ne,
    Not,
    StartsWith,
    EndsWith,
    Contains,
}

impl FilterKind {
    /// The `wix-data` query-builder method this clause compiles to.
    pub fn query_method(self) -> &'static str {
        match self {
            FilterKind::Eq => "eq",
            FilterKind::Gt => "gt",
            FilterKind::Ge => "ge",
            FilterKind::Lt => "lt",
            FilterKind::Le => "le",
            FilterKind::Ne => "ne",
            FilterKind::Not => "not",
            FilterKind::StartsWith => "startsWith",
            FilterKind::EndsWith => "endsWith",
            FilterKind::Contains => "contains",
        }
    }
}

/// Recognition exemplar: a block-kind tag plus the partial payload a
/// candidate must structurally contain, and the presentation transforms.
pub struct FilterExemplar {
    pub kind: FilterKind,
    pub block_kind: BlockKind,
    pub pattern: JsonValue,
    restrict: Option<fn(JsonValue) -> JsonValue>,
    revert: Option<fn(JsonValue) -> JsonValue>,
}

static EXEMPLARS: OnceLock<Vec<FilterExemplar>> = OnceLock::new();

fn exemplars() -> &'static [FilterExemplar] {
    EXEMPLARS.get_or_init(|| {
        let comparison = |kind: FilterKind, operator: &str| FilterExemplar {
            kind,
            block_kind: BlockKind::Comparison,
            pattern: json!({ "operand": { "value": operator } }),
            restrict: Some(restrict_comparison),
            revert: Some(revert_comparison),
        };
        let text_call = |kind: FilterKind, function: &str| FilterExemplar {
            kind,
            block_kind: BlockKind::MultiCallable,
            pattern: json!({ "target": { "type": "string" }, "selected": { "value": function } }),
            restrict: Some(restrict_text_function),
            revert: Some(revert_text_function),
        };
        vec![
            comparison(FilterKind::Eq, "=="),
            comparison(FilterKind::Gt, ">"),
            comparison(FilterKind::Ge, ">="),
            comparison(FilterKind::Lt, "<"),
            comparison(FilterKind::Le, "<="),
            comparison(FilterKind::Ne, "!="),
            FilterExemplar {
                kind: FilterKind::Not,
                block_kind: BlockKind::Unary,
                pattern: json!({ "operand": "!" }),
                restrict: Some(restrict_unary),
                revert: Some(revert_unary),
            },
            text_call(FilterKind::StartsWith, "startsWith"),
            text_call(FilterKind::EndsWith, "endsWith"),
            text_call(FilterKind::Contains, "includes"),
        ]
    })
}

/// Partial structural match: every key in `pattern` must be present and
/// equal in `candidate`, recursing through nested objects; extra candidate
/// keys are ignored.
pub fn is_partial_match(candidate: &JsonValue, pattern: &JsonValue) -> bool {
    match (candidate, pattern) {
        (JsonValue::Object(candidate), JsonValue::Object(pattern)) => {
            pattern.iter().all(|(key, expected)| {
                candidate.get(key).is_some_and(|actual| {
                    if expected.is_object() {
                        is_partial_match(actual, expected)
                    } else {
                        actual == expected
                    }
                })
            })
        }
        _ => candidate == pattern,
    }
}

/// The first exemplar (in registration order) matching `block`, if any. No
/// match means the block cannot be used as a filter clause.
pub fn recognize(block: &Block) -> Option<&'static FilterExemplar> {
    exemplars().iter().find(|exemplar| {
        exemplar.block_kind == block.kind && is_partial_match(&block.data, &exemplar.pattern)
    })
}

/// Rewrite a recognized clause for filter presentation. Unrecognized blocks
/// pass through unchanged.
pub fn restrict_block(block: &Block) -> Block {
    match recognize(block).and_then(|exemplar| exemplar.restrict) {
        Some(restrict) => Block {
            kind: block.kind,
            data: restrict(block.data.clone()),
        },
        None => block.clone(),
    }
}

/// Undo the filter presentation. A clause that no longer matches any
/// exemplar passes through unchanged; the revert is best-effort, not
/// guaranteed lossless.
pub fn revert_block(block: &Block) -> Block {
    match recognize(block).and_then(|exemplar| exemplar.revert) {
        Some(revert) => Block {
            kind: block.kind,
            data: revert(block.data.clone()),
        },
        None => block.clone(),
    }
}

/// Rewrite the `label` of the named slot properties in a payload.
fn relabel(mut data: JsonValue, labels: &[(&str, &str)]) -> JsonValue {
    if let JsonValue::Object(map) = &mut data {
        for (slot, label) in labels {
            if let Some(JsonValue::Object(slot_map)) = map.get_mut(*slot) {
                slot_map.insert("label".to_string(), JsonValue::String((*label).to_string()));
            }
        }
    }
    data
}

fn restrict_comparison(data: JsonValue) -> JsonValue {
    relabel(data, &[("left", "Property Name"), ("right", "Value")])
}

fn revert_comparison(data: JsonValue) -> JsonValue {
    relabel(data, &[("left", "Value"), ("right", "Value")])
}

fn restrict_unary(data: JsonValue) -> JsonValue {
    relabel(data, &[("value", "Property Name")])
}

fn revert_unary(data: JsonValue) -> JsonValue {
    relabel(data, &[("value", "Value")])
}

/// The three text functions usable as filter clauses.
const FILTER_FUNCTIONS: [&str; 3] = ["startsWith", "endsWith", "includes"];

fn restrict_text_function(data: JsonValue) -> JsonValue {
    let Ok(mut typed) = serde_json::from_value::<MultiCallableData>(data.clone()) else {
        return data;
    };
    typed
        .functions
        .retain(|function| FILTER_FUNCTIONS.contains(&function.value.as_str()));
    // the optional trailing index parameter has no filter counterpart
    for function in &mut typed.functions {
        function.params.pop();
    }
    typed.selected.params.pop();
    typed.target.label = "Property Name".to_string();
    serde_json::to_value(&typed).unwrap_or(data)
}

fn revert_text_function(data: JsonValue) -> JsonValue {
    let Ok(mut typed) = serde_json::from_value::<MultiCallableData>(data.clone()) else {
        return data;
    };
    typed.functions = string_functions();
    if let Some(template) = typed
        .functions
        .iter()
        .find(|function| function.value == typed.selected.value)
        .cloned()
    {
        // restore the full parameter list, keeping values already bound
        let mut params = template.params;
        for (slot, existing) in params.iter_mut().zip(&typed.selected.params) {
            slot.value = existing.value.clone();
        }
        typed.selected.params = params;
    }
    typed.target.label = "String".to_string();
    serde_json::to_value(&typed).unwrap_or(data)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterData {
    #[serde(default)]
    pub filters: Vec<Property>,
}

/// Composite `wixData.filter()` builder expression. Holds one slot per
/// attached clause plus a trailing open "Add filter..." slot.
pub struct CreateFilter;

impl BlockType for CreateFilter {
    fn capability(&self) -> Capability {
        Capability::Expression
    }

    fn color(&self) -> &'static str {
        "bg-teal-500"
    }

    fn render(&self, data: &JsonValue) -> Vec<BlockPiece> {
        let Some(data) = decode::<FilterData>(data) else {
            return malformed();
        };
        let mut pieces: Vec<BlockPiece> = vec!["Create a Filter where:".into()];
        for (index, clause) in data.filters.iter().enumerate() {
            let mut slot = clause.clone();
            slot.on_attach_change = Some(Arc::new(move |_slot, owner, removed| {
                let mut update = AttachUpdate {
                    owner: owner.clone(),
                    detached: removed.cloned(),
                };
                let Some(mut data) = decode::<FilterData>(&owner.data) else {
                    return update;
                };
                if index < data.filters.len() {
                    data.filters.remove(index);
                }
                update.owner = owner.with_data(json!({ "filters": data.filters }));
                update.detached = removed.map(revert_block);
                update
            }));
            pieces.push(BlockPiece::Slot(slot));
        }
        let mut open = Property::new("Add filter...", ExpressionType::Void);
        open.can_attach = Some(Arc::new(|_slot, candidate| {
            if recognize(candidate).is_some() {
                None
            } else {
                Some("This block cannot be used as a Filter".to_string())
            }
        }));
        open.on_attach_change = Some(Arc::new(|slot, owner, _removed| {
            let Some(value) = &slot.value else {
                return AttachUpdate {
                    owner: owner.clone(),
                    detached: None,
                };
            };
            let Some(mut data) = decode::<FilterData>(&owner.data) else {
                return AttachUpdate {
                    owner: owner.clone(),
                    detached: None,
                };
            };
            let clause =
                Property::new("Filter", ExpressionType::Void).holding(restrict_block(value));
            data.filters.push(clause);
            AttachUpdate {
                owner: owner.with_data(json!({ "filters": data.filters })),
                detached: None,
            }
        }));
        pieces.push(BlockPiece::Slot(open));
        pieces
    }

    fn result_type(&self, _data: &JsonValue) -> Option<ExpressionType> {
        Some(ExpressionType::Any)
    }

    fn compile(&self, ctx: &mut Compiler, data: &JsonValue) -> Result<(), CompileError> {
        let mut data: FilterData = payload(data)?;
        ctx.import_alias("wix-data", "wixData")?;
        ctx.write("wixData.filter()");
        for clause in &mut data.filters {
            let Some(block) = clause.value.clone() else {
                continue;
            };
            // a clause that no longer matches any exemplar cannot be compiled
            let Some(exemplar) = recognize(&block) else {
                continue;
            };
            ctx.write(&format!(".{}(", exemplar.kind.query_method()));
            write_clause_args(ctx, exemplar.kind, &block)?;
            ctx.write(")");
        }
        Ok(())
    }
}

fn write_clause_args(
    ctx: &mut Compiler,
    kind: FilterKind,
    block: &Block,
) -> Result<(), CompileError> {
    match kind {
        FilterKind::Eq
        | FilterKind::Gt
        | FilterKind::Ge
        | FilterKind::Lt
        | FilterKind::Le
        | FilterKind::Ne => {
            let mut data: ComparisonData = payload(&block.data)?;
            ctx.write_property(&mut data.left, true)?;
            ctx.write(", ");
            ctx.write_property(&mut data.right, true)?;
        }
        FilterKind::Not => {
            let mut data: UnaryData = payload(&block.data)?;
            ctx.write_property(&mut data.value, true)?;
        }
        FilterKind::StartsWith | FilterKind::EndsWith | FilterKind::Contains => {
            let mut data: MultiCallableData = payload(&block.data)?;
            ctx.write_property(&mut data.target, true)?;
            for param in &mut data.selected.params {
                if param.optional && param.value.is_none() {
                    continue;
                }
                ctx.write(", ");
                let required = !param.optional;
                ctx.write_property(param, required)?;
            }
        }
    }
    Ok(())
}

/// `dataset.setFilter(filter)` statement; accepts only the composite filter
/// expression or a boolean combinator as its value.
pub struct SetFilter;

fn accepts_filter_value(_slot: &Property, candidate: &Block) -> Option<String> {
    match candidate.kind {
        BlockKind::CreateFilter | BlockKind::LogicGate => None,
        _ => Some("This block cannot be used as a Filter".to_string()),
    }
}

impl BlockType for SetFilter {
    fn capability(&self) -> Capability {
        Capability::Statement
    }

    fn color(&self) -> &'static str {
        "bg-indigo-500"
    }

    fn render(&self, data: &JsonValue) -> Vec<BlockPiece> {
        let Some(mut data) = decode::<FieldSetterData>(data) else {
            return malformed();
        };
        data.value.can_attach = Some(Arc::new(accepts_filter_value));
        vec![
            "Set".into(),
            data.label.into(),
            "of".into(),
            data.target.into(),
            "to".into(),
            data.value.into(),
        ]
    }

    fn compile(&self, ctx: &mut Compiler, data: &JsonValue) -> Result<(), CompileError> {
        let mut data: FieldSetterData = payload(data)?;
        ctx.require_async();
        ctx.write("await ");
        ctx.write_property(&mut data.target, true)?;
        ctx.write(&format!(".{}(", data.key));
        ctx.write_property(&mut data.value, true)?;
        ctx.write(")");
        Ok(())
    }
}

/// Palette templates for the Data category.
pub fn palette() -> Vec<Block> {
    vec![
        Block::new(BlockKind::CreateFilter, FilterData { filters: Vec::new() }),
        Block::new(
            BlockKind::SetFilter,
            FieldSetterData {
                target: prop("Dataset", ExpressionType::Element),
                key: "setFilter".to_string(),
                label: "Filter".to_string(),
                value: prop("Filter", ExpressionType::Any),
                toggleable: None,
                toggling: false,
            },
        ),
    ]
}
