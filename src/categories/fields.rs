//! Field access, field mutation, and method-call blocks
//!
//! These kinds cover the element surface of the host API: reading a field,
//! writing a field, and calling a method, each in a fixed-key form and a
//! dropdown (multi) form.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::compiler::{payload, CompileError, Compiler};
use crate::core::block::{
    BlockAction, BlockPiece, BlockType, Capability, Property, Selection,
};
use crate::core::types::ExpressionType;
use crate::core::{SelectOption, TypedSelectOption};

use super::{decode, malformed};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAccessData {
    pub target: Property,
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub ty: ExpressionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opposite_label: Option<String>,
    #[serde(default, skip_serializing_if = "crate::core::is_false")]
    pub negated: bool,
}

/// Read one field of a target: `target.key`, negated for boolean readings.
pub struct FieldAccessBlock;

impl BlockType for FieldAccessBlock {
    fn capability(&self) -> Capability {
        Capability::Expression
    }

    fn color(&self) -> &'static str {
        "bg-indigo-400"
    }

    fn render(&self, data: &JsonValue) -> Vec<BlockPiece> {
        let Some(data) = decode::<FieldAccessData>(data) else {
            return malformed();
        };
        if data.ty == ExpressionType::Boolean {
            let reading = if data.negated {
                data.opposite_label.unwrap_or(data.label)
            } else {
                data.label
            };
            vec!["Is".into(), data.target.into(), reading.into()]
        } else {
            vec![data.label.into(), "of".into(), data.target.into()]
        }
    }

    fn result_type(&self, data: &JsonValue) -> Option<ExpressionType> {
        decode::<FieldAccessData>(data).map(|data| data.ty)
    }

    fn compile(&self, ctx: &mut Compiler, data: &JsonValue) -> Result<(), CompileError> {
        let mut data: FieldAccessData = payload(data)?;
        if data.negated {
            ctx.write("!");
        }
        ctx.write_property(&mut data.target, true)?;
        ctx.write(&format!(".{}", data.key));
        Ok(())
    }

    fn actions(&self, data: &JsonValue) -> Vec<BlockAction> {
        let Some(data) = decode::<FieldAccessData>(data) else {
            return Vec::new();
        };
        if data.ty != ExpressionType::Boolean {
            return Vec::new();
        }
        let Some(opposite_label) = data.opposite_label else {
            return Vec::new();
        };
        let target_label = if data.negated { data.label } else { opposite_label };
        let negated = data.negated;
        vec![BlockAction::new(
            format!("Change to {target_label}"),
            move |block| block.with_data(json!({ "negated": !negated })),
        )]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiFieldAccessData {
    pub target: Property,
    pub fields: Vec<TypedSelectOption>,
    pub selected: TypedSelectOption,
}

/// Read a field chosen from a dropdown: `target.selected`.
pub struct MultiFieldAccessBlock;

impl BlockType for MultiFieldAccessBlock {
    fn capability(&self) -> Capability {
        Capability::Expression
    }

    fn color(&self) -> &'static str {
        "bg-indigo-400"
    }

    fn render(&self, data: &JsonValue) -> Vec<BlockPiece> {
        let Some(data) = decode::<MultiFieldAccessData>(data) else {
            return malformed();
        };
        let options = data
            .fields
            .iter()
            .map(|field| SelectOption::new(field.label.clone(), field.value.clone()))
            .collect();
        let fields = data.fields;
        let selection =
            Selection::new(data.selected.value, options).with_change(move |value, block| {
                match fields.iter().find(|field| field.value == value) {
                    Some(field) => block.with_data(json!({ "selected": field })),
                    None => block.clone(),
                }
            });
        vec![selection.into(), "of".into(), data.target.into()]
    }

    fn result_type(&self, data: &JsonValue) -> Option<ExpressionType> {
        decode::<MultiFieldAccessData>(data).map(|data| data.selected.ty)
    }

    fn compile(&self, ctx: &mut Compiler, data: &JsonValue) -> Result<(), CompileError> {
        let mut data: MultiFieldAccessData = payload(data)?;
        ctx.write_property(&mut data.target, true)?;
        ctx.write(&format!(".{}", data.selected.value));
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallableData {
    pub target: Property,
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub params: Vec<Property>,
    pub return_type: ExpressionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opposite_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opposite_label: Option<String>,
    /// Boolean getter this method pair can toggle on (e.g. "Collapsed")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toggleable: Option<String>,
    #[serde(default, skip_serializing_if = "crate::core::is_false")]
    pub toggling: bool,
}

/// Call a method on a target: `target.key(args...)`. A toggleable pair in
/// toggling form branches on its getter and calls whichever method flips the
/// state.
pub struct CallableBlock;

/// Emit a call's argument list, skipping unbound optional parameters.
pub(crate) fn write_call_params(
    ctx: &mut Compiler,
    params: &mut [Property],
) -> Result<(), CompileError> {
    let mut first = true;
    for param in params.iter_mut() {
        if param.optional && param.value.is_none() {
            continue;
        }
        if !first {
            ctx.write(", ");
        }
        let required = !param.optional;
        ctx.write_property(param, required)?;
        first = false;
    }
    Ok(())
}

impl BlockType for CallableBlock {
    fn capability(&self) -> Capability {
        Capability::Computation
    }

    fn color(&self) -> &'static str {
        "bg-purple-400"
    }

    fn render(&self, data: &JsonValue) -> Vec<BlockPiece> {
        let Some(data) = decode::<CallableData>(data) else {
            return malformed();
        };
        if let (Some(toggleable), true) = (&data.toggleable, data.toggling) {
            return vec![
                "Toggle".into(),
                toggleable.clone().into(),
                "state of".into(),
                data.target.into(),
            ];
        }
        let mut pieces: Vec<BlockPiece> = vec![data.label.into(), data.target.into()];
        pieces.extend(data.params.into_iter().map(BlockPiece::from));
        pieces
    }

    fn result_type(&self, data: &JsonValue) -> Option<ExpressionType> {
        decode::<CallableData>(data).map(|data| data.return_type)
    }

    fn compile(&self, ctx: &mut Compiler, data: &JsonValue) -> Result<(), CompileError> {
        let mut data: CallableData = payload(data)?;
        if let (Some(toggleable), true) = (data.toggleable.clone(), data.toggling) {
            // branch on the getter and call whichever method flips the state
            let flip = data.opposite_key.clone().unwrap_or_else(|| data.key.clone());
            ctx.write("if (");
            ctx.write_property(&mut data.target, true)?;
            ctx.write_line(&format!(".{}) {{", toggleable.to_lowercase()));
            ctx.indent(|ctx| {
                ctx.write_property(&mut data.target, true)?;
                ctx.write(&format!(".{flip}()"));
                Ok(())
            })?;
            ctx.write_line("");
            ctx.write_line("} else {");
            ctx.indent(|ctx| {
                ctx.write_property(&mut data.target, true)?;
                ctx.write(&format!(".{}()", data.key));
                Ok(())
            })?;
            ctx.write_line("");
            ctx.write("}");
            return Ok(());
        }
        if matches!(data.return_type, ExpressionType::Promise { .. }) {
            ctx.require_async();
            ctx.write("await ");
        }
        ctx.write_property(&mut data.target, true)?;
        ctx.write(&format!(".{}(", data.key));
        write_call_params(ctx, &mut data.params)?;
        ctx.write(")");
        Ok(())
    }

    fn actions(&self, data: &JsonValue) -> Vec<BlockAction> {
        let Some(data) = decode::<CallableData>(data) else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        if let (Some(opposite_key), Some(opposite_label)) =
            (data.opposite_key.clone(), data.opposite_label.clone())
        {
            actions.push(BlockAction::new(
                format!("Change to {opposite_label}"),
                move |block| {
                    let Some(current) = decode::<CallableData>(&block.data) else {
                        return block.clone();
                    };
                    block.with_data(json!({
                        "key": opposite_key,
                        "label": opposite_label,
                        "oppositeKey": current.key,
                        "oppositeLabel": current.label,
                        "toggling": false,
                    }))
                },
            ));
        }
        if let Some(toggleable) = &data.toggleable {
            if data.toggling {
                let label = data.label.clone();
                actions.push(BlockAction::new(format!("Change to {label}"), |block| {
                    block.with_data(json!({ "toggling": false }))
                }));
            } else {
                actions.push(BlockAction::new(
                    format!("Toggle {toggleable} state"),
                    |block| block.with_data(json!({ "toggling": true })),
                ));
            }
        }
        actions
    }
}

/// A callable choice in a multi-function dropdown, carrying its own
/// parameter slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionOption {
    pub label: String,
    pub value: String,
    #[serde(rename = "type")]
    pub ty: ExpressionType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Property>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiCallableData {
    pub target: Property,
    pub functions: Vec<FunctionOption>,
    pub selected: FunctionOption,
}

/// Call a method chosen from a dropdown: `target.selected(args...)`.
pub struct MultiCallableBlock;

impl BlockType for MultiCallableBlock {
    fn capability(&self) -> Capability {
        Capability::Computation
    }

    fn color(&self) -> &'static str {
        "bg-purple-400"
    }

    fn render(&self, data: &JsonValue) -> Vec<BlockPiece> {
        let Some(data) = decode::<MultiCallableData>(data) else {
            return malformed();
        };
        let options = data
            .functions
            .iter()
            .map(|function| SelectOption::new(function.label.clone(), function.value.clone()))
            .collect();
        let functions = data.functions;
        let selection =
            Selection::new(data.selected.value.clone(), options).with_change(move |value, block| {
                match functions.iter().find(|function| function.value == value) {
                    Some(function) => block.with_data(json!({ "selected": function })),
                    None => block.clone(),
                }
            });
        let mut pieces: Vec<BlockPiece> = vec![selection.into(), data.target.into()];
        pieces.extend(data.selected.params.into_iter().map(BlockPiece::from));
        pieces
    }

    fn result_type(&self, data: &JsonValue) -> Option<ExpressionType> {
        decode::<MultiCallableData>(data).map(|data| data.selected.ty)
    }

    fn compile(&self, ctx: &mut Compiler, data: &JsonValue) -> Result<(), CompileError> {
        let mut data: MultiCallableData = payload(data)?;
        if matches!(data.selected.ty, ExpressionType::Promise { .. }) {
            ctx.require_async();
            ctx.write("await ");
        }
        ctx.write_property(&mut data.target, true)?;
        ctx.write(&format!(".{}(", data.selected.value));
        write_call_params(ctx, &mut data.selected.params)?;
        ctx.write(")");
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSetterData {
    pub target: Property,
    pub key: String,
    pub label: String,
    pub value: Property,
    /// Label shown by the toggle action (boolean fields only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toggleable: Option<String>,
    #[serde(default, skip_serializing_if = "crate::core::is_false")]
    pub toggling: bool,
}

/// Assign one field of a target: `target.key = value`, or
/// `target.key = !target.key` in toggling form.
pub struct FieldSetterBlock;

impl BlockType for FieldSetterBlock {
    fn capability(&self) -> Capability {
        Capability::Statement
    }

    fn color(&self) -> &'static str {
        "bg-indigo-500"
    }

    fn render(&self, data: &JsonValue) -> Vec<BlockPiece> {
        let Some(data) = decode::<FieldSetterData>(data) else {
            return malformed();
        };
        if let (Some(_), true) = (&data.toggleable, data.toggling) {
            return vec![
                "Toggle".into(),
                data.label.into(),
                "state of".into(),
                data.target.into(),
            ];
        }
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
        ctx.write_property(&mut data.target, true)?;
        ctx.write(&format!(".{} = ", data.key));
        if data.toggleable.is_some() && data.toggling {
            ctx.write("!");
            ctx.write_property(&mut data.target, true)?;
            ctx.write(&format!(".{}", data.key));
        } else {
            ctx.write_property(&mut data.value, true)?;
        }
        Ok(())
    }

    fn actions(&self, data: &JsonValue) -> Vec<BlockAction> {
        let Some(data) = decode::<FieldSetterData>(data) else {
            return Vec::new();
        };
        let Some(toggleable) = data.toggleable else {
            return Vec::new();
        };
        if data.toggling {
            vec![BlockAction::new("Set manual value", |block| {
                block.with_data(json!({ "toggling": false }))
            })]
        } else {
            vec![BlockAction::new(
                format!("Toggle {toggleable} state"),
                |block| block.with_data(json!({ "toggling": true })),
            )]
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiFieldSetterData {
    pub target: Property,
    pub fields: Vec<TypedSelectOption>,
    pub selected: TypedSelectOption,
    pub value: Property,
}

/// Assign a field chosen from a dropdown: `target.selected = value`.
pub struct MultiFieldSetterBlock;

impl BlockType for MultiFieldSetterBlock {
    fn capability(&self) -> Capability {
        Capability::Statement
    }

    fn color(&self) -> &'static str {
        "bg-indigo-500"
    }

    fn render(&self, data: &JsonValue) -> Vec<BlockPiece> {
        let Some(data) = decode::<MultiFieldSetterData>(data) else {
            return malformed();
        };
        let options = data
            .fields
            .iter()
            .map(|field| SelectOption::new(field.label.clone(), field.value.clone()))
            .collect();
        let fields = data.fields;
        let held = data.value.value.clone();
        let selection =
            Selection::new(data.selected.value, options).with_change(move |value, block| {
                let Some(field) = fields.iter().find(|field| field.value == value) else {
                    return block.clone();
                };
                // retype the value slot for the newly chosen field, keeping
                // whatever block it already holds
                let mut slot = Property::new(field.label.clone(), field.ty.clone());
                slot.value = held.clone();
                block.with_data(json!({ "selected": field, "value": slot }))
            });
        vec![
            "Set".into(),
            selection.into(),
            "of".into(),
            data.target.into(),
            "to".into(),
            data.value.into(),
        ]
    }

    fn compile(&self, ctx: &mut Compiler, data: &JsonValue) -> Result<(), CompileError> {
        let mut data: MultiFieldSetterData = payload(data)?;
        ctx.write_property(&mut data.target, true)?;
        ctx.write(&format!(".{} = ", data.selected.value));
        ctx.write_property(&mut data.value, true)?;
        Ok(())
    }
}
