//! Block, slot, and group data shapes plus the capability interface
//!
//! A [`Block`] is a kind tag plus an opaque payload owned by that kind's
//! [`BlockType`] implementation. Blocks are immutable by convention: every
//! mutation goes through [`Block::with_data`], which overlays changed fields
//! onto the old payload and produces a new block, keeping trees safely
//! shareable.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

use crate::compiler::{CompileError, Compiler};
use crate::core::registry::{registry, BlockKind};
use crate::core::types::{can_assign, ExpressionType};
use crate::core::{is_false, SelectOption};

/// A tagged unit of program structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Discriminant resolved through the registry
    #[serde(rename = "type")]
    pub kind: BlockKind,
    /// Kind-specific payload
    #[serde(default, skip_serializing_if = "JsonValue::is_null")]
    pub data: JsonValue,
}

impl Block {
    /// Build a block from a kind and its typed payload.
    pub fn new<T: Serialize>(kind: BlockKind, data: T) -> Self {
        // payload structs are plain data trees; serialization cannot fail
        let data = serde_json::to_value(data).unwrap_or(JsonValue::Null);
        Self { kind, data }
    }

    /// A block with no payload.
    pub fn bare(kind: BlockKind) -> Self {
        Self {
            kind,
            data: JsonValue::Null,
        }
    }

    /// Overlay `patch` onto the payload, producing a new block. Top-level
    /// keys in the patch replace the old values; a `null` clears the key
    /// (mirroring the editor's remove-field updates); everything else is
    /// kept.
    pub fn with_data<T: Serialize>(&self, patch: T) -> Block {
        let patch = serde_json::to_value(patch).unwrap_or(JsonValue::Null);
        let mut data = self.data.clone();
        if !data.is_object() {
            data = JsonValue::Object(serde_json::Map::new());
        }
        if let (JsonValue::Object(base), JsonValue::Object(patch)) = (&mut data, patch) {
            for (key, value) in patch {
                if value.is_null() {
                    base.remove(&key);
                } else {
                    base.insert(key, value);
                }
            }
        }
        Block {
            kind: self.kind,
            data,
        }
    }
}

/// An ordered statement sequence: a program body, branch body, or event body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockGroup {
    pub blocks: Vec<Block>,
    /// Canvas position of a root group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_pos: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_pos: Option<f64>,
}

impl BlockGroup {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            x_pos: None,
            y_pos: None,
        }
    }

    /// A group holding a single block.
    pub fn single(block: Block) -> Self {
        Self::new(vec![block])
    }
}

/// Result of running a slot's attach reaction: the rebuilt owning block and,
/// on detachment, the removed block with any presentation rewrites undone.
#[derive(Debug, Clone)]
pub struct AttachUpdate {
    pub owner: Block,
    pub detached: Option<Block>,
}

/// Validates a candidate block for a slot; returns a human-readable
/// rejection reason, or `None` to accept.
pub type AttachGuard = Arc<dyn Fn(&Property, &Block) -> Option<String> + Send + Sync>;

/// Invoked after a slot's held block changes. Receives the slot's new state,
/// the owning block, and the removed block on detachment.
pub type AttachReaction =
    Arc<dyn Fn(&Property, &Block, Option<&Block>) -> AttachUpdate + Send + Sync>;

/// A named, typed slot that may hold a nested block.
///
/// The two callbacks are display-time state: `render` re-establishes them on
/// every call and they are never persisted.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub label: String,
    #[serde(rename = "type")]
    pub ty: ExpressionType,
    /// The held block, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Box<Block>>,
    /// Set when a required slot was empty at compile time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// An optional slot may be left empty without error
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(skip)]
    pub can_attach: Option<AttachGuard>,
    #[serde(skip)]
    pub on_attach_change: Option<AttachReaction>,
}

impl Property {
    /// A required, empty slot.
    pub fn new(label: impl Into<String>, ty: ExpressionType) -> Self {
        Self {
            label: label.into(),
            ty,
            value: None,
            error: None,
            optional: false,
            can_attach: None,
            on_attach_change: None,
        }
    }

    /// An optional, empty slot.
    pub fn optional(label: impl Into<String>, ty: ExpressionType) -> Self {
        Self {
            optional: true,
            ..Self::new(label, ty)
        }
    }

    /// The slot with `block` placed in it.
    pub fn holding(mut self, block: Block) -> Self {
        self.value = Some(Box::new(block));
        self
    }

    /// Decide whether `candidate` may be placed in this slot. A slot-specific
    /// guard takes precedence; otherwise the candidate must be an expression
    /// whose result type is assignable to the slot's declared type.
    pub fn accepts(&self, candidate: &Block) -> Result<(), String> {
        if let Some(guard) = &self.can_attach {
            return match guard(self, candidate) {
                Some(reason) => Err(reason),
                None => Ok(()),
            };
        }
        let Some(result) = registry().get(candidate.kind).result_type(&candidate.data) else {
            return Err(format!(
                "A {} block does not produce a value",
                candidate.kind
            ));
        };
        if can_assign(&result, &self.ty) {
            Ok(())
        } else {
            Err(format!(
                "{} cannot be used as {}",
                result.name(),
                self.ty.name()
            ))
        }
    }

    /// Run the slot's attach reaction for a newly placed block, returning the
    /// rebuilt owner.
    pub fn attached(&self, owner: &Block, value: Block) -> Block {
        let mut slot = self.clone();
        slot.value = Some(Box::new(value));
        match &self.on_attach_change {
            Some(react) => react(&slot, owner, None).owner,
            None => owner.clone(),
        }
    }

    /// Run the slot's detach reaction for a removed block, returning the
    /// rebuilt owner and the (possibly rewritten) detached block.
    pub fn detached(&self, owner: &Block, removed: &Block) -> AttachUpdate {
        let mut slot = self.clone();
        slot.value = None;
        match &self.on_attach_change {
            Some(react) => react(&slot, owner, Some(removed)),
            None => AttachUpdate {
                owner: owner.clone(),
                detached: Some(removed.clone()),
            },
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("label", &self.label)
            .field("ty", &self.ty)
            .field("value", &self.value)
            .field("error", &self.error)
            .field("optional", &self.optional)
            .field("can_attach", &self.can_attach.is_some())
            .field("on_attach_change", &self.on_attach_change.is_some())
            .finish()
    }
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
            && self.ty == other.ty
            && self.value == other.value
            && self.error == other.error
            && self.optional == other.optional
    }
}

/// Callback run when a selection piece changes value.
pub type SelectionChange = Arc<dyn Fn(&str, &Block) -> Block + Send + Sync>;

/// A dropdown rendered inside a block.
#[derive(Clone)]
pub struct Selection {
    pub placeholder: Option<String>,
    /// Currently selected value
    pub value: Option<String>,
    pub options: Vec<SelectOption>,
    pub on_change: Option<SelectionChange>,
}

impl Selection {
    pub fn new(value: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self {
            placeholder: None,
            value: Some(value.into()),
            options,
            on_change: None,
        }
    }

    pub fn with_change(
        mut self,
        on_change: impl Fn(&str, &Block) -> Block + Send + Sync + 'static,
    ) -> Self {
        self.on_change = Some(Arc::new(on_change));
        self
    }

    /// Apply the selection's change callback to `block`.
    pub fn change(&self, value: &str, block: &Block) -> Block {
        match &self.on_change {
            Some(on_change) => on_change(value, block),
            None => block.clone(),
        }
    }
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("placeholder", &self.placeholder)
            .field("value", &self.value)
            .field("options", &self.options)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

/// One display piece of a rendered block.
#[derive(Debug, Clone)]
pub enum BlockPiece {
    /// Fixed text
    Label(String),
    /// A typed slot
    Slot(Property),
    /// A dropdown
    Selection(Selection),
    /// A nested statement body
    Body(BlockGroup),
}

impl From<&str> for BlockPiece {
    fn from(text: &str) -> Self {
        BlockPiece::Label(text.to_string())
    }
}

impl From<String> for BlockPiece {
    fn from(text: String) -> Self {
        BlockPiece::Label(text)
    }
}

impl From<Property> for BlockPiece {
    fn from(prop: Property) -> Self {
        BlockPiece::Slot(prop)
    }
}

impl From<Selection> for BlockPiece {
    fn from(selection: Selection) -> Self {
        BlockPiece::Selection(selection)
    }
}

impl From<BlockGroup> for BlockPiece {
    fn from(group: BlockGroup) -> Self {
        BlockPiece::Body(group)
    }
}

/// A context-menu transformation: a label plus a pure old-block → new-block
/// function.
#[derive(Clone)]
pub struct BlockAction {
    pub label: String,
    run: Arc<dyn Fn(&Block) -> Block + Send + Sync>,
}

impl BlockAction {
    pub fn new(
        label: impl Into<String>,
        run: impl Fn(&Block) -> Block + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            run: Arc::new(run),
        }
    }

    /// Apply the transformation.
    pub fn run(&self, block: &Block) -> Block {
        (self.run)(block)
    }
}

impl fmt::Debug for BlockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockAction")
            .field("label", &self.label)
            .finish()
    }
}

/// The closed category a block kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Body-only, no result
    Statement,
    /// Has a result type and no side effects
    Expression,
    /// Has a result type and may have side effects, so it is also usable as
    /// a statement
    Computation,
    /// A program root owning a deferred body
    Event,
}

impl Capability {
    /// Whether blocks of this capability produce a value.
    pub fn is_expression(self) -> bool {
        matches!(self, Capability::Expression | Capability::Computation)
    }

    /// Whether another block may be stacked directly below this one.
    pub fn connects_below(self) -> bool {
        matches!(
            self,
            Capability::Statement | Capability::Computation | Capability::Event
        )
    }

    /// Whether another block may be stacked directly above this one. An
    /// event is always first in its group, never stacked on.
    pub fn connects_above(self) -> bool {
        matches!(self, Capability::Statement | Capability::Computation)
    }
}

/// Capability interface implemented once per block kind.
pub trait BlockType: Send + Sync {
    /// The category this kind belongs to.
    fn capability(&self) -> Capability;

    /// Display color for the editor palette.
    fn color(&self) -> &'static str;

    /// Produce the display pieces for a block holding `data`.
    fn render(&self, data: &JsonValue) -> Vec<BlockPiece>;

    /// Emit code for a block holding `data` into the compilation context.
    fn compile(&self, ctx: &mut Compiler, data: &JsonValue) -> Result<(), CompileError>;

    /// Context-menu transformations available on a block holding `data`.
    fn actions(&self, _data: &JsonValue) -> Vec<BlockAction> {
        Vec::new()
    }

    /// Result type, for expression kinds only.
    fn result_type(&self, _data: &JsonValue) -> Option<ExpressionType> {
        None
    }
}
