//! The code-generation engine
//!
//! A [`Compiler`] is the per-run emission context: line buffer, import table,
//! indentation width, expected-type stack, the captured event body, the async
//! flags, the persistent ready list, and the diagnostics collected along the
//! way. Each compilation run owns its own context; nothing is shared across
//! runs.

mod imports;
mod json;

pub use self::imports::{ImportEntry, ImportTable};
pub use self::json::{ObjectKey, ObjectTemplate};

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::core::block::{Block, BlockGroup, Capability, Property};
use crate::core::registry::{registry, BlockKind, BlockRegistry};
use crate::core::types::ExpressionType;

/// Spaces added per indentation level
pub const INDENT_STEP: usize = 2;

/// Token emitted in place of a missing slot value
pub const PLACEHOLDER: &str = "undefined";

/// Fatal compilation errors. Everything else (missing values, unresolved
/// kinds, undecodable payloads) is non-fatal and surfaces as a
/// [`Diagnostic`].
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Two different default-import aliases were requested for one module
    #[error("conflicting default imports for `{origin}`: `{existing}` vs `{requested}`")]
    ImportConflict {
        origin: String,
        existing: String,
        requested: String,
    },

    /// A block payload did not decode into its kind's typed form
    #[error("malformed block payload: {0}")]
    MalformedPayload(String),
}

/// Non-fatal findings recorded during a run, surfaced to the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A block's kind could not be resolved; the block was skipped
    UnresolvedKind { kind: BlockKind },
    /// A resolved kind could not decode its payload; the block was skipped
    MalformedPayload { kind: BlockKind, detail: String },
    /// A required slot had no value; a placeholder was emitted
    MissingValue { label: String },
}

/// Result of a full compilation run.
#[derive(Debug, Clone)]
pub struct Compilation {
    /// The assembled source document
    pub code: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Decode a block payload into its kind's typed form.
pub fn payload<T: DeserializeOwned>(data: &JsonValue) -> Result<T, CompileError> {
    serde_json::from_value(data.clone()).map_err(|err| CompileError::MalformedPayload(err.to_string()))
}

/// Per-run emission context.
#[derive(Debug, Default)]
pub struct Compiler {
    /// Output buffer; the last element is the line currently being appended to
    lines: Vec<String>,
    imports: ImportTable,
    /// Lines already wrapped by an event block, in flush order
    ready: Vec<String>,
    indentation: usize,
    /// Declared types of the slots currently being compiled, innermost last
    expected: Vec<ExpressionType>,
    /// Statements captured for the event block that owns them
    event_body: Vec<String>,
    /// The current event body required asynchronous execution
    is_async: bool,
    /// Some body flushed by the program-ready event required async
    ready_async: bool,
    diagnostics: Vec<Diagnostic>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the current line.
    pub fn write(&mut self, text: &str) {
        if let Some(line) = self.lines.last_mut() {
            line.push_str(text);
        } else {
            self.lines.push(text.to_string());
        }
    }

    /// Append `text`, terminate the current line, and start a new one
    /// pre-indented to the current width.
    pub fn write_line(&mut self, text: &str) {
        self.write(text);
        self.lines.push(" ".repeat(self.indentation));
    }

    /// Splice previously captured lines into the output, keeping their
    /// relative layout.
    pub fn write_all(&mut self, lines: &[String]) {
        for (index, line) in lines.iter().enumerate() {
            if index > 0 {
                self.write_line("");
            }
            self.write(line);
        }
    }

    /// Splice the captured event body into the output. The body is consumed;
    /// an event block writes it exactly once.
    pub fn write_event_body(&mut self) {
        let body = std::mem::take(&mut self.event_body);
        self.write_all(&body);
    }

    /// Run `action` one indentation step deeper, writing the new leading
    /// whitespace once. The previous width is restored on every return path,
    /// so indentation never leaks out of a failed emission.
    pub fn indent<F>(&mut self, action: F) -> Result<(), CompileError>
    where
        F: FnOnce(&mut Compiler) -> Result<(), CompileError>,
    {
        let previous = self.indentation;
        self.indentation += INDENT_STEP;
        self.write(&" ".repeat(self.indentation));
        let result = action(self);
        self.indentation = previous;
        result
    }

    /// Declared type of the slot currently being compiled, if any.
    pub fn expected_type(&self) -> Option<&ExpressionType> {
        self.expected.last()
    }

    /// Mark the current event body as requiring asynchronous execution.
    pub fn require_async(&mut self) {
        self.is_async = true;
    }

    /// Whether the current event body required asynchronous execution.
    /// Reading the flag resets it for the next body.
    pub fn take_async(&mut self) -> bool {
        std::mem::take(&mut self.is_async)
    }

    /// Make the final program-entry wrapper use its asynchronous form.
    pub fn mark_ready_async(&mut self) {
        self.ready_async = true;
    }

    /// Request `import <alias> from '<origin>'`.
    pub fn import_alias(&mut self, origin: &str, alias: &str) -> Result<(), CompileError> {
        self.imports.add_alias(origin, alias)
    }

    /// Request `import { <name> } from '<origin>'`.
    pub fn import_named(&mut self, origin: &str, name: &str) {
        self.imports.add_named(origin, name);
    }

    /// Record a non-fatal finding.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Findings recorded so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Lines of the current buffer, for callers inspecting intermediate
    /// output.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines already flushed to the ready list.
    pub fn ready(&self) -> &[String] {
        &self.ready
    }

    /// Compile a slot. An empty required slot is marked with an error and
    /// emitted as a placeholder; a held value compiles against the slot's
    /// declared type, wrapped in the `$w(...)` element accessor when that
    /// type is `element`.
    pub fn write_property(
        &mut self,
        prop: &mut Property,
        required: bool,
    ) -> Result<(), CompileError> {
        let Some(value) = prop.value.clone() else {
            if required {
                prop.error = Some("This property is required".to_string());
                self.report(Diagnostic::MissingValue {
                    label: prop.label.clone(),
                });
            }
            self.write(PLACEHOLDER);
            return Ok(());
        };
        self.expected.push(prop.ty.clone());
        let wrap = prop.ty == ExpressionType::Element;
        if wrap {
            self.write("$w(");
        }
        let result = self.write_block(&value);
        if wrap {
            self.write(")");
        }
        self.expected.pop();
        result
    }

    /// Compile one block, resolving its kind through the registry. An
    /// unresolved kind or an undecodable payload skips the block and records
    /// a diagnostic instead of failing the run.
    pub fn write_block(&mut self, block: &Block) -> Result<(), CompileError> {
        let Some(registry) = BlockRegistry::peek() else {
            self.report(Diagnostic::UnresolvedKind { kind: block.kind });
            return Ok(());
        };
        match registry.get(block.kind).compile(self, &block.data) {
            Err(CompileError::MalformedPayload(detail)) => {
                self.report(Diagnostic::MalformedPayload {
                    kind: block.kind,
                    detail,
                });
                Ok(())
            }
            other => other,
        }
    }

    /// Compile a statement sequence. A group rooted at an event block
    /// compiles its tail into a fresh buffer captured as the event body,
    /// then compiles the event block itself, which wraps the body and
    /// flushes the result to the ready list. Any other group emits an inline
    /// delimited body, one statement per line one step deeper.
    pub fn write_group(&mut self, group: &BlockGroup) -> Result<(), CompileError> {
        let event_root = group.blocks.first().filter(|block| {
            BlockRegistry::peek()
                .map(|registry| registry.get(block.kind).capability() == Capability::Event)
                .unwrap_or(false)
        });
        if let Some(event) = event_root {
            self.lines = Vec::new();
            for (index, block) in group.blocks[1..].iter().enumerate() {
                if index > 0 {
                    self.write_line("");
                }
                self.write_block(block)?;
            }
            self.event_body = std::mem::take(&mut self.lines);
            let result = self.write_block(event);
            self.event_body.clear();
            result
        } else {
            self.write("{");
            if !group.blocks.is_empty() {
                self.indent(|ctx| {
                    for block in &group.blocks {
                        ctx.write_line("");
                        ctx.write_block(block)?;
                    }
                    Ok(())
                })?;
                self.write_line("");
            }
            self.write("}");
            Ok(())
        }
    }

    /// Move the current buffer into the persistent ready list. This is the
    /// only way statements enter the final program-entry wrapper.
    pub fn flush_to_ready(&mut self) {
        self.ready.append(&mut self.lines);
    }

    /// Assemble the final document: deduplicated import declarations, then
    /// one program-entry wrapper containing every flushed line in flush
    /// order. The wrapper uses its asynchronous form exactly when a body
    /// flushed by the program-ready event required it.
    pub fn create_output(&self) -> String {
        let mut output = String::new();
        for import in self.imports.render() {
            output.push_str(&import);
            output.push('\n');
        }
        output.push_str("$w.onReady(");
        if self.ready_async {
            output.push_str("async ");
        }
        output.push_str("() => {");
        for line in &self.ready {
            output.push_str("\n  ");
            output.push_str(line);
        }
        output.push_str("\n});");
        output
    }

    /// Finish the run, producing the document and the collected diagnostics.
    pub fn finish(self) -> Compilation {
        Compilation {
            code: self.create_output(),
            diagnostics: self.diagnostics,
        }
    }
}

/// Compile every root group on a canvas and assemble the final document.
pub fn compile_groups(groups: &[BlockGroup]) -> Result<Compilation, CompileError> {
    // warm the registry so in-run peeks resolve
    registry();
    let mut compiler = Compiler::new();
    for group in groups {
        compiler.write_group(group)?;
    }
    Ok(compiler.finish())
}
