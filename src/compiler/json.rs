//! Emission of structured host-API arguments
//!
//! Domain blocks that call host APIs taking structured options build an
//! [`ObjectTemplate`] from their payload and hand it to
//! [`Compiler::write_object`]. Leaves are slot properties; branches are
//! nested objects. An entry with no populated property anywhere beneath it
//! is omitted entirely rather than emitted as a null member.

use crate::core::block::Property;

use super::{CompileError, Compiler};

/// Key of an object entry: a fixed member name or a computed key expression.
#[derive(Debug, Clone)]
pub enum ObjectKey {
    Name(String),
    Computed(Property),
}

impl ObjectKey {
    pub fn name(name: impl Into<String>) -> Self {
        ObjectKey::Name(name.into())
    }
}

/// Template for a host-API argument object.
#[derive(Debug, Clone)]
pub enum ObjectTemplate {
    /// A slot whose held value becomes the member value
    Value(Property),
    /// A nested object, in declaration order
    Object(Vec<(ObjectKey, ObjectTemplate)>),
}

impl ObjectTemplate {
    /// Whether a populated property exists anywhere beneath this node.
    pub fn has_value(&self) -> bool {
        match self {
            ObjectTemplate::Value(prop) => prop.value.is_some(),
            ObjectTemplate::Object(entries) => {
                entries.iter().any(|(_, template)| template.has_value())
            }
        }
    }
}

impl Compiler {
    /// Emit `template` as an object literal, omitting entries that hold no
    /// populated property.
    pub fn write_object(&mut self, template: &mut ObjectTemplate) -> Result<(), CompileError> {
        match template {
            ObjectTemplate::Value(prop) => {
                let required = !prop.optional;
                self.write_property(prop, required)
            }
            ObjectTemplate::Object(entries) => {
                self.write("{");
                let mut first = true;
                for (key, value) in entries.iter_mut() {
                    if !value.has_value() {
                        continue;
                    }
                    if !first {
                        self.write(", ");
                    }
                    match key {
                        ObjectKey::Name(name) => self.write(name),
                        ObjectKey::Computed(prop) => {
                            self.write("[");
                            self.write_property(prop, true)?;
                            self.write("]");
                        }
                    }
                    self.write(": ");
                    self.write_object(value)?;
                    first = false;
                }
                self.write("}");
                Ok(())
            }
        }
    }
}
