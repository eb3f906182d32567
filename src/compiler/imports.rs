//! Import declarations accumulated during a compilation run

use std::collections::BTreeMap;

use super::CompileError;

/// Imports requested for one module origin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportEntry {
    /// `import <alias> from '<origin>'` binding; at most one per origin
    pub alias: Option<String>,
    /// `import { <name>, ... } from '<origin>'` bindings, deduplicated
    pub named: Vec<String>,
}

/// Import table keyed by module origin. Requests for the same origin merge
/// additively; two different default aliases for one origin are a fatal
/// conflict. A `BTreeMap` keeps the emitted declaration order stable across
/// runs.
#[derive(Debug, Clone, Default)]
pub struct ImportTable {
    entries: BTreeMap<String, ImportEntry>,
}

impl ImportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request `import <alias> from '<origin>'`.
    pub fn add_alias(&mut self, origin: &str, alias: &str) -> Result<(), CompileError> {
        let entry = self.entries.entry(origin.to_string()).or_default();
        match &entry.alias {
            Some(existing) if existing != alias => Err(CompileError::ImportConflict {
                origin: origin.to_string(),
                existing: existing.clone(),
                requested: alias.to_string(),
            }),
            _ => {
                entry.alias = Some(alias.to_string());
                Ok(())
            }
        }
    }

    /// Request `import { <name> } from '<origin>'`; repeated requests merge.
    pub fn add_named(&mut self, origin: &str, name: &str) {
        let entry = self.entries.entry(origin.to_string()).or_default();
        if !entry.named.iter().any(|existing| existing == name) {
            entry.named.push(name.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render one declaration line per origin: the optional default alias,
    /// the optional named-import list, and the origin.
    pub fn render(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(origin, entry)| {
                let mut line = String::from("import ");
                if let Some(alias) = &entry.alias {
                    line.push_str(alias);
                    if !entry.named.is_empty() {
                        line.push_str(", ");
                    }
                }
                if !entry.named.is_empty() {
                    line.push_str("{ ");
                    line.push_str(&entry.named.join(", "));
                    line.push_str(" }");
                }
                line.push_str(&format!(" from '{origin}';"));
                line
            })
            .collect()
    }
}
