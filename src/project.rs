//! Persistence boundary for stored block projects
//!
//! Projects store their canvas (a list of root block groups) opaquely by
//! id. The store has no schema awareness beyond the serde shapes of the
//! block tree; identity and access control live with the caller.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::core::block::BlockGroup;

/// Unique project identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    /// Generate a new random project ID
    pub fn new() -> Self {
        ProjectId(Uuid::new_v4())
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored project: its name plus the root block groups on its canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredProject {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub groups: Vec<BlockGroup>,
}

/// Storage collaborator contract.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Create an empty project.
    async fn create(&self, name: &str) -> anyhow::Result<StoredProject>;

    /// Load a project by id.
    async fn load(&self, id: ProjectId) -> anyhow::Result<Option<StoredProject>>;

    /// Rename a project.
    async fn rename(&self, id: ProjectId, name: &str) -> anyhow::Result<()>;

    /// Replace a project's canvas.
    async fn update(&self, id: ProjectId, groups: Vec<BlockGroup>) -> anyhow::Result<()>;
}

/// In-memory store for tests and embedding.
#[derive(Default)]
pub struct MemoryProjectStore {
    projects: RwLock<HashMap<ProjectId, StoredProject>>,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored projects.
    pub fn count(&self) -> usize {
        self.projects.read().len()
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn create(&self, name: &str) -> anyhow::Result<StoredProject> {
        let project = StoredProject {
            id: ProjectId::new(),
            name: name.to_string(),
            groups: Vec::new(),
        };
        self.projects.write().insert(project.id, project.clone());
        Ok(project)
    }

    async fn load(&self, id: ProjectId) -> anyhow::Result<Option<StoredProject>> {
        Ok(self.projects.read().get(&id).cloned())
    }

    async fn rename(&self, id: ProjectId, name: &str) -> anyhow::Result<()> {
        let mut projects = self.projects.write();
        let project = projects
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("project not found: {id}"))?;
        project.name = name.to_string();
        Ok(())
    }

    async fn update(&self, id: ProjectId, groups: Vec<BlockGroup>) -> anyhow::Result<()> {
        let mut projects = self.projects.write();
        let project = projects
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("project not found: {id}"))?;
        project.groups = groups;
        Ok(())
    }
}
