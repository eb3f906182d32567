//! Tests for the persistence boundary

use serde_json::json;

use crate::categories::prop;
use crate::core::block::{Block, BlockGroup};
use crate::core::registry::BlockKind;
use crate::core::types::ExpressionType;
use crate::project::{MemoryProjectStore, ProjectId, ProjectStore, StoredProject};

fn sample_canvas() -> Vec<BlockGroup> {
    let if_block = Block::new(
        BlockKind::IfBlock,
        json!({
            "cond": prop("Condition", ExpressionType::Boolean),
            "then": { "blocks": [] },
        }),
    );
    let mut group = BlockGroup::new(vec![Block::bare(BlockKind::OnReady), if_block]);
    group.x_pos = Some(120.0);
    group.y_pos = Some(48.0);
    vec![group]
}

#[tokio::test]
async fn create_load_round_trip() {
    let store = MemoryProjectStore::new();
    let created = store.create("My Page").await.unwrap();
    assert_eq!(created.name, "My Page");
    assert!(created.groups.is_empty());

    let loaded = store.load(created.id).await.unwrap().unwrap();
    assert_eq!(loaded.id, created.id);
    assert_eq!(store.count(), 1);
}

#[tokio::test]
async fn missing_projects_load_as_none() {
    let store = MemoryProjectStore::new();
    assert!(store.load(ProjectId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn rename_and_update_replace_fields() {
    let store = MemoryProjectStore::new();
    let created = store.create("Draft").await.unwrap();

    store.rename(created.id, "Landing Page").await.unwrap();
    store.update(created.id, sample_canvas()).await.unwrap();

    let loaded = store.load(created.id).await.unwrap().unwrap();
    assert_eq!(loaded.name, "Landing Page");
    assert_eq!(loaded.groups.len(), 1);
    assert_eq!(loaded.groups[0].blocks[0].kind, BlockKind::OnReady);
}

#[tokio::test]
async fn rename_of_unknown_project_fails() {
    let store = MemoryProjectStore::new();
    let err = store.rename(ProjectId::new(), "x").await.unwrap_err();
    assert!(err.to_string().contains("project not found"));
}

/// The stored shape is plain serde: a project round-trips with its canvas
/// coordinates and nested block payloads intact.
#[test]
fn stored_projects_round_trip_through_serde() {
    let project = StoredProject {
        id: ProjectId::new(),
        name: "My Page".to_string(),
        groups: sample_canvas(),
    };
    let json = serde_json::to_string(&project).unwrap();
    let restored: StoredProject = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.id, project.id);
    assert_eq!(restored.groups, project.groups);
    assert_eq!(restored.groups[0].x_pos, Some(120.0));
}
