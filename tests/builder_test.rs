//! Tests for StructureBuilder

use std::path::PathBuf;

use stree::domain::{Document, NodeKind, StructuralEvent, StructureBuilder};

fn build(events: Vec<StructuralEvent>) -> Document {
    StructureBuilder::new("Fallback").build(events, None)
}

fn child_names(document: &Document) -> Vec<String> {
    let model = document.model();
    model
        .node(model.root())
        .unwrap()
        .children()
        .iter()
        .map(|&id| model.node(id).unwrap().name().to_string())
        .collect()
}

#[test]
fn given_first_folder_when_building_then_becomes_display_name_not_node() {
    // Arrange
    let events = vec![
        StructuralEvent::enter("Root1"),
        StructuralEvent::template("A", "x"),
        StructuralEvent::ExitFolder,
    ];

    // Act
    let document = build(events);

    // Assert
    let model = document.model();
    assert_eq!(document.display_name(), "Root1");
    assert_eq!(child_names(&document), vec!["A"]);
    let only = model.child_at(model.root(), 0).unwrap();
    assert_eq!(model.kind_of(only).unwrap(), NodeKind::Template);
    assert!(model
        .iter()
        .all(|(_, node)| !(node.kind() == NodeKind::Folder && node.name() == "Root1")));
}

#[test]
fn given_unmatched_exit_when_building_then_template_attaches_to_root() {
    let events = vec![
        StructuralEvent::ExitFolder,
        StructuralEvent::template("A", "x"),
    ];

    let document = build(events);

    assert_eq!(document.display_name(), "Fallback");
    assert_eq!(child_names(&document), vec!["A"]);
}

#[test]
fn given_nested_folders_when_building_then_depth_counts_folders_only() {
    // Arrange
    let events = vec![
        StructuralEvent::enter("Doc"),
        StructuralEvent::enter("Sub"),
        StructuralEvent::template("T1", "hello"),
        StructuralEvent::ExitFolder,
        StructuralEvent::ExitFolder,
    ];

    // Act
    let document = build(events);

    // Assert
    let model = document.model();
    assert_eq!(document.display_name(), "Doc");
    let sub = model.resolve(&[0]).unwrap();
    let t1 = model.resolve(&[0, 0]).unwrap();
    assert_eq!(model.node(sub).unwrap().name(), "Sub");
    assert_eq!(model.kind_of(sub).unwrap(), NodeKind::Folder);
    assert_eq!(model.node(t1).unwrap().content(), Some("hello"));
    assert_eq!(model.depth_of(t1).unwrap(), 1);
    assert_eq!(model.child_count(model.root()).unwrap(), 1);
}

#[test]
fn given_no_folders_when_building_then_uses_fallback_name() {
    let document = build(vec![
        StructuralEvent::template("A", "1"),
        StructuralEvent::template("B", "2"),
    ]);

    assert_eq!(document.display_name(), "Fallback");
    assert_eq!(child_names(&document), vec!["A", "B"]);
}

#[test]
fn given_second_top_level_folder_when_building_then_materialized_under_root() {
    let document = build(vec![
        StructuralEvent::enter("First"),
        StructuralEvent::template("A", ""),
        StructuralEvent::ExitFolder,
        StructuralEvent::enter("Second"),
        StructuralEvent::template("B", ""),
        StructuralEvent::ExitFolder,
    ]);

    assert_eq!(document.display_name(), "First");
    assert_eq!(child_names(&document), vec!["A", "Second"]);
}

#[test]
fn given_empty_stream_when_building_then_empty_clean_document() {
    let path = PathBuf::from("doc.st");

    let document = StructureBuilder::new("Fallback").build(Vec::new(), Some(path.clone()));

    assert_eq!(document.display_name(), "Fallback");
    assert_eq!(document.path(), Some(path.as_path()));
    assert!(!document.is_dirty());
    assert_eq!(document.model().node_count(), 1);
}
