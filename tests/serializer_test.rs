//! Tests for the canonical ST writer

use stree::domain::{
    read_events, serialize, serialize_excluding, Document, DomainError, NodeKind, StructuralEvent,
    StructureBuilder, Subtree,
};

fn reread(text: &str) -> Document {
    StructureBuilder::new("Fallback").build(read_events(text).unwrap(), None)
}

fn sample() -> Document {
    StructureBuilder::new("Fallback").build(
        vec![
            StructuralEvent::enter("Doc"),
            StructuralEvent::enter("Sub"),
            StructuralEvent::template("T1", "hello"),
            StructuralEvent::enter("Deeper"),
            StructuralEvent::ExitFolder,
            StructuralEvent::ExitFolder,
            StructuralEvent::template("T2", "say \"hi\"\nbye"),
            StructuralEvent::ExitFolder,
        ],
        None,
    )
}

#[test]
fn given_document_when_serialized_and_reread_then_structurally_equal() {
    // Arrange
    let document = sample();

    // Act
    let text = serialize(&document).unwrap();
    let back = reread(&text);

    // Assert
    assert_eq!(back.display_name(), document.display_name());
    assert_eq!(
        back.model().snapshot(back.model().root()).unwrap(),
        document.model().snapshot(document.model().root()).unwrap()
    );
}

#[test]
fn given_single_template_when_serialized_then_canonical_text() {
    let document = StructureBuilder::new("Fallback").build(
        vec![
            StructuralEvent::enter("Doc"),
            StructuralEvent::template("T1", "hello"),
            StructuralEvent::ExitFolder,
        ],
        None,
    );

    let text = serialize(&document).unwrap();

    assert_eq!(
        text,
        "{1, {\"Doc\", 1, 0, \"\", \"\"}, [\n{0, {\"T1\", 0, 1, \"\", \"hello\"}}\n]}"
    );
}

#[test]
fn given_document_without_folder_event_when_serialized_then_wraps_in_display_name() {
    let document = StructureBuilder::new("Fallback")
        .build(vec![StructuralEvent::template("A", "x")], None);

    let back = reread(&serialize(&document).unwrap());

    assert_eq!(back.display_name(), "Fallback");
    assert_eq!(back.model().child_count(back.model().root()).unwrap(), 1);
}

#[test]
fn given_skip_node_when_serializing_excluding_then_subtree_omitted_and_model_untouched() {
    // Arrange
    let document = sample();
    let sub = document.model().resolve(&[0]).unwrap();
    let before = document.model().node_count();

    // Act
    let text = serialize_excluding(&document, sub).unwrap();

    // Assert
    let back = reread(&text);
    let model = back.model();
    assert_eq!(model.child_count(model.root()).unwrap(), 1);
    let t2 = model.resolve(&[0]).unwrap();
    assert_eq!(model.node(t2).unwrap().name(), "T2");
    assert_eq!(document.model().node_count(), before);
}

#[test]
fn given_file_node_inside_document_when_serializing_then_invalid_kind() {
    let mut document = Document::empty("Doc", None);
    let root = document.model().root();
    document
        .model_mut()
        .append_child(root, Subtree::file("stray"))
        .unwrap();

    let err = serialize(&document).unwrap_err();

    assert_eq!(
        err,
        DomainError::InvalidKind {
            kind: NodeKind::File
        }
    );
}

#[test]
fn given_deeply_nested_folders_when_serializing_then_text_round_trips() {
    // Arrange
    let depth = 100_000;
    let mut text = String::new();
    for i in 0..depth {
        text.push_str(&format!("{{1, {{\"F{i}\", 1, 0, \"\", \"\"}}, [\n"));
    }
    text.push_str("{0, {\"T\", 0, 1, \"\", \"x\"}}");
    for _ in 0..depth {
        text.push_str("\n]}");
    }
    let document = reread(&text);

    // Act
    let written = serialize(&document).unwrap();
    let deepest = document.model().iter().last().map(|(id, _)| id).unwrap();
    let pruned = serialize_excluding(&document, deepest).unwrap();

    // Assert
    assert_eq!(document.display_name(), "F0");
    assert_eq!(document.model().node_count(), depth + 1);
    assert_eq!(written, text);
    assert!(!pruned.contains("\"T\""));
    assert_eq!(reread(&pruned).model().node_count(), depth);
}
