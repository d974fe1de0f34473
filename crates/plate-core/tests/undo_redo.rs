use plate_core::{
    ApplyError, Document, Editor, EditorConfig, Mark, Node, Op, OpKind, Point, Selection,
    Transaction,
};

fn editor_with_text(text: &str) -> Editor {
    let doc = Document::new(vec![Node::paragraph(text)]);
    let selection = Selection::collapsed(Point::new(vec![0, 0], 0));
    Editor::new(doc, Some(selection))
}

fn focus_offset(editor: &Editor) -> usize {
    editor.selection().map_or(0, |sel| sel.focus.offset)
}

#[test]
fn undo_redo_handles_multi_op_insert_order() {
    let mut editor = editor_with_text("");

    let tx = Transaction::new(vec![
        Op::InsertText {
            path: vec![0, 0],
            offset: 0,
            text: "a".to_string(),
        },
        Op::InsertText {
            path: vec![0, 0],
            offset: 1,
            text: "b".to_string(),
        },
    ])
    .selection_after(Selection::collapsed(Point::new(vec![0, 0], 2)))
    .source("test:multi_insert");

    editor.apply(tx).unwrap();
    assert_eq!(editor.doc().children, vec![Node::paragraph("ab")]);
    assert_eq!(focus_offset(&editor), 2);

    assert!(editor.undo());
    assert_eq!(editor.doc().children, vec![Node::paragraph("")]);
    assert_eq!(focus_offset(&editor), 0);

    assert!(editor.redo());
    assert_eq!(editor.doc().children, vec![Node::paragraph("ab")]);
    assert_eq!(focus_offset(&editor), 2);
}

#[test]
fn undo_redo_handles_multi_op_paste_newline_shape() {
    let mut editor = editor_with_text("XYZ");
    let selection_before = editor.selection().cloned();

    let tx = Transaction::new(vec![
        Op::RemoveText {
            path: vec![0, 0],
            range: 0..3,
        },
        Op::InsertText {
            path: vec![0, 0],
            offset: 0,
            text: "a".to_string(),
        },
        Op::InsertNode {
            path: vec![1],
            node: Node::paragraph("bXYZ"),
        },
    ])
    .selection_after(Selection::collapsed(Point::new(vec![1, 0], 1)))
    .source("test:paste_newline");

    editor.apply(tx).unwrap();
    let doc_after = editor.doc().clone();
    let selection_after = editor.selection().cloned();

    assert_eq!(doc_after.children.len(), 2);
    assert_eq!(
        selection_after,
        Some(Selection::collapsed(Point::new(vec![1, 0], 1)))
    );

    assert!(editor.undo());
    assert_eq!(editor.doc().children, vec![Node::paragraph("XYZ")]);
    assert_eq!(editor.selection().cloned(), selection_before);

    assert!(editor.redo());
    assert_eq!(editor.doc(), &doc_after);
    assert_eq!(editor.selection().cloned(), selection_after);
}

#[test]
fn undo_restores_runs_split_by_a_mark() {
    let mut editor = editor_with_text("abcdef");
    editor.select(Selection::new(
        Point::new(vec![0, 0], 2),
        Point::new(vec![0, 0], 4),
    ));
    let before = editor.doc().clone();

    editor.add_mark(Mark::Code).unwrap();
    let marked = editor.doc().clone();
    assert_ne!(marked, before);

    assert!(editor.undo());
    assert_eq!(editor.doc(), &before);
    assert!(editor.redo());
    assert_eq!(editor.doc(), &marked);
}

#[test]
fn new_edit_clears_redo() {
    let mut editor = editor_with_text("a");
    editor.insert_text("b").unwrap();
    assert!(editor.undo());
    assert!(editor.can_redo());

    editor.insert_text("c").unwrap();

    assert!(!editor.can_redo());
    assert!(!editor.redo());
}

#[test]
fn undo_history_is_bounded() {
    let config = EditorConfig {
        max_undo: 2,
        ..EditorConfig::default()
    };
    let doc = Document::new(vec![Node::paragraph("")]);
    let mut editor = Editor::with_config(
        doc,
        Some(Selection::collapsed(Point::new(vec![0, 0], 0))),
        config,
    );
    assert_eq!(editor.config().max_normalize_iterations, 100);

    for text in ["a", "b", "c"] {
        editor.insert_text(text).unwrap();
    }

    assert!(editor.undo());
    assert!(editor.undo());
    assert!(!editor.undo());
    assert_eq!(editor.doc().children, vec![Node::paragraph("a")]);
}

#[test]
fn failed_transaction_leaves_the_editor_untouched() {
    let mut editor = editor_with_text("keep");
    let before = editor.doc().clone();

    let err = editor
        .apply(Transaction::new(vec![
            Op::InsertText {
                path: vec![0, 0],
                offset: 0,
                text: "x".to_string(),
            },
            Op::InsertText {
                path: vec![4, 0],
                offset: 0,
                text: "y".to_string(),
            },
        ]))
        .unwrap_err();

    assert!(matches!(err, ApplyError::InvalidPath(_)));
    assert_eq!(editor.doc(), &before);
    assert!(!editor.can_undo());
    assert!(editor.take_changes().is_empty());
}

#[test]
fn merge_of_runs_with_different_marks_is_rejected() {
    let mut editor = editor_with_text("ab");
    editor.select(Selection::new(
        Point::new(vec![0, 0], 1),
        Point::new(vec![0, 0], 2),
    ));
    editor.add_mark(Mark::Bold).unwrap();

    let err = editor
        .apply(Transaction::new(vec![Op::MergeNode { path: vec![0, 1] }]))
        .unwrap_err();

    assert!(matches!(err, ApplyError::InvalidPath(_)));
}

#[test]
fn every_commit_queues_a_change() {
    let mut editor = editor_with_text("abc");
    editor.select(Selection::collapsed(Point::new(vec![0, 0], 3)));
    editor.insert_text("d").unwrap();
    assert!(editor.undo());

    let changes = editor.take_changes();
    assert_eq!(changes.len(), 3);
    assert!(changes[0].is_selection_only());
    assert_eq!(changes[1].ops, vec![OpKind::InsertText]);
    assert_eq!(changes[1].source.as_deref(), Some("editor:insert_text"));
    assert_eq!(changes[2].ops, vec![OpKind::RemoveText]);
    assert_eq!(changes[2].source.as_deref(), Some("history:undo"));
    assert!(editor.take_changes().is_empty());
}
