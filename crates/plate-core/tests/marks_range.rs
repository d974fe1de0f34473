use plate_core::{
    BlockKind, Document, Editor, ElementNode, Mark, Marks, Node, Point, Selection,
};

fn runs(doc: &Document, block: usize) -> Vec<(String, Marks)> {
    let Some(Node::Element(el)) = doc.children.get(block) else {
        panic!("expected block {block}");
    };
    el.children
        .iter()
        .filter_map(Node::as_text)
        .map(|t| (t.text.clone(), t.marks))
        .collect()
}

fn marks(list: &[Mark]) -> Marks {
    list.iter()
        .fold(Marks::default(), |marks, mark| marks.with(*mark, true))
}

#[test]
fn add_mark_splits_runs_and_keeps_the_selection_on_the_marked_text() {
    let doc = Document::new(vec![Node::paragraph("abcde")]);
    let selection = Selection::new(Point::new(vec![0, 0], 1), Point::new(vec![0, 0], 3));
    let mut editor = Editor::new(doc, Some(selection));

    editor.add_mark(Mark::Bold).unwrap();

    assert_eq!(
        runs(editor.doc(), 0),
        vec![
            ("a".to_string(), Marks::default()),
            ("bc".to_string(), marks(&[Mark::Bold])),
            ("de".to_string(), Marks::default()),
        ]
    );
    assert_eq!(
        editor.selection(),
        Some(&Selection::new(
            Point::new(vec![0, 1], 0),
            Point::new(vec![0, 1], 2)
        ))
    );
    assert_eq!(editor.marks(), Some(marks(&[Mark::Bold])));
}

#[test]
fn backward_selection_marks_the_same_text() {
    let doc = Document::new(vec![Node::paragraph("abcde")]);
    let selection = Selection::new(Point::new(vec![0, 0], 3), Point::new(vec![0, 0], 1));
    let mut editor = Editor::new(doc, Some(selection));

    editor.add_mark(Mark::Italic).unwrap();

    assert_eq!(runs(editor.doc(), 0)[1], ("bc".to_string(), marks(&[Mark::Italic])));
    let selection = editor.selection().unwrap();
    assert!(selection.is_backward());
    assert_eq!(selection.anchor, Point::new(vec![0, 1], 2));
    assert_eq!(selection.focus, Point::new(vec![0, 1], 0));
}

#[test]
fn marks_span_blocks() {
    let doc = Document::new(vec![Node::paragraph("first"), Node::paragraph("second")]);
    let selection = Selection::new(Point::new(vec![0, 0], 3), Point::new(vec![1, 0], 3));
    let mut editor = Editor::new(doc, Some(selection));

    editor.add_mark(Mark::Strikethrough).unwrap();

    let strike = marks(&[Mark::Strikethrough]);
    assert_eq!(
        runs(editor.doc(), 0),
        vec![
            ("fir".to_string(), Marks::default()),
            ("st".to_string(), strike),
        ]
    );
    assert_eq!(
        runs(editor.doc(), 1),
        vec![
            ("sec".to_string(), strike),
            ("ond".to_string(), Marks::default()),
        ]
    );
    assert_eq!(editor.marks(), Some(strike));
}

#[test]
fn remove_mark_merges_runs_back() {
    let doc = Document::new(vec![Node::Element(ElementNode::new(
        BlockKind::Paragraph,
        vec![
            Node::text("a"),
            Node::marked_text("bc", marks(&[Mark::Bold, Mark::Code])),
            Node::text("de"),
        ],
    ))]);
    let selection = Selection::new(Point::new(vec![0, 1], 0), Point::new(vec![0, 1], 2));
    let mut editor = Editor::new(doc, Some(selection));

    editor.remove_mark(Mark::Bold).unwrap();
    assert_eq!(
        runs(editor.doc(), 0)[1],
        ("bc".to_string(), marks(&[Mark::Code]))
    );

    editor.remove_mark(Mark::Code).unwrap();
    assert_eq!(
        runs(editor.doc(), 0),
        vec![("abcde".to_string(), Marks::default())]
    );
    assert_eq!(
        editor.selection(),
        Some(&Selection::new(
            Point::new(vec![0, 0], 1),
            Point::new(vec![0, 0], 3)
        ))
    );
}

#[test]
fn uniform_marks_are_the_intersection_of_covered_runs() {
    let doc = Document::new(vec![Node::Element(ElementNode::new(
        BlockKind::Paragraph,
        vec![
            Node::marked_text("ab", marks(&[Mark::Bold, Mark::Italic])),
            Node::marked_text("cd", marks(&[Mark::Bold])),
        ],
    ))]);
    let selection = Selection::new(Point::new(vec![0, 0], 1), Point::new(vec![0, 1], 1));
    let editor = Editor::new(doc, Some(selection));

    assert_eq!(editor.marks(), Some(marks(&[Mark::Bold])));
}

#[test]
fn no_selection_has_no_marks() {
    let editor = Editor::new(Document::new(vec![Node::paragraph("x")]), None);
    assert_eq!(editor.marks(), None);
}

#[test]
fn pending_marks_fill_an_empty_paragraph() {
    let mut editor = Editor::empty();

    editor.add_mark(Mark::Rainbow).unwrap();
    editor.add_mark(Mark::Underline).unwrap();
    assert_eq!(editor.pending_marks(), Some(marks(&[Mark::Rainbow, Mark::Underline])));

    editor.insert_text("hi").unwrap();

    assert_eq!(
        runs(editor.doc(), 0),
        vec![("hi".to_string(), marks(&[Mark::Rainbow, Mark::Underline]))]
    );
    assert_eq!(
        editor.selection(),
        Some(&Selection::collapsed(Point::new(vec![0, 0], 2)))
    );
}

#[test]
fn pending_removal_starts_a_plain_run_at_the_end() {
    let doc = Document::new(vec![Node::Element(ElementNode::new(
        BlockKind::Paragraph,
        vec![Node::marked_text("bold", marks(&[Mark::Bold]))],
    ))]);
    let mut editor = Editor::new(doc, Some(Selection::collapsed(Point::new(vec![0, 0], 4))));

    editor.remove_mark(Mark::Bold).unwrap();
    editor.insert_text("!").unwrap();

    assert_eq!(
        runs(editor.doc(), 0),
        vec![
            ("bold".to_string(), marks(&[Mark::Bold])),
            ("!".to_string(), Marks::default()),
        ]
    );
    assert_eq!(editor.marks(), Some(Marks::default()));
}

#[test]
fn plain_typing_extends_the_current_run() {
    let mut editor = Editor::new(
        Document::new(vec![Node::paragraph("helo")]),
        Some(Selection::collapsed(Point::new(vec![0, 0], 3))),
    );

    editor.insert_text("l").unwrap();

    assert_eq!(runs(editor.doc(), 0), vec![("hello".to_string(), Marks::default())]);
    assert_eq!(
        editor.selection(),
        Some(&Selection::collapsed(Point::new(vec![0, 0], 4)))
    );
}

#[test]
fn caret_at_run_start_types_into_the_previous_run() {
    let doc = Document::new(vec![Node::Element(ElementNode::new(
        BlockKind::Paragraph,
        vec![
            Node::marked_text("ab", marks(&[Mark::Italic])),
            Node::text("cd"),
        ],
    ))]);
    let mut editor = Editor::new(doc, Some(Selection::collapsed(Point::new(vec![0, 1], 0))));
    let reported = editor.marks();

    editor.insert_text("x").unwrap();

    assert_eq!(
        runs(editor.doc(), 0),
        vec![
            ("abx".to_string(), marks(&[Mark::Italic])),
            ("cd".to_string(), Marks::default()),
        ]
    );
    assert_eq!(reported, Some(marks(&[Mark::Italic])));
    assert_eq!(
        editor.selection(),
        Some(&Selection::collapsed(Point::new(vec![0, 0], 3)))
    );
}
