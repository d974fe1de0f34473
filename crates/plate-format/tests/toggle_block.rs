use plate_core::{BlockKind, Document, Editor, ElementNode, Node, Point, Selection};
use plate_format::{
    BlockKey, DEFAULT_BLOCK, MutationRequest, is_block_active, plan_toggle_block, toggle_block,
};
use serde_json::json;

fn kinds(editor: &Editor) -> Vec<BlockKind> {
    editor
        .doc()
        .children
        .iter()
        .filter_map(Node::as_element)
        .map(|el| el.kind)
        .collect()
}

fn caret(path: Vec<usize>, offset: usize) -> Selection {
    Selection::collapsed(Point::new(path, offset))
}

fn range(anchor: (Vec<usize>, usize), focus: (Vec<usize>, usize)) -> Selection {
    Selection::new(Point::new(anchor.0, anchor.1), Point::new(focus.0, focus.1))
}

fn active(editor: &Editor, block: BlockKind) -> bool {
    is_block_active(editor, block, &BlockKey::Type)
}

#[test]
fn toggle_block_quote_at_the_cursor() {
    let doc = Document::new(vec![Node::paragraph("hello")]);
    let mut editor = Editor::new(doc, Some(caret(vec![0, 0], 0)));
    assert!(!active(&editor, BlockKind::BlockQuote));

    assert!(toggle_block(&mut editor, BlockKind::BlockQuote).unwrap());
    assert_eq!(kinds(&editor), vec![BlockKind::BlockQuote]);
    assert!(active(&editor, BlockKind::BlockQuote));

    assert!(toggle_block(&mut editor, BlockKind::BlockQuote).unwrap());
    assert_eq!(kinds(&editor), vec![DEFAULT_BLOCK]);
    assert!(!active(&editor, BlockKind::BlockQuote));
}

#[test]
fn block_touched_only_at_its_start_is_excluded() {
    let doc = Document::new(vec![
        Node::paragraph("one"),
        Node::block(BlockKind::BlockQuote, "two"),
    ]);
    let mut editor = Editor::new(doc, Some(range((vec![0, 0], 0), (vec![1, 0], 0))));

    assert!(!active(&editor, BlockKind::BlockQuote));

    toggle_block(&mut editor, BlockKind::Code).unwrap();
    assert_eq!(kinds(&editor), vec![BlockKind::Code, BlockKind::BlockQuote]);
}

#[test]
fn block_entered_by_one_character_is_included() {
    let doc = Document::new(vec![
        Node::paragraph("one"),
        Node::block(BlockKind::BlockQuote, "two"),
    ]);
    let editor = Editor::new(doc, Some(range((vec![0, 0], 0), (vec![1, 0], 1))));

    assert!(active(&editor, BlockKind::BlockQuote));
    assert_eq!(
        plan_toggle_block(&editor, BlockKind::BlockQuote),
        Some(MutationRequest::SetBlockKind(DEFAULT_BLOCK))
    );
}

#[test]
fn backward_selection_is_unhung_too() {
    let doc = Document::new(vec![
        Node::paragraph("one"),
        Node::block(BlockKind::Code, "two"),
    ]);
    let editor = Editor::new(doc, Some(range((vec![1, 0], 0), (vec![0, 0], 1))));

    assert!(!active(&editor, BlockKind::Code));
}

#[test]
fn toggle_spans_every_selected_block() {
    let doc = Document::new(vec![
        Node::paragraph("a"),
        Node::paragraph("b"),
        Node::paragraph("c"),
    ]);
    let mut editor = Editor::new(doc, Some(range((vec![0, 0], 0), (vec![2, 0], 1))));

    toggle_block(&mut editor, BlockKind::BlockQuote).unwrap();
    assert_eq!(kinds(&editor), vec![BlockKind::BlockQuote; 3]);

    toggle_block(&mut editor, BlockKind::BlockQuote).unwrap();
    assert_eq!(kinds(&editor), vec![BlockKind::Paragraph; 3]);
}

#[test]
fn toggling_off_flattens_mixed_blocks_to_paragraph() {
    let doc = Document::new(vec![
        Node::block(BlockKind::BlockQuote, "quoted"),
        Node::block(BlockKind::Code, "code"),
    ]);
    let mut editor = Editor::new(doc, Some(range((vec![0, 0], 0), (vec![1, 0], 4))));
    assert!(active(&editor, BlockKind::Code));

    toggle_block(&mut editor, BlockKind::Code).unwrap();

    assert_eq!(kinds(&editor), vec![BlockKind::Paragraph, BlockKind::Paragraph]);
}

#[test]
fn only_text_blocks_change_kind() {
    let quote = ElementNode::new(BlockKind::BlockQuote, vec![Node::paragraph("inner")]);
    let doc = Document::new(vec![Node::Element(quote)]);
    let mut editor = Editor::new(doc, Some(caret(vec![0, 0, 0], 2)));
    assert!(active(&editor, BlockKind::BlockQuote));

    toggle_block(&mut editor, BlockKind::Code).unwrap();

    let outer = editor.doc().element(&[0]).unwrap();
    assert_eq!(outer.kind, BlockKind::BlockQuote);
    assert_eq!(editor.doc().element(&[0, 0]).unwrap().kind, BlockKind::Code);
    assert!(active(&editor, BlockKind::Code));
}

#[test]
fn wrapping_quote_cannot_be_toggled_off_from_inside() {
    let quote = ElementNode::new(BlockKind::BlockQuote, vec![Node::paragraph("inner")]);
    let doc = Document::new(vec![Node::Element(quote)]);
    let mut editor = Editor::new(doc.clone(), Some(caret(vec![0, 0, 0], 2)));
    assert!(active(&editor, BlockKind::BlockQuote));
    assert_eq!(
        plan_toggle_block(&editor, BlockKind::BlockQuote),
        Some(MutationRequest::SetBlockKind(DEFAULT_BLOCK))
    );

    assert!(toggle_block(&mut editor, BlockKind::BlockQuote).unwrap());

    assert_eq!(editor.doc(), &doc);
    assert!(active(&editor, BlockKind::BlockQuote));
    assert!(!editor.can_undo());
}

#[test]
fn attribute_key_reads_the_named_attribute() {
    let mut el = ElementNode::new(BlockKind::Paragraph, vec![Node::text("styled")]);
    el.attrs.insert("type".to_string(), json!("block-quote"));
    let doc = Document::new(vec![Node::Element(el)]);
    let editor = Editor::new(doc, Some(caret(vec![0, 0], 1)));

    let key = BlockKey::Attr("type".to_string());
    assert!(is_block_active(&editor, BlockKind::BlockQuote, &key));
    assert!(!is_block_active(&editor, BlockKind::Code, &key));
    assert!(!active(&editor, BlockKind::BlockQuote));
}

#[test]
fn no_selection_is_inactive_and_a_no_op() {
    let doc = Document::new(vec![Node::block(BlockKind::Code, "x")]);
    let mut editor = Editor::new(doc.clone(), None);

    assert!(!active(&editor, BlockKind::Code));
    assert_eq!(plan_toggle_block(&editor, BlockKind::Code), None);
    assert!(!toggle_block(&mut editor, BlockKind::Code).unwrap());
    assert_eq!(editor.doc(), &doc);
}

#[test]
fn block_toggle_is_one_undo_step() {
    let doc = Document::new(vec![Node::paragraph("a"), Node::paragraph("b")]);
    let mut editor = Editor::new(doc.clone(), Some(range((vec![0, 0], 0), (vec![1, 0], 1))));

    toggle_block(&mut editor, BlockKind::Code).unwrap();
    assert!(editor.undo());

    assert_eq!(editor.doc(), &doc);
    assert!(!editor.can_undo());
}
