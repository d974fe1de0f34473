use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize::{Normalizer, normalize_selection};
use crate::ops::{Change, Op, OpKind, Path, Transaction};

pub type Attrs = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn node(&self, path: &[usize]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.children.get(*first)?;
        for &ix in rest {
            node = match node {
                Node::Element(el) => el.children.get(ix)?,
                Node::Text(_) => return None,
            };
        }
        Some(node)
    }

    pub fn element(&self, path: &[usize]) -> Option<&ElementNode> {
        self.node(path).and_then(Node::as_element)
    }

    pub fn text(&self, path: &[usize]) -> Option<&TextNode> {
        self.node(path).and_then(Node::as_text)
    }
}

/// Block type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Paragraph,
    BlockQuote,
    Code,
}

impl BlockKind {
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::BlockQuote => "block-quote",
            BlockKind::Code => "code",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Boolean character-level formatting attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
    Rainbow,
}

impl Mark {
    pub const ALL: [Mark; 6] = [
        Mark::Bold,
        Mark::Italic,
        Mark::Underline,
        Mark::Strikethrough,
        Mark::Code,
        Mark::Rainbow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Underline => "underline",
            Mark::Strikethrough => "strikethrough",
            Mark::Code => "code",
            Mark::Rainbow => "rainbow",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Marks carried by a text run. Unset marks are omitted when serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Marks {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub rainbow: bool,
}

impl Marks {
    pub fn get(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Strikethrough => self.strikethrough,
            Mark::Code => self.code,
            Mark::Rainbow => self.rainbow,
        }
    }

    pub fn set(&mut self, mark: Mark, value: bool) {
        let slot = match mark {
            Mark::Bold => &mut self.bold,
            Mark::Italic => &mut self.italic,
            Mark::Underline => &mut self.underline,
            Mark::Strikethrough => &mut self.strikethrough,
            Mark::Code => &mut self.code,
            Mark::Rainbow => &mut self.rainbow,
        };
        *slot = value;
    }

    pub fn with(mut self, mark: Mark, value: bool) -> Self {
        self.set(mark, value);
        self
    }

    /// Marks set on both sides.
    pub fn intersect(self, other: Marks) -> Marks {
        Mark::ALL.into_iter().fold(Marks::default(), |acc, mark| {
            acc.with(mark, self.get(mark) && other.get(mark))
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Marks::default()
    }

    pub fn active(self) -> impl Iterator<Item = Mark> {
        Mark::ALL.into_iter().filter(move |mark| self.get(*mark))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Element(ElementNode),
    Text(TextNode),
}

impl Node {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::block(BlockKind::Paragraph, text)
    }

    pub fn block(kind: BlockKind, text: impl Into<String>) -> Self {
        Node::Element(ElementNode::new(kind, vec![Node::text(text)]))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::marked_text(text, Marks::default())
    }

    pub fn marked_text(text: impl Into<String>, marks: Marks) -> Self {
        Node::Text(TextNode {
            text: text.into(),
            marks,
        })
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    pub kind: BlockKind,
    #[serde(default)]
    pub attrs: Attrs,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl ElementNode {
    pub fn new(kind: BlockKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            attrs: Attrs::default(),
            children,
        }
    }

    /// A block holding text runs rather than nested blocks (the lowest block level).
    pub fn is_text_block(&self) -> bool {
        !self
            .children
            .iter()
            .any(|child| matches!(child, Node::Element(_)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
    #[serde(default)]
    pub marks: Marks,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn is_expanded(&self) -> bool {
        !self.is_collapsed()
    }

    pub fn is_backward(&self) -> bool {
        self.focus < self.anchor
    }

    /// `(start, end)` in document order.
    pub fn edges(&self) -> (&Point, &Point) {
        if self.is_backward() {
            (&self.focus, &self.anchor)
        } else {
            (&self.anchor, &self.focus)
        }
    }

    pub fn start(&self) -> &Point {
        self.edges().0
    }

    pub fn end(&self) -> &Point {
        self.edges().1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttrPatch {
    #[serde(default)]
    pub set: Attrs,
    #[serde(default)]
    pub remove: Vec<String>,
}

impl AttrPatch {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.remove.is_empty()
    }
}

fn patch_apply(attrs: &mut Attrs, patch: &AttrPatch) -> AttrPatch {
    let mut old_set: Attrs = Attrs::new();
    let mut old_remove: Vec<String> = Vec::new();

    for (k, v) in &patch.set {
        if let Some(prev) = attrs.insert(k.clone(), v.clone()) {
            old_set.insert(k.clone(), prev);
        } else {
            old_remove.push(k.clone());
        }
    }

    for key in &patch.remove {
        if let Some(prev) = attrs.remove(key) {
            old_set.insert(key.clone(), prev);
        }
    }

    AttrPatch {
        set: old_set,
        remove: old_remove,
    }
}

#[derive(Debug, Clone)]
pub struct UndoRecord {
    pub inverse_ops: Vec<Op>,
    pub selection_before: Option<Selection>,
    pub selection_after: Option<Selection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub max_undo: usize,
    pub max_normalize_iterations: usize,
}

impl EditorConfig {
    pub fn with_defaults(mut self) -> Self {
        if self.max_undo == 0 {
            self.max_undo = 200;
        }
        if self.max_normalize_iterations == 0 {
            self.max_normalize_iterations = 100;
        }
        self
    }
}

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),
    #[error("normalization did not converge after {0} iterations")]
    NormalizeDidNotConverge(usize),
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct PathError(pub String);

struct Applied {
    doc: Document,
    selection: Option<Selection>,
    inverse_ops: Vec<Op>,
    kinds: Vec<OpKind>,
}

/// Reference document engine: owns the document, the selection, pending
/// cursor marks, undo history, and the queue of change notifications.
pub struct Editor {
    doc: Document,
    selection: Option<Selection>,
    pub(crate) pending_marks: Option<Marks>,
    normalizer: Normalizer,
    config: EditorConfig,
    undo_stack: Vec<UndoRecord>,
    redo_stack: Vec<UndoRecord>,
    pub(crate) changes: Vec<Change>,
}

impl Editor {
    pub fn new(doc: Document, selection: Option<Selection>) -> Self {
        Self::with_config(doc, selection, EditorConfig::default())
    }

    pub fn with_config(doc: Document, selection: Option<Selection>, config: EditorConfig) -> Self {
        let mut editor = Self {
            doc,
            selection,
            pending_marks: None,
            normalizer: Normalizer::core(),
            config: config.with_defaults(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            changes: Vec::new(),
        };
        editor.normalize_in_place();
        editor
    }

    /// One empty paragraph with the cursor inside it.
    pub fn empty() -> Self {
        let doc = Document::new(vec![Node::paragraph("")]);
        let selection = Selection::collapsed(Point::new(vec![0, 0], 0));
        Self::new(doc, Some(selection))
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn pending_marks(&self) -> Option<Marks> {
        self.pending_marks
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        let selection = selection.map(|sel| normalize_selection(&self.doc, &sel));
        if selection == self.selection {
            return;
        }
        self.selection = selection;
        self.pending_marks = None;
        self.changes.push(Change::new(vec![OpKind::SetSelection]));
    }

    pub fn select(&mut self, selection: Selection) {
        self.set_selection(Some(selection));
    }

    pub fn deselect(&mut self) {
        self.set_selection(None);
    }

    /// Drains the queued change notifications, oldest first.
    pub fn take_changes(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.changes)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo(&mut self) -> bool {
        let Some(record) = self.undo_stack.pop() else {
            return false;
        };

        match self.run_ops(
            record.inverse_ops.clone(),
            Some(record.selection_before.clone()),
        ) {
            Ok(Applied {
                doc,
                selection,
                inverse_ops,
                kinds,
            }) => {
                self.commit(doc, selection, kinds, Some("history:undo".to_string()));
                self.redo_stack.push(UndoRecord {
                    inverse_ops,
                    selection_before: record.selection_before,
                    selection_after: record.selection_after,
                });
                true
            }
            Err(err) => {
                log::warn!("dropping undo entry that no longer applies: {err}");
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        let Some(record) = self.redo_stack.pop() else {
            return false;
        };

        match self.run_ops(
            record.inverse_ops.clone(),
            Some(record.selection_after.clone()),
        ) {
            Ok(Applied {
                doc,
                selection,
                inverse_ops,
                kinds,
            }) => {
                self.commit(doc, selection, kinds, Some("history:redo".to_string()));
                self.undo_stack.push(UndoRecord {
                    inverse_ops,
                    selection_before: record.selection_before,
                    selection_after: record.selection_after,
                });
                true
            }
            Err(err) => {
                log::warn!("dropping redo entry that no longer applies: {err}");
                false
            }
        }
    }

    /// Applies a transaction atomically: on error the document and the
    /// selection are left exactly as they were.
    pub fn apply(&mut self, tx: Transaction) -> Result<(), ApplyError> {
        let Transaction {
            ops,
            selection_after,
            meta,
        } = tx;

        let Applied {
            doc,
            selection,
            inverse_ops,
            kinds,
        } = self.run_ops(ops, selection_after.map(Some))?;

        if kinds.is_empty() {
            self.set_selection(selection);
            return Ok(());
        }

        log::debug!(
            "applied {} op(s) from {}",
            kinds.len(),
            meta.source.as_deref().unwrap_or("unknown source")
        );

        let selection_before = self.selection.clone();
        let selection_after = selection.clone();
        self.commit(doc, selection, kinds, meta.source);

        self.undo_stack.push(UndoRecord {
            inverse_ops,
            selection_before,
            selection_after,
        });
        self.redo_stack.clear();
        if self.undo_stack.len() > self.config.max_undo {
            self.undo_stack.remove(0);
        }

        Ok(())
    }

    fn commit(
        &mut self,
        doc: Document,
        selection: Option<Selection>,
        kinds: Vec<OpKind>,
        source: Option<String>,
    ) {
        self.doc = doc;
        self.selection = selection;
        self.pending_marks = None;
        self.changes.push(Change { ops: kinds, source });
    }

    fn run_ops(
        &self,
        ops: Vec<Op>,
        selection_after: Option<Option<Selection>>,
    ) -> Result<Applied, ApplyError> {
        let mut doc = self.doc.clone();
        let mut selection = self.selection.clone();
        let mut inverse_ops: Vec<Op> = Vec::with_capacity(ops.len());
        let mut kinds: Vec<OpKind> = Vec::with_capacity(ops.len());

        for op in ops {
            kinds.push(op.kind());
            inverse_ops.push(apply_op_to(&mut doc, &mut selection, op)?);
        }

        if let Some(sel) = selection_after {
            selection = sel;
        }

        let max_iterations = self.config.max_normalize_iterations;
        let mut converged = false;
        for _ in 0..max_iterations {
            let ops = self.normalizer.normalize(&doc);
            if ops.is_empty() {
                converged = true;
                break;
            }
            for op in ops {
                kinds.push(op.kind());
                inverse_ops.push(apply_op_to(&mut doc, &mut selection, op)?);
            }
        }
        if !converged {
            return Err(ApplyError::NormalizeDidNotConverge(max_iterations));
        }

        inverse_ops.reverse();
        let selection = selection.map(|sel| normalize_selection(&doc, &sel));

        Ok(Applied {
            doc,
            selection,
            inverse_ops,
            kinds,
        })
    }

    fn normalize_in_place(&mut self) {
        match self.run_ops(Vec::new(), None) {
            Ok(applied) => {
                self.doc = applied.doc;
                self.selection = applied.selection;
            }
            Err(err) => log::warn!("initial document could not be normalized: {err}"),
        }
    }
}

fn apply_op_to(
    doc: &mut Document,
    selection: &mut Option<Selection>,
    op: Op,
) -> Result<Op, ApplyError> {
    match op {
        Op::InsertText { path, offset, text } => {
            let text_node = node_text_mut(doc, &path)?;
            let offset = clamp_to_char_boundary(&text_node.text, offset);
            text_node.text.insert_str(offset, &text);
            transform_selection_insert_text(selection, &path, offset, text.len());
            Ok(Op::RemoveText {
                path,
                range: offset..offset + text.len(),
            })
        }
        Op::RemoveText { path, range } => {
            let text_node = node_text_mut(doc, &path)?;
            let start =
                clamp_to_char_boundary(&text_node.text, range.start.min(text_node.text.len()));
            let end = clamp_to_char_boundary(&text_node.text, range.end.min(text_node.text.len()));
            if start >= end {
                return Ok(Op::InsertText {
                    path,
                    offset: start,
                    text: String::new(),
                });
            }
            let removed = text_node.text[start..end].to_string();
            text_node.text.replace_range(start..end, "");
            transform_selection_remove_text(selection, &path, start..end);
            Ok(Op::InsertText {
                path,
                offset: start,
                text: removed,
            })
        }
        Op::InsertNode { path, node } => {
            insert_node(doc, &path, node)?;
            transform_selection_insert_node(selection, &path);
            Ok(Op::RemoveNode { path })
        }
        Op::RemoveNode { path } => {
            let removed = remove_node(doc, &path)?;
            transform_selection_remove_node(selection, &path, doc);
            Ok(Op::InsertNode {
                path,
                node: removed,
            })
        }
        Op::SplitNode { path, position } => {
            let text_node = node_text_mut(doc, &path)?;
            let position = clamp_to_char_boundary(&text_node.text, position);
            let tail = TextNode {
                text: text_node.text.split_off(position),
                marks: text_node.marks,
            };
            let next = next_path(&path)?;
            insert_node(doc, &next, Node::Text(tail))?;
            transform_selection_split(selection, &path, position);
            Ok(Op::MergeNode { path: next })
        }
        Op::MergeNode { path } => {
            let prev = previous_path(&path)?;
            let mergeable = matches!(
                (doc.node(&prev), doc.node(&path)),
                (Some(Node::Text(left)), Some(Node::Text(right))) if left.marks == right.marks
            );
            if !mergeable {
                return Err(PathError(format!(
                    "Cannot merge {path:?} into {prev:?}: expected sibling runs with equal marks"
                ))
                .into());
            }
            let Node::Text(removed) = remove_node(doc, &path)? else {
                return Err(PathError("Expected Text node".into()).into());
            };
            let left = node_text_mut(doc, &prev)?;
            let position = left.text.len();
            left.text.push_str(&removed.text);
            transform_selection_merge(selection, &path, &prev, position);
            Ok(Op::SplitNode {
                path: prev,
                position,
            })
        }
        Op::SetNodeKind { path, kind } => match node_mut(doc, &path)? {
            Node::Element(el) => {
                let old = std::mem::replace(&mut el.kind, kind);
                Ok(Op::SetNodeKind { path, kind: old })
            }
            Node::Text(_) => Err(PathError("Text has no block kind".into()).into()),
        },
        Op::SetNodeAttrs { path, patch } => match node_mut(doc, &path)? {
            Node::Element(el) => {
                let old = patch_apply(&mut el.attrs, &patch);
                Ok(Op::SetNodeAttrs { path, patch: old })
            }
            Node::Text(_) => Err(PathError("Text has no attrs".into()).into()),
        },
        Op::SetTextMarks { path, marks } => {
            let text_node = node_text_mut(doc, &path)?;
            let old = std::mem::replace(&mut text_node.marks, marks);
            Ok(Op::SetTextMarks { path, marks: old })
        }
    }
}

pub(crate) fn clamp_to_char_boundary(s: &str, mut ix: usize) -> usize {
    ix = ix.min(s.len());
    while ix > 0 && !s.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}

fn next_path(path: &[usize]) -> Result<Path, PathError> {
    let (last, parent) = path
        .split_last()
        .ok_or_else(|| PathError("Empty path".into()))?;
    let mut next = parent.to_vec();
    next.push(last + 1);
    Ok(next)
}

fn previous_path(path: &[usize]) -> Result<Path, PathError> {
    match path.split_last() {
        Some((&last, parent)) if last > 0 => {
            let mut prev = parent.to_vec();
            prev.push(last - 1);
            Ok(prev)
        }
        _ => Err(PathError(format!("{path:?} has no previous sibling"))),
    }
}

fn transform_selection_insert_text(
    selection: &mut Option<Selection>,
    path: &[usize],
    offset: usize,
    len: usize,
) {
    let Some(selection) = selection else {
        return;
    };
    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.path == path && point.offset >= offset {
            point.offset = point.offset.saturating_add(len);
        }
    }
}

fn transform_selection_remove_text(
    selection: &mut Option<Selection>,
    path: &[usize],
    range: std::ops::Range<usize>,
) {
    let Some(selection) = selection else {
        return;
    };
    let removed_len = range.end.saturating_sub(range.start);
    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.path != path {
            continue;
        }
        if point.offset <= range.start {
            continue;
        }
        if point.offset >= range.end {
            point.offset = point.offset.saturating_sub(removed_len);
        } else {
            point.offset = range.start;
        }
    }
}

/// Shifts a point that sits in or below a later sibling of an inserted node.
fn shift_point_after_insert(point: &mut Point, path: &[usize]) {
    let Some((&index, parent_path)) = path.split_last() else {
        return;
    };
    let depth = parent_path.len();
    if point.path.len() <= depth || !point.path.starts_with(parent_path) {
        return;
    }
    if point.path[depth] >= index {
        point.path[depth] += 1;
    }
}

/// Shifts a point that sits in or below a later sibling of a removed node.
/// Returns `true` when the point was inside the removed subtree.
fn shift_point_after_remove(point: &mut Point, path: &[usize]) -> bool {
    let Some((&index, parent_path)) = path.split_last() else {
        return false;
    };
    let depth = parent_path.len();
    if point.path.len() <= depth || !point.path.starts_with(parent_path) {
        return false;
    }
    let ix = point.path[depth];
    if ix > index {
        point.path[depth] = ix - 1;
    }
    ix == index
}

fn transform_selection_insert_node(selection: &mut Option<Selection>, path: &[usize]) {
    let Some(selection) = selection else {
        return;
    };
    for point in [&mut selection.anchor, &mut selection.focus] {
        shift_point_after_insert(point, path);
    }
}

fn transform_selection_remove_node(
    selection: &mut Option<Selection>,
    path: &[usize],
    doc_after_remove: &Document,
) {
    let Some(selection) = selection else {
        return;
    };
    let Some((&index, parent_path)) = path.split_last() else {
        return;
    };

    for point in [&mut selection.anchor, &mut selection.focus] {
        if !shift_point_after_remove(point, path) {
            continue;
        }

        // Point was inside the removed subtree: prefer the end of the previous
        // sibling, then the start of the node that took its place.
        let mut sibling = parent_path.to_vec();
        let replacement = match index.checked_sub(1) {
            Some(prev) => {
                sibling.push(prev);
                edge_point(doc_after_remove, &sibling, Edge::End)
            }
            None => {
                sibling.push(index);
                edge_point(doc_after_remove, &sibling, Edge::Start)
            }
        };
        *point = replacement.unwrap_or_else(|| Point::new(parent_path.to_vec(), 0));
    }
}

fn transform_selection_split(selection: &mut Option<Selection>, path: &[usize], position: usize) {
    let Some(selection) = selection else {
        return;
    };
    let Ok(next) = next_path(path) else {
        return;
    };

    // The start of a range (or a caret) follows the text forward; the end of a
    // range stays with the head of the split run.
    let collapsed = selection.is_collapsed();
    let backward = selection.is_backward();
    let anchor_forward = collapsed || !backward;
    let focus_forward = collapsed || backward;

    for (point, forward) in [
        (&mut selection.anchor, anchor_forward),
        (&mut selection.focus, focus_forward),
    ] {
        if point.path == path {
            if point.offset > position || (point.offset == position && forward) {
                point.path = next.clone();
                point.offset -= position;
            }
        } else {
            shift_point_after_insert(point, &next);
        }
    }
}

fn transform_selection_merge(
    selection: &mut Option<Selection>,
    path: &[usize],
    prev: &[usize],
    position: usize,
) {
    let Some(selection) = selection else {
        return;
    };
    for point in [&mut selection.anchor, &mut selection.focus] {
        if shift_point_after_remove(point, path) {
            point.path = prev.to_vec();
            point.offset += position;
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) enum Edge {
    Start,
    End,
}

/// First or last text position inside the node at `path`.
pub(crate) fn edge_point(doc: &Document, path: &[usize], edge: Edge) -> Option<Point> {
    let mut path = path.to_vec();
    let mut node = doc.node(&path)?;
    loop {
        match node {
            Node::Text(t) => {
                let offset = match edge {
                    Edge::Start => 0,
                    Edge::End => t.text.len(),
                };
                return Some(Point::new(path, offset));
            }
            Node::Element(el) => {
                let ix = match edge {
                    Edge::Start => 0,
                    Edge::End => el.children.len().checked_sub(1)?,
                };
                node = el.children.get(ix)?;
                path.push(ix);
            }
        }
    }
}

fn node_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Result<&'a mut Node, PathError> {
    let (first, rest) = path
        .split_first()
        .ok_or_else(|| PathError("Empty path".into()))?;
    let len = doc.children.len();
    let mut node = doc
        .children
        .get_mut(*first)
        .ok_or_else(|| PathError(format!("Path out of bounds at depth 0: {first} >= {len}")))?;

    for (depth, &ix) in rest.iter().enumerate() {
        node = match node {
            Node::Element(el) => {
                let len = el.children.len();
                el.children.get_mut(ix).ok_or_else(|| {
                    PathError(format!(
                        "Path out of bounds at depth {}: {ix} >= {len}",
                        depth + 1
                    ))
                })?
            }
            Node::Text(_) => {
                return Err(PathError(format!("Non-container node at depth {depth}")));
            }
        };
    }
    Ok(node)
}

fn node_text_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Result<&'a mut TextNode, PathError> {
    match node_mut(doc, path)? {
        Node::Text(t) => Ok(t),
        Node::Element(_) => Err(PathError("Expected Text node".into())),
    }
}

fn children_mut<'a>(
    doc: &'a mut Document,
    parent_path: &[usize],
) -> Result<&'a mut Vec<Node>, PathError> {
    if parent_path.is_empty() {
        return Ok(&mut doc.children);
    }
    match node_mut(doc, parent_path)? {
        Node::Element(el) => Ok(&mut el.children),
        Node::Text(_) => Err(PathError("Parent is not a container".into())),
    }
}

fn insert_node(doc: &mut Document, path: &[usize], node: Node) -> Result<(), PathError> {
    let (&index, parent_path) = path
        .split_last()
        .ok_or_else(|| PathError("Empty insert path".into()))?;
    let children = children_mut(doc, parent_path)?;
    if index > children.len() {
        return Err(PathError(format!(
            "Insert index out of bounds: {index} > {}",
            children.len()
        )));
    }
    children.insert(index, node);
    Ok(())
}

fn remove_node(doc: &mut Document, path: &[usize]) -> Result<Node, PathError> {
    let (&index, parent_path) = path
        .split_last()
        .ok_or_else(|| PathError("Empty remove path".into()))?;
    let children = children_mut(doc, parent_path)?;
    if index >= children.len() {
        return Err(PathError(format!(
            "Remove index out of bounds: {index} >= {}",
            children.len()
        )));
    }
    Ok(children.remove(index))
}
