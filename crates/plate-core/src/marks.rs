use crate::core::{
    ApplyError, Document, Editor, Mark, Marks, Node, PathError, Point, Selection, TextNode,
    clamp_to_char_boundary,
};
use crate::ops::{Change, Op, OpKind, Path, Transaction};
use crate::query::Nodes;

/// Byte range of the run at `path` covered by `[start, end]`.
fn overlap(path: &[usize], len: usize, start: &Point, end: &Point) -> (usize, usize) {
    let from = if path == start.path.as_slice() {
        start.offset.min(len)
    } else {
        0
    };
    let to = if path == end.path.as_slice() {
        end.offset.min(len)
    } else {
        len
    };
    (from, to)
}

impl Editor {
    /// Marks that text inserted at the current selection would carry.
    ///
    /// Pending cursor marks win. An expanded selection yields the marks shared
    /// by every run it covers. A caret yields the marks of its run, or of the
    /// previous run in the same block when it sits at offset 0.
    pub fn marks(&self) -> Option<Marks> {
        let selection = self.selection()?;
        if let Some(marks) = self.pending_marks {
            return Some(marks);
        }

        let doc = self.doc();
        if selection.is_expanded() {
            let (start, end) = selection.edges();
            let mut uniform: Option<Marks> = None;
            for entry in self.nodes(selection) {
                let Node::Text(text) = entry.node else {
                    continue;
                };
                let (from, to) = overlap(&entry.path, text.text.len(), start, end);
                if from >= to {
                    continue;
                }
                uniform = Some(match uniform {
                    Some(marks) => marks.intersect(text.marks),
                    None => text.marks,
                });
            }
            return Some(
                uniform
                    .or_else(|| doc.text(&start.path).map(|t| t.marks))
                    .unwrap_or_default(),
            );
        }

        let at = self.insertion_point(&selection.anchor);
        Some(doc.text(&at.path).map(|leaf| leaf.marks).unwrap_or_default())
    }

    pub fn add_mark(&mut self, mark: Mark) -> Result<(), ApplyError> {
        self.set_mark(mark, true)
    }

    pub fn remove_mark(&mut self, mark: Mark) -> Result<(), ApplyError> {
        self.set_mark(mark, false)
    }

    fn set_mark(&mut self, mark: Mark, value: bool) -> Result<(), ApplyError> {
        let Some(selection) = self.selection().cloned() else {
            return Ok(());
        };
        let verb = if value { "add" } else { "remove" };

        if selection.is_collapsed() {
            let marks = self.marks().unwrap_or_default().with(mark, value);
            self.pending_marks = Some(marks);
            self.changes.push(
                Change::new(vec![OpKind::SetPendingMarks])
                    .source(format!("editor:{verb}_mark:{mark}")),
            );
            return Ok(());
        }

        let ops = mark_range_ops(self.doc(), &selection, |marks| marks.with(mark, value));
        if ops.is_empty() {
            return Ok(());
        }
        self.apply(Transaction::new(ops).source(format!("editor:{verb}_mark:{mark}")))
    }

    /// Where typed text lands for a caret at `point`. At offset 0 the end of
    /// the previous run in the same block wins, matching [`Editor::marks`].
    fn insertion_point(&self, point: &Point) -> Point {
        if point.offset != 0 {
            return point.clone();
        }
        let Some((&ix, block_path)) = point.path.split_last() else {
            return point.clone();
        };
        let Some(prev_ix) = ix.checked_sub(1) else {
            return point.clone();
        };
        let mut prev_path = block_path.to_vec();
        prev_path.push(prev_ix);
        match self.doc().text(&prev_path) {
            Some(prev) => Point::new(prev_path, prev.text.len()),
            None => point.clone(),
        }
    }

    /// Inserts `text` at the start of the selection, carrying pending marks
    /// into a run of their own when they differ from the run at the caret.
    pub fn insert_text(&mut self, text: &str) -> Result<(), ApplyError> {
        let Some(selection) = self.selection().cloned() else {
            return Ok(());
        };
        if text.is_empty() {
            return Ok(());
        }

        let at = self.insertion_point(selection.start());
        let leaf = self
            .doc()
            .text(&at.path)
            .ok_or_else(|| PathError(format!("No text run at {:?}", at.path)))?;
        let offset = clamp_to_char_boundary(&leaf.text, at.offset);

        let pending = self.pending_marks;
        let ops = match pending {
            Some(marks) if marks != leaf.marks && !leaf.text.is_empty() => {
                let (&child_ix, block_path) = at
                    .path
                    .split_last()
                    .ok_or_else(|| PathError("Empty path".into()))?;
                let mut ops = Vec::new();
                let mut insert_ix = child_ix;
                if offset > 0 {
                    if offset < leaf.text.len() {
                        ops.push(Op::SplitNode {
                            path: at.path.clone(),
                            position: offset,
                        });
                    }
                    insert_ix += 1;
                }
                let mut path: Path = block_path.to_vec();
                path.push(insert_ix);
                ops.push(Op::InsertNode {
                    path: path.clone(),
                    node: Node::marked_text(text, marks),
                });
                let caret = Point::new(path, text.len());
                return self.apply(
                    Transaction::new(ops)
                        .selection_after(Selection::collapsed(caret))
                        .source("editor:insert_text"),
                );
            }
            Some(marks) if marks != leaf.marks => vec![
                Op::SetTextMarks {
                    path: at.path.clone(),
                    marks,
                },
                Op::InsertText {
                    path: at.path.clone(),
                    offset: 0,
                    text: text.to_string(),
                },
            ],
            _ => vec![Op::InsertText {
                path: at.path.clone(),
                offset,
                text: text.to_string(),
            }],
        };

        let caret = Point::new(at.path, offset + text.len());
        self.apply(
            Transaction::new(ops)
                .selection_after(Selection::collapsed(caret))
                .source("editor:insert_text"),
        )
    }
}

/// Ops that rewrite the marks of every run covered by `selection`, splitting
/// runs at the range edges. Runs are visited last to first: a split only
/// shifts later siblings, which have already been handled.
fn mark_range_ops(doc: &Document, selection: &Selection, apply: impl Fn(Marks) -> Marks) -> Vec<Op> {
    let (start, end) = selection.edges();
    let covered: Vec<(Path, &TextNode)> = Nodes::new(doc, selection)
        .filter_map(|entry| match entry.node {
            Node::Text(t) => Some((entry.path, t)),
            Node::Element(_) => None,
        })
        .collect();

    let mut ops = Vec::new();
    for (path, text) in covered.into_iter().rev() {
        let len = text.text.len();
        let (from, to) = overlap(&path, len, start, end);
        let from = clamp_to_char_boundary(&text.text, from);
        let to = clamp_to_char_boundary(&text.text, to);
        if from >= to {
            continue;
        }
        let next = apply(text.marks);
        if next == text.marks {
            continue;
        }

        if to < len {
            ops.push(Op::SplitNode {
                path: path.clone(),
                position: to,
            });
        }
        let mut target = path.clone();
        if from > 0 {
            ops.push(Op::SplitNode {
                path: path.clone(),
                position: from,
            });
            if let Some(last) = target.last_mut() {
                *last += 1;
            }
        }
        ops.push(Op::SetTextMarks {
            path: target,
            marks: next,
        });
    }
    ops
}
