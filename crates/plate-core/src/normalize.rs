use crate::core::{Document, Node, Point, Selection, TextNode};
use crate::ops::Op;

pub(crate) trait NormalizePass: Send + Sync {
    fn id(&self) -> &'static str;
    fn run(&self, doc: &Document) -> Vec<Op>;
}

/// Ordered normalization passes. Each round applies the ops of the first pass
/// that still has work to do, so every pass sees a settled document.
pub(crate) struct Normalizer {
    passes: Vec<Box<dyn NormalizePass>>,
}

impl Normalizer {
    pub(crate) fn core() -> Self {
        Self {
            passes: vec![
                Box::new(EnsureNonEmptyDocument),
                Box::new(EnsureTextBlockHasLeaf),
                Box::new(MergeAdjacentTextLeaves),
            ],
        }
    }

    pub(crate) fn normalize(&self, doc: &Document) -> Vec<Op> {
        for pass in &self.passes {
            let ops = pass.run(doc);
            if !ops.is_empty() {
                log::trace!("normalize pass {} produced {} op(s)", pass.id(), ops.len());
                return ops;
            }
        }
        Vec::new()
    }
}

struct EnsureNonEmptyDocument;

impl NormalizePass for EnsureNonEmptyDocument {
    fn id(&self) -> &'static str {
        "core.ensure_non_empty_document"
    }

    fn run(&self, doc: &Document) -> Vec<Op> {
        if doc.children.is_empty() {
            return vec![Op::InsertNode {
                path: vec![0],
                node: Node::paragraph(""),
            }];
        }
        Vec::new()
    }
}

struct EnsureTextBlockHasLeaf;

impl NormalizePass for EnsureTextBlockHasLeaf {
    fn id(&self) -> &'static str {
        "core.ensure_text_block_has_leaf"
    }

    fn run(&self, doc: &Document) -> Vec<Op> {
        fn walk(children: &[Node], path: &mut Vec<usize>, ops: &mut Vec<Op>) {
            for (ix, node) in children.iter().enumerate() {
                let Node::Element(el) = node else {
                    continue;
                };

                path.push(ix);
                if el.children.is_empty() {
                    let mut insert_path = path.clone();
                    insert_path.push(0);
                    ops.push(Op::InsertNode {
                        path: insert_path,
                        node: Node::text(""),
                    });
                } else {
                    walk(&el.children, path, ops);
                }
                path.pop();
            }
        }

        let mut ops = Vec::new();
        walk(&doc.children, &mut Vec::new(), &mut ops);
        ops
    }
}

/// Merges neighbouring runs with equal marks and drops empty runs that sit
/// next to other text.
struct MergeAdjacentTextLeaves;

impl NormalizePass for MergeAdjacentTextLeaves {
    fn id(&self) -> &'static str {
        "core.merge_adjacent_text_leaves"
    }

    fn run(&self, doc: &Document) -> Vec<Op> {
        fn merge_block(texts: &[&TextNode], path: &[usize], ops: &mut Vec<Op>) {
            let Some(last) = texts.last() else {
                return;
            };

            // The run right of the cursor always sits at index `ix` when the
            // loop body starts, whatever happened to its neighbours.
            let mut right_marks = last.marks;
            let mut right_len = last.text.len();
            for ix in (1..texts.len()).rev() {
                let left = texts[ix - 1];
                let mut child_path = path.to_vec();
                child_path.push(ix);

                if left.marks == right_marks {
                    ops.push(Op::MergeNode { path: child_path });
                    right_len += left.text.len();
                } else if right_len == 0 {
                    ops.push(Op::RemoveNode { path: child_path });
                    right_marks = left.marks;
                    right_len = left.text.len();
                } else if left.text.is_empty() {
                    child_path[path.len()] = ix - 1;
                    ops.push(Op::RemoveNode { path: child_path });
                } else {
                    right_marks = left.marks;
                    right_len = left.text.len();
                }
            }
        }

        fn walk(children: &[Node], path: &mut Vec<usize>, ops: &mut Vec<Op>) {
            for (ix, node) in children.iter().enumerate() {
                let Node::Element(el) = node else {
                    continue;
                };

                path.push(ix);
                if el.is_text_block() {
                    let texts: Vec<&TextNode> =
                        el.children.iter().filter_map(Node::as_text).collect();
                    merge_block(&texts, path, ops);
                } else {
                    walk(&el.children, path, ops);
                }
                path.pop();
            }
        }

        let mut ops = Vec::new();
        walk(&doc.children, &mut Vec::new(), &mut ops);
        ops
    }
}

/// Snaps both points of `selection` onto existing text runs.
pub(crate) fn normalize_selection(doc: &Document, selection: &Selection) -> Selection {
    let fallback = first_text_point(doc).unwrap_or(Point {
        path: vec![0],
        offset: 0,
    });

    let anchor = normalize_point_to_existing_text(doc, &selection.anchor).unwrap_or_else(|| {
        normalize_point_to_existing_text(doc, &selection.focus).unwrap_or_else(|| fallback.clone())
    });
    let focus =
        normalize_point_to_existing_text(doc, &selection.focus).unwrap_or_else(|| anchor.clone());

    Selection { anchor, focus }
}

fn first_text_descendant(children: &[Node], path: &mut Vec<usize>) -> Option<Point> {
    for (ix, node) in children.iter().enumerate() {
        path.push(ix);
        match node {
            Node::Text(_) => {
                let point = Point {
                    path: path.clone(),
                    offset: 0,
                };
                path.pop();
                return Some(point);
            }
            Node::Element(el) => {
                if let Some(point) = first_text_descendant(&el.children, path) {
                    path.pop();
                    return Some(point);
                }
            }
        }
        path.pop();
    }
    None
}

fn first_text_point(doc: &Document) -> Option<Point> {
    first_text_descendant(&doc.children, &mut Vec::new())
}

fn normalize_point_to_existing_text(doc: &Document, point: &Point) -> Option<Point> {
    if point.path.is_empty() || doc.children.is_empty() {
        return None;
    }

    let mut resolved_path: Vec<usize> = Vec::new();
    let mut children: &[Node] = &doc.children;

    for &wanted in &point.path {
        if children.is_empty() {
            break;
        }
        let ix = wanted.min(children.len() - 1);
        resolved_path.push(ix);
        match &children[ix] {
            Node::Text(t) => {
                return Some(Point {
                    path: resolved_path,
                    offset: crate::core::clamp_to_char_boundary(&t.text, point.offset),
                });
            }
            Node::Element(el) => {
                children = &el.children;
            }
        }
    }

    match doc.node(&resolved_path)? {
        Node::Text(t) => Some(Point {
            path: resolved_path,
            offset: crate::core::clamp_to_char_boundary(&t.text, point.offset),
        }),
        Node::Element(el) => first_text_descendant(&el.children, &mut resolved_path),
    }
}
