use std::iter::FusedIterator;

use crate::core::{
    ApplyError, AttrPatch, BlockKind, Document, Editor, ElementNode, Node, Point, Selection,
    TextNode,
};
use crate::ops::{Op, Path, Transaction};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeEntry<'a> {
    pub node: &'a Node,
    pub path: Path,
}

/// Pre-order walk over the nodes that intersect a range, ancestors first.
///
/// Subtrees that end before the range are skipped without being visited and
/// the walk stops at the first node past the range. Cloning the iterator
/// restarts from the cloned position.
#[derive(Debug, Clone)]
pub struct Nodes<'a> {
    stack: Vec<(&'a Node, Path)>,
    from: Path,
    to: Path,
}

impl<'a> Nodes<'a> {
    pub fn new(doc: &'a Document, at: &Selection) -> Self {
        let (start, end) = at.edges();
        let stack = doc
            .children
            .iter()
            .enumerate()
            .rev()
            .map(|(ix, node)| (node, vec![ix]))
            .collect();
        Self {
            stack,
            from: start.path.clone(),
            to: end.path.clone(),
        }
    }
}

impl<'a> Iterator for Nodes<'a> {
    type Item = NodeEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, path)) = self.stack.pop() {
            if path > self.to && !path.starts_with(&self.to) {
                self.stack.clear();
                return None;
            }
            if path < self.from && !self.from.starts_with(&path) {
                continue;
            }
            if let Node::Element(el) = node {
                for (ix, child) in el.children.iter().enumerate().rev() {
                    let mut child_path = path.clone();
                    child_path.push(ix);
                    self.stack.push((child, child_path));
                }
            }
            return Some(NodeEntry { node, path });
        }
        None
    }
}

impl FusedIterator for Nodes<'_> {}

/// Partial update applied by [`Editor::set_nodes`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockUpdate {
    pub kind: Option<BlockKind>,
    pub attrs: AttrPatch,
}

impl BlockUpdate {
    pub fn kind(kind: BlockKind) -> Self {
        Self {
            kind: Some(kind),
            attrs: AttrPatch::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.attrs.is_empty()
    }
}

/// All text runs in document order.
pub(crate) fn text_leaves(doc: &Document) -> Vec<(Path, &TextNode)> {
    fn walk<'a>(children: &'a [Node], path: &mut Vec<usize>, out: &mut Vec<(Path, &'a TextNode)>) {
        for (ix, node) in children.iter().enumerate() {
            path.push(ix);
            match node {
                Node::Text(t) => out.push((path.clone(), t)),
                Node::Element(el) => walk(&el.children, path, out),
            }
            path.pop();
        }
    }

    let mut out = Vec::new();
    walk(&doc.children, &mut Vec::new(), &mut out);
    out
}

impl Editor {
    pub fn nodes(&self, at: &Selection) -> Nodes<'_> {
        Nodes::new(self.doc(), at)
    }

    /// Pulls the end of a range that sits exactly at the start of a block back
    /// to the end of the preceding text, so that block no longer counts as
    /// selected.
    pub fn unhang_range(&self, range: &Selection) -> Selection {
        let (start, end) = range.edges();
        if range.is_collapsed() || end.offset != 0 {
            return range.clone();
        }
        if end.path.last().is_some_and(|&ix| ix > 0) {
            return range.clone();
        }

        let leaves = text_leaves(self.doc());
        let Some(end_ix) = leaves.iter().position(|(path, _)| *path == end.path) else {
            return range.clone();
        };
        let Some((prev_path, prev)) = end_ix.checked_sub(1).map(|ix| &leaves[ix]) else {
            return range.clone();
        };

        let focus = Point::new(prev_path.clone(), prev.text.len());
        if focus < *start {
            return range.clone();
        }
        Selection::new(start.clone(), focus)
    }

    /// Updates every element inside the (unhung) selection that satisfies
    /// `matcher`, as a single transaction.
    pub fn set_nodes(
        &mut self,
        update: &BlockUpdate,
        matcher: impl Fn(&ElementNode) -> bool,
    ) -> Result<(), ApplyError> {
        let Some(selection) = self.selection().cloned() else {
            return Ok(());
        };
        if update.is_empty() {
            return Ok(());
        }

        let at = self.unhang_range(&selection);
        let mut ops: Vec<Op> = Vec::new();
        for entry in self.nodes(&at) {
            let Node::Element(el) = entry.node else {
                continue;
            };
            if !matcher(el) {
                continue;
            }
            if let Some(kind) = update.kind.filter(|kind| *kind != el.kind) {
                ops.push(Op::SetNodeKind {
                    path: entry.path.clone(),
                    kind,
                });
            }
            if !update.attrs.is_empty() {
                ops.push(Op::SetNodeAttrs {
                    path: entry.path,
                    patch: update.attrs.clone(),
                });
            }
        }

        if ops.is_empty() {
            return Ok(());
        }
        self.apply(Transaction::new(ops).source("editor:set_nodes"))
    }
}
