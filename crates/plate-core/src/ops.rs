use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::core::{AttrPatch, BlockKind, Marks, Node, Selection};

pub type Path = Vec<usize>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    InsertText {
        #[serde(default)]
        path: Path,
        offset: usize,
        text: String,
    },
    RemoveText {
        #[serde(default)]
        path: Path,
        range: Range<usize>,
    },
    InsertNode {
        #[serde(default)]
        path: Path,
        node: Node,
    },
    RemoveNode {
        #[serde(default)]
        path: Path,
    },
    /// Splits the text run at `path`; the tail becomes the next sibling.
    SplitNode {
        #[serde(default)]
        path: Path,
        position: usize,
    },
    /// Appends the text run at `path` to its previous sibling. Both runs must
    /// carry the same marks.
    MergeNode {
        #[serde(default)]
        path: Path,
    },
    SetNodeKind {
        #[serde(default)]
        path: Path,
        kind: BlockKind,
    },
    SetNodeAttrs {
        #[serde(default)]
        path: Path,
        patch: AttrPatch,
    },
    SetTextMarks {
        #[serde(default)]
        path: Path,
        marks: Marks,
    },
}

impl Op {
    pub fn kind(&self) -> OpKind {
        match self {
            Op::InsertText { .. } => OpKind::InsertText,
            Op::RemoveText { .. } => OpKind::RemoveText,
            Op::InsertNode { .. } => OpKind::InsertNode,
            Op::RemoveNode { .. } => OpKind::RemoveNode,
            Op::SplitNode { .. } => OpKind::SplitNode,
            Op::MergeNode { .. } => OpKind::MergeNode,
            Op::SetNodeKind { .. } => OpKind::SetNodeKind,
            Op::SetNodeAttrs { .. } => OpKind::SetNodeAttrs,
            Op::SetTextMarks { .. } => OpKind::SetTextMarks,
        }
    }
}

/// Tag carried by change notifications. The last two never touch the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    InsertText,
    RemoveText,
    InsertNode,
    RemoveNode,
    SplitNode,
    MergeNode,
    SetNodeKind,
    SetNodeAttrs,
    SetTextMarks,
    SetSelection,
    SetPendingMarks,
}

impl OpKind {
    pub fn is_content(self) -> bool {
        !matches!(self, OpKind::SetSelection | OpKind::SetPendingMarks)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub ops: Vec<Op>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_after: Option<Selection>,
    #[serde(default)]
    pub meta: TransactionMeta,
}

impl Transaction {
    pub fn new(ops: Vec<Op>) -> Self {
        Self {
            ops,
            selection_after: None,
            meta: TransactionMeta::default(),
        }
    }

    pub fn selection_after(mut self, selection_after: Selection) -> Self {
        self.selection_after = Some(selection_after);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.meta.source = Some(source.into());
        self
    }
}

/// Notification queued by the editor after every applied transaction,
/// selection update, or pending-mark update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Change {
    pub ops: Vec<OpKind>,
    pub source: Option<String>,
}

impl Change {
    pub fn new(ops: Vec<OpKind>) -> Self {
        Self { ops, source: None }
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn is_selection_only(&self) -> bool {
        self.ops.iter().all(|op| !op.is_content())
    }
}
