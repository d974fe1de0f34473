use std::fmt;

use plate_core::{BlockKind, BlockUpdate, ElementNode, Mark};
use serde::{Deserialize, Serialize};

use crate::blocks::{BlockKey, is_block_active, plan_toggle_block};
use crate::engine::DocumentEngine;
use crate::marks::{is_mark_active, plan_toggle_mark};

/// What a toolbar button or key binding formats.
///
/// Serializes as `{"kind": "mark", "name": "bold"}` or
/// `{"kind": "block", "type": "block-quote"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Format {
    Mark {
        name: Mark,
    },
    Block {
        #[serde(rename = "type")]
        block: BlockKind,
    },
}

impl Format {
    pub fn mark(name: Mark) -> Self {
        Format::Mark { name }
    }

    pub fn block(block: BlockKind) -> Self {
        Format::Block { block }
    }

    pub fn is_active<E: DocumentEngine + ?Sized>(&self, engine: &E) -> bool {
        match *self {
            Format::Mark { name } => is_mark_active(engine, name),
            Format::Block { block } => is_block_active(engine, block, &BlockKey::Type),
        }
    }

    pub fn plan<E: DocumentEngine + ?Sized>(&self, engine: &E) -> Option<MutationRequest> {
        match *self {
            Format::Mark { name } => plan_toggle_mark(engine, name),
            Format::Block { block } => plan_toggle_block(engine, block),
        }
    }

    /// Toggles this format at the engine's selection. Returns whether a
    /// mutation was requested.
    pub fn toggle<E: DocumentEngine + ?Sized>(&self, engine: &mut E) -> Result<bool, E::Error> {
        let Some(request) = self.plan(&*engine) else {
            log::trace!("{self}: no selection, nothing to toggle");
            return Ok(false);
        };
        request.submit(engine)?;
        Ok(true)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Mark { name } => write!(f, "mark:{name}"),
            Format::Block { block } => write!(f, "block:{block}"),
        }
    }
}

/// The single engine call a toggle resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationRequest {
    AddMark(Mark),
    RemoveMark(Mark),
    /// Sets the kind of every text block intersecting the selection.
    SetBlockKind(BlockKind),
}

impl MutationRequest {
    pub fn submit<E: DocumentEngine + ?Sized>(self, engine: &mut E) -> Result<(), E::Error> {
        log::debug!("submitting {self:?}");
        match self {
            MutationRequest::AddMark(mark) => engine.add_mark(mark),
            MutationRequest::RemoveMark(mark) => engine.remove_mark(mark),
            MutationRequest::SetBlockKind(kind) => {
                engine.set_nodes(&BlockUpdate::kind(kind), &ElementNode::is_text_block)
            }
        }
    }
}
