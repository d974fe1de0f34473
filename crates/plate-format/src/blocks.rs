use plate_core::{BlockKind, ElementNode};

use crate::engine::DocumentEngine;
use crate::format::MutationRequest;

/// Block type a toggled-off block falls back to.
pub const DEFAULT_BLOCK: BlockKind = BlockKind::Paragraph;

/// Where a block's type is read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BlockKey {
    /// The element kind.
    #[default]
    Type,
    /// A string attribute holding the block type name.
    Attr(String),
}

impl BlockKey {
    fn matches(&self, el: &ElementNode, block: BlockKind) -> bool {
        match self {
            BlockKey::Type => el.kind == block,
            BlockKey::Attr(name) => {
                el.attrs.get(name).and_then(serde_json::Value::as_str) == Some(block.name())
            }
        }
    }
}

/// Whether any element in the selection is a `block`. The selection is
/// unhung first, so a block only touched at its very start does not count.
pub fn is_block_active<E: DocumentEngine + ?Sized>(
    engine: &E,
    block: BlockKind,
    key: &BlockKey,
) -> bool {
    let Some(selection) = engine.selection() else {
        return false;
    };
    let at = engine.unhang_range(selection);
    engine
        .nodes(&at)
        .filter_map(|entry| entry.node.as_element())
        .any(|el| key.matches(el, block))
}

pub fn plan_toggle_block<E: DocumentEngine + ?Sized>(
    engine: &E,
    block: BlockKind,
) -> Option<MutationRequest> {
    engine.selection()?;
    let target = if is_block_active(engine, block, &BlockKey::Type) {
        DEFAULT_BLOCK
    } else {
        block
    };
    Some(MutationRequest::SetBlockKind(target))
}

/// Turns the text blocks in the selection into `block`, or back into
/// [`DEFAULT_BLOCK`] when one of them already is one. Toggling off always
/// lands on the default, whatever the blocks were before. Only text blocks
/// change, so a `block` that wraps other blocks (a quote around paragraphs)
/// stays active and cannot be toggled off from inside.
pub fn toggle_block<E: DocumentEngine + ?Sized>(
    engine: &mut E,
    block: BlockKind,
) -> Result<bool, E::Error> {
    let Some(request) = plan_toggle_block(&*engine, block) else {
        return Ok(false);
    };
    request.submit(engine)?;
    Ok(true)
}
