use plate_core::Mark;

use crate::engine::DocumentEngine;
use crate::format::MutationRequest;

/// Whether `mark` applies at the current selection. False without a
/// selection.
pub fn is_mark_active<E: DocumentEngine + ?Sized>(engine: &E, mark: Mark) -> bool {
    engine.marks().is_some_and(|marks| marks.get(mark))
}

pub fn plan_toggle_mark<E: DocumentEngine + ?Sized>(
    engine: &E,
    mark: Mark,
) -> Option<MutationRequest> {
    engine.selection()?;
    Some(if is_mark_active(engine, mark) {
        MutationRequest::RemoveMark(mark)
    } else {
        MutationRequest::AddMark(mark)
    })
}

/// Removes `mark` when active, adds it otherwise. Returns `false` without
/// touching the engine when there is no selection.
pub fn toggle_mark<E: DocumentEngine + ?Sized>(engine: &mut E, mark: Mark) -> Result<bool, E::Error> {
    let Some(request) = plan_toggle_mark(&*engine, mark) else {
        return Ok(false);
    };
    request.submit(engine)?;
    Ok(true)
}
