use plate_core::{
    ApplyError, BlockUpdate, Change, Editor, ElementNode, Mark, Marks, NodeEntry, Nodes, Selection,
};

/// Document editing engine the formatting commands run against.
///
/// The commands hold no state of their own: every query reads the engine
/// again and every command hands it a single mutation request, which the
/// engine applies atomically before returning.
pub trait DocumentEngine {
    type Error: std::error::Error + 'static;

    /// Lazy walk over the nodes intersecting a range, ancestors first.
    type Nodes<'a>: Iterator<Item = NodeEntry<'a>> + Clone
    where
        Self: 'a;

    fn selection(&self) -> Option<&Selection>;

    /// Marks at the current selection, `None` when there is no selection.
    fn marks(&self) -> Option<Marks>;

    fn add_mark(&mut self, mark: Mark) -> Result<(), Self::Error>;

    fn remove_mark(&mut self, mark: Mark) -> Result<(), Self::Error>;

    /// Applies `update` to every element in the selection accepted by
    /// `matcher`.
    fn set_nodes(
        &mut self,
        update: &BlockUpdate,
        matcher: &dyn Fn(&ElementNode) -> bool,
    ) -> Result<(), Self::Error>;

    fn nodes<'a>(&'a self, at: &Selection) -> Self::Nodes<'a>;

    fn unhang_range(&self, range: &Selection) -> Selection;

    /// Drains the change notifications queued since the last call.
    fn take_changes(&mut self) -> Vec<Change>;
}

impl DocumentEngine for Editor {
    type Error = ApplyError;
    type Nodes<'a> = Nodes<'a>;

    fn selection(&self) -> Option<&Selection> {
        Editor::selection(self)
    }

    fn marks(&self) -> Option<Marks> {
        Editor::marks(self)
    }

    fn add_mark(&mut self, mark: Mark) -> Result<(), ApplyError> {
        Editor::add_mark(self, mark)
    }

    fn remove_mark(&mut self, mark: Mark) -> Result<(), ApplyError> {
        Editor::remove_mark(self, mark)
    }

    fn set_nodes(
        &mut self,
        update: &BlockUpdate,
        matcher: &dyn Fn(&ElementNode) -> bool,
    ) -> Result<(), ApplyError> {
        Editor::set_nodes(self, update, matcher)
    }

    fn nodes<'a>(&'a self, at: &Selection) -> Nodes<'a> {
        Editor::nodes(self, at)
    }

    fn unhang_range(&self, range: &Selection) -> Selection {
        Editor::unhang_range(self, range)
    }

    fn take_changes(&mut self) -> Vec<Change> {
        Editor::take_changes(self)
    }
}
