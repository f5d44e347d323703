use std::collections::HashSet;

use stacktrail_frame::{FrameDataSource, ItemId};

/// Per-rebuild book-keeping of a frame-data tree view: which items are
/// expanded, which is selected, and whether something should be
/// scrolled into view.
///
/// Item ids do not survive a rebuild, so `begin_rebuild` wipes all of
/// it; cross-rebuild continuity is the selection controller's job
/// (marker paths for the selection, `ExpandedMarkerIdTree` for the
/// expanded set).
#[derive(Debug, Default)]
pub struct TreeViewState {
    expanded: HashSet<ItemId>,
    selected: Option<ItemId>,
    pending_reveal: Option<ItemId>,
    altered_by_user: bool,
}

impl TreeViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The root row is always visible, hence always "expanded".
    pub fn is_expanded(&self, item: ItemId) -> bool {
        item.is_root() || self.expanded.contains(&item)
    }

    /// Expand/collapse driven by a user click. Marks the state as
    /// user-altered, which invalidates any captured expansion replay.
    pub fn set_expanded_by_user(&mut self, item: ItemId, expanded: bool) {
        self.altered_by_user = true;
        self.set_expanded(item, expanded);
    }

    /// Programmatic expand/collapse (replay, auto-expand on selection).
    pub fn set_expanded(&mut self, item: ItemId, expanded: bool) {
        if item.is_root() {
            return;
        }
        if expanded {
            self.expanded.insert(item);
        } else {
            self.expanded.remove(&item);
        }
    }

    /// Expand every item on `path` so its last element becomes visible.
    pub fn expand_path(&mut self, path: &[ItemId]) {
        // The leaf itself need not be expanded, only its ancestors.
        for &item in path.iter().rev().skip(1) {
            self.set_expanded(item, true);
        }
    }

    pub fn expanded_items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.expanded.iter().copied()
    }

    pub fn altered_by_user(&self) -> bool {
        self.altered_by_user
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    pub fn select(&mut self, item: Option<ItemId>) {
        self.selected = item;
    }

    /// Ask the host to scroll `item` into view on its next draw.
    pub fn request_reveal(&mut self, item: ItemId) {
        self.pending_reveal = Some(item);
    }

    /// Consumed by the host once per draw.
    pub fn take_pending_reveal(&mut self) -> Option<ItemId> {
        self.pending_reveal.take()
    }

    /// Drop all per-rebuild state. Callers capture whatever continuity
    /// they need (expansion replay, selection path) before this.
    pub fn begin_rebuild(&mut self) {
        self.expanded.clear();
        self.selected = None;
        self.pending_reveal = None;
        self.altered_by_user = false;
    }

    /// Visible rows in display order: preorder walk that only descends
    /// into expanded items. The synthetic root is not a row.
    pub fn visible_rows(&self, source: &dyn FrameDataSource) -> Vec<ItemId> {
        let mut rows = Vec::new();
        let mut stack: Vec<ItemId> = source
            .children(source.root_id())
            .iter()
            .rev()
            .copied()
            .collect();
        while let Some(item) = stack.pop() {
            rows.push(item);
            if self.is_expanded(item) {
                stack.extend(source.children(item).iter().rev().copied());
            }
        }
        rows
    }
}
