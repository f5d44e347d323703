use std::collections::HashMap;

use stacktrail_frame::{FrameDataSource, ItemId, MarkerId};

use crate::treeview::TreeViewState;

/// Marker-id-keyed mirror of a view's expanded subset.
///
/// Item ids die with every rebuild, so expansion state is captured by
/// marker identity instead and replayed onto the next frame's view.
/// This is an approximation: it assumes equal marker names renegotiate
/// to equal ids between structurally-similar frames, and it is only
/// consulted while the user has not expanded or collapsed anything by
/// hand (a manual edit makes the live tree state authoritative and this
/// capture stale).
#[derive(Debug, Default, Clone)]
pub struct ExpandedMarkerIdTree {
    children: HashMap<MarkerId, ExpandedMarkerIdTree>,
}

impl ExpandedMarkerIdTree {
    /// Snapshot the expanded subset of `source` as seen by `tree`.
    /// Returns `None` when nothing is expanded (nothing to replay).
    pub fn capture(source: &dyn FrameDataSource, tree: &TreeViewState) -> Option<Self> {
        let root = Self::capture_item(source, tree, source.root_id());
        if root.children.is_empty() {
            None
        } else {
            Some(root)
        }
    }

    fn capture_item(source: &dyn FrameDataSource, tree: &TreeViewState, item: ItemId) -> Self {
        let mut node = Self::default();
        for &child in source.children(item) {
            if tree.is_expanded(child) {
                node.children.insert(
                    source.item_marker(child),
                    Self::capture_item(source, tree, child),
                );
            }
        }
        node
    }

    /// Mark every item of `source` whose marker ancestry appears in this
    /// capture as expanded in `tree`. Items the new frame no longer has
    /// are skipped silently.
    pub fn replay(&self, source: &dyn FrameDataSource, tree: &mut TreeViewState) {
        self.replay_item(source, tree, source.root_id());
    }

    fn replay_item(&self, source: &dyn FrameDataSource, tree: &mut TreeViewState, item: ItemId) {
        for &child in source.children(item) {
            if let Some(sub) = self.children.get(&source.item_marker(child)) {
                tree.set_expanded(child, true);
                sub.replay_item(source, tree, child);
            }
        }
    }

    /// Number of directly captured children (test/diagnostic aid).
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
