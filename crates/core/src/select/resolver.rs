use stacktrail_frame::{FrameDataSource, ItemId, RawIndex};

use crate::treeview::TreeViewState;

/// Outcome of mapping a path onto hierarchy items.
///
/// Never an error: a path that stops short simply yields the deepest
/// ancestor that did resolve, down to the root itself.
#[derive(Debug, Clone)]
pub struct ResolvedPath {
    /// Deepest item reached; the root when nothing below it matched.
    pub item: ItemId,
    /// Resolved items root-first, excluding the synthetic root.
    pub item_path: Vec<ItemId>,
    /// Levels actually resolved; equals `item_path.len()`.
    pub resolved_depth: usize,
    /// True when every item above the leaf is currently expanded, i.e.
    /// the leaf is already visible without any auto-expansion.
    pub all_ancestors_expanded: bool,
}

impl ResolvedPath {
    fn from_walk(item_path: Vec<ItemId>, tree: &TreeViewState) -> Self {
        let all_ancestors_expanded = item_path
            .iter()
            .rev()
            .skip(1)
            .all(|&item| tree.is_expanded(item));
        Self {
            item: item_path.last().copied().unwrap_or(ItemId::ROOT),
            resolved_depth: item_path.len(),
            all_ancestors_expanded,
            item_path,
        }
    }
}

/// Map a raw index path (one matched raw sample per depth, from the
/// matcher) onto hierarchy item ids.
///
/// Raw indices and item ids are different numbering spaces: the merged
/// view folds same-marker siblings into one item, so the step at each
/// level is "which child item absorbed this raw sample".
pub fn resolve_raw_path(
    source: &dyn FrameDataSource,
    tree: &TreeViewState,
    raw_path: &[RawIndex],
) -> ResolvedPath {
    let mut item_path = Vec::with_capacity(raw_path.len());
    let mut cursor = source.root_id();
    for &raw in raw_path {
        let next = source
            .children(cursor)
            .iter()
            .copied()
            .find(|&child| source.item_contains_raw_index(child, raw));
        let Some(child) = next else {
            // Merge shape collapsed differently than the raw walk; the
            // hierarchy path ends here.
            break;
        };
        item_path.push(child);
        cursor = child;
    }
    ResolvedPath::from_walk(item_path, tree)
}
