use serde::{Deserialize, Serialize};
use stacktrail_frame::{FrameDataSource, ItemId, MarkerId, SharedStr};

/// Root-first list of markers describing one sample's ancestry.
///
/// Ids and names are parallel arrays: ids are the fast lookup key while
/// they are known valid for the displayed frame, names are the fallback
/// key once the frame changes and ids must be renegotiated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkerPath {
    ids: Vec<MarkerId>,
    names: Vec<SharedStr>,
}

impl MarkerPath {
    /// Build a path by walking from `item` up to the view root and
    /// reversing into root-first order.
    pub fn from_item(source: &dyn FrameDataSource, item: ItemId) -> Self {
        let mut ids = Vec::new();
        let mut names = Vec::new();
        let mut cursor = item;
        while !cursor.is_root() {
            ids.push(source.item_marker(cursor));
            names.push(SharedStr::from(source.item_name(cursor)));
            let Some(parent) = source.item_parent(cursor) else {
                break;
            };
            cursor = parent;
        }
        ids.reverse();
        names.reverse();
        Self { ids, names }
    }

    /// Build a path from parallel id/name lists. Callers must pass lists
    /// of equal length; `Selection` validates this at its boundary.
    pub fn from_parts(ids: Vec<MarkerId>, names: Vec<SharedStr>) -> Self {
        Self { ids, names }
    }

    /// Number of levels; equals the denoted item's depth below the root.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Two paths can denote the same sample only if they are equally deep.
    pub fn depth_compatible(&self, other: &MarkerPath) -> bool {
        self.len() == other.len()
    }

    pub fn id(&self, depth: usize) -> Option<MarkerId> {
        self.ids.get(depth).copied()
    }

    pub fn name(&self, depth: usize) -> Option<&str> {
        self.names.get(depth).map(SharedStr::as_str)
    }

    pub fn ids(&self) -> &[MarkerId] {
        &self.ids
    }

    pub fn names(&self) -> &[SharedStr] {
        &self.names
    }

    /// Leaf display name, if the path is non-empty.
    pub fn leaf_name(&self) -> Option<&str> {
        self.names.last().map(SharedStr::as_str)
    }

    /// Whether ids and names line up one-to-one.
    pub fn arity_matches(&self) -> bool {
        self.ids.len() == self.names.len()
    }
}

impl std::fmt::Display for MarkerPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, name) in self.names.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{name}")?;
        }
        Ok(())
    }
}
