use serde::{Deserialize, Serialize};
use thiserror::Error;

use stacktrail_frame::{FrameDataSource, ItemId, RawIndex, SharedStr};

use super::marker_path::MarkerPath;

/// Caller bugs caught eagerly at the selection boundary.
///
/// Shape variance in frame data (missing markers, changed trees) is
/// never an error; only malformed selection requests are.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("selection requires a non-empty sample name")]
    EmptySampleName,
    #[error("selection by path requires a non-empty marker path")]
    EmptyMarkerPath,
    #[error("marker path has {ids} ids but {names} names")]
    MismatchedPathArity { ids: usize, names: usize },
}

/// A recorded selection: which sample, in which frame/thread, by what
/// marker ancestry. Everything needed to re-locate the sample after the
/// tree view is rebuilt for another frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    /// Frame the path ids were captured in.
    pub frame_index: i32,
    pub thread_group: SharedStr,
    pub thread_name: SharedStr,
    pub thread_id: u64,
    /// Raw samples merged under the selected item at capture time.
    /// Exactly one element for raw-view selections.
    pub raw_indices: Vec<RawIndex>,
    /// Leaf display name; also the search key for pathless selections.
    pub sample_name: SharedStr,
    /// Root-first marker ancestry. Empty for name-only selections.
    pub path: MarkerPath,
    /// True while `path`'s ids were captured against the frame currently
    /// being viewed; cleared whenever the ids had to be renegotiated.
    pub frame_index_is_safe: bool,
}

impl Selection {
    /// Record the item the user clicked in the given view.
    ///
    /// Ids are captured from the live view, so they stay trustworthy for
    /// as long as that exact frame is the one on screen.
    pub fn from_item(source: &dyn FrameDataSource, item: ItemId) -> Result<Self, SelectionError> {
        let path = MarkerPath::from_item(source, item);
        let sample_name = SharedStr::from(source.item_name(item));
        if sample_name.is_empty() {
            return Err(SelectionError::EmptySampleName);
        }
        if path.is_empty() {
            return Err(SelectionError::EmptyMarkerPath);
        }
        Ok(Self {
            frame_index: source.frame_index(),
            thread_group: SharedStr::from(source.thread_group()),
            thread_name: SharedStr::from(source.thread_name()),
            thread_id: source.thread_id(),
            raw_indices: source.item_raw_indices(item).to_vec(),
            sample_name,
            path,
            frame_index_is_safe: true,
        })
    }

    /// Programmatic selection by marker path, captured outside any
    /// particular frame. Ids in `path` are treated as unsafe and will be
    /// renegotiated by name on the first migration.
    pub fn by_path(
        path: MarkerPath,
        thread_group: SharedStr,
        thread_name: SharedStr,
        thread_id: u64,
    ) -> Result<Self, SelectionError> {
        if !path.arity_matches() {
            return Err(SelectionError::MismatchedPathArity {
                ids: path.ids().len(),
                names: path.names().len(),
            });
        }
        let Some(leaf) = path.leaf_name() else {
            return Err(SelectionError::EmptyMarkerPath);
        };
        if leaf.is_empty() {
            return Err(SelectionError::EmptySampleName);
        }
        Ok(Self {
            frame_index: -1,
            thread_group,
            thread_name,
            thread_id,
            raw_indices: Vec::new(),
            sample_name: SharedStr::from(leaf),
            path,
            frame_index_is_safe: false,
        })
    }

    /// Name-only selection: no path, find the first sample anywhere in
    /// the frame bearing `sample_name`. Documented fallback mode, not
    /// the primary one.
    pub fn by_name(
        sample_name: SharedStr,
        thread_group: SharedStr,
        thread_name: SharedStr,
        thread_id: u64,
    ) -> Result<Self, SelectionError> {
        if sample_name.is_empty() {
            return Err(SelectionError::EmptySampleName);
        }
        Ok(Self {
            frame_index: -1,
            thread_group,
            thread_name,
            thread_id,
            raw_indices: Vec::new(),
            sample_name,
            path: MarkerPath::default(),
            frame_index_is_safe: false,
        })
    }

    /// Re-anchor the selection to a freshly resolved item so the next
    /// migration against the same frame can take the safe-id fast path.
    pub fn refresh_from(&mut self, source: &dyn FrameDataSource, item: ItemId) {
        self.path = MarkerPath::from_item(source, item);
        self.raw_indices = source.item_raw_indices(item).to_vec();
        self.frame_index = source.frame_index();
        self.frame_index_is_safe = true;
    }
}
