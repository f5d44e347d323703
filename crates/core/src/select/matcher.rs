use stacktrail_frame::{FrameDataSource, MarkerId, RawIndex};

use super::marker_path::MarkerPath;

/// Result of walking a marker path against one frame's raw stream.
#[derive(Debug, Clone, Default)]
pub struct RawPathMatch {
    /// Matched raw index per depth, root-first. May be shorter than the
    /// requested path when the walk stopped early.
    pub raw_path: Vec<RawIndex>,
    /// How many levels matched; equals `raw_path.len()`.
    pub matched_depth: usize,
    /// The leaf raw index, only when every level of the path matched.
    pub found: Option<RawIndex>,
}

impl RawPathMatch {
    pub fn is_full(&self) -> bool {
        self.found.is_some()
    }
}

/// Find the deepest raw sample matching `path` from the root down.
///
/// The raw stream is preorder, so a matched parent's children are the
/// samples after it at exactly one greater depth, ending at the first
/// sample that leaves the parent's subtree. At each level the first
/// sibling in stream order wins, which keeps repeated runs over the
/// same frame deterministic even with duplicate siblings.
///
/// With `renegotiate_ids` set, each path element's id is re-resolved
/// from its *name* in this frame's marker table before matching; this
/// is the mode for frames other than the one the path was captured in,
/// where the stored ids mean nothing.
pub fn find_raw_path(
    source: &dyn FrameDataSource,
    path: &MarkerPath,
    renegotiate_ids: bool,
) -> RawPathMatch {
    let total = source.raw_sample_count();
    let mut result = RawPathMatch::default();
    let mut pos: usize = 0;

    for depth in 0..path.len() {
        let target = if renegotiate_ids {
            path.name(depth)
                .and_then(|name| source.marker_id_by_name(name))
                .unwrap_or(MarkerId::INVALID)
        } else {
            path.id(depth).unwrap_or(MarkerId::INVALID)
        };
        if !target.is_valid() {
            break;
        }

        let want = depth as u32;
        let mut matched = None;
        let mut i = pos;
        while i < total {
            let raw = i as RawIndex;
            let d = source.raw_depth(raw);
            if d < want {
                // Left the current parent's subtree.
                break;
            }
            if d == want && source.raw_marker(raw) == target {
                matched = Some(raw);
                break;
            }
            i += 1;
        }

        let Some(raw) = matched else { break };
        result.raw_path.push(raw);
        pos = raw as usize + 1;
    }

    result.matched_depth = result.raw_path.len();
    if result.matched_depth == path.len() && !path.is_empty() {
        result.found = result.raw_path.last().copied();
    }
    result
}

/// Validation variant: the path must not only resolve, it must land on
/// `expected`. A full match on a *different* physical sample (duplicate
/// siblings) is reported as failure by clearing `found`.
pub fn find_raw_path_expecting(
    source: &dyn FrameDataSource,
    path: &MarkerPath,
    renegotiate_ids: bool,
    expected: RawIndex,
) -> RawPathMatch {
    let mut result = find_raw_path(source, path, renegotiate_ids);
    if result.found.is_some_and(|raw| raw != expected) {
        result.found = None;
    }
    result
}

/// Pathless fallback: first raw sample anywhere in the stream whose
/// marker bears `name`, in enumeration order, depth ignored.
pub fn find_first_by_name(source: &dyn FrameDataSource, name: &str) -> Option<RawIndex> {
    let target = source.marker_id_by_name(name)?;
    (0..source.raw_sample_count() as RawIndex).find(|&raw| source.raw_marker(raw) == target)
}

/// Root-first chain of raw indices ending at `raw` itself,
/// reconstructed from the preorder stream's depth sequence. Empty when
/// `raw` is out of range.
pub fn raw_ancestry(source: &dyn FrameDataSource, raw: RawIndex) -> Vec<RawIndex> {
    if raw as usize >= source.raw_sample_count() {
        return Vec::new();
    }
    let mut stack: Vec<RawIndex> = Vec::new();
    for i in 0..=raw {
        let depth = source.raw_depth(i);
        stack.truncate(depth as usize);
        stack.push(i);
    }
    stack
}
