use log::debug;

use stacktrail_frame::{FrameDataSource, ItemId, MarkerId};

use super::expansion::ExpandedMarkerIdTree;
use super::matcher;
use super::resolver::{self, ResolvedPath};
use super::selection::{Selection, SelectionError};
use crate::treeview::TreeViewState;

/// Where the controller stands relative to the displayed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    /// Nothing selected, nothing to migrate.
    NoSelection,
    /// A selection is stored but has not been resolved against the
    /// currently displayed frame yet (or the frame was stale).
    PendingMigration,
    /// The selection resolved at full depth in the displayed frame.
    Migrated,
    /// Only an ancestor of the selected sample could be re-located; the
    /// displayed row is a stand-in, not the original sample.
    ProxyMigrated,
}

/// Outcome of one migration pass, as handed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationResult {
    /// No row selected (no selection stored, stale frame, or the path
    /// matched nothing at all).
    NoMatch,
    /// Exact sample re-located.
    Exact(ItemId),
    /// Deepest matching ancestor selected; `missing_levels` is how many
    /// path levels below it could not be re-located.
    Proxy { item: ItemId, missing_levels: usize },
}

/// Re-resolves the stored selection every time the tree view is rebuilt
/// for a new frame, search string, or view mode.
///
/// Owns the selection and the captured expansion replay; both survive
/// rebuilds precisely because they are keyed by marker identity instead
/// of by the short-lived item ids.
pub struct SelectionController {
    selection: Option<Selection>,
    state: MigrationState,
    proxy_difference: usize,
    expand_on_migrate: bool,
    allow_live_framing: bool,
    expansion_replay: Option<ExpandedMarkerIdTree>,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionController {
    pub fn new() -> Self {
        Self {
            selection: None,
            state: MigrationState::NoSelection,
            proxy_difference: 0,
            expand_on_migrate: false,
            allow_live_framing: false,
            expansion_replay: None,
        }
    }

    /// Opt in to scrolling the selection into view even while live data
    /// is streaming. Off by default: framing during a live session
    /// perturbs the profile being recorded.
    pub fn set_allow_live_framing(&mut self, allow: bool) {
        self.allow_live_framing = allow;
    }

    pub fn state(&self) -> MigrationState {
        self.state
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Levels of discrepancy surfaced alongside a proxy selection;
    /// zero whenever the selection is exact or absent.
    pub fn proxy_path_length_difference(&self) -> usize {
        self.proxy_difference
    }

    pub fn is_proxy(&self) -> bool {
        self.state == MigrationState::ProxyMigrated
    }

    /// Store a selection to be resolved on the next migration pass.
    ///
    /// `expand` asks the controller to auto-expand the resolved path's
    /// ancestors so the row is revealed.
    pub fn set_selection(
        &mut self,
        selection: Selection,
        expand: bool,
    ) -> Result<(), SelectionError> {
        if selection.sample_name.is_empty() {
            return Err(SelectionError::EmptySampleName);
        }
        if !selection.path.arity_matches() {
            return Err(SelectionError::MismatchedPathArity {
                ids: selection.path.ids().len(),
                names: selection.path.names().len(),
            });
        }
        self.selection = Some(selection);
        self.state = MigrationState::PendingMigration;
        self.proxy_difference = 0;
        self.expand_on_migrate = expand;
        Ok(())
    }

    /// A user click on a row in the current view: replaces the stored
    /// selection and is immediately in the `Migrated` state, no
    /// re-resolution needed until the next rebuild.
    pub fn select_item(
        &mut self,
        source: &dyn FrameDataSource,
        tree: &mut TreeViewState,
        item: ItemId,
    ) -> Result<(), SelectionError> {
        let selection = Selection::from_item(source, item)?;
        self.selection = Some(selection);
        self.state = MigrationState::Migrated;
        self.proxy_difference = 0;
        self.expand_on_migrate = false;
        tree.select(Some(item));
        Ok(())
    }

    pub fn clear_selection(&mut self, tree: &mut TreeViewState) {
        self.selection = None;
        self.state = MigrationState::NoSelection;
        self.proxy_difference = 0;
        self.expand_on_migrate = false;
        tree.select(None);
    }

    /// Snapshot expansion state before the tree is rebuilt.
    ///
    /// A capture is only taken when the user touched the tree since the
    /// last one (the live book-keeping is then the authority) or when
    /// none exists yet; otherwise the previous capture stays valid.
    pub fn capture_expansion(&mut self, source: &dyn FrameDataSource, tree: &TreeViewState) {
        if tree.altered_by_user() || self.expansion_replay.is_none() {
            self.expansion_replay = ExpandedMarkerIdTree::capture(source, tree);
        }
    }

    /// One migration pass, to be invoked exactly once per tree rebuild.
    ///
    /// Replays captured expansion state onto the fresh view, re-resolves
    /// the stored selection, updates `tree`'s selected row and reveal
    /// request, and reports what happened.
    ///
    /// A stale source aborts before anything is read from it: no
    /// expansion replay, no resolution, and the stored selection stays
    /// pending until a valid frame shows up.
    pub fn migrate(
        &mut self,
        source: &dyn FrameDataSource,
        tree: &mut TreeViewState,
        live_updating: bool,
    ) -> MigrationResult {
        if !source.is_valid() {
            debug!(
                "frame {} is stale, skipping migration pass",
                source.frame_index()
            );
            self.state = if self.selection.is_some() {
                MigrationState::PendingMigration
            } else {
                MigrationState::NoSelection
            };
            tree.select(None);
            return MigrationResult::NoMatch;
        }

        let Some(sel) = self.selection.clone() else {
            self.replay_expansion(source, tree);
            self.state = MigrationState::NoSelection;
            tree.select(None);
            return MigrationResult::NoMatch;
        };

        if sel.thread_group != *source.thread_group() || sel.thread_name != *source.thread_name() {
            // A capture from one thread has no business shaping another
            // thread's view, so the replay is skipped too.
            debug!(
                "selection '{}': view shows thread {}/{}, selection is for {}/{}",
                sel.sample_name,
                source.thread_group(),
                source.thread_name(),
                sel.thread_group,
                sel.thread_name
            );
            self.state = MigrationState::PendingMigration;
            tree.select(None);
            return MigrationResult::NoMatch;
        }

        self.replay_expansion(source, tree);

        let (resolved, requested_depth) = if sel.path.is_empty() {
            self.resolve_by_name_only(source, tree, &sel)
        } else {
            self.resolve_path(source, tree, &sel)
        };

        self.finish(source, tree, sel, resolved, requested_depth, live_updating)
    }

    fn replay_expansion(&self, source: &dyn FrameDataSource, tree: &mut TreeViewState) {
        if let Some(replay) = &self.expansion_replay {
            replay.replay(source, tree);
        }
    }

    /// Pathless selections: first sample anywhere bearing the name.
    fn resolve_by_name_only(
        &self,
        source: &dyn FrameDataSource,
        tree: &TreeViewState,
        sel: &Selection,
    ) -> (ResolvedPath, usize) {
        match matcher::find_first_by_name(source, &sel.sample_name) {
            Some(raw) => {
                let chain = matcher::raw_ancestry(source, raw);
                let depth = chain.len();
                (resolver::resolve_raw_path(source, tree, &chain), depth)
            }
            None => (resolver::resolve_raw_path(source, tree, &[]), 1),
        }
    }

    fn resolve_path(
        &self,
        source: &dyn FrameDataSource,
        tree: &TreeViewState,
        sel: &Selection,
    ) -> (ResolvedPath, usize) {
        let requested = sel.path.len();

        if self.ids_safe_for(source, sel) {
            // Known-good ids: the stored leaf raw index pins the exact
            // physical sample, so the raw walk can be skipped entirely.
            if let Some(&raw) = sel.raw_indices.first() {
                let chain = matcher::raw_ancestry(source, raw);
                if chain.len() == requested
                    && source.raw_marker(raw)
                        == sel.path.id(requested - 1).unwrap_or(MarkerId::INVALID)
                {
                    let resolved = resolver::resolve_raw_path(source, tree, &chain);
                    if resolved.resolved_depth == requested {
                        return (resolved, requested);
                    }
                }
            }
            debug!(
                "selection '{}': safe-id fast path failed, re-resolving by name",
                sel.sample_name
            );
        }

        // Full re-resolution: renegotiate each level's id from its name
        // in this frame's marker table, then walk the raw stream.
        let matched = matcher::find_raw_path(source, &sel.path, true);
        (
            resolver::resolve_raw_path(source, tree, &matched.raw_path),
            requested,
        )
    }

    /// Ids can be trusted only when they were captured against this very
    /// frame and no editor-only marker sits mid-path (those reshape the
    /// merged hierarchy between frames).
    fn ids_safe_for(&self, source: &dyn FrameDataSource, sel: &Selection) -> bool {
        sel.frame_index_is_safe
            && sel.frame_index == source.frame_index()
            && !sel
                .path
                .ids()
                .iter()
                .rev()
                .skip(1)
                .any(|&id| source.marker_is_editor_only(id))
    }

    fn finish(
        &mut self,
        source: &dyn FrameDataSource,
        tree: &mut TreeViewState,
        mut sel: Selection,
        resolved: ResolvedPath,
        requested_depth: usize,
        live_updating: bool,
    ) -> MigrationResult {
        if resolved.resolved_depth == 0 {
            debug!(
                "selection '{}': no match in frame {}, clearing",
                sel.sample_name,
                source.frame_index()
            );
            self.selection = None;
            self.state = MigrationState::NoSelection;
            self.proxy_difference = 0;
            tree.select(None);
            return MigrationResult::NoMatch;
        }

        let missing = requested_depth.saturating_sub(resolved.resolved_depth);
        tree.select(Some(resolved.item));

        if self.expand_on_migrate {
            tree.expand_path(&resolved.item_path);
        }
        let reveal = self.expand_on_migrate || resolved.all_ancestors_expanded;
        if reveal && (!live_updating || self.allow_live_framing) {
            tree.request_reveal(resolved.item);
        }

        let result = if missing == 0 {
            debug!(
                "selection '{}': exact match in frame {} (item {})",
                sel.sample_name,
                source.frame_index(),
                resolved.item
            );
            // Re-anchor so the next pass over this same frame can take
            // the fast path with renegotiated ids.
            sel.refresh_from(source, resolved.item);
            self.state = MigrationState::Migrated;
            self.proxy_difference = 0;
            MigrationResult::Exact(resolved.item)
        } else {
            debug!(
                "selection '{}': proxy match in frame {} (item {}, {} levels missing)",
                sel.sample_name,
                source.frame_index(),
                resolved.item,
                missing
            );
            // Keep the original path for later frames; current ids do
            // not describe the missing tail.
            sel.frame_index_is_safe = false;
            self.state = MigrationState::ProxyMigrated;
            self.proxy_difference = missing;
            MigrationResult::Proxy {
                item: resolved.item,
                missing_levels: missing,
            }
        };
        self.selection = Some(sel);
        result
    }
}
