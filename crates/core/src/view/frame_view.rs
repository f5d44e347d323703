use std::collections::HashMap;

use stacktrail_frame::{FrameDataSource, FrameSnapshot, ItemId, MarkerId, RawIndex};

/// How raw samples are presented as tree items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Siblings sharing the same marker collapse into one item.
    Merged,
    /// One item per raw sample, call order preserved.
    Raw,
}

#[derive(Debug)]
struct ItemNode {
    marker: MarkerId,
    depth: u32,
    parent: Option<ItemId>,
    children: Vec<ItemId>,
    raw_indices: Vec<RawIndex>,
}

/// Hierarchy view built over one frame snapshot.
///
/// Item ids are dense indices assigned during construction; id 0 is the
/// synthetic root. A rebuilt view renumbers everything, which is exactly
/// why selections cannot store item ids across frames.
pub struct FrameView<'s> {
    snapshot: &'s FrameSnapshot,
    mode: ViewMode,
    items: Vec<ItemNode>,
    name_to_marker: HashMap<&'s str, MarkerId>,
    valid: bool,
}

impl<'s> FrameView<'s> {
    pub fn build(snapshot: &'s FrameSnapshot, mode: ViewMode) -> Self {
        // Child lists of the raw preorder stream, via a depth stack.
        let mut raw_children: Vec<Vec<RawIndex>> = vec![Vec::new(); snapshot.samples.len()];
        let mut roots: Vec<RawIndex> = Vec::new();
        let mut stack: Vec<RawIndex> = Vec::new();
        for (i, sample) in snapshot.samples.iter().enumerate() {
            let i = i as RawIndex;
            stack.truncate(sample.depth as usize);
            match stack.last() {
                Some(&parent) => raw_children[parent as usize].push(i),
                None => roots.push(i),
            }
            stack.push(i);
        }

        // Name lookup table; first occurrence of a duplicated name wins.
        let mut name_to_marker: HashMap<&'s str, MarkerId> = HashMap::new();
        for (i, info) in snapshot.markers.iter().enumerate() {
            name_to_marker
                .entry(info.name.as_str())
                .or_insert(MarkerId(i as i32));
        }

        let mut view = Self {
            snapshot,
            mode,
            items: vec![ItemNode {
                marker: MarkerId::INVALID,
                depth: 0,
                parent: None,
                children: Vec::new(),
                raw_indices: Vec::new(),
            }],
            name_to_marker,
            valid: true,
        };
        view.build_level(ItemId::ROOT, &roots, &raw_children);
        view
    }

    /// Create the child items of `parent` from the raw indices that sit
    /// directly under it, then recurse into each new item.
    fn build_level(&mut self, parent: ItemId, raws: &[RawIndex], raw_children: &[Vec<RawIndex>]) {
        let groups: Vec<Vec<RawIndex>> = match self.mode {
            ViewMode::Raw => raws.iter().map(|&r| vec![r]).collect(),
            ViewMode::Merged => {
                // Group by marker, preserving first-encounter order.
                let mut order: Vec<MarkerId> = Vec::new();
                let mut by_marker: HashMap<MarkerId, Vec<RawIndex>> = HashMap::new();
                for &raw in raws {
                    let marker = self.snapshot.samples[raw as usize].marker;
                    let group = by_marker.entry(marker).or_default();
                    if group.is_empty() {
                        order.push(marker);
                    }
                    group.push(raw);
                }
                order
                    .into_iter()
                    .filter_map(|m| by_marker.remove(&m))
                    .collect()
            }
        };

        let parent_depth = self.items[parent.0 as usize].depth;
        for group in groups {
            let marker = self.snapshot.samples[group[0] as usize].marker;
            let id = ItemId(self.items.len() as u32);
            self.items.push(ItemNode {
                marker,
                depth: parent_depth + 1,
                parent: Some(parent),
                children: Vec::new(),
                raw_indices: group.clone(),
            });
            self.items[parent.0 as usize].children.push(id);

            let child_raws: Vec<RawIndex> = group
                .iter()
                .flat_map(|&r| raw_children[r as usize].iter().copied())
                .collect();
            if !child_raws.is_empty() {
                self.build_level(id, &child_raws, raw_children);
            }
        }
    }

    /// The snapshot this view presents.
    pub fn snapshot(&self) -> &FrameSnapshot {
        self.snapshot
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Total number of items, synthetic root included.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Mark the view stale (underlying frame evicted from history).
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    fn node(&self, item: ItemId) -> Option<&ItemNode> {
        self.items.get(item.0 as usize)
    }
}

impl FrameDataSource for FrameView<'_> {
    fn frame_index(&self) -> i32 {
        self.snapshot.frame_index
    }

    fn thread_group(&self) -> &str {
        self.snapshot.thread_group.as_str()
    }

    fn thread_name(&self) -> &str {
        self.snapshot.thread_name.as_str()
    }

    fn thread_id(&self) -> u64 {
        self.snapshot.thread_id
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn root_id(&self) -> ItemId {
        ItemId::ROOT
    }

    fn has_children(&self, item: ItemId) -> bool {
        self.node(item).is_some_and(|n| !n.children.is_empty())
    }

    fn children(&self, item: ItemId) -> &[ItemId] {
        self.node(item).map_or(&[], |n| n.children.as_slice())
    }

    fn item_parent(&self, item: ItemId) -> Option<ItemId> {
        self.node(item).and_then(|n| n.parent)
    }

    fn item_marker(&self, item: ItemId) -> MarkerId {
        self.node(item).map_or(MarkerId::INVALID, |n| n.marker)
    }

    fn item_name(&self, item: ItemId) -> &str {
        if item.is_root() {
            return self.snapshot.thread_name.as_str();
        }
        self.node(item)
            .and_then(|n| self.snapshot.marker_name(n.marker))
            .unwrap_or("")
    }

    fn item_depth(&self, item: ItemId) -> u32 {
        self.node(item).map_or(0, |n| n.depth)
    }

    fn item_raw_indices(&self, item: ItemId) -> &[RawIndex] {
        self.node(item).map_or(&[], |n| n.raw_indices.as_slice())
    }

    fn marker_name(&self, marker: MarkerId) -> Option<&str> {
        self.snapshot.marker_name(marker)
    }

    fn marker_id_by_name(&self, name: &str) -> Option<MarkerId> {
        self.name_to_marker.get(name).copied()
    }

    fn marker_is_editor_only(&self, marker: MarkerId) -> bool {
        usize::try_from(marker.0)
            .ok()
            .and_then(|i| self.snapshot.markers.get(i))
            .is_some_and(|m| m.editor_only)
    }

    fn raw_sample_count(&self) -> usize {
        self.snapshot.samples.len()
    }

    fn raw_marker(&self, raw: RawIndex) -> MarkerId {
        self.snapshot
            .samples
            .get(raw as usize)
            .map_or(MarkerId::INVALID, |s| s.marker)
    }

    fn raw_depth(&self, raw: RawIndex) -> u32 {
        self.snapshot
            .samples
            .get(raw as usize)
            .map_or(0, |s| u32::from(s.depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacktrail_frame::{MarkerInfo, RawSample};

    /// Frame with: Update → { PhysicsStep, PhysicsStep, Animate }, Update → Animate
    fn two_updates() -> FrameSnapshot {
        let m = |i: i32, d: u16| RawSample {
            marker: MarkerId(i),
            depth: d,
        };
        FrameSnapshot {
            frame_index: 10,
            thread_group: "Main".into(),
            thread_name: "Main Thread".into(),
            thread_id: 1,
            markers: vec![
                MarkerInfo {
                    name: "Update".into(),
                    editor_only: false,
                },
                MarkerInfo {
                    name: "PhysicsStep".into(),
                    editor_only: false,
                },
                MarkerInfo {
                    name: "Animate".into(),
                    editor_only: false,
                },
            ],
            samples: vec![
                m(0, 0), // 0 Update
                m(1, 1), // 1   PhysicsStep
                m(1, 1), // 2   PhysicsStep
                m(2, 1), // 3   Animate
                m(0, 0), // 4 Update
                m(2, 1), // 5   Animate
            ],
        }
    }

    #[test]
    fn merged_view_collapses_same_marker_siblings() {
        let snap = two_updates();
        let view = FrameView::build(&snap, ViewMode::Merged);

        let roots = view.children(ItemId::ROOT);
        assert_eq!(roots.len(), 1, "both Update samples merge into one item");
        let update = roots[0];
        assert_eq!(view.item_name(update), "Update");
        assert_eq!(view.item_raw_indices(update), &[0, 4]);

        let kids = view.children(update);
        assert_eq!(kids.len(), 2);
        assert_eq!(view.item_name(kids[0]), "PhysicsStep");
        assert_eq!(view.item_raw_indices(kids[0]), &[1, 2]);
        assert_eq!(view.item_name(kids[1]), "Animate");
        assert_eq!(view.item_raw_indices(kids[1]), &[3, 5]);
    }

    #[test]
    fn raw_view_keeps_every_occurrence() {
        let snap = two_updates();
        let view = FrameView::build(&snap, ViewMode::Raw);

        let roots = view.children(ItemId::ROOT);
        assert_eq!(roots.len(), 2);
        for &item in roots {
            assert_eq!(view.item_raw_indices(item).len(), 1);
        }
        assert_eq!(view.children(roots[0]).len(), 3);
        assert_eq!(view.children(roots[1]).len(), 1);
    }

    #[test]
    fn depths_and_parents() {
        let snap = two_updates();
        let view = FrameView::build(&snap, ViewMode::Merged);
        let update = view.children(ItemId::ROOT)[0];
        let physics = view.children(update)[0];

        assert_eq!(view.item_depth(ItemId::ROOT), 0);
        assert_eq!(view.item_depth(update), 1);
        assert_eq!(view.item_depth(physics), 2);
        assert_eq!(view.item_parent(physics), Some(update));
        assert_eq!(view.item_parent(update), Some(ItemId::ROOT));
        assert_eq!(view.item_parent(ItemId::ROOT), None);
    }

    #[test]
    fn raw_index_containment() {
        let snap = two_updates();
        let view = FrameView::build(&snap, ViewMode::Merged);
        let update = view.children(ItemId::ROOT)[0];
        assert!(view.item_contains_raw_index(update, 0));
        assert!(view.item_contains_raw_index(update, 4));
        assert!(!view.item_contains_raw_index(update, 1));
    }

    #[test]
    fn name_lookup_is_stable_per_view() {
        let snap = two_updates();
        let view = FrameView::build(&snap, ViewMode::Merged);
        let first = view.marker_id_by_name("PhysicsStep");
        for _ in 0..3 {
            assert_eq!(view.marker_id_by_name("PhysicsStep"), first);
        }
        assert_eq!(view.marker_id_by_name("DoesNotExist"), None);
    }

    #[test]
    fn out_of_range_queries_degrade_quietly() {
        let snap = two_updates();
        let view = FrameView::build(&snap, ViewMode::Merged);
        let bogus = ItemId(999);
        assert!(!view.has_children(bogus));
        assert!(view.children(bogus).is_empty());
        assert_eq!(view.item_marker(bogus), MarkerId::INVALID);
        assert_eq!(view.item_name(bogus), "");
        assert_eq!(view.raw_marker(999), MarkerId::INVALID);
    }

    #[test]
    fn invalidate_marks_stale() {
        let snap = two_updates();
        let mut view = FrameView::build(&snap, ViewMode::Merged);
        assert!(view.is_valid());
        view.invalidate();
        assert!(!view.is_valid());
    }

    #[test]
    fn empty_frame_has_only_root() {
        let snap = FrameSnapshot {
            frame_index: 0,
            thread_group: "Main".into(),
            thread_name: "Main Thread".into(),
            thread_id: 1,
            markers: vec![],
            samples: vec![],
        };
        let view = FrameView::build(&snap, ViewMode::Merged);
        assert_eq!(view.item_count(), 1);
        assert!(!view.has_children(ItemId::ROOT));
    }
}
