use crate::ids::{ItemId, MarkerId, RawIndex};

/// Capability set a hierarchy view over one captured frame must provide.
///
/// The selection migration engine only ever talks to a frame through
/// this trait, so the algorithms can run against a real capture-backed
/// view or an in-memory fake interchangeably.
///
/// Contract invariants callers may rely on:
/// - `children` returns items in enumeration/display order, and that
///   order is stable for the lifetime of the source value.
/// - `marker_id_by_name` returns the same id for the same name on every
///   call against the same source value (frame-scoped id stability).
/// - All item queries tolerate arbitrary `ItemId`s and answer with
///   empty/invalid results rather than panicking.
pub trait FrameDataSource {
    /// History index of the frame this source presents.
    fn frame_index(&self) -> i32;

    /// Thread identity of the presented frame/thread.
    fn thread_group(&self) -> &str;
    fn thread_name(&self) -> &str;
    fn thread_id(&self) -> u64;

    /// False once the underlying frame was evicted/expired; migration
    /// aborts early on stale sources instead of reading garbage.
    fn is_valid(&self) -> bool;

    fn root_id(&self) -> ItemId;
    fn has_children(&self, item: ItemId) -> bool;
    fn children(&self, item: ItemId) -> &[ItemId];
    fn item_parent(&self, item: ItemId) -> Option<ItemId>;

    /// Marker the item presents; `MarkerId::INVALID` for the root.
    fn item_marker(&self, item: ItemId) -> MarkerId;
    fn item_name(&self, item: ItemId) -> &str;
    /// Root is depth 0, its direct children depth 1.
    fn item_depth(&self, item: ItemId) -> u32;

    /// Raw sample indices merged into this item (one element per sample
    /// in raw view mode, possibly many in merged mode).
    fn item_raw_indices(&self, item: ItemId) -> &[RawIndex];
    fn item_contains_raw_index(&self, item: ItemId, raw: RawIndex) -> bool {
        self.item_raw_indices(item).contains(&raw)
    }

    fn marker_name(&self, marker: MarkerId) -> Option<&str>;
    fn marker_id_by_name(&self, name: &str) -> Option<MarkerId>;
    fn marker_is_editor_only(&self, marker: MarkerId) -> bool;

    /// Number of raw samples in the frame's depth-first stream.
    fn raw_sample_count(&self) -> usize;
    fn raw_marker(&self, raw: RawIndex) -> MarkerId;
    /// Depth 0 = direct child of the thread's implicit root.
    fn raw_depth(&self, raw: RawIndex) -> u32;
}
