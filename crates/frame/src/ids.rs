use serde::{Deserialize, Serialize};

/// Index of a raw sample within one frame's depth-first sample stream.
pub type RawIndex = u32;

/// Identifies a named marker within one captured frame's marker table.
///
/// Marker ids are frame-scoped: the same marker name may map to a
/// different id in the next frame, and an id from frame N means nothing
/// in frame M. Cross-frame correlation goes through the marker *name*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerId(pub i32);

impl MarkerId {
    /// Sentinel for "no such marker" (failed name lookup, root item).
    pub const INVALID: MarkerId = MarkerId(-1);

    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl std::fmt::Display for MarkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifies one item in a hierarchy view built over a frame snapshot.
///
/// Item ids are only meaningful for the view that produced them; every
/// view rebuild renumbers from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl ItemId {
    /// The implicit root of every hierarchy view.
    pub const ROOT: ItemId = ItemId(0);

    #[inline]
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
