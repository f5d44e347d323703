//! Selection migration for profiler frame-data tree views.
//!
//! A profiler tree view rebuilds its rows every time the displayed frame,
//! search string, or view mode changes, and none of the ids involved
//! (marker ids, hierarchy item ids) survive a rebuild. This crate keeps a
//! user's selection meaningful across those rebuilds:
//!
//! ```text
//!   FrameSnapshot ──▶ FrameView (merged/raw items)
//!                          │
//!   Selection ──▶ matcher (raw stream walk) ──▶ resolver (item path)
//!                          │                          │
//!                          └──── SelectionController ─┘
//!                              exact / proxy / none
//! ```
//!
//! The controller re-resolves the stored marker path against each new
//! frame, degrading to a "proxy" selection (deepest matching ancestor)
//! when the exact sample no longer exists.

pub mod search;
pub mod select;
pub mod treeview;
pub mod view;

pub use search::SearchDebounce;
pub use select::{
    MarkerPath, MigrationResult, MigrationState, Selection, SelectionController, SelectionError,
};
pub use treeview::TreeViewState;
pub use view::{FrameView, ViewMode};
