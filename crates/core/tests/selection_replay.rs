//! Integration test: load a three-frame capture and follow a selection
//! through a rename (proxy) and a marker-table reshuffle (recovery),
//! with expansion state replayed across the frame changes.

use stacktrail_core::select::MarkerPath;
use stacktrail_core::{
    FrameView, MigrationResult, MigrationState, SelectionController, TreeViewState, ViewMode,
};
use stacktrail_frame::{Capture, FrameDataSource, ItemId};

fn load_capture() -> Capture {
    let data = include_bytes!("fixtures/physics-three-frames.json");
    let capture: Capture = serde_json::from_slice(data).expect("fixture parses");
    capture.validate().expect("fixture is well-formed");
    capture
}

fn child_named(view: &FrameView<'_>, parent: ItemId, name: &str) -> ItemId {
    view.children(parent)
        .iter()
        .copied()
        .find(|&c| view.item_name(c) == name)
        .unwrap_or_else(|| panic!("no child named {name}"))
}

#[test]
fn selection_follows_rename_and_reshuffle() {
    let capture = load_capture();
    assert_eq!(capture.frames.len(), 3);

    let mut controller = SelectionController::new();
    let mut tree = TreeViewState::new();

    // Frame 10: user expands Update and clicks PhysicsStep.
    let view10 = FrameView::build(&capture.frames[0], ViewMode::Merged);
    let update = child_named(&view10, ItemId::ROOT, "Update");
    let physics = child_named(&view10, update, "PhysicsStep");
    tree.set_expanded_by_user(update, true);
    controller
        .select_item(&view10, &mut tree, physics)
        .expect("valid click");
    assert_eq!(controller.state(), MigrationState::Migrated);
    let stored = controller.selection().expect("selection stored");
    assert!(stored.frame_index_is_safe);
    assert_eq!(stored.frame_index, 10);
    assert_eq!(stored.path.to_string(), "Update/PhysicsStep");

    // Redisplay of frame 10 unchanged: exact, via the safe-id fast path.
    controller.capture_expansion(&view10, &tree);
    tree.begin_rebuild();
    let view10b = FrameView::build(&capture.frames[0], ViewMode::Merged);
    let result = controller.migrate(&view10b, &mut tree, false);
    let physics10b = child_named(
        &view10b,
        child_named(&view10b, ItemId::ROOT, "Update"),
        "PhysicsStep",
    );
    assert_eq!(result, MigrationResult::Exact(physics10b));
    assert!(!controller.is_proxy());
    // Expansion replay restored Update's expanded state.
    assert!(tree.is_expanded(child_named(&view10b, ItemId::ROOT, "Update")));
    // Ancestors visible, so the row was framed.
    assert_eq!(tree.take_pending_reveal(), Some(physics10b));

    // Frame 11: PhysicsStep was renamed to PhysicsStep2. Name lookup
    // fails, so the selection degrades to its parent with one level of
    // discrepancy.
    controller.capture_expansion(&view10b, &tree);
    tree.begin_rebuild();
    let view11 = FrameView::build(&capture.frames[1], ViewMode::Merged);
    let result = controller.migrate(&view11, &mut tree, false);
    let update11 = child_named(&view11, ItemId::ROOT, "Update");
    assert_eq!(
        result,
        MigrationResult::Proxy {
            item: update11,
            missing_levels: 1
        }
    );
    assert_eq!(controller.state(), MigrationState::ProxyMigrated);
    assert_eq!(controller.proxy_path_length_difference(), 1);
    assert_eq!(tree.selected(), Some(update11));

    // Frame 12: PhysicsStep is back but the marker table is reordered,
    // so the originally captured ids are wrong and only name
    // renegotiation can find it. Duplicate siblings: the first
    // occurrence in stream order wins.
    controller.capture_expansion(&view11, &tree);
    tree.begin_rebuild();
    let view12 = FrameView::build(&capture.frames[2], ViewMode::Merged);
    let result = controller.migrate(&view12, &mut tree, false);
    let update12 = child_named(&view12, ItemId::ROOT, "Update");
    let physics12 = child_named(&view12, update12, "PhysicsStep");
    assert_eq!(result, MigrationResult::Exact(physics12));
    assert_eq!(controller.state(), MigrationState::Migrated);
    assert_eq!(controller.proxy_path_length_difference(), 0);
    // Both raw occurrences merged into the re-found row.
    assert_eq!(view12.item_raw_indices(physics12).len(), 2);

    // The selection re-anchored to frame 12 with renegotiated ids.
    let refreshed = controller.selection().expect("still selected");
    assert_eq!(refreshed.frame_index, 12);
    assert!(refreshed.frame_index_is_safe);
    assert_eq!(refreshed.path.to_string(), "Update/PhysicsStep");
}

#[test]
fn expansion_replay_is_dropped_after_user_edit() {
    let capture = load_capture();
    let mut controller = SelectionController::new();
    let mut tree = TreeViewState::new();

    let view10 = FrameView::build(&capture.frames[0], ViewMode::Merged);
    let update = child_named(&view10, ItemId::ROOT, "Update");
    tree.set_expanded_by_user(update, true);
    controller.capture_expansion(&view10, &tree);

    // User collapses Update again; the stale capture must not resurrect
    // it on the next frame.
    tree.set_expanded_by_user(update, false);
    controller.capture_expansion(&view10, &tree);

    tree.begin_rebuild();
    let view11 = FrameView::build(&capture.frames[1], ViewMode::Merged);
    controller.migrate(&view11, &mut tree, false);
    assert!(!tree.is_expanded(child_named(&view11, ItemId::ROOT, "Update")));
}

#[test]
fn raw_view_selection_pins_physical_sample() {
    let capture = load_capture();
    let mut controller = SelectionController::new();
    let mut tree = TreeViewState::new();

    // Frame 12 has two PhysicsStep siblings under Update; in raw view
    // they are distinct rows. Select the second.
    let view12 = FrameView::build(&capture.frames[2], ViewMode::Raw);
    let update = child_named(&view12, ItemId::ROOT, "Update");
    let steps: Vec<ItemId> = view12
        .children(update)
        .iter()
        .copied()
        .filter(|&c| view12.item_name(c) == "PhysicsStep")
        .collect();
    assert_eq!(steps.len(), 2);
    controller
        .select_item(&view12, &mut tree, steps[1])
        .expect("valid click");

    // Same-frame rebuild keeps the exact physical sample selected.
    tree.begin_rebuild();
    let view12b = FrameView::build(&capture.frames[2], ViewMode::Raw);
    let update_b = child_named(&view12b, ItemId::ROOT, "Update");
    let second_b = view12b.children(update_b)[1];
    assert_eq!(
        controller.migrate(&view12b, &mut tree, false),
        MigrationResult::Exact(second_b)
    );
}
