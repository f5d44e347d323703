#![allow(clippy::print_stdout)]

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, bail};

use stacktrail_core::select::MarkerPath;
use stacktrail_core::{
    FrameView, MigrationResult, Selection, SelectionController, TreeViewState, ViewMode,
};
use stacktrail_frame::{Capture, FrameDataSource, MarkerId};

struct Options {
    capture: PathBuf,
    target: String,
    raw_view: bool,
    expand: bool,
    show_tree: bool,
}

fn usage() -> ! {
    eprintln!("Usage: stacktrail <capture.json> <marker or marker/path> [--raw] [--expand] [--tree]");
    eprintln!();
    eprintln!("Replays the given marker path as a selection across every frame in");
    eprintln!("the capture and reports how it migrates (exact, proxy, or lost).");
    process::exit(1);
}

fn parse_args() -> Options {
    let mut positional = Vec::new();
    let mut raw_view = false;
    let mut expand = false;
    let mut show_tree = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--raw" => raw_view = true,
            "--expand" => expand = true,
            "--tree" => show_tree = true,
            _ if arg.starts_with("--") => usage(),
            _ => positional.push(arg),
        }
    }
    if positional.len() != 2 {
        usage();
    }
    let target = positional.pop().unwrap_or_default();
    let capture = PathBuf::from(positional.pop().unwrap_or_default());
    Options {
        capture,
        target,
        raw_view,
        expand,
        show_tree,
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let opts = parse_args();

    let data = std::fs::read(&opts.capture)
        .with_context(|| format!("reading {}", opts.capture.display()))?;
    let capture: Capture = serde_json::from_slice(&data)
        .with_context(|| format!("parsing {}", opts.capture.display()))?;
    capture.validate().context("malformed capture")?;
    let Some(first) = capture.frames.first() else {
        bail!("capture contains no frames");
    };

    let mode = if opts.raw_view {
        ViewMode::Raw
    } else {
        ViewMode::Merged
    };

    // A single marker name searches anywhere; a slash-joined path pins
    // the full ancestry. Ids are unknown here, so migration renegotiates
    // them by name in every frame.
    let selection = if opts.target.contains('/') {
        let names: Vec<_> = opts.target.split('/').map(Into::into).collect();
        let ids = vec![MarkerId::INVALID; names.len()];
        Selection::by_path(
            MarkerPath::from_parts(ids, names),
            first.thread_group.clone(),
            first.thread_name.clone(),
            first.thread_id,
        )?
    } else {
        Selection::by_name(
            opts.target.as_str().into(),
            first.thread_group.clone(),
            first.thread_name.clone(),
            first.thread_id,
        )?
    };

    let mut controller = SelectionController::new();
    let mut tree = TreeViewState::new();
    controller.set_selection(selection, opts.expand)?;

    for frame in &capture.frames {
        let view = FrameView::build(frame, mode);
        tree.begin_rebuild();
        let result = controller.migrate(&view, &mut tree, false);
        match result {
            MigrationResult::Exact(item) => {
                let path = MarkerPath::from_item(&view, item);
                println!(
                    "frame {:>4}: exact  {}  ({} raw sample{})",
                    frame.frame_index,
                    path,
                    view.item_raw_indices(item).len(),
                    if view.item_raw_indices(item).len() == 1 {
                        ""
                    } else {
                        "s"
                    },
                );
            }
            MigrationResult::Proxy {
                item,
                missing_levels,
            } => {
                let path = MarkerPath::from_item(&view, item);
                println!(
                    "frame {:>4}: proxy  {}  ({missing_levels} level{} below lost)",
                    frame.frame_index,
                    path,
                    if missing_levels == 1 { "" } else { "s" },
                );
            }
            MigrationResult::NoMatch => {
                println!("frame {:>4}: no match", frame.frame_index);
            }
        }

        if opts.show_tree {
            print_rows(&view, &tree);
        }
        controller.capture_expansion(&view, &tree);
    }

    Ok(())
}

fn print_rows(view: &FrameView<'_>, tree: &TreeViewState) {
    for item in tree.visible_rows(view) {
        let depth = view.item_depth(item) as usize;
        let marker = if tree.selected() == Some(item) {
            ">"
        } else {
            " "
        };
        println!(
            "  {marker} {}{}",
            "  ".repeat(depth.saturating_sub(1)),
            view.item_name(item),
        );
    }
}
