pub mod frame_view;

pub use frame_view::{FrameView, ViewMode};
