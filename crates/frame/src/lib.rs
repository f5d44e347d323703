pub mod ids;
pub mod shared_str;
pub mod snapshot;
pub mod source;

pub use ids::{ItemId, MarkerId, RawIndex};
pub use shared_str::SharedStr;
pub use snapshot::{Capture, CaptureError, FrameSnapshot, MarkerInfo, RawSample};
pub use source::FrameDataSource;
