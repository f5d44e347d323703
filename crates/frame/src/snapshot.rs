use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::MarkerId;
use crate::shared_str::SharedStr;

/// One row of a frame's marker table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerInfo {
    /// Display name of the instrumentation point ("Update", "GC.Collect"…).
    pub name: SharedStr,
    /// Markers injected by editor tooling rather than the profiled code.
    /// These can appear or vanish between frames and reshape merging, so
    /// id-based fast paths must not trust paths that run through them.
    #[serde(default)]
    pub editor_only: bool,
}

/// One unmerged sample occurrence in the depth-first stream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawSample {
    /// Index into the owning frame's marker table.
    pub marker: MarkerId,
    /// Call depth; 0 = direct child of the thread's implicit root.
    pub depth: u16,
}

/// A single captured frame/thread: marker table plus the raw sample
/// stream in preorder (depth-first, chronological call order).
///
/// This is the canonical snapshot every view and every migration pass
/// operates on:
///
/// ```text
///   capture file ──▶ FrameSnapshot ──▶ FrameView (merged/raw) ──▶ tree rows
///                        (this)            │
///                                          └──▶ selection migration
/// ```
///
/// Marker ids are simply indices into `markers`, which is what makes
/// them frame-scoped: the same name can sit at a different index in the
/// next frame's table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Position of this frame in the capture history.
    pub frame_index: i32,
    /// Thread group the samples belong to (e.g. "Job", "Main").
    pub thread_group: SharedStr,
    /// Display name of the thread.
    pub thread_name: SharedStr,
    /// OS-level thread id from the source capture.
    pub thread_id: u64,
    /// Marker table; `MarkerId(i)` names `markers[i]`.
    pub markers: Vec<MarkerInfo>,
    /// Raw samples in preorder.
    pub samples: Vec<RawSample>,
}

/// A loaded capture: one or more frame snapshots in history order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capture {
    pub frames: Vec<FrameSnapshot>,
}

/// Structural problems in capture data, caught on load.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("frame {frame}: sample {index} jumps from depth {prev} to {depth}")]
    DepthJump {
        frame: i32,
        index: usize,
        prev: u16,
        depth: u16,
    },
    #[error("frame {frame}: sample {index} starts the stream at depth {depth}")]
    BadFirstDepth { frame: i32, index: usize, depth: u16 },
    #[error("frame {frame}: sample {index} references marker {marker} outside the table")]
    MarkerOutOfRange {
        frame: i32,
        index: usize,
        marker: MarkerId,
    },
}

impl FrameSnapshot {
    /// Name of a marker in this frame's table, if the id is in range.
    pub fn marker_name(&self, marker: MarkerId) -> Option<&str> {
        let idx = usize::try_from(marker.0).ok()?;
        self.markers.get(idx).map(|m| m.name.as_str())
    }

    /// First marker id in the table bearing `name`, if any.
    pub fn marker_id_by_name(&self, name: &str) -> Option<MarkerId> {
        self.markers
            .iter()
            .position(|m| m.name == name)
            .map(|i| MarkerId(i as i32))
    }

    /// Check preorder and marker-table invariants.
    ///
    /// A valid stream starts at depth 0 and never deepens by more than
    /// one step between consecutive samples (a child directly follows
    /// its parent in preorder).
    pub fn validate(&self) -> Result<(), CaptureError> {
        let mut prev_depth: Option<u16> = None;
        for (index, sample) in self.samples.iter().enumerate() {
            let in_range =
                sample.marker.is_valid() && (sample.marker.0 as usize) < self.markers.len();
            if !in_range {
                return Err(CaptureError::MarkerOutOfRange {
                    frame: self.frame_index,
                    index,
                    marker: sample.marker,
                });
            }
            match prev_depth {
                None if sample.depth != 0 => {
                    return Err(CaptureError::BadFirstDepth {
                        frame: self.frame_index,
                        index,
                        depth: sample.depth,
                    });
                }
                Some(prev) if sample.depth > prev + 1 => {
                    return Err(CaptureError::DepthJump {
                        frame: self.frame_index,
                        index,
                        prev,
                        depth: sample.depth,
                    });
                }
                _ => {}
            }
            prev_depth = Some(sample.depth);
        }
        Ok(())
    }
}

impl Capture {
    /// Validate every frame in the capture.
    pub fn validate(&self) -> Result<(), CaptureError> {
        for frame in &self.frames {
            frame.validate()?;
        }
        Ok(())
    }

    /// Find a frame by its history index.
    pub fn frame(&self, frame_index: i32) -> Option<&FrameSnapshot> {
        self.frames.iter().find(|f| f.frame_index == frame_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(samples: Vec<RawSample>) -> FrameSnapshot {
        FrameSnapshot {
            frame_index: 1,
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
            ],
            samples,
        }
    }

    #[test]
    fn valid_preorder_stream() {
        let snap = snapshot(vec![
            RawSample {
                marker: MarkerId(0),
                depth: 0,
            },
            RawSample {
                marker: MarkerId(1),
                depth: 1,
            },
            RawSample {
                marker: MarkerId(0),
                depth: 0,
            },
        ]);
        assert!(snap.validate().is_ok());
    }

    #[test]
    fn depth_jump_rejected() {
        let snap = snapshot(vec![
            RawSample {
                marker: MarkerId(0),
                depth: 0,
            },
            RawSample {
                marker: MarkerId(1),
                depth: 2,
            },
        ]);
        assert!(matches!(
            snap.validate(),
            Err(CaptureError::DepthJump { index: 1, .. })
        ));
    }

    #[test]
    fn first_sample_must_be_depth_zero() {
        let snap = snapshot(vec![RawSample {
            marker: MarkerId(0),
            depth: 1,
        }]);
        assert!(matches!(
            snap.validate(),
            Err(CaptureError::BadFirstDepth { .. })
        ));
    }

    #[test]
    fn marker_out_of_table() {
        let snap = snapshot(vec![RawSample {
            marker: MarkerId(5),
            depth: 0,
        }]);
        assert!(matches!(
            snap.validate(),
            Err(CaptureError::MarkerOutOfRange { .. })
        ));
    }

    #[test]
    fn marker_lookup_both_ways() {
        let snap = snapshot(vec![]);
        assert_eq!(snap.marker_name(MarkerId(1)), Some("PhysicsStep"));
        assert_eq!(snap.marker_name(MarkerId(9)), None);
        assert_eq!(snap.marker_id_by_name("Update"), Some(MarkerId(0)));
        assert_eq!(snap.marker_id_by_name("Render"), None);
    }

    #[test]
    fn capture_json_roundtrip() {
        let capture = Capture {
            frames: vec![snapshot(vec![RawSample {
                marker: MarkerId(0),
                depth: 0,
            }])],
        };
        let json = serde_json::to_string(&capture).expect("serialize");
        let back: Capture = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.frames.len(), 1);
        assert_eq!(back.frames[0].markers[0].name, "Update");
        assert!(back.validate().is_ok());
    }

    #[test]
    fn editor_only_defaults_to_false() {
        let json = r#"{"name":"Update"}"#;
        let info: MarkerInfo = serde_json::from_str(json).expect("deserialize");
        assert!(!info.editor_only);
    }
}
