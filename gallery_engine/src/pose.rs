//! Types on the narrow pose-feed interface. The external tracker reports a
//! discrete health status plus pointer coordinates each sample; the status
//! gates whether pose-space rendering is valid at all.

use glam::Mat4;

/// Tracker health signal, with the feed's wire codes. Unknown codes degrade
/// to `LostTracking`, which suppresses drawing entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackingStatus {
    LostTracking,
    Tracking,
    TrackingAndMoving,
    NoFeatures,
}

impl TrackingStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => TrackingStatus::Tracking,
            2 => TrackingStatus::TrackingAndMoving,
            3 => TrackingStatus::NoFeatures,
            _ => TrackingStatus::LostTracking,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            TrackingStatus::LostTracking => 0,
            TrackingStatus::Tracking => 1,
            TrackingStatus::TrackingAndMoving => 2,
            TrackingStatus::NoFeatures => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrackingStatus::LostTracking => "lost-tracking",
            TrackingStatus::Tracking => "tracking",
            TrackingStatus::TrackingAndMoving => "tracking-and-moving",
            TrackingStatus::NoFeatures => "no-features",
        }
    }

    /// Anything but a lost tracker allows drawing.
    pub fn should_draw(self) -> bool {
        !matches!(self, TrackingStatus::LostTracking)
    }

    /// With no scene features the pose math is bypassed and the scene falls
    /// back to raw 2-D rendering.
    pub fn use_pose(self) -> bool {
        !matches!(self, TrackingStatus::NoFeatures)
    }
}

/// One sample from the pose feed. The pointer is forwarded verbatim to the
/// hotspot engine; the view matrix is present only when the tracker produced
/// a fresh pose this sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseFrame {
    pub status: TrackingStatus,
    pub pointer: [f32; 2],
    pub view: Option<Mat4>,
}

impl PoseFrame {
    pub fn new(status: TrackingStatus, x: f32, y: f32) -> Self {
        Self {
            status,
            pointer: [x, y],
            view: None,
        }
    }

    pub fn with_view(mut self, view: Mat4) -> Self {
        self.view = Some(view);
        self
    }
}
