//! Interaction and composition logic for the projector gallery: the dwell
//! hotspot engine, projection-matrix construction from projector intrinsics,
//! parameter/calibration records, and the pose-feed types. Everything here is
//! plain state with no GPU or windowing dependencies; `gallery_viewer` drives
//! it from the render thread.

pub mod calibration;
pub mod config;
pub mod hotspot;
pub mod pose;
pub mod projection;
pub mod ui;

pub use calibration::ProjectorCalibration;
pub use config::GalleryConfig;
pub use hotspot::{Hotspot, HotspotId, HotspotShape};
pub use pose::{PoseFrame, TrackingStatus};
pub use ui::UiLayer;
