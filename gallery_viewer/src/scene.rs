//! Frame-gating and transform state for the composition pipeline, kept apart
//! from the wgpu plumbing so the pose/zoom behavior is testable headless.
//!
//! The latest tracking status decides, per frame, whether anything draws at
//! all and whether world content uses the tracked projection+view pair or
//! the raw 2-D fallback. Zoom and scene translation apply only under pose.

use gallery_engine::config::GalleryConfig;
use gallery_engine::pose::{PoseFrame, TrackingStatus};
use gallery_engine::projection::{
    FRUSTUM_FAR_Z, FRUSTUM_NEAR_Z, OPENGL_TO_WGPU, ortho_2d, projection_from_intrinsics,
};
use gallery_engine::ProjectorCalibration;
use glam::{Mat4, Vec3};
use log::debug;

pub struct SceneState {
    config: GalleryConfig,
    calibration: ProjectorCalibration,
    zoom: f32,
    scene_offset: Vec3,
    aspect_ratio: f32,
    status: TrackingStatus,
    should_draw: bool,
    use_pose: bool,
    projection: Mat4,
    view: Mat4,
}

impl SceneState {
    pub fn new(config: GalleryConfig, calibration: ProjectorCalibration) -> Self {
        let mut state = Self {
            zoom: config.zoom,
            scene_offset: Vec3::from_array(config.scene_offset),
            aspect_ratio: 1.0,
            status: TrackingStatus::LostTracking,
            should_draw: false,
            use_pose: false,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            config,
            calibration,
        };
        state.rebuild_projection();
        state
    }

    /// Re-derives all mutable state from the stored configuration. Used by
    /// the stop/start lifecycle; deliberately does not touch GPU resources.
    pub fn reset(&mut self) {
        self.zoom = self.config.zoom;
        self.scene_offset = Vec3::from_array(self.config.scene_offset);
        self.status = TrackingStatus::LostTracking;
        self.should_draw = false;
        self.use_pose = false;
        self.view = Mat4::IDENTITY;
        self.rebuild_projection();
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn set_calibration(&mut self, calibration: ProjectorCalibration) {
        self.calibration = calibration;
        self.rebuild_projection();
    }

    /// Viewport change: track the new aspect ratio and rebuild the
    /// projection from the stored calibration.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect_ratio = width as f32 / height as f32;
        self.rebuild_projection();
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn should_draw(&self) -> bool {
        self.should_draw
    }

    pub fn use_pose(&self) -> bool {
        self.use_pose
    }

    /// Applies one pose sample: status gates plus the view matrix when the
    /// tracker produced one. Pointer routing happens in the caller.
    pub fn apply_pose(&mut self, frame: &PoseFrame) {
        if frame.status != self.status {
            debug!("tracking status: {}", frame.status.label());
            self.status = frame.status;
        }
        self.should_draw = frame.status.should_draw();
        self.use_pose = frame.status.use_pose();
        if let Some(view) = frame.view {
            self.view = view;
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + self.config.zoom_step).min(self.config.zoom_max);
        debug!("zoom in to {}", self.zoom);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - self.config.zoom_step).max(self.config.zoom_min);
        debug!("zoom out to {}", self.zoom);
    }

    /// The transform for world-space drawables this frame. `None` means the
    /// frame is clear-only. Under pose: tracked projection and view with the
    /// scene translation and uniform zoom; otherwise the raw 2-D fallback
    /// with pose math bypassed.
    pub fn world_transform(&self) -> Option<Mat4> {
        if !self.should_draw {
            return None;
        }
        let transform = if self.use_pose {
            self.projection
                * self.view
                * Mat4::from_translation(self.scene_offset)
                * Mat4::from_scale(Vec3::new(self.zoom, self.zoom, 1.0))
        } else {
            ortho_2d(self.aspect_ratio)
        };
        Some(OPENGL_TO_WGPU * transform)
    }

    /// The fixed overlay transform: always the 2-D orthographic projection,
    /// regardless of pose state, so overlay content stays screen-locked.
    pub fn screen_transform(&self) -> Mat4 {
        OPENGL_TO_WGPU * ortho_2d(self.aspect_ratio)
    }

    fn rebuild_projection(&mut self) {
        self.projection = projection_from_intrinsics(
            &self.calibration.k,
            self.config.projector_width,
            self.config.projector_height,
            FRUSTUM_NEAR_Z,
            FRUSTUM_FAR_Z,
        );
    }
}
