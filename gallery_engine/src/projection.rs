//! Projection-matrix construction: maps the projector's pinhole intrinsics
//! and resolution into a perspective matrix using the computer-vision-to-GL
//! convention, plus the 2-D orthographic fallback used when no pose is
//! available and the clip-space adapter for the wgpu backend.

use glam::Mat4;

pub const FRUSTUM_NEAR_Z: f32 = 0.01;
pub const FRUSTUM_FAR_Z: f32 = 500.0;

/// GL clip space keeps z in [-1, 1]; wgpu expects [0, 1]. Applied by the
/// renderer on top of the matrices built here.
pub const OPENGL_TO_WGPU: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 0.5, 0.0, //
    0.0, 0.0, 0.5, 1.0,
]);

/// Builds the perspective projection from row-major intrinsics
/// `[fx, skew, cx, k3, fy, cy, k6, k7, 1]` and the projector resolution.
/// The first two rows map focal lengths and principal point into normalized
/// device coordinates; the third row is the symmetric frustum depth mapping;
/// the fourth is the perspective divide row.
pub fn projection_from_intrinsics(k: &[f32; 9], width: u32, height: u32, near: f32, far: f32) -> Mat4 {
    let w = width as f32;
    let h = height as f32;
    Mat4::from_cols_array(&[
        // column 0
        2.0 * k[0] / w,
        k[3],
        k[6],
        0.0,
        // column 1
        k[1],
        2.0 * k[4] / h,
        k[7],
        0.0,
        // column 2
        2.0 * (k[2] / w) - 1.0,
        2.0 * (k[5] / h) - 1.0,
        -(near + far) / (far - near),
        -1.0,
        // column 3
        0.0,
        0.0,
        -(2.0 * near * far) / (far - near),
        0.0,
    ])
}

/// The raw 2-D fallback: an orthographic projection over
/// `[-1, 1] x [-1/aspect, 1/aspect]`.
pub fn ortho_2d(aspect_ratio: f32) -> Mat4 {
    Mat4::orthographic_rh_gl(
        -1.0,
        1.0,
        -1.0 / aspect_ratio,
        1.0 / aspect_ratio,
        -1.0,
        1.0,
    )
}
