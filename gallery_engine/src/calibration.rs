//! Projector calibration record: the 3x3 pinhole intrinsic matrix, row-major,
//! read from a single-line calibration file. A malformed or missing file
//! leaves the prior in-memory values untouched.

use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::config::{DEFAULT_PROJECTOR_HEIGHT, DEFAULT_PROJECTOR_WIDTH};

/// Row-major intrinsics: `[fx, skew, cx, 0, fy, cy, 0, 0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectorCalibration {
    pub k: [f32; 9],
}

impl Default for ProjectorCalibration {
    /// Centered pinhole with focal length equal to the default projector
    /// width, so an uncalibrated setup still projects sensibly.
    fn default() -> Self {
        let fx = DEFAULT_PROJECTOR_WIDTH as f32;
        let cx = DEFAULT_PROJECTOR_WIDTH as f32 / 2.0;
        let cy = DEFAULT_PROJECTOR_HEIGHT as f32 / 2.0;
        Self {
            k: [fx, 0.0, cx, 0.0, fx, cy, 0.0, 0.0, 1.0],
        }
    }
}

impl ProjectorCalibration {
    /// Re-reads the calibration file. On any failure the current values stay
    /// in place; nothing is raised.
    pub fn refresh_from_file(&mut self, path: &Path) {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(
                    "calibration {} unavailable ({err}); keeping prior intrinsics",
                    path.display()
                );
                return;
            }
        };

        let first_line = text.lines().next().unwrap_or("");
        match parse_intrinsics(first_line) {
            Some(k) => {
                self.k = k;
                debug!("loaded projector intrinsics from {}", path.display());
            }
            None => warn!(
                "calibration {} is malformed; keeping prior intrinsics",
                path.display()
            ),
        }
    }
}

/// Parses exactly nine whitespace-separated floats.
pub fn parse_intrinsics(line: &str) -> Option<[f32; 9]> {
    let mut k = [0.0f32; 9];
    let mut count = 0;
    for token in line.split_whitespace() {
        if count == 9 {
            return None;
        }
        k[count] = token.parse::<f32>().ok()?;
        count += 1;
    }
    if count == 9 {
        Some(k)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn parses_nine_floats() {
        let k = parse_intrinsics("1000 0 640 0 1000 360 0 0 1").expect("intrinsics");
        assert!((k[0] - 1000.0).abs() < 1e-6);
        assert!((k[2] - 640.0).abs() < 1e-6);
        assert!((k[8] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_wrong_counts_and_garbage() {
        assert!(parse_intrinsics("1 2 3").is_none());
        assert!(parse_intrinsics("1 2 3 4 5 6 7 8 9 10").is_none());
        assert!(parse_intrinsics("a b c d e f g h i").is_none());
        assert!(parse_intrinsics("").is_none());
    }

    #[test]
    fn malformed_file_keeps_prior_values() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("ProjectorCalibration.txt");
        fs::write(&path, "not a calibration line\n").expect("write file");

        let mut calibration = ProjectorCalibration::default();
        let before = calibration;
        calibration.refresh_from_file(&path);
        assert_eq!(calibration, before);
    }

    #[test]
    fn missing_file_keeps_prior_values() {
        let mut calibration = ProjectorCalibration { k: [2.0; 9] };
        calibration.refresh_from_file(Path::new("/nonexistent/calibration.txt"));
        assert_eq!(calibration.k, [2.0; 9]);
    }

    #[test]
    fn valid_file_replaces_intrinsics() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("ProjectorCalibration.txt");
        fs::write(&path, "800 0 400 0 800 300 0 0 1\n").expect("write file");

        let mut calibration = ProjectorCalibration::default();
        calibration.refresh_from_file(&path);
        assert!((calibration.k[0] - 800.0).abs() < 1e-6);
        assert!((calibration.k[5] - 300.0).abs() < 1e-6);
    }
}
