//! Gallery parameter record. Parsed from the projector's parameter file, a
//! flat `key value` / `key=value` listing. Every key is optional: malformed
//! values are logged and the built-in default is retained, so configuration
//! loading can never fail.

use std::fs;
use std::path::Path;

use log::{debug, warn};

pub const DEFAULT_PROJECTOR_WIDTH: u32 = 1280;
pub const DEFAULT_PROJECTOR_HEIGHT: u32 = 720;

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryConfig {
    /// Screen-space half-extent of the pointer cursor cross.
    pub marker_size: f32,
    /// Cursor arm thickness, as a percentage of the arm length.
    pub marker_thickness: f32,
    pub hotspot_size: f32,
    /// Dwell activation delay in pointer samples.
    pub hotspot_delay: u32,
    /// Flat list of normalized (x, y) hotspot centers.
    pub hotspots: Vec<f32>,
    pub scene_offset: [f32; 3],
    pub zoom: f32,
    pub zoom_step: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub projector_width: u32,
    pub projector_height: u32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            marker_size: 0.05,
            marker_thickness: 2.0,
            hotspot_size: 0.2,
            hotspot_delay: 30,
            hotspots: Vec::new(),
            scene_offset: [0.0, 0.0, 0.0],
            zoom: 1.0,
            zoom_step: 4.0,
            zoom_min: 20.0,
            zoom_max: 50.0,
            projector_width: DEFAULT_PROJECTOR_WIDTH,
            projector_height: DEFAULT_PROJECTOR_HEIGHT,
        }
    }
}

impl GalleryConfig {
    /// Reads the parameter file, falling back to defaults when it is missing
    /// or unreadable.
    pub fn load(path: &Path) -> Self {
        let mut config = Self::default();
        match fs::read_to_string(path) {
            Ok(text) => {
                config.apply(&text);
                debug!("loaded gallery parameters from {}", path.display());
            }
            Err(err) => {
                warn!(
                    "gallery parameters {} unavailable ({err}); using defaults",
                    path.display()
                );
            }
        }
        config
    }

    /// Applies `key value` lines on top of the current record. Unrecognized
    /// keys are ignored; unparsable values keep the prior setting.
    pub fn apply(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let (key, value) = match split_entry(line) {
                Some(pair) => pair,
                None => continue,
            };
            self.apply_entry(key, value);
        }
    }

    fn apply_entry(&mut self, key: &str, value: &str) {
        match key {
            "-markerSize" => merge_f32(&mut self.marker_size, key, value),
            "-markerThickness" => merge_f32(&mut self.marker_thickness, key, value),
            "-hotSpotSize" => merge_f32(&mut self.hotspot_size, key, value),
            "-hotSpotActionDelay" => merge_u32(&mut self.hotspot_delay, key, value),
            "-hotSpots" => match parse_float_list(value) {
                Some(coords) => self.hotspots = coords,
                None => warn!("ignoring malformed {key} value '{value}'"),
            },
            "-objX" => merge_f32(&mut self.scene_offset[0], key, value),
            "-objY" => merge_f32(&mut self.scene_offset[1], key, value),
            "-objZ" => merge_f32(&mut self.scene_offset[2], key, value),
            "-objScale" => merge_f32(&mut self.zoom, key, value),
            "-objScaleStep" => merge_f32(&mut self.zoom_step, key, value),
            "-objScaleMin" => merge_f32(&mut self.zoom_min, key, value),
            "-objScaleMax" => merge_f32(&mut self.zoom_max, key, value),
            "-projW" => merge_u32(&mut self.projector_width, key, value),
            "-projH" => merge_u32(&mut self.projector_height, key, value),
            _ => debug!("ignoring unrecognized parameter key '{key}'"),
        }
    }
}

/// Splits a parameter line at the first `=`, `:` or run of whitespace.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let split_at = line.find(['=', ':']).or_else(|| line.find(char::is_whitespace))?;
    let key = line[..split_at].trim();
    let value = line[split_at + 1..].trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

fn merge_f32(slot: &mut f32, key: &str, value: &str) {
    match value.trim().parse::<f32>() {
        Ok(parsed) => *slot = parsed,
        Err(_) => warn!("ignoring malformed {key} value '{value}'"),
    }
}

fn merge_u32(slot: &mut u32, key: &str, value: &str) {
    match value.trim().parse::<u32>() {
        Ok(parsed) => *slot = parsed,
        Err(_) => warn!("ignoring malformed {key} value '{value}'"),
    }
}

fn parse_float_list(value: &str) -> Option<Vec<f32>> {
    value
        .split_whitespace()
        .map(|token| token.parse::<f32>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn defaults_match_builtins() {
        let config = GalleryConfig::default();
        assert_eq!(config.hotspot_delay, 30);
        assert!((config.hotspot_size - 0.2).abs() < 1e-6);
        assert!((config.zoom_step - 4.0).abs() < 1e-6);
        assert!(config.hotspots.is_empty());
    }

    #[test]
    fn apply_parses_recognized_keys() {
        let mut config = GalleryConfig::default();
        config.apply(
            "-hotSpotSize=0.15\n\
             -hotSpotActionDelay=45\n\
             -hotSpots=0.1 0.1 0.9 0.9\n\
             -objX=1.5\n\
             -objScaleMax=80\n\
             -projW=854\n\
             -projH=480\n",
        );
        assert!((config.hotspot_size - 0.15).abs() < 1e-6);
        assert_eq!(config.hotspot_delay, 45);
        assert_eq!(config.hotspots, vec![0.1, 0.1, 0.9, 0.9]);
        assert!((config.scene_offset[0] - 1.5).abs() < 1e-6);
        assert!((config.zoom_max - 80.0).abs() < 1e-6);
        assert_eq!(config.projector_width, 854);
        assert_eq!(config.projector_height, 480);
    }

    #[test]
    fn whitespace_separated_entries_parse_too() {
        let mut config = GalleryConfig::default();
        config.apply("-markerSize 0.1\n-markerThickness 3");
        assert!((config.marker_size - 0.1).abs() < 1e-6);
        assert!((config.marker_thickness - 3.0).abs() < 1e-6);
    }

    #[test]
    fn malformed_values_keep_defaults() {
        let mut config = GalleryConfig::default();
        config.apply("-hotSpotSize=abc\n-hotSpotActionDelay=-4\n-hotSpots=0.1 oops");
        assert!((config.hotspot_size - 0.2).abs() < 1e-6);
        assert_eq!(config.hotspot_delay, 30);
        assert!(config.hotspots.is_empty());
    }

    #[test]
    fn unrecognized_keys_are_ignored() {
        let mut config = GalleryConfig::default();
        config.apply("-somethingElse=12\n# comment line\n\n");
        assert_eq!(config, GalleryConfig::default());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = GalleryConfig::load(Path::new("/nonexistent/galleryParameters.txt"));
        assert_eq!(config, GalleryConfig::default());
    }

    #[test]
    fn load_reads_parameter_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("galleryParameters.txt");
        fs::write(&path, "-objScale=30\n-objScaleMin=10\n").expect("write params");
        let config = GalleryConfig::load(&path);
        assert!((config.zoom - 30.0).abs() < 1e-6);
        assert!((config.zoom_min - 10.0).abs() < 1e-6);
    }
}
