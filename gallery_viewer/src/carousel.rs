//! The circular image list behind the gallery: an ordered set of surface
//! images with a wrapping cursor. Discovery walks the configured directory;
//! when nothing usable is found the built-in placeholder keeps the carousel
//! non-empty, so the cursor is always valid.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::texture::SurfaceImage;

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

pub struct ImageCarousel {
    images: Vec<SurfaceImage>,
    cursor: usize,
}

impl ImageCarousel {
    /// Builds the carousel from a directory of images. Files that fail to
    /// decode are skipped with a warning; an empty result falls back to the
    /// single built-in image.
    pub fn load(dir: &Path, max_images: usize) -> Self {
        let mut images = Vec::new();
        for path in discover_images(dir) {
            if max_images > 0 && images.len() == max_images {
                break;
            }
            match SurfaceImage::from_file(&path) {
                Ok(image) => {
                    debug!("carousel image: {}", path.display());
                    images.push(image);
                }
                Err(err) => warn!("skipping {}: {err:?}", path.display()),
            }
        }
        Self::from_images(images)
    }

    /// Wraps an already-decoded image list, inserting the fallback if it is
    /// empty. This is the invariant the rest of the pipeline leans on:
    /// `len() >= 1` always.
    pub fn from_images(images: Vec<SurfaceImage>) -> Self {
        let images = if images.is_empty() {
            warn!("no gallery images found; using the built-in image");
            vec![SurfaceImage::placeholder()]
        } else {
            images
        };
        Self { images, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> &SurfaceImage {
        &self.images[self.cursor]
    }

    pub fn next(&mut self) -> &SurfaceImage {
        self.cursor = (self.cursor + 1) % self.images.len();
        self.current()
    }

    pub fn prev(&mut self) -> &SurfaceImage {
        self.cursor = (self.cursor + self.images.len() - 1) % self.images.len();
        self.current()
    }

    /// Uploads every image; called from GPU setup and after surface
    /// recreation so cursor changes later are pure bind-group swaps.
    pub fn realize_all(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
    ) {
        for image in &mut self.images {
            image.realize(device, queue, layout, sampler);
        }
    }
}

fn discover_images(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_image_extension(path))
        .collect();
    found.sort();
    if found.is_empty() {
        warn!("no image files under {}", dir.display());
    }
    found
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lower = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.iter().any(|known| *known == lower)
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn tiny_image(label: &str) -> SurfaceImage {
        SurfaceImage::from_rgba(label.to_string(), vec![0u8; 4 * 4], 2, 2).expect("image")
    }

    #[test]
    fn empty_carousel_gets_the_fallback_image() {
        let carousel = ImageCarousel::from_images(Vec::new());
        assert_eq!(carousel.len(), 1);
        assert_eq!(carousel.current().label(), "builtin-placeholder");
    }

    #[test]
    fn next_then_prev_round_trips() {
        let mut carousel =
            ImageCarousel::from_images(vec![tiny_image("a"), tiny_image("b"), tiny_image("c")]);
        for start in 0..3 {
            assert_eq!(carousel.cursor(), start);
            carousel.next();
            carousel.prev();
            assert_eq!(carousel.cursor(), start);
            carousel.next();
        }
    }

    #[test]
    fn cursor_wraps_in_both_directions() {
        let mut carousel = ImageCarousel::from_images(vec![tiny_image("a"), tiny_image("b")]);
        assert_eq!(carousel.prev().label(), "b");
        assert_eq!(carousel.next().label(), "a");
        assert_eq!(carousel.next().label(), "b");
        assert_eq!(carousel.next().label(), "a");
    }

    #[test]
    fn single_image_carousel_is_a_fixed_point() {
        let mut carousel = ImageCarousel::from_images(vec![tiny_image("only")]);
        carousel.next();
        carousel.prev();
        assert_eq!(carousel.cursor(), 0);
    }

    #[test]
    fn discovery_filters_by_extension_and_sorts() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("b.png"), b"not a real png").expect("write");
        fs::write(dir.path().join("a.jpg"), b"not a real jpg").expect("write");
        fs::write(dir.path().join("notes.txt"), b"skip me").expect("write");
        fs::create_dir(dir.path().join("nested")).expect("mkdir");
        fs::write(dir.path().join("nested/c.png"), b"too deep").expect("write");

        let found = discover_images(dir.path());
        let names: Vec<_> = found
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn undecodable_files_fall_back_to_placeholder() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("broken.png"), b"garbage").expect("write");
        let carousel = ImageCarousel::load(dir.path(), 0);
        assert_eq!(carousel.len(), 1);
        assert_eq!(carousel.current().label(), "builtin-placeholder");
    }

    #[test]
    fn max_images_caps_the_load() {
        let dir = tempfile::tempdir().expect("temp dir");
        // Minimal valid 1x1 BMP so decoding succeeds.
        let bmp: &[u8] = &[
            0x42, 0x4D, 0x3A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x36, 0x00, 0x00, 0x00,
            0x28, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00,
            0x18, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x13, 0x0B, 0x00, 0x00,
            0x13, 0x0B, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0xFF, 0x00,
        ];
        fs::write(dir.path().join("a.bmp"), bmp).expect("write");
        fs::write(dir.path().join("b.bmp"), bmp).expect("write");
        fs::write(dir.path().join("c.bmp"), bmp).expect("write");

        let carousel = ImageCarousel::load(dir.path(), 2);
        assert_eq!(carousel.len(), 2);
    }
}
