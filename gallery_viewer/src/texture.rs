//! Surface images: decoded RGBA bitmaps bound to the textured quad. Decoding
//! happens up front; the GPU texture and bind group are materialized during
//! setup and again whenever the surface is recreated. A procedurally built
//! test card stands in when no usable image exists.

use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result, ensure};

const PLACEHOLDER_SIDE: u32 = 256;

struct GpuTexture {
    _texture: wgpu::Texture,
    _view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

pub struct SurfaceImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
    aspect_ratio: f32,
    label: String,
    gpu: Option<GpuTexture>,
}

impl SurfaceImage {
    pub fn from_rgba(label: String, data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        ensure!(width > 0 && height > 0, "image {label} has no dimensions");
        ensure!(
            data.len() == (width as usize) * (height as usize) * 4,
            "image {label}: RGBA buffer {} does not match {}x{}",
            data.len(),
            width,
            height
        );
        Ok(Self {
            data,
            width,
            height,
            aspect_ratio: width as f32 / height as f32,
            label,
            gpu: None,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let decoded = image::open(path)
            .with_context(|| format!("decoding image {}", path.display()))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_rgba(label, decoded.into_raw(), width, height)
    }

    /// The built-in fallback: a checker test card with a diagonal gradient,
    /// distinct enough to make a missing image directory obvious on the wall.
    pub fn placeholder() -> Self {
        let side = PLACEHOLDER_SIDE;
        let mut data = vec![0u8; (side * side * 4) as usize];
        for y in 0..side {
            for x in 0..side {
                let idx = ((y * side + x) * 4) as usize;
                let checker = ((x / 32) + (y / 32)) % 2 == 0;
                let ramp = ((x + y) * 255 / (2 * side - 2)) as u8;
                data[idx] = if checker { ramp } else { 255 - ramp };
                data[idx + 1] = if checker { 0x30 } else { 0xB0 };
                data[idx + 2] = ramp;
                data[idx + 3] = 0xFF;
            }
        }
        Self {
            data,
            width: side,
            height: side,
            aspect_ratio: 1.0,
            label: "builtin-placeholder".to_string(),
            gpu: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Uploads the bitmap and builds the bind group. Re-run on surface
    /// recreation; a later carousel swap only rebinds the existing group.
    pub fn realize(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
    ) {
        let extent = wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("surface-image-{}", self.label)),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let upload = align_rgba_rows(self.width, self.height, &self.data);
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            upload.pixels(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(upload.bytes_per_row()),
                rows_per_image: Some(self.height),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("surface-image-bind-{}", self.label)),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        self.gpu = Some(GpuTexture {
            _texture: texture,
            _view: view,
            bind_group,
        });
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().map(|gpu| &gpu.bind_group)
    }
}

pub struct RgbaUpload<'a> {
    data: Cow<'a, [u8]>,
    bytes_per_row: u32,
}

impl<'a> RgbaUpload<'a> {
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.bytes_per_row
    }
}

/// Pads RGBA rows out to the copy alignment wgpu requires; rows that are
/// already aligned borrow the source buffer untouched.
pub fn align_rgba_rows(width: u32, height: u32, data: &[u8]) -> RgbaUpload<'_> {
    let row_bytes = 4 * width as usize;
    let alignment = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize;
    if row_bytes % alignment == 0 {
        return RgbaUpload {
            data: Cow::Borrowed(data),
            bytes_per_row: row_bytes as u32,
        };
    }

    let padded_row_bytes = row_bytes.div_ceil(alignment) * alignment;
    let mut buffer = vec![0u8; padded_row_bytes * height as usize];
    for row in 0..height as usize {
        let src = row * row_bytes;
        let dst = row * padded_row_bytes;
        buffer[dst..dst + row_bytes].copy_from_slice(&data[src..src + row_bytes]);
    }
    RgbaUpload {
        data: Cow::Owned(buffer),
        bytes_per_row: padded_row_bytes as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_square_and_opaque() {
        let image = SurfaceImage::placeholder();
        assert_eq!(image.width(), PLACEHOLDER_SIDE);
        assert_eq!(image.height(), PLACEHOLDER_SIDE);
        assert!((image.aspect_ratio() - 1.0).abs() < 1e-6);
        assert!(image.data.chunks(4).all(|px| px[3] == 0xFF));
    }

    #[test]
    fn from_rgba_rejects_mismatched_buffers() {
        assert!(SurfaceImage::from_rgba("bad".into(), vec![0u8; 7], 2, 2).is_err());
        assert!(SurfaceImage::from_rgba("empty".into(), Vec::new(), 0, 4).is_err());
    }

    #[test]
    fn from_rgba_computes_aspect_ratio() {
        let image =
            SurfaceImage::from_rgba("wide".into(), vec![0u8; 8 * 4 * 4], 8, 4).expect("image");
        assert!((image.aspect_ratio() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn aligned_rows_are_borrowed() {
        // 64 pixels * 4 bytes = 256 bytes per row, exactly one alignment unit.
        let data = vec![0xAB; 64 * 2 * 4];
        let upload = align_rgba_rows(64, 2, &data);
        assert_eq!(upload.bytes_per_row(), 256);
        assert!(matches!(upload.data, Cow::Borrowed(_)));
    }

    #[test]
    fn unaligned_rows_are_padded() {
        let data: Vec<u8> = (0..3 * 2 * 4).map(|i| i as u8).collect();
        let upload = align_rgba_rows(3, 2, &data);
        assert_eq!(upload.bytes_per_row() % wgpu::COPY_BYTES_PER_ROW_ALIGNMENT, 0);
        let row = upload.bytes_per_row() as usize;
        assert_eq!(&upload.pixels()[..12], &data[..12]);
        assert_eq!(&upload.pixels()[row..row + 12], &data[12..24]);
    }
}
