use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Projector gallery viewer: dwell hotspots over a pose-gated scene", version)]
pub struct Args {
    /// Gallery parameter file (marker, hotspot, zoom and projector settings)
    #[arg(long, default_value = "galleryParameters.txt")]
    pub params: PathBuf,

    /// Projector intrinsics file; missing or malformed files keep the
    /// built-in pinhole defaults
    #[arg(long, default_value = "ProjectorCalibration.txt")]
    pub calibration: PathBuf,

    /// Directory scanned (non-recursively) for gallery images
    #[arg(long, default_value = "images")]
    pub images: PathBuf,

    /// Cap on the number of images loaded; 0 means unlimited
    #[arg(long, default_value_t = 0)]
    pub max_images: usize,

    /// Override the configured dwell delay, in pointer frames
    #[arg(long)]
    pub delay_frames: Option<u32>,

    /// Load everything and print a summary without opening a window
    #[arg(long)]
    pub headless: bool,
}
