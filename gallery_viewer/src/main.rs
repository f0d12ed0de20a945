mod carousel;
mod cli;
mod primitive;
mod renderer;
mod scene;
mod shaders;
mod texture;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gallery_engine::pose::{PoseFrame, TrackingStatus};
use gallery_engine::{GalleryConfig, ProjectorCalibration};
use log::info;
use pollster::FutureExt;
use wgpu::SurfaceError;
use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

use crate::carousel::ImageCarousel;
use crate::cli::Args;
use crate::renderer::GalleryRenderer;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = GalleryConfig::load(&args.params);
    if let Some(delay) = args.delay_frames {
        config.hotspot_delay = delay;
    }
    let mut calibration = ProjectorCalibration::default();
    calibration.refresh_from_file(&args.calibration);
    let carousel = ImageCarousel::load(&args.images, args.max_images);

    info!(
        "gallery: {} images from {}, {} hotspot coordinates, projector {}x{}",
        carousel.len(),
        args.images.display(),
        config.hotspots.len(),
        config.projector_width,
        config.projector_height,
    );

    if args.headless {
        println!(
            "loaded {} images; hotspot size {} delay {}; zoom {} in [{}, {}]",
            carousel.len(),
            config.hotspot_size,
            config.hotspot_delay,
            config.zoom,
            config.zoom_min,
            config.zoom_max,
        );
        return Ok(());
    }

    let event_loop = EventLoop::new().context("creating winit event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Projector Gallery")
            .with_inner_size(PhysicalSize::new(
                config.projector_width,
                config.projector_height,
            ))
            .build(&event_loop)
            .context("creating viewer window")?,
    );

    let mut state = GalleryRenderer::new(window, config, calibration, carousel).block_on()?;
    state.start();
    let poses = state.pose_sender();

    event_loop
        .run(move |event, target| {
            target.set_control_flow(ControlFlow::Wait);

            match event {
                Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                    match event {
                        WindowEvent::CloseRequested => {
                            state.stop();
                            target.exit();
                        }
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    logical_key,
                                    state: ElementState::Pressed,
                                    ..
                                },
                            ..
                        } => match logical_key {
                            Key::Named(NamedKey::Escape) => {
                                state.stop();
                                target.exit();
                            }
                            Key::Named(NamedKey::ArrowUp) => {
                                state.zoom_in();
                                state.window().request_redraw();
                            }
                            Key::Named(NamedKey::ArrowDown) => {
                                state.zoom_out();
                                state.window().request_redraw();
                            }
                            Key::Named(NamedKey::ArrowLeft) => {
                                state.prev();
                                state.window().request_redraw();
                            }
                            Key::Named(NamedKey::ArrowRight) => {
                                state.next();
                                state.window().request_redraw();
                            }
                            _ => {}
                        },
                        WindowEvent::MouseInput {
                            state: ElementState::Pressed,
                            button: MouseButton::Left,
                            ..
                        } => {
                            state.tracker_reset();
                            state.window().request_redraw();
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            let frame = pointer_frame(position, state.size(), state.aspect_ratio());
                            // Same queue an external tracker would feed; the
                            // render thread drains it before drawing.
                            let _ = poses.send(frame);
                            state.window().request_redraw();
                        }
                        WindowEvent::Resized(new_size) => {
                            state.resize(new_size);
                            state.window().request_redraw();
                        }
                        WindowEvent::RedrawRequested => match state.render() {
                            Ok(_) => {}
                            Err(SurfaceError::Lost) => state.resize(state.size()),
                            Err(SurfaceError::OutOfMemory) => target.exit(),
                            Err(err) => eprintln!("[gallery_viewer] render error: {err:?}"),
                        },
                        _ => {}
                    }
                }
                _ => {}
            }
        })
        .context("running viewer event loop")?;

    Ok(())
}

/// Stands in for the external tracker when driving the gallery with a mouse:
/// the pointer is always "tracking", positioned in the same centered device
/// space the hotspots live in.
fn pointer_frame(
    position: PhysicalPosition<f64>,
    size: PhysicalSize<u32>,
    aspect_ratio: f32,
) -> PoseFrame {
    let x = 2.0 * position.x as f32 / size.width.max(1) as f32 - 1.0;
    let y = (1.0 - 2.0 * position.y as f32 / size.height.max(1) as f32) / aspect_ratio;
    PoseFrame::new(TrackingStatus::Tracking, x, y)
}
