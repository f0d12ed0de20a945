//! The hotspot interaction engine: owns the hotspots built from the gallery
//! parameters, fans every pointer sample out to each of them, and routes
//! their selection events to a single listener channel.

use std::sync::mpsc::Sender;

use log::{debug, warn};

use crate::config::GalleryConfig;
use crate::hotspot::{Hotspot, HotspotId, HotspotShape, HotspotSprite};

pub struct UiLayer {
    spots: Vec<Hotspot>,
    aspect_ratio: f32,
    listener: Option<Sender<HotspotId>>,
}

impl Default for UiLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl UiLayer {
    pub fn new() -> Self {
        Self {
            spots: Vec::with_capacity(4),
            aspect_ratio: 1.0,
            listener: None,
        }
    }

    /// Rebuilds the hotspot set from the configured flat coordinate list.
    /// Coordinates are normalized [0,1]x[0,1] screen space and land in
    /// centered device space under the current aspect ratio. An odd-length
    /// list yields zero hotspots; that is logged, not raised.
    pub fn configure(&mut self, config: &GalleryConfig) {
        self.spots.clear();

        let coords = &config.hotspots;
        if coords.len() % 2 != 0 {
            warn!(
                "hotspot list has odd length {}; no hotspots configured",
                coords.len()
            );
            return;
        }

        for (index, pair) in coords.chunks_exact(2).enumerate() {
            let Some(id) = HotspotId::from_index(index) else {
                warn!("ignoring extra hotspot coordinates beyond slot {index}");
                break;
            };
            self.add_spot(id, pair[0], pair[1], config.hotspot_size, config.hotspot_delay);
        }
        debug!("ui layer configured with {} hotspots", self.spots.len());
    }

    /// Forwards one pointer sample to every hotspot in draw order. Hotspots
    /// do not exclude each other; several can dwell simultaneously.
    pub fn on_pointer_event(&mut self, x: f32, y: f32) {
        for spot in &mut self.spots {
            spot.on_pointer_event(x, y);
        }
    }

    /// Replaces the selection listener for all current and future hotspots.
    pub fn set_listener(&mut self, listener: Sender<HotspotId>) {
        for spot in &mut self.spots {
            spot.set_listener(listener.clone());
        }
        self.listener = Some(listener);
    }

    /// Aspect ratio used for the normalized-to-device conversion; callers
    /// re-run `configure` after changing it so positions stay correct.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    pub fn spots(&self) -> &[Hotspot] {
        &self.spots
    }

    pub fn sprites(&self) -> Vec<HotspotSprite> {
        self.spots.iter().map(Hotspot::sprite).collect()
    }

    fn add_spot(&mut self, id: HotspotId, x: f32, y: f32, size: f32, delay: u32) {
        let dx = 2.0 * x - 1.0;
        let dy = (-2.0 * y + 1.0) / self.aspect_ratio;
        let mut spot = Hotspot::new(id, HotspotShape::Circle);
        spot.configure(dx, dy, size, delay);
        if let Some(listener) = &self.listener {
            spot.set_listener(listener.clone());
        }
        self.spots.push(spot);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    fn config_with_spots(coords: &[f32]) -> GalleryConfig {
        GalleryConfig {
            hotspots: coords.to_vec(),
            ..GalleryConfig::default()
        }
    }

    #[test]
    fn configure_maps_normalized_coordinates_to_device_space() {
        let mut ui = UiLayer::new();
        ui.set_aspect_ratio(1.0);
        ui.configure(&config_with_spots(&[0.1, 0.1, 0.9, 0.9]));

        let spots = ui.spots();
        assert_eq!(spots.len(), 2);
        assert_eq!(spots[0].id(), HotspotId::Prev);
        assert_eq!(spots[1].id(), HotspotId::ZoomIn);

        let first = spots[0].sprite();
        let second = spots[1].sprite();
        assert!((first.center[0] + 0.8).abs() < 1e-6);
        assert!((first.center[1] - 0.8).abs() < 1e-6);
        assert!((second.center[0] - 0.8).abs() < 1e-6);
        assert!((second.center[1] + 0.8).abs() < 1e-6);
    }

    #[test]
    fn aspect_ratio_divides_device_y() {
        let mut ui = UiLayer::new();
        ui.set_aspect_ratio(2.0);
        ui.configure(&config_with_spots(&[0.0, 0.0]));
        let sprite = ui.spots()[0].sprite();
        assert!((sprite.center[0] + 1.0).abs() < 1e-6);
        assert!((sprite.center[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn odd_length_list_yields_zero_hotspots() {
        let mut ui = UiLayer::new();
        ui.configure(&config_with_spots(&[0.1, 0.2, 0.3]));
        assert!(ui.spots().is_empty());
    }

    #[test]
    fn identities_assigned_in_declaration_order() {
        let mut ui = UiLayer::new();
        ui.configure(&config_with_spots(&[
            0.1, 0.5, 0.3, 0.5, 0.7, 0.5, 0.9, 0.5,
        ]));
        let ids: Vec<_> = ui.spots().iter().map(|s| s.id()).collect();
        assert_eq!(
            ids,
            vec![
                HotspotId::Prev,
                HotspotId::ZoomIn,
                HotspotId::Next,
                HotspotId::ZoomOut
            ]
        );
    }

    #[test]
    fn listener_applies_to_spots_configured_later() {
        let (tx, rx) = mpsc::channel();
        let mut ui = UiLayer::new();
        ui.set_listener(tx);

        let mut config = config_with_spots(&[0.5, 0.5]);
        config.hotspot_delay = 2;
        ui.configure(&config);

        // Center of the screen maps to the device origin.
        ui.on_pointer_event(0.0, 0.0);
        ui.on_pointer_event(0.0, 0.0);
        assert_eq!(rx.try_recv(), Ok(HotspotId::Prev));
    }

    #[test]
    fn pointer_fans_out_to_overlapping_hotspots() {
        let (tx, rx) = mpsc::channel();
        let mut ui = UiLayer::new();
        let mut config = config_with_spots(&[0.5, 0.5, 0.5, 0.5]);
        config.hotspot_delay = 1;
        ui.configure(&config);
        ui.set_listener(tx);

        ui.on_pointer_event(0.0, 0.0);
        let fired: Vec<_> = rx.try_iter().collect();
        assert_eq!(fired, vec![HotspotId::Prev, HotspotId::ZoomIn]);
    }
}
