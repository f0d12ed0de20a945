//! End-to-end dwell scenarios driven through the UI layer, mirroring the
//! pointer streams the pose feed delivers in practice.

use std::sync::mpsc;

use gallery_engine::{GalleryConfig, HotspotId, UiLayer};

fn centered_layer(delay: u32) -> (UiLayer, mpsc::Receiver<HotspotId>) {
    let (tx, rx) = mpsc::channel();
    let mut ui = UiLayer::new();
    ui.set_aspect_ratio(1.0);
    ui.set_listener(tx);
    let config = GalleryConfig {
        hotspots: vec![0.5, 0.5],
        hotspot_delay: delay,
        ..GalleryConfig::default()
    };
    ui.configure(&config);
    (ui, rx)
}

#[test]
fn thirty_samples_inside_then_five_outside_selects_once() {
    let (mut ui, rx) = centered_layer(30);

    for sample in 1..=30u32 {
        ui.on_pointer_event(0.0, 0.0);
        assert_eq!(ui.spots()[0].counter(), sample);
    }
    for _ in 0..5 {
        ui.on_pointer_event(0.9, 0.9);
        assert_eq!(ui.spots()[0].counter(), 0);
    }

    let selections: Vec<_> = rx.try_iter().collect();
    assert_eq!(selections, vec![HotspotId::Prev]);
}

#[test]
fn leaving_early_never_selects() {
    let (mut ui, rx) = centered_layer(30);

    for _ in 0..29 {
        ui.on_pointer_event(0.0, 0.0);
    }
    ui.on_pointer_event(0.9, 0.9);
    for _ in 0..29 {
        ui.on_pointer_event(0.0, 0.0);
    }

    assert!(rx.try_iter().next().is_none());
    assert_eq!(ui.spots()[0].counter(), 29);
}

#[test]
fn re_entry_after_selection_selects_again() {
    let (mut ui, rx) = centered_layer(5);

    for _ in 0..5 {
        ui.on_pointer_event(0.0, 0.0);
    }
    ui.on_pointer_event(0.9, 0.9);
    for _ in 0..5 {
        ui.on_pointer_event(0.0, 0.0);
    }

    let selections: Vec<_> = rx.try_iter().collect();
    assert_eq!(selections, vec![HotspotId::Prev, HotspotId::Prev]);
}

#[test]
fn hotspot_list_string_maps_to_device_corners() {
    let mut config = GalleryConfig::default();
    config.apply("-hotSpots=0.1 0.1 0.9 0.9");

    let mut ui = UiLayer::new();
    ui.set_aspect_ratio(1.0);
    ui.configure(&config);

    let sprites = ui.sprites();
    assert_eq!(sprites.len(), 2);
    assert!((sprites[0].center[0] + 0.8).abs() < 1e-6);
    assert!((sprites[0].center[1] - 0.8).abs() < 1e-6);
    assert!((sprites[1].center[0] - 0.8).abs() < 1e-6);
    assert!((sprites[1].center[1] + 0.8).abs() < 1e-6);
}
