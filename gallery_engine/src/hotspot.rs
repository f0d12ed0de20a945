//! Dwell-activated hotspot state machine. Each hotspot is a screen-space
//! region with a frame counter: sustained pointer presence ramps a color cue
//! and fires a single selection event when the counter reaches the configured
//! delay. Leaving the region at any point resets the counter.

use std::sync::mpsc::Sender;

use log::{debug, warn};

/// Floor of the proximity alpha ramp; a hotspot never fades below this.
pub const MIN_ALPHA: f32 = 0.1;

// Constants of the logarithmic dwell brightening curve. Tunable visual
// values, chosen so the fill cue accelerates as the counter nears the delay.
const DWELL_RAMP_SLOPE: f64 = -9.0;
const DWELL_RAMP_OFFSET: f64 = 10.001;

/// Which gallery command a hotspot triggers. Identities are assigned in this
/// order when hotspots are built from the configured coordinate list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HotspotId {
    Prev,
    ZoomIn,
    Next,
    ZoomOut,
}

impl HotspotId {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(HotspotId::Prev),
            1 => Some(HotspotId::ZoomIn),
            2 => Some(HotspotId::Next),
            3 => Some(HotspotId::ZoomOut),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HotspotId::Prev => "prev",
            HotspotId::ZoomIn => "zoom-in",
            HotspotId::Next => "next",
            HotspotId::ZoomOut => "zoom-out",
        }
    }
}

/// Containment test variant. Both shapes share the Euclidean distance to the
/// hotspot center as the input to the proximity alpha ramp; only the
/// inside/outside decision differs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HotspotShape {
    Circle,
    Square,
}

impl HotspotShape {
    fn contains(self, dx: f32, dy: f32, size: f32) -> bool {
        match self {
            HotspotShape::Circle => (dx * dx + dy * dy).sqrt() < size,
            HotspotShape::Square => dx.abs() < size && dy.abs() < size,
        }
    }
}

/// Draw parameters derived from the current dwell state: a pure snapshot the
/// renderer turns into a translate/scale/tint without touching the machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HotspotSprite {
    pub center: [f32; 2],
    pub scale: f32,
    pub tint: [f32; 4],
}

pub struct Hotspot {
    id: HotspotId,
    shape: HotspotShape,
    x: f32,
    y: f32,
    size: f32,
    alpha_size: f32,
    delay: u32,
    counter: u32,
    hovering: bool,
    alpha: f32,
    color: [f32; 3],
    retrigger: bool,
    listener: Option<Sender<HotspotId>>,
}

impl Hotspot {
    pub fn new(id: HotspotId, shape: HotspotShape) -> Self {
        Self {
            id,
            shape,
            x: 0.0,
            y: 0.0,
            size: 1.0,
            alpha_size: 3.0,
            delay: 30,
            counter: 0,
            hovering: false,
            alpha: MIN_ALPHA,
            color: [1.0, 1.0, 1.0],
            retrigger: false,
            listener: None,
        }
    }

    /// Places the hotspot in device coordinates. The alpha ramp extends to
    /// three times the containment size.
    pub fn configure(&mut self, x: f32, y: f32, size: f32, delay: u32) {
        self.x = x;
        self.y = y;
        self.size = size;
        self.alpha_size = 3.0 * size;
        self.delay = delay;
        debug!(
            "hotspot {} [x:{:.2} y:{:.2}] size:{:.2} delay:{}",
            self.id.label(),
            x,
            y,
            size,
            delay
        );
    }

    /// Installs the selection listener. Last writer wins; an absent listener
    /// means selections are dropped.
    pub fn set_listener(&mut self, listener: Sender<HotspotId>) {
        self.listener = Some(listener);
    }

    pub fn set_retrigger(&mut self, retrigger: bool) {
        self.retrigger = retrigger;
    }

    pub fn id(&self) -> HotspotId {
        self.id
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Euclidean distance from the pointer to the hotspot center.
    pub fn distance(&self, x: f32, y: f32) -> f32 {
        let dx = x - self.x;
        let dy = y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_inside(&self, x: f32, y: f32) -> bool {
        self.shape.contains(x - self.x, y - self.y, self.size)
    }

    /// Advances the dwell machine by one pointer sample. The counter
    /// saturates at the delay and the selection event fires exactly once per
    /// upward crossing; with retrigger the counter resets so dwelling can
    /// restart in place.
    pub fn on_pointer_event(&mut self, x: f32, y: f32) {
        let d = self.distance(x, y);
        self.alpha = ((d - self.alpha_size) * ((1.0 - MIN_ALPHA) / -self.alpha_size) + MIN_ALPHA)
            .clamp(MIN_ALPHA, 1.0);

        let mut fired = false;
        if self.is_inside(x, y) {
            self.hovering = true;
            if self.counter < self.delay {
                self.counter += 1;
                fired = self.counter == self.delay;
                let value = f64::from(self.counter) / f64::from(self.delay);
                let ramp = (DWELL_RAMP_SLOPE * value + DWELL_RAMP_OFFSET).log10() as f32;
                self.color[0] = ramp;
                self.color[2] = ramp;
            } else {
                // Past the delay the selection has fired; the fill cue
                // returns to white while the pointer lingers.
                self.color = [1.0, 1.0, 1.0];
            }
        } else {
            self.hovering = false;
            self.reset();
        }

        if fired {
            if let Some(listener) = &self.listener {
                if listener.send(self.id).is_err() {
                    warn!("hotspot {}: selection listener is gone", self.id.label());
                }
            }
            if self.retrigger {
                self.reset();
            }
        }
    }

    pub fn sprite(&self) -> HotspotSprite {
        let tint = if self.hovering {
            [self.color[0], self.color[1], self.color[2], self.alpha]
        } else {
            [1.0, 1.0, 1.0, self.alpha]
        };
        HotspotSprite {
            center: [self.x, self.y],
            scale: self.size,
            tint,
        }
    }

    fn reset(&mut self) {
        self.counter = 0;
        self.color = [1.0, 1.0, 1.0];
    }
}
