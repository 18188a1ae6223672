//! Location driver interface

use rp_core::BackendDescriptor;

/// A position fix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy in meters
    pub horizontal_accuracy: f64,
    /// Vertical accuracy in meters
    pub vertical_accuracy: f64,
}

/// Location backend
pub trait LocationDriver: Send {
    /// Begin receiving position updates
    fn start(&mut self) -> bool;

    /// Stop receiving position updates
    fn stop(&mut self);

    /// Most recent fix, if any
    fn position(&mut self) -> Option<Position>;

    /// Minimum time (ms) and distance (m) between updates
    fn set_interval(&mut self, interval_ms: u32, interval_distance: u32);

    /// Release backend resources
    fn free(&mut self);
}

/// A registered location backend
pub type LocationDescriptor = BackendDescriptor<(), Box<dyn LocationDriver>>;

/// Location backend that never gets a fix
#[derive(Debug, Default)]
pub struct NullLocation {
    running: bool,
    interval_ms: u32,
    interval_distance: u32,
}

impl NullLocation {
    /// Registry entry for this backend
    pub fn descriptor() -> LocationDescriptor {
        LocationDescriptor::new("null", rp_core::Capabilities::empty(), |_| {
            Some(Box::new(NullLocation::default()) as Box<dyn LocationDriver>)
        })
    }
}

impl LocationDriver for NullLocation {
    fn start(&mut self) -> bool {
        self.running = true;
        true
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn position(&mut self) -> Option<Position> {
        None
    }

    fn set_interval(&mut self, interval_ms: u32, interval_distance: u32) {
        tracing::debug!("Location interval: {} ms, {} m", interval_ms, interval_distance);
        self.interval_ms = interval_ms;
        self.interval_distance = interval_distance;
    }

    fn free(&mut self) {
        self.running = false;
    }
}
