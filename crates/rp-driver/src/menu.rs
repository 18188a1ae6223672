//! Menu driver interface
//!
//! The menu draws through the active video backend, so it is told when the
//! graphics context goes away and comes back. Unlike the other categories
//! it normally survives driver reinits.

use rp_core::{BackendDescriptor, Capabilities};

/// Menu backend
pub trait MenuDriver: Send {
    /// Graphics context is usable again, recreate GPU resources
    fn context_reset(&mut self) {}

    /// Graphics context is about to go away
    fn context_destroy(&mut self) {}

    /// Advance the menu by one frame, returns `false` once it wants to close.
    fn iterate(&mut self, frame_count: u64) -> bool;

    /// Release backend resources
    fn free(&mut self);
}

/// A registered menu backend
pub type MenuDescriptor = BackendDescriptor<(), Box<dyn MenuDriver>>;

/// Menu that renders nothing
#[derive(Debug, Default)]
pub struct NullMenu {
    context_resets: u32,
}

impl NullMenu {
    /// Registry entry for this backend
    pub fn descriptor() -> MenuDescriptor {
        MenuDescriptor::new("null", Capabilities::empty(), |_| {
            Some(Box::new(NullMenu::default()) as Box<dyn MenuDriver>)
        })
    }
}

impl MenuDriver for NullMenu {
    fn context_reset(&mut self) {
        self.context_resets += 1;
    }

    fn iterate(&mut self, _frame_count: u64) -> bool {
        true
    }

    fn free(&mut self) {
        tracing::debug!("Null menu freed after {} context resets", self.context_resets);
    }
}
