//! Null input backend

use crate::driver::{InputDescriptor, InputDevice, InputDriver, JoypadButtons};
use rp_core::Capabilities;

/// Input backend with no devices attached
///
/// Buttons can be held programmatically, which the headless frontend uses
/// to script input.
#[derive(Debug, Default)]
pub struct NullInput {
    held: JoypadButtons,
    polls: u64,
}

impl NullInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry entry for this backend
    pub fn descriptor() -> InputDescriptor {
        InputDescriptor::new("null", Capabilities::empty(), |_| {
            Some(Box::new(NullInput::new()) as Box<dyn InputDriver>)
        })
    }

    /// Hold or release buttons on port 0
    pub fn set_held(&mut self, buttons: JoypadButtons, held: bool) {
        self.held.set(buttons, held);
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }
}

impl InputDriver for NullInput {
    fn poll(&mut self) {
        self.polls += 1;
    }

    fn state(&self, port: u32, device: InputDevice, _index: u32, id: u32) -> i16 {
        if port != 0 || device != InputDevice::Joypad {
            return 0;
        }
        JoypadButtons::from_id(id)
            .map(|button| self.held.contains(button) as i16)
            .unwrap_or(0)
    }

    fn key_pressed(&self, _key: u32) -> bool {
        false
    }

    fn free(&mut self) {
        tracing::debug!("Null input freed after {} polls", self.polls);
    }
}
