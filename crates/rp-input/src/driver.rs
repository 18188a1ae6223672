//! Input driver interface

use bitflags::bitflags;
use parking_lot::Mutex;
use rp_core::BackendDescriptor;
use std::sync::Arc;

bitflags! {
    /// Joypad buttons, bit `n` is button id `n`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct JoypadButtons: u32 {
        const B      = 1 << 0;
        const Y      = 1 << 1;
        const SELECT = 1 << 2;
        const START  = 1 << 3;
        const UP     = 1 << 4;
        const DOWN   = 1 << 5;
        const LEFT   = 1 << 6;
        const RIGHT  = 1 << 7;
        const A      = 1 << 8;
        const X      = 1 << 9;
        const L      = 1 << 10;
        const R      = 1 << 11;
        const L2     = 1 << 12;
        const R2     = 1 << 13;
        const L3     = 1 << 14;
        const R3     = 1 << 15;
    }
}

impl JoypadButtons {
    /// Button for a joypad id, `None` past the last button.
    pub fn from_id(id: u32) -> Option<Self> {
        if id >= 16 {
            return None;
        }
        Self::from_bits(1 << id)
    }
}

/// Device class queried through [`InputDriver::state`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDevice {
    Joypad,
    Mouse,
    Keyboard,
    Lightgun,
    Analog,
    Pointer,
}

/// Rumble motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RumbleEffect {
    Strong,
    Weak,
}

/// Sensor request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorAction {
    AccelerometerEnable,
    AccelerometerDisable,
}

/// Input backend
pub trait InputDriver: Send {
    /// Refresh device state, once per frame
    fn poll(&mut self);

    /// Current state of one input
    fn state(&self, port: u32, device: InputDevice, index: u32, id: u32) -> i16;

    /// Whether a frontend key binding is held
    fn key_pressed(&self, key: u32) -> bool;

    /// Release backend resources
    fn free(&mut self);

    /// Drive a rumble motor (`RUMBLE`)
    fn set_rumble(&mut self, _port: u32, _effect: RumbleEffect, _strength: u16) -> bool {
        false
    }

    /// Enable or disable a sensor (`SENSORS`)
    fn set_sensor_state(&mut self, _port: u32, _action: SensorAction, _rate: u32) -> bool {
        false
    }

    /// Read one sensor axis (`SENSORS`)
    fn sensor_input(&self, _port: u32, _id: u32) -> f32 {
        0.0
    }
}

/// Input driver shared between the video backend that created it and the
/// frontend
pub type SharedInput = Arc<Mutex<Box<dyn InputDriver>>>;

/// Wrap an input driver so it can be handed out by a video backend.
pub fn share(driver: Box<dyn InputDriver>) -> SharedInput {
    Arc::new(Mutex::new(driver))
}

/// A registered input backend
pub type InputDescriptor = BackendDescriptor<(), Box<dyn InputDriver>>;
