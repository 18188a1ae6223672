//! Backend features a core reaches through the frontend
//!
//! Each call is forwarded to the active backend if it advertises the
//! matching capability and answers with a neutral value otherwise.

use crate::context::RuntimeContext;
use rp_core::Capabilities;
use rp_input::{CameraFrame, InputDevice, Position, RumbleEffect, SensorAction};

impl RuntimeContext {
    pub fn driver_set_rumble_state(&mut self, port: u32, effect: RumbleEffect, strength: u16) -> bool {
        match self.input.as_mut() {
            Some(input) if input.supports(Capabilities::RUMBLE) => {
                input.with(|i| i.set_rumble(port, effect, strength))
            }
            _ => false,
        }
    }

    pub fn driver_set_sensor_state(&mut self, port: u32, action: SensorAction, rate: u32) -> bool {
        match self.input.as_mut() {
            Some(input) if input.supports(Capabilities::SENSORS) => {
                input.with(|i| i.set_sensor_state(port, action, rate))
            }
            _ => false,
        }
    }

    pub fn driver_sensor_get_input(&mut self, port: u32, id: u32) -> f32 {
        match self.input.as_mut() {
            Some(input) if input.supports(Capabilities::SENSORS) => input.with(|i| i.sensor_input(port, id)),
            _ => 0.0,
        }
    }

    /// Current state of one input, `0` without an input driver
    pub fn input_state(&mut self, port: u32, device: InputDevice, index: u32, id: u32) -> i16 {
        self.input
            .as_mut()
            .map_or(0, |input| input.with(|i| i.state(port, device, index, id)))
    }

    /// Framebuffer a hardware-rendering core draws into, `0` if the video
    /// backend has none.
    pub fn driver_get_current_framebuffer(&mut self) -> usize {
        match self.video.as_mut() {
            Some(video) if video.supports(Capabilities::FBO | Capabilities::POKE) => {
                video.with(|v| v.poke().map_or(0, |poke| poke.current_framebuffer()))
            }
            _ => 0,
        }
    }

    /// Graphics API entry point for a hardware-rendering core
    pub fn driver_get_proc_address(&mut self, symbol: &str) -> Option<usize> {
        match self.video.as_mut() {
            Some(video) if video.supports(Capabilities::FBO | Capabilities::POKE) => {
                video.with(|v| v.poke().and_then(|poke| poke.proc_address(symbol)))
            }
            _ => None,
        }
    }

    pub fn camera_start(&mut self) -> bool {
        self.camera.as_mut().is_some_and(|camera| camera.with(|c| c.start()))
    }

    pub fn camera_stop(&mut self) {
        if let Some(camera) = self.camera.as_mut() {
            camera.with(|c| c.stop());
        }
    }

    /// Hand captured camera frames to `on_frame`.
    pub fn camera_poll(&mut self, on_frame: &mut dyn FnMut(CameraFrame<'_>)) -> bool {
        self.camera
            .as_mut()
            .is_some_and(|camera| camera.with(|c| c.poll(on_frame)))
    }

    pub fn location_start(&mut self) -> bool {
        self.location.as_mut().is_some_and(|location| location.with(|l| l.start()))
    }

    pub fn location_stop(&mut self) {
        if let Some(location) = self.location.as_mut() {
            location.with(|l| l.stop());
        }
    }

    pub fn location_set_interval(&mut self, interval_ms: u32, interval_distance: u32) {
        if let Some(location) = self.location.as_mut() {
            location.with(|l| l.set_interval(interval_ms, interval_distance));
        }
    }

    pub fn location_position(&mut self) -> Option<Position> {
        self.location.as_mut().and_then(|location| location.with(|l| l.position()))
    }

    /// Show the on-screen keyboard.
    pub fn osk_open(&mut self, title: &str, initial: &str) -> bool {
        self.osk.as_mut().is_some_and(|osk| osk.with(|o| o.open(title, initial)))
    }

    /// Text confirmed on the on-screen keyboard
    pub fn osk_text(&mut self) -> Option<String> {
        self.osk
            .as_mut()
            .and_then(|osk| osk.with(|o| o.text().map(str::to_string)))
    }

    pub fn osk_close(&mut self) {
        if let Some(osk) = self.osk.as_mut() {
            osk.with(|o| o.close());
        }
    }

    /// Advance the menu, `false` once it wants to close.
    pub fn menu_iterate(&mut self) -> bool {
        let frame_count = self.frame_count;
        self.menu.as_mut().is_some_and(|menu| menu.with(|m| m.iterate(frame_count)))
    }
}
