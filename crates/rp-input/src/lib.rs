//! Input-side drivers for retroplex
//!
//! Joypad/keyboard input plus the camera, location and on-screen keyboard
//! categories a core may request.

pub mod camera;
pub mod driver;
pub mod location;
pub mod null;
pub mod osk;

pub use camera::{CameraDescriptor, CameraDriver, CameraFrame, CameraParams, NullCamera};
pub use driver::{
    share, InputDescriptor, InputDevice, InputDriver, JoypadButtons, RumbleEffect, SensorAction,
    SharedInput,
};
pub use location::{LocationDescriptor, LocationDriver, NullLocation, Position};
pub use null::NullInput;
pub use osk::{NullOsk, OskDescriptor, OskDriver};
