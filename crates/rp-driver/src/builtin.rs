//! Registries for every driver category

use crate::menu::{MenuDescriptor, NullMenu};
use crate::registry::Registry;
use rp_audio::{AudioDescriptor, NullAudioBackend};
use rp_core::DriverCategory;
use rp_input::{
    CameraDescriptor, InputDescriptor, LocationDescriptor, NullCamera, NullInput, NullLocation, NullOsk,
    OskDescriptor,
};
use rp_video::{NullVideoBackend, VideoDescriptor};

/// One registry per category
#[derive(Debug, Clone)]
pub struct Registries {
    pub audio: Registry<AudioDescriptor>,
    pub video: Registry<VideoDescriptor>,
    pub input: Registry<InputDescriptor>,
    pub camera: Registry<CameraDescriptor>,
    pub location: Registry<LocationDescriptor>,
    pub osk: Registry<OskDescriptor>,
    pub menu: Registry<MenuDescriptor>,
}

impl Registries {
    /// Registries with no backends at all
    pub fn empty() -> Self {
        Self {
            audio: Registry::new(DriverCategory::Audio),
            video: Registry::new(DriverCategory::Video),
            input: Registry::new(DriverCategory::Input),
            camera: Registry::new(DriverCategory::Camera),
            location: Registry::new(DriverCategory::Location),
            osk: Registry::new(DriverCategory::Osk),
            menu: Registry::new(DriverCategory::Menu),
        }
    }

    /// Every backend compiled into this build, preferred ones first
    pub fn builtin() -> Self {
        let mut registries = Self::empty();

        #[cfg(feature = "cpal")]
        registries.audio.register(rp_audio::CpalAudioBackend::descriptor());
        registries.audio.register(NullAudioBackend::descriptor());

        registries.video.register(NullVideoBackend::descriptor());
        registries.input.register(NullInput::descriptor());
        registries.camera.register(NullCamera::descriptor());
        registries.location.register(NullLocation::descriptor());
        registries.osk.register(NullOsk::descriptor());
        registries.menu.register(NullMenu::descriptor());

        registries
    }

    /// Backend identifiers per category, for `--list-drivers` style output
    pub fn summary(&self) -> Vec<(DriverCategory, Vec<&str>)> {
        vec![
            (DriverCategory::Video, self.video.names()),
            (DriverCategory::Input, self.input.names()),
            (DriverCategory::Audio, self.audio.names()),
            (DriverCategory::Camera, self.camera.names()),
            (DriverCategory::Location, self.location.names()),
            (DriverCategory::Osk, self.osk.names()),
            (DriverCategory::Menu, self.menu.names()),
        ]
    }
}

impl Default for Registries {
    fn default() -> Self {
        Self::builtin()
    }
}
