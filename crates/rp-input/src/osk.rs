//! On-screen keyboard driver interface

use rp_core::BackendDescriptor;

/// On-screen keyboard backend
pub trait OskDriver: Send {
    /// Show the keyboard with `initial` text and a `title`
    fn open(&mut self, title: &str, initial: &str) -> bool;

    /// Hide the keyboard
    fn close(&mut self);

    /// Text entered so far, `None` until the user confirms
    fn text(&self) -> Option<&str>;

    /// Release backend resources
    fn free(&mut self);
}

/// A registered on-screen keyboard backend
pub type OskDescriptor = BackendDescriptor<(), Box<dyn OskDriver>>;

/// Keyboard that confirms its initial text immediately
#[derive(Debug, Default)]
pub struct NullOsk {
    text: Option<String>,
}

impl NullOsk {
    /// Registry entry for this backend
    pub fn descriptor() -> OskDescriptor {
        OskDescriptor::new("null", rp_core::Capabilities::empty(), |_| {
            Some(Box::new(NullOsk::default()) as Box<dyn OskDriver>)
        })
    }
}

impl OskDriver for NullOsk {
    fn open(&mut self, _title: &str, initial: &str) -> bool {
        self.text = Some(initial.to_string());
        true
    }

    fn close(&mut self) {
        self.text = None;
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn free(&mut self) {
        self.text = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_osk_echoes_initial_text() {
        let mut osk = NullOsk::default();
        assert_eq!(osk.text(), None);
        assert!(osk.open("Name", "PLAYER"));
        assert_eq!(osk.text(), Some("PLAYER"));
        osk.close();
        assert_eq!(osk.text(), None);
    }
}
