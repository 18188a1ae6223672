//! Active driver slots
//!
//! A slot holds the one active backend of a category. Most backends are
//! owned by the frontend, but a video backend may hand out an input driver
//! it created together with its window; that input is only borrowed and
//! the video backend stays responsible for releasing it.

use parking_lot::Mutex;
use rp_core::Capabilities;
use std::fmt;
use std::sync::Arc;

/// Ownership of an active backend
pub enum Slot<T: ?Sized> {
    /// Created and released by the frontend
    Owned(Box<T>),
    /// Shared with another backend, never released here
    Borrowed(Arc<Mutex<Box<T>>>),
}

impl<T: ?Sized> Slot<T> {
    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }

    /// Run `f` against the backend.
    pub fn with<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        match self {
            Self::Owned(driver) => f(driver.as_mut()),
            Self::Borrowed(shared) => f(shared.lock().as_mut()),
        }
    }

    /// Drop the slot, calling `free` only if the backend is owned.
    pub fn release(self, free: impl FnOnce(&mut T)) -> bool {
        match self {
            Self::Owned(mut driver) => {
                free(driver.as_mut());
                true
            }
            Self::Borrowed(_) => false,
        }
    }
}

impl<T: ?Sized> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owned(_) => f.write_str("Owned"),
            Self::Borrowed(_) => f.write_str("Borrowed"),
        }
    }
}

/// An initialized backend together with what it was registered as
#[derive(Debug)]
pub struct ActiveDriver<T: ?Sized> {
    pub ident: String,
    pub capabilities: Capabilities,
    pub slot: Slot<T>,
}

impl<T: ?Sized> ActiveDriver<T> {
    pub fn owned(ident: &str, capabilities: Capabilities, driver: Box<T>) -> Self {
        Self {
            ident: ident.to_string(),
            capabilities,
            slot: Slot::Owned(driver),
        }
    }

    pub fn borrowed(ident: &str, capabilities: Capabilities, shared: Arc<Mutex<Box<T>>>) -> Self {
        Self {
            ident: ident.to_string(),
            capabilities,
            slot: Slot::Borrowed(shared),
        }
    }

    pub fn supports(&self, caps: Capabilities) -> bool {
        self.capabilities.contains(caps)
    }

    pub fn with<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        self.slot.with(f)
    }
}

/// Where a category is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    Initializing,
    Active,
    /// Torn down as part of a reinit, about to come back
    Reinitializing,
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Counter: Send {
        fn bump(&mut self);
        fn value(&self) -> u32;
    }

    struct Plain(u32);

    impl Counter for Plain {
        fn bump(&mut self) {
            self.0 += 1;
        }
        fn value(&self) -> u32 {
            self.0
        }
    }

    #[test]
    fn test_owned_slot_is_freed() {
        let mut slot: Slot<dyn Counter> = Slot::Owned(Box::new(Plain(0)));
        slot.with(|c| c.bump());
        assert!(slot.is_owned());
        let mut seen = 0;
        assert!(slot.release(|c| seen = c.value()));
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_borrowed_slot_is_not_freed() {
        let shared: Arc<Mutex<Box<dyn Counter>>> = Arc::new(Mutex::new(Box::new(Plain(0))));
        let mut slot = Slot::Borrowed(Arc::clone(&shared));
        slot.with(|c| c.bump());
        assert!(!slot.release(|_| panic!("borrowed backend released")));
        assert_eq!(shared.lock().value(), 1);
    }
}
