//! Backend registry and driver selection
//!
//! Each category keeps an ordered list of descriptors. The configured
//! driver name is matched case-insensitively; an unknown name falls back
//! to the first entry so a typo in the config never keeps the frontend
//! from starting.

use rp_core::{Descriptor, DriverCategory, DriverError};

/// Ordered list of backends for one category
#[derive(Debug, Clone)]
pub struct Registry<D> {
    category: DriverCategory,
    entries: Vec<D>,
}

impl<D: Descriptor> Registry<D> {
    /// Create an empty registry
    pub fn new(category: DriverCategory) -> Self {
        Self {
            category,
            entries: Vec::new(),
        }
    }

    /// Append a backend, builder style
    pub fn with(mut self, descriptor: D) -> Self {
        self.register(descriptor);
        self
    }

    /// Append a backend
    pub fn register(&mut self, descriptor: D) {
        self.entries.push(descriptor);
    }

    pub fn category(&self) -> DriverCategory {
        self.category
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&D> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &D> {
        self.entries.iter()
    }

    /// Identifiers of every registered backend, in order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(Descriptor::ident).collect()
    }

    /// Index of the backend called `name`, ignoring case.
    pub fn find_index(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|d| d.ident().eq_ignore_ascii_case(name))
    }

    /// Resolve the configured driver name.
    ///
    /// An unknown name logs the available backends and falls back to the
    /// first one. An empty registry is a fatal error.
    pub fn select(&self, name: &str) -> Result<&D, DriverError> {
        if let Some(index) = self.find_index(name) {
            return Ok(&self.entries[index]);
        }

        let first = self
            .entries
            .first()
            .ok_or(DriverError::NoDrivers(self.category))?;

        tracing::error!("Couldn't find any {} driver named \"{}\"", self.category, name);
        tracing::info!("Available {} drivers are:", self.category);
        for ident in self.names() {
            tracing::info!("\t{}", ident);
        }
        tracing::warn!("Going to default to first {} driver...", self.category);

        Ok(first)
    }

    /// Point `name` at the backend registered before it.
    ///
    /// Returns `false` and leaves `name` untouched at the start of the list
    /// or when `name` is not registered.
    pub fn find_prev(&self, name: &mut String) -> bool {
        match self.find_index(name) {
            Some(index) if index > 0 => {
                *name = self.entries[index - 1].ident().to_string();
                true
            }
            _ => {
                tracing::warn!(
                    "Couldn't find any previous {} driver (current one: \"{}\")",
                    self.category,
                    name
                );
                false
            }
        }
    }

    /// Point `name` at the backend registered after it.
    ///
    /// Returns `false` and leaves `name` untouched at the end of the list or
    /// when `name` is not registered.
    pub fn find_next(&self, name: &mut String) -> bool {
        match self.find_index(name) {
            Some(index) if index + 1 < self.entries.len() => {
                *name = self.entries[index + 1].ident().to_string();
                true
            }
            _ => {
                tracing::warn!(
                    "Couldn't find any next {} driver (current one: \"{}\")",
                    self.category,
                    name
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_core::BackendDescriptor;

    type Desc = BackendDescriptor<(), u32>;

    fn registry() -> Registry<Desc> {
        Registry::new(DriverCategory::Audio)
            .with(Desc::new("alsa", Default::default(), |_| Some(0)))
            .with(Desc::new("pulse", Default::default(), |_| Some(1)))
            .with(Desc::new("null", Default::default(), |_| Some(2)))
    }

    #[test]
    fn test_select_case_insensitive() {
        let reg = registry();
        assert_eq!(reg.select("PULSE").unwrap().ident(), "pulse");
        assert_eq!(reg.find_index("Null"), Some(2));
    }

    #[test]
    fn test_select_falls_back_to_first() {
        let reg = registry();
        assert_eq!(reg.select("oss").unwrap().ident(), "alsa");
        assert_eq!(reg.select("").unwrap().ident(), "alsa");
    }

    #[test]
    fn test_select_empty_registry() {
        let reg: Registry<Desc> = Registry::new(DriverCategory::Video);
        let err = reg.select("gl").unwrap_err();
        assert!(matches!(err, DriverError::NoDrivers(DriverCategory::Video)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_navigation_stops_at_ends() {
        let reg = registry();
        let mut name = "alsa".to_string();
        assert!(!reg.find_prev(&mut name));
        assert_eq!(name, "alsa");

        assert!(reg.find_next(&mut name));
        assert!(reg.find_next(&mut name));
        assert_eq!(name, "null");
        assert!(!reg.find_next(&mut name));
        assert_eq!(name, "null");

        assert!(reg.find_prev(&mut name));
        assert_eq!(name, "pulse");
    }

    #[test]
    fn test_navigation_unknown_name() {
        let reg = registry();
        let mut name = "oss".to_string();
        assert!(!reg.find_next(&mut name));
        assert!(!reg.find_prev(&mut name));
        assert_eq!(name, "oss");
    }
}
