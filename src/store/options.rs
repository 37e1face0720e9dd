//! Loading options.

/// Options for loading document folders.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Whether to parse page files in parallel
    pub parallel: bool,
}

impl LoadOptions {
    /// Create new load options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_options_builder() {
        assert!(LoadOptions::default().parallel);
        assert!(!LoadOptions::new().sequential().parallel);
        assert!(LoadOptions::new().sequential().with_parallel(true).parallel);
    }
}
