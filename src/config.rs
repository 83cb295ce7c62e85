//! Engine configuration.

/// Configuration for a [`crate::LogEngine`].
///
/// The teaser prefilter is on by default; turning it off makes the matcher
/// fall back to a per-definition substring check. Classification results
/// are identical either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub enable_prefilter: bool,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            enable_prefilter: true,
        }
    }

    pub fn prefilter(mut self, enable: bool) -> Self {
        self.enable_prefilter = enable;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
