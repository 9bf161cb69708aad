//! Options for instance processing

use crate::config::DEFAULT_UFO_VERSION;

/// Options for instance processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOptions {
    /// UFO format version of the generated instances
    pub ufo_version: u32,

    /// Whether to apply the document rules to each instance
    pub process_rules: bool,

    /// Whether instance geometry should be rounded to integers
    pub round_geometry: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self { ufo_version: DEFAULT_UFO_VERSION, process_rules: true, round_geometry: false }
    }
}

impl ProcessOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ufo_version(mut self, version: u32) -> Self {
        self.ufo_version = version;
        self
    }

    pub fn process_rules(mut self, process_rules: bool) -> Self {
        self.process_rules = process_rules;
        self
    }

    pub fn round_geometry(mut self, round_geometry: bool) -> Self {
        self.round_geometry = round_geometry;
        self
    }
}
