//! Scaling locations to the normalized -1 … 0 … 1 range.

use log::warn;

use crate::{axis::Axis, designspace::DesignSpaceDocument, location::Location};

/// Normalize `location` against `axes`.
///
/// Only axes named in the location are kept, in axis order. Anisotropic
/// values are normalized on their x coordinate.
pub fn normalize_location(axes: &[Axis], location: &Location) -> Location {
    axes.iter()
        .filter_map(|axis| {
            location
                .value(&axis.name)
                .map(|value| (axis.name.as_str(), axis.normalize(value)))
        })
        .collect()
}

impl DesignSpaceDocument {
    /// Normalize a location against the document axes.
    pub fn normalize_location(&self, location: &Location) -> Location {
        normalize_location(&self.axes, location)
    }

    /// Rewrite the whole document into normalized space.
    ///
    /// Source, instance, glyph and glyph master locations, axis maps, axis
    /// ranges and rule conditions are all scaled against the axes as they
    /// were before this call.
    pub fn normalize(&mut self) {
        let axes = self.axes.clone();
        let scale = |location: &mut Location| *location = normalize_location(&axes, location);

        for source in &mut self.sources {
            scale(&mut source.location);
        }

        for instance in &mut self.instances {
            for glyph in instance.glyphs.values_mut() {
                if let Some(location) = glyph.instance_location.as_mut() {
                    scale(location);
                }
                for master in glyph.masters.iter_mut().flatten() {
                    if let Some(location) = master.location.as_mut() {
                        scale(location);
                    }
                }
            }
            if let Some(location) = instance.location.as_mut() {
                scale(location);
            }
        }

        for (axis, original) in self.axes.iter_mut().zip(&axes) {
            for (_, output) in axis.map.iter_mut() {
                *output = original.normalize(*output);
            }
            axis.minimum = original.normalize(original.minimum);
            axis.maximum = original.normalize(original.maximum);
            axis.default = original.normalize(original.default);
        }

        for rule in &mut self.rules {
            for condition in rule.condition_sets.iter_mut().flatten() {
                let Some(axis) = axes.iter().find(|axis| axis.name == condition.name) else {
                    warn!("Rule condition on undefined axis \"{}\" left as is.", condition.name);
                    continue;
                };
                condition.minimum = condition.minimum.map(|v| axis.normalize(v));
                condition.maximum = condition.maximum.map(|v| axis.normalize(v));
            }
        }
    }
}
