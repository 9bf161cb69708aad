//! Axes of the design space.

use std::collections::BTreeMap;

/// A variation axis in the designspace.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    /// OpenType tag for this axis (e.g. "wght")
    pub tag: String,
    /// Name used to refer to the axis in locations and conditions
    pub name: String,
    pub minimum: f64,
    pub default: f64,
    pub maximum: f64,
    pub hidden: bool,
    /// UI names keyed by language code
    pub label_names: BTreeMap<String, String>,
    /// `(input, output)` pairs of a non-linear mapping
    pub map: Vec<(f64, f64)>,
}

impl Axis {
    /// Create a new axis.
    pub fn new(tag: &str, name: &str, minimum: f64, default: f64, maximum: f64) -> Self {
        Self {
            tag: tag.to_string(),
            name: name.to_string(),
            minimum,
            default,
            maximum,
            hidden: false,
            label_names: BTreeMap::new(),
            map: Vec::new(),
        }
    }

    /// Create an axis whose tag and English label are derived from its name.
    pub fn from_name(name: &str, minimum: f64, default: f64, maximum: f64) -> Self {
        let (tag, label) = tag_for_axis_name(name);
        Self::new(&tag, name, minimum, default, maximum).with_label_name("en", &label)
    }

    pub fn with_label_name(mut self, language: &str, label: &str) -> Self {
        self.label_names.insert(language.to_string(), label.to_string());
        self
    }

    pub fn with_map(mut self, map: impl IntoIterator<Item = (f64, f64)>) -> Self {
        self.map = map.into_iter().collect();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Normalize a value to the range [-1, 1].
    ///
    /// Values are clamped to the axis range first. Values below the default
    /// normalize to [-1, 0], values above it to [0, 1].
    pub fn normalize(&self, value: f64) -> f64 {
        if value == self.default {
            0.0
        } else if value < self.default {
            if self.default == self.minimum {
                0.0
            } else {
                (value.max(self.minimum) - self.default) / (self.default - self.minimum)
            }
        } else if self.default == self.maximum {
            0.0
        } else {
            (value.min(self.maximum) - self.default) / (self.maximum - self.default)
        }
    }

    /// Map an input value through the axis map. Identity when there is no map.
    pub fn map_forward(&self, value: f64) -> f64 {
        piecewise_linear(self.map.iter().copied(), value)
    }

    /// Map an output value back through the axis map.
    pub fn map_backward(&self, value: f64) -> f64 {
        piecewise_linear(self.map.iter().map(|&(input, output)| (output, input)), value)
    }
}

/// Find or make a tag and English label for an axis name.
///
/// Registered axis names get their OpenType tag; other names are cut or
/// padded with `*` to four characters.
pub fn tag_for_axis_name(name: &str) -> (String, String) {
    let registered = match name.to_lowercase().as_str() {
        "weight" => Some(("wght", "Weight")),
        "width" => Some(("wdth", "Width")),
        "optical" => Some(("opsz", "Optical Size")),
        "slant" => Some(("slnt", "Slant")),
        "italic" => Some(("ital", "Italic")),
        _ => None,
    };
    if let Some((tag, label)) = registered {
        return (tag.to_string(), label.to_string());
    }
    let tag: String = name.chars().chain(std::iter::repeat('*')).take(4).collect();
    (tag, name.to_string())
}

/// Remap a value through sorted `(from, to)` segments.
///
/// Beyond either end the value is shifted by the offset of the nearest point.
fn piecewise_linear(mapping: impl Iterator<Item = (f64, f64)>, value: f64) -> f64 {
    let mut points: Vec<(f64, f64)> = mapping.collect();
    if points.is_empty() {
        return value;
    }
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    if let Some(&(_, to)) = points.iter().find(|(from, _)| *from == value) {
        return to;
    }
    let (first_from, first_to) = points[0];
    if value < first_from {
        return value + first_to - first_from;
    }
    let (last_from, last_to) = points[points.len() - 1];
    if value > last_from {
        return value + last_to - last_from;
    }

    let idx = points.partition_point(|(from, _)| *from < value);
    let (from_lhs, to_lhs) = points[idx - 1];
    let (from_rhs, to_rhs) = points[idx];
    let t = (value - from_lhs) / (from_rhs - from_lhs);
    to_lhs + t * (to_rhs - to_lhs)
}
