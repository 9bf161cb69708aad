//! Locations in the design space, keyed by axis name.

use indexmap::IndexMap;

/// The coordinate of a location on one axis.
///
/// Anisotropic values carry separate horizontal and vertical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DimensionValue {
    Isotropic(f64),
    Anisotropic { x: f64, y: f64 },
}

impl DimensionValue {
    /// The horizontal (or only) coordinate.
    pub fn x(&self) -> f64 {
        match *self {
            DimensionValue::Isotropic(v) => v,
            DimensionValue::Anisotropic { x, .. } => x,
        }
    }

    /// The vertical coordinate; equal to `x` for isotropic values.
    pub fn y(&self) -> f64 {
        match *self {
            DimensionValue::Isotropic(v) => v,
            DimensionValue::Anisotropic { y, .. } => y,
        }
    }

    pub fn is_anisotropic(&self) -> bool {
        matches!(self, DimensionValue::Anisotropic { .. })
    }
}

impl From<f64> for DimensionValue {
    fn from(value: f64) -> Self {
        DimensionValue::Isotropic(value)
    }
}

impl From<(f64, f64)> for DimensionValue {
    fn from((x, y): (f64, f64)) -> Self {
        DimensionValue::Anisotropic { x, y }
    }
}

/// A location: one coordinate per axis name, in insertion order.
///
/// Equality ignores order, so two locations naming the same coordinates
/// compare equal however they were built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Location(IndexMap<String, DimensionValue>);

impl Location {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, axis: &str) -> Option<DimensionValue> {
        self.0.get(axis).copied()
    }

    /// The x coordinate on `axis`, if present.
    pub fn value(&self, axis: &str) -> Option<f64> {
        self.get(axis).map(|v| v.x())
    }

    pub fn insert(&mut self, axis: impl Into<String>, value: impl Into<DimensionValue>) {
        self.0.insert(axis.into(), value.into());
    }

    /// Builder form of [`Location::insert`].
    pub fn with(mut self, axis: impl Into<String>, value: impl Into<DimensionValue>) -> Self {
        self.insert(axis, value);
        self
    }

    pub fn contains(&self, axis: &str) -> bool {
        self.0.contains_key(axis)
    }

    pub fn remove(&mut self, axis: &str) -> Option<DimensionValue> {
        self.0.shift_remove(axis)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn axis_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, DimensionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K, V> FromIterator<(K, V)> for Location
where
    K: Into<String>,
    V: Into<DimensionValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a Location {
    type Item = (&'a String, &'a DimensionValue);
    type IntoIter = indexmap::map::Iter<'a, String, DimensionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
