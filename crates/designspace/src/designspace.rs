//! Designspace document model.
//!
//! Mirrors the concepts from fontTools designspaceLib: axes, sources,
//! instances, substitution rules and a free-form lib.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use plist::{Dictionary, Value};

use crate::{
    axis::Axis,
    error::{Error, Result},
    location::{DimensionValue, Location},
    reader, writer,
    rules::Rule,
};

/// Prefix of the names given to sources that have none in the document.
pub const TEMP_SOURCE_NAME_PREFIX: &str = "temp_master";

/// Tolerance used when comparing a source location against the defaults.
const DEFAULT_LOCATION_TOLERANCE: f64 = 0.001;

/// A source (master) font in the designspace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Source {
    /// The path as written in the document, with forward slashes
    pub filename: Option<String>,
    /// Absolute path, resolved from `filename` and the document location
    pub path: Option<PathBuf>,
    pub name: Option<String>,
    pub family_name: Option<String>,
    pub style_name: Option<String>,
    /// Layer of the source font to use instead of the default layer
    pub layer_name: Option<String>,
    pub location: Location,
    pub copy_lib: bool,
    pub copy_info: bool,
    pub copy_groups: bool,
    pub copy_features: bool,
    pub mute_kerning: bool,
    pub mute_info: bool,
    pub muted_glyph_names: Vec<String>,
}

impl Source {
    /// Create a new source with the given path and location.
    pub fn new<K, V>(path: impl Into<PathBuf>, location: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<DimensionValue>,
    {
        Self {
            path: Some(path.into()),
            location: location.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_filename(mut self, filename: &str) -> Self {
        self.filename = Some(filename.to_string());
        self
    }

    pub fn with_family_name(mut self, name: &str) -> Self {
        self.family_name = Some(name.to_string());
        self
    }

    pub fn with_style_name(mut self, name: &str) -> Self {
        self.style_name = Some(name.to_string());
        self
    }

    pub fn with_layer_name(mut self, name: &str) -> Self {
        self.layer_name = Some(name.to_string());
        self
    }

    /// Mark this source as the one font info, lib, groups and features are copied from.
    pub fn copy_all(mut self) -> Self {
        self.copy_info = true;
        self.copy_lib = true;
        self.copy_groups = true;
        self.copy_features = true;
        self
    }

    pub fn with_muted_glyph(mut self, glyph: &str) -> Self {
        self.muted_glyph_names.push(glyph.to_string());
        self
    }

    /// Get the value for an axis, or the axis default if not specified.
    pub fn axis_value(&self, axis: &Axis) -> f64 {
        self.location.value(&axis.name).unwrap_or(axis.default)
    }

    /// Whether this source's name was invented by the reader.
    pub fn has_temporary_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| n.starts_with(TEMP_SOURCE_NAME_PREFIX))
    }
}

/// One `<master>` of an instance glyph: which source glyph to use, and where.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphMaster {
    /// Name of the source font
    pub font: Option<String>,
    pub glyph_name: String,
    pub location: Option<Location>,
}

/// Per-glyph overrides of an instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceGlyph {
    pub mute: bool,
    pub unicodes: Option<Vec<u32>>,
    pub note: Option<String>,
    /// Location for this glyph only, replacing the instance location
    pub instance_location: Option<Location>,
    pub masters: Option<Vec<GlyphMaster>>,
}

/// A requested interpolated output.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub filename: Option<String>,
    pub path: Option<PathBuf>,
    pub name: Option<String>,
    pub family_name: Option<String>,
    pub style_name: Option<String>,
    pub postscript_font_name: Option<String>,
    pub style_map_family_name: Option<String>,
    pub style_map_style_name: Option<String>,
    pub localised_family_name: BTreeMap<String, String>,
    pub localised_style_name: BTreeMap<String, String>,
    pub localised_style_map_family_name: BTreeMap<String, String>,
    pub localised_style_map_style_name: BTreeMap<String, String>,
    pub location: Option<Location>,
    pub glyphs: BTreeMap<String, InstanceGlyph>,
    /// Generate kerning for this instance
    pub kerning: bool,
    /// Generate font info for this instance
    pub info: bool,
    pub lib: Dictionary,
}

impl Default for Instance {
    fn default() -> Self {
        Self {
            filename: None,
            path: None,
            name: None,
            family_name: None,
            style_name: None,
            postscript_font_name: None,
            style_map_family_name: None,
            style_map_style_name: None,
            localised_family_name: BTreeMap::new(),
            localised_style_name: BTreeMap::new(),
            localised_style_map_family_name: BTreeMap::new(),
            localised_style_map_style_name: BTreeMap::new(),
            location: None,
            glyphs: BTreeMap::new(),
            kerning: true,
            info: true,
            lib: Dictionary::new(),
        }
    }
}

impl Instance {
    /// Create a new instance with the given name and location.
    pub fn new<K, V>(name: &str, location: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<DimensionValue>,
    {
        Self {
            name: Some(name.to_string()),
            location: Some(location.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_family_name(mut self, name: &str) -> Self {
        self.family_name = Some(name.to_string());
        self
    }

    pub fn with_style_name(mut self, name: &str) -> Self {
        self.style_name = Some(name.to_string());
        self
    }

    pub fn with_postscript_font_name(mut self, name: &str) -> Self {
        self.postscript_font_name = Some(name.to_string());
        self
    }

    pub fn with_glyph(mut self, name: &str, glyph: InstanceGlyph) -> Self {
        self.glyphs.insert(name.to_string(), glyph);
        self
    }

    pub fn set_style_name(&mut self, name: &str, language: &str) {
        self.localised_style_name.insert(language.to_string(), name.to_string());
    }

    pub fn style_name_for(&self, language: &str) -> Option<&str> {
        self.localised_style_name.get(language).map(String::as_str)
    }

    pub fn set_family_name(&mut self, name: &str, language: &str) {
        self.localised_family_name.insert(language.to_string(), name.to_string());
    }

    pub fn family_name_for(&self, language: &str) -> Option<&str> {
        self.localised_family_name.get(language).map(String::as_str)
    }

    pub fn set_style_map_style_name(&mut self, name: &str, language: &str) {
        self.localised_style_map_style_name.insert(language.to_string(), name.to_string());
    }

    pub fn style_map_style_name_for(&self, language: &str) -> Option<&str> {
        self.localised_style_map_style_name.get(language).map(String::as_str)
    }

    pub fn set_style_map_family_name(&mut self, name: &str, language: &str) {
        self.localised_style_map_family_name.insert(language.to_string(), name.to_string());
    }

    pub fn style_map_family_name_for(&self, language: &str) -> Option<&str> {
        self.localised_style_map_family_name.get(language).map(String::as_str)
    }
}

/// A complete designspace document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesignSpaceDocument {
    /// Where the document was read from or last written to
    pub path: Option<PathBuf>,
    /// Last component of `path`
    pub filename: Option<String>,
    /// Format version found in the file (`None` for documents built in memory)
    pub format_version: Option<String>,
    pub axes: Vec<Axis>,
    pub rules: Vec<Rule>,
    pub sources: Vec<Source>,
    pub instances: Vec<Instance>,
    pub lib: Dictionary,
    /// Index of the default source, set by [`DesignSpaceDocument::find_default`]
    pub default: Option<usize>,
}

impl DesignSpaceDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a designspace file.
    ///
    /// Source and instance paths are resolved against the document's
    /// directory, and the default source is looked up.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path = std::path::absolute(path).map_err(|e| Error::io(path, e))?;
        let xml = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        debug!("Reading designspace {}", path.display());
        Self::from_xml_str(&xml, Some(&path))
    }

    /// Parse a document from a string. `path` is used to resolve relative filenames.
    pub fn from_xml_str(xml: &str, path: Option<&Path>) -> Result<Self> {
        let mut document = reader::read_document(xml, path)?;
        if !document.sources.is_empty() {
            document.find_default();
        }
        Ok(document)
    }

    /// Write the document to `path`.
    ///
    /// Like saving from a design tool, this updates the document: its path,
    /// source and instance filenames relative to the new location, and
    /// source/instance locations completed with axis defaults.
    pub fn write(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.path = Some(std::path::absolute(path).map_err(|e| Error::io(path, e))?);
        self.filename = path.file_name().map(|n| n.to_string_lossy().into_owned());
        self.update_paths();
        self.complete_locations();
        let xml = self.to_xml_string()?;
        fs::write(path, xml).map_err(|e| Error::io(path, e))
    }

    /// Serialize the document without touching the filesystem.
    pub fn to_xml_string(&self) -> Result<String> {
        writer::write_document(self)
    }

    pub fn add_axis(&mut self, axis: Axis) {
        self.axes.push(axis);
    }

    pub fn add_source(&mut self, source: Source) {
        self.sources.push(source);
    }

    pub fn add_instance(&mut self, instance: Instance) {
        self.instances.push(instance);
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Look up an axis by name.
    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|axis| axis.name == name)
    }

    /// Axis names in declaration order.
    pub fn axis_order(&self) -> Vec<&str> {
        self.axes.iter().map(|axis| axis.name.as_str()).collect()
    }

    /// A location with every axis at its default.
    pub fn new_default_location(&self) -> Location {
        self.axes
            .iter()
            .map(|axis| (axis.name.as_str(), axis.default))
            .collect()
    }

    /// A location naming every declared axis in axis order.
    ///
    /// Values from `location` are kept for declared axes, missing axes get
    /// their default and unknown names are dropped.
    pub fn complete_location(&self, location: &Location) -> Location {
        self.axes
            .iter()
            .map(|axis| {
                let value = location
                    .get(&axis.name)
                    .unwrap_or(DimensionValue::Isotropic(axis.default));
                (axis.name.as_str(), value)
            })
            .collect()
    }

    /// Complete every source and instance location with axis defaults.
    pub fn complete_locations(&mut self) {
        let sources = std::mem::take(&mut self.sources);
        self.sources = sources
            .into_iter()
            .map(|mut source| {
                source.location = self.complete_location(&source.location);
                source
            })
            .collect();
        let instances = std::mem::take(&mut self.instances);
        self.instances = instances
            .into_iter()
            .map(|mut instance| {
                instance.location = instance.location.map(|loc| self.complete_location(&loc));
                instance
            })
            .collect();
    }

    /// Find the default source and remember its index.
    ///
    /// The default is the source at the default location on all axes; failing
    /// that, the first source that has its info copied.
    pub fn find_default(&mut self) -> Option<usize> {
        self.default = self.default_source_index();
        if self.default.is_none() {
            warn!("Can't find a suitable default location in this document.");
        }
        self.default
    }

    /// The default source, as found by [`DesignSpaceDocument::find_default`].
    pub fn default_source(&self) -> Option<&Source> {
        self.default.and_then(|idx| self.sources.get(idx))
    }

    /// Index of the source that [`DesignSpaceDocument::find_default`] would pick.
    pub fn default_source_index(&self) -> Option<usize> {
        let at_default = |source: &Source| {
            self.axes.iter().all(|axis| {
                let value = source
                    .location
                    .get(&axis.name)
                    .unwrap_or(DimensionValue::Isotropic(axis.default));
                (value.x() - axis.default).abs() < DEFAULT_LOCATION_TOLERANCE
                    && (value.y() - axis.default).abs() < DEFAULT_LOCATION_TOLERANCE
            })
        };
        self.sources
            .iter()
            .position(at_default)
            .or_else(|| self.sources.iter().position(|source| source.copy_info))
    }

    /// Look up a source by name.
    pub fn source(&self, name: &str) -> Option<&Source> {
        self.sources.iter().find(|source| source.name.as_deref() == Some(name))
    }

    /// Look up a value in the document lib.
    pub fn lib_value(&self, key: &str) -> Option<&Value> {
        self.lib.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight_width() -> DesignSpaceDocument {
        let mut doc = DesignSpaceDocument::new();
        doc.add_axis(Axis::new("wght", "weight", 0.0, 0.0, 1000.0));
        doc.add_axis(Axis::new("wdth", "width", 0.0, 20.0, 1000.0));
        doc
    }

    #[test]
    fn default_location_in_axis_order() {
        let doc = weight_width();
        let loc = doc.new_default_location();
        assert_eq!(loc.axis_names().collect::<Vec<_>>(), vec!["weight", "width"]);
        assert_eq!(loc.value("width"), Some(20.0));
    }

    #[test]
    fn complete_location_fills_and_drops() {
        let doc = weight_width();
        let loc = Location::new().with("unknown", 5.0).with("width", 300.0);
        let complete = doc.complete_location(&loc);

        assert_eq!(complete.axis_names().collect::<Vec<_>>(), vec!["weight", "width"]);
        assert_eq!(complete.value("weight"), Some(0.0));
        assert_eq!(complete.value("width"), Some(300.0));
        assert!(!complete.contains("unknown"));
    }

    #[test]
    fn default_source_at_default_location() {
        let mut doc = weight_width();
        doc.add_source(Source::new("Bold.ufo", [("weight", 1000.0)]).with_name("bold"));
        // width is omitted and falls back to the axis default
        doc.add_source(Source::new("Regular.ufo", [("weight", 0.0)]).with_name("regular"));

        assert_eq!(doc.find_default(), Some(1));
        assert_eq!(doc.default_source().and_then(|s| s.name.as_deref()), Some("regular"));
    }

    #[test]
    fn default_source_falls_back_to_copy_info() {
        let mut doc = weight_width();
        doc.add_source(Source::new("Light.ufo", [("weight", 100.0)]));
        let mut bold = Source::new("Bold.ufo", [("weight", 1000.0)]);
        bold.copy_info = true;
        doc.add_source(bold);

        assert_eq!(doc.find_default(), Some(1));
    }

    #[test]
    fn no_default_source() {
        let mut doc = weight_width();
        doc.add_source(Source::new("Light.ufo", [("weight", 100.0)]));
        assert_eq!(doc.find_default(), None);
    }

    #[test]
    fn temporary_source_names() {
        let source = Source::default().with_name("temp_master.3");
        assert!(source.has_temporary_name());
        assert!(!Source::default().with_name("master").has_temporary_name());
    }

    #[test]
    fn localised_instance_names() {
        let mut instance = Instance::default();
        instance.set_style_name("Demigras", "fr");
        instance.set_family_name("Montserrat", "de");
        assert_eq!(instance.style_name_for("fr"), Some("Demigras"));
        assert_eq!(instance.family_name_for("de"), Some("Montserrat"));
        assert_eq!(instance.style_name_for("en"), None);
        assert!(instance.kerning && instance.info);
    }
}
