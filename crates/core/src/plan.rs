//! Instance planning.
//!
//! A [`Processor`] looks at a designspace and its source UFOs and works out,
//! for every instance, everything an interpolation backend has to do: where
//! the output goes, which sources provide copied data, which glyphs are
//! muted, which rule substitutions apply and which masters feed each glyph.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use designspace::{
    DesignSpaceDocument, Dictionary, DimensionValue, GlyphMaster, Instance, Location, Source, Value,
};
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::{
    config::{DESIGNSPACE_LIB_KEY, FOREGROUND_LAYER, GLYPH_ORDER_KEY},
    options::ProcessOptions,
    ufo,
};

/// What the planner knows about a source UFO.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFont {
    pub format_version: u32,
    /// Glyphs of the default layer
    pub glyphs: BTreeSet<String>,
    pub layers: Vec<String>,
}

impl SourceFont {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            format_version: ufo::format_version(path)?,
            glyphs: ufo::glyph_names(path, None)?.into_iter().collect(),
            layers: ufo::layer_contents(path)?.into_iter().map(|(name, _)| name).collect(),
        })
    }

    pub fn has_layer(&self, layer: &str) -> bool {
        self.layers.iter().any(|name| name == layer)
    }
}

/// A source glyph that takes part in interpolating an instance glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterGlyph {
    pub source_name: String,
    pub source_path: Option<PathBuf>,
    pub glyph_name: String,
    pub layer_name: String,
    pub location: Location,
}

/// Overrides for one glyph of an instance.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphPlan {
    /// Where this glyph is interpolated
    pub location: Location,
    pub unicodes: Option<Vec<u32>>,
    pub note: Option<String>,
    pub masters: Vec<MasterGlyph>,
}

/// Everything needed to generate one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct InstancePlan {
    pub name: Option<String>,
    pub path: Option<PathBuf>,
    pub ufo_version: u32,
    pub round_geometry: bool,
    /// Instance location with every axis filled in
    pub location: Location,
    pub normalized_location: Location,
    pub family_name: Option<String>,
    pub style_name: Option<String>,
    pub postscript_font_name: Option<String>,
    pub style_map_family_name: Option<String>,
    pub style_map_style_name: Option<String>,
    pub kerning: bool,
    pub info: bool,
    pub copy_info_from: Vec<String>,
    pub copy_lib_from: Vec<String>,
    pub copy_groups_from: Vec<String>,
    pub copy_features_from: Vec<String>,
    /// Glyphs muted for this instance
    pub muted_glyphs: Vec<String>,
    /// Glyphs muted per source, keyed by source name
    pub source_muted_glyphs: BTreeMap<String, Vec<String>>,
    /// `(old, new)` glyph swaps from the document rules
    pub substitutions: Vec<(String, String)>,
    pub glyphs: BTreeMap<String, GlyphPlan>,
    /// Font lib of the generated instance
    pub lib: Dictionary,
}

/// Plans for all instances of a document, and what went wrong on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPlan {
    pub document: Option<PathBuf>,
    pub instances: Vec<InstancePlan>,
    pub problems: Vec<String>,
}

/// Plans instances for a document whose sources have been read.
#[derive(Debug)]
pub struct Processor<'a> {
    document: &'a DesignSpaceDocument,
    options: ProcessOptions,
    /// Parallel to `document.sources`; `None` for sources that could not be read
    fonts: Vec<Option<SourceFont>>,
    glyph_names: Vec<String>,
    default: usize,
    problems: Vec<String>,
}

impl<'a> Processor<'a> {
    /// Read the sources of `document`.
    ///
    /// Sources that can't be read are recorded as problems. A default source
    /// is required.
    pub fn new(document: &'a DesignSpaceDocument, options: ProcessOptions) -> Result<Self> {
        let default = document
            .default
            .or_else(|| document.default_source_index())
            .context("Can't find a suitable default source in this document")?;

        let loaded: Vec<Result<SourceFont>> =
            document.sources.par_iter().map(load_source).collect();

        let mut fonts = Vec::with_capacity(loaded.len());
        let mut problems = Vec::new();
        let mut names = BTreeSet::new();
        for (source, result) in document.sources.iter().zip(loaded) {
            match result {
                Ok(font) => {
                    info!(
                        "Loaded master {} (UFO{})",
                        display_path(source),
                        font.format_version
                    );
                    names.extend(font.glyphs.iter().cloned());
                    fonts.push(Some(font));
                }
                Err(e) => {
                    let problem = format!("Can't load master from {}: {e:#}", display_path(source));
                    warn!("{problem}");
                    problems.push(problem);
                    fonts.push(None);
                }
            }
        }
        if fonts.get(default).is_none_or(Option::is_none) {
            warn!("The default source could not be loaded");
        }

        Ok(Self {
            document,
            options,
            fonts,
            glyph_names: names.into_iter().collect(),
            default,
            problems,
        })
    }

    pub fn document(&self) -> &DesignSpaceDocument {
        self.document
    }

    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    /// All glyph names found in the sources, sorted.
    pub fn glyph_names(&self) -> &[String] {
        &self.glyph_names
    }

    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    pub fn default_source(&self) -> Option<&Source> {
        self.document.sources.get(self.default)
    }

    /// The loaded font of the source at `index`.
    pub fn source_font(&self, index: usize) -> Option<&SourceFont> {
        self.fonts.get(index).and_then(Option::as_ref)
    }

    fn loaded_sources(&self) -> impl Iterator<Item = (&Source, &SourceFont)> {
        self.document
            .sources
            .iter()
            .zip(&self.fonts)
            .filter_map(|(source, font)| font.as_ref().map(|font| (source, font)))
    }

    /// The sources that provide `glyph_name`, with their layer and location.
    ///
    /// Sources that mute the glyph or don't have it are left out. The layer is
    /// the source's layer when the UFO has it, the foreground otherwise.
    pub fn collect_masters_for_glyph(&self, glyph_name: &str) -> Vec<MasterGlyph> {
        self.loaded_sources()
            .filter(|(source, font)| {
                !source.muted_glyph_names.iter().any(|name| name == glyph_name)
                    && font.glyphs.contains(glyph_name)
            })
            .map(|(source, font)| {
                let layer_name = source
                    .layer_name
                    .as_deref()
                    .filter(|layer| font.has_layer(layer))
                    .unwrap_or(FOREGROUND_LAYER);
                MasterGlyph {
                    source_name: source_name(source),
                    source_path: source.path.clone(),
                    glyph_name: glyph_name.to_string(),
                    layer_name: layer_name.to_string(),
                    location: self.document.complete_location(&source.location),
                }
            })
            .collect()
    }

    /// Work out everything needed to generate `instance`.
    pub fn plan_instance(&self, instance: &Instance) -> InstancePlan {
        let location = match &instance.location {
            Some(location) => self.document.complete_location(location),
            None => self.document.new_default_location(),
        };
        let normalized_location = self.document.normalize_location(&location);

        let copied_from = |flag: fn(&Source) -> bool| -> Vec<String> {
            self.loaded_sources()
                .filter(|(source, _)| flag(source))
                .map(|(source, _)| source_name(source))
                .collect()
        };

        let source_muted_glyphs = self
            .document
            .sources
            .iter()
            .filter(|source| !source.muted_glyph_names.is_empty())
            .map(|source| (source_name(source), source.muted_glyph_names.clone()))
            .collect();

        let substitutions = if self.options.process_rules {
            self.document.substitutions_at(&location, &self.glyph_names)
        } else {
            Vec::new()
        };

        let glyphs = instance
            .glyphs
            .iter()
            .filter(|(_, glyph)| !glyph.mute)
            .map(|(name, glyph)| {
                let glyph_location = match &glyph.instance_location {
                    Some(location) => self.document.complete_location(location),
                    None => location.clone(),
                };
                let masters = match glyph.masters.as_deref() {
                    Some(masters) if !masters.is_empty() => self.resolve_masters(name, masters),
                    _ => self.collect_masters_for_glyph(name),
                };
                let plan = GlyphPlan {
                    location: glyph_location,
                    unicodes: glyph.unicodes.clone(),
                    note: glyph.note.clone(),
                    masters,
                };
                (name.clone(), plan)
            })
            .collect();

        let mut lib = instance.lib.clone();
        if !lib.contains_key(GLYPH_ORDER_KEY) {
            let order = self.glyph_names.iter().map(|name| Value::from(name.as_str())).collect();
            lib.insert(GLYPH_ORDER_KEY.to_string(), Value::Array(order));
        }
        // the location as authored, not completed with axis defaults
        let authored = instance.location.as_ref().unwrap_or(&location);
        lib.insert(DESIGNSPACE_LIB_KEY.to_string(), location_lib_value(authored));

        debug!(
            "Planned instance {} with {} substitutions",
            instance.name.as_deref().unwrap_or("<unnamed>"),
            substitutions.len()
        );

        InstancePlan {
            name: instance.name.clone(),
            path: instance.path.clone(),
            ufo_version: self.options.ufo_version,
            round_geometry: self.options.round_geometry,
            normalized_location,
            family_name: instance.family_name.clone(),
            style_name: instance.style_name.clone(),
            postscript_font_name: instance.postscript_font_name.clone(),
            style_map_family_name: instance.style_map_family_name.clone(),
            style_map_style_name: instance.style_map_style_name.clone(),
            kerning: instance.kerning,
            info: instance.info,
            copy_info_from: copied_from(|s| s.copy_info),
            copy_lib_from: copied_from(|s| s.copy_lib),
            copy_groups_from: copied_from(|s| s.copy_groups),
            copy_features_from: copied_from(|s| s.copy_features),
            muted_glyphs: instance
                .glyphs
                .iter()
                .filter(|(_, glyph)| glyph.mute)
                .map(|(name, _)| name.clone())
                .collect(),
            source_muted_glyphs,
            substitutions,
            glyphs,
            lib,
            location,
        }
    }

    /// Masters named explicitly by an instance glyph.
    fn resolve_masters(&self, glyph_name: &str, masters: &[GlyphMaster]) -> Vec<MasterGlyph> {
        masters
            .iter()
            .filter_map(|master| {
                let found = self.loaded_sources().find(|(source, _)| {
                    master.font.is_some() && source.name.as_deref() == master.font.as_deref()
                });
                let Some((source, font)) = found else {
                    warn!(
                        "Glyph {glyph_name}: no loaded source named {}",
                        master.font.as_deref().unwrap_or("<none>")
                    );
                    return None;
                };
                if !font.glyphs.contains(&master.glyph_name) {
                    debug!("Glyph {glyph_name}: {} has no {}", source_name(source), master.glyph_name);
                    return None;
                }
                let location = master.location.as_ref().unwrap_or(&source.location);
                Some(MasterGlyph {
                    source_name: source_name(source),
                    source_path: source.path.clone(),
                    glyph_name: master.glyph_name.clone(),
                    layer_name: FOREGROUND_LAYER.to_string(),
                    location: self.document.complete_location(location),
                })
            })
            .collect()
    }

    /// Plan every instance that has an output path, in parallel.
    ///
    /// An instance whose output would overwrite a UFO of a newer format
    /// version is skipped and reported as a problem.
    pub fn plan_all(&self) -> DocumentPlan {
        let outcomes: Vec<std::result::Result<InstancePlan, String>> = self
            .document
            .instances
            .par_iter()
            .filter(|instance| instance.path.is_some())
            .map(|instance| self.plan_checked(instance))
            .collect();

        let mut plan = DocumentPlan {
            document: self.document.path.clone(),
            instances: Vec::new(),
            problems: self.problems.clone(),
        };
        for outcome in outcomes {
            match outcome {
                Ok(instance) => plan.instances.push(instance),
                Err(problem) => {
                    warn!("{problem}");
                    plan.problems.push(problem);
                }
            }
        }
        plan
    }

    fn plan_checked(&self, instance: &Instance) -> std::result::Result<InstancePlan, String> {
        if let Some(path) = &instance.path
            && path.exists()
        {
            match ufo::format_version(path) {
                Ok(existing) if existing > self.options.ufo_version => {
                    return Err(format!(
                        "Can't overwrite existing UFO{existing} with UFO{}: {}",
                        self.options.ufo_version,
                        path.display()
                    ));
                }
                Ok(_) => (),
                Err(e) => debug!("Existing output {} is not readable: {e:#}", path.display()),
            }
        }
        Ok(self.plan_instance(instance))
    }
}

fn load_source(source: &Source) -> Result<SourceFont> {
    let path = source.path.as_deref().context("source has no path")?;
    SourceFont::load(path)
}

fn source_name(source: &Source) -> String {
    source.name.clone().unwrap_or_default()
}

fn display_path(source: &Source) -> String {
    match (&source.path, &source.filename) {
        (Some(path), _) => path.display().to_string(),
        (None, Some(filename)) => filename.clone(),
        (None, None) => source_name(source),
    }
}

/// The instance location as `[axis, value]` pairs for the font lib.
fn location_lib_value(location: &Location) -> Value {
    Value::Array(
        location
            .iter()
            .map(|(axis, value)| {
                let value = match value {
                    DimensionValue::Isotropic(x) => Value::Real(x),
                    DimensionValue::Anisotropic { x, y } => {
                        Value::Array(vec![Value::Real(x), Value::Real(y)])
                    }
                };
                Value::Array(vec![Value::from(axis), value])
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use designspace::{Axis, Condition, InstanceGlyph, Rule};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::ufo::test_support::write_ufo;

    struct Fixture {
        dir: TempDir,
        document: DesignSpaceDocument,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let support: &[&str] = &["a"];
        write_ufo(&dir.path().join("Light.ufo"), 3, &["a", "b", "dollar", "dollar.nostroke"], &[("support", support)]);
        write_ufo(&dir.path().join("Bold.ufo"), 3, &["a", "dollar", "dollar.nostroke", "c"], &[]);

        let mut document = DesignSpaceDocument::new();
        document.path = Some(dir.path().join("test.designspace"));
        document.add_axis(Axis::new("wght", "weight", 0.0, 0.0, 1000.0));
        document.add_axis(Axis::new("wdth", "width", 0.0, 100.0, 100.0));
        document.add_source(
            Source::new(dir.path().join("Light.ufo"), [("weight", 0.0)])
                .with_name("light")
                .copy_all(),
        );
        document.add_source(
            Source::new(dir.path().join("Bold.ufo"), [("weight", 1000.0)])
                .with_name("bold")
                .with_muted_glyph("a"),
        );
        document.add_source(
            Source::new(dir.path().join("Light.ufo"), [("weight", 0.0), ("width", 0.0)])
                .with_name("light.support")
                .with_layer_name("support"),
        );
        document.add_source(
            Source::new(dir.path().join("Missing.ufo"), [("weight", 500.0)]).with_name("missing"),
        );
        document.add_rule(
            Rule::new("heavy")
                .with_condition_set([Condition::at_least("weight", 600.0)])
                .with_sub("dollar", "dollar.nostroke"),
        );
        document.find_default();
        Fixture { dir, document }
    }

    #[test]
    fn processor_loads_sources() {
        let fixture = fixture();
        let processor = Processor::new(&fixture.document, ProcessOptions::new()).unwrap();

        assert_eq!(processor.glyph_names(), ["a", "b", "c", "dollar", "dollar.nostroke"]);
        assert_eq!(processor.default_source().and_then(|s| s.name.as_deref()), Some("light"));
        assert_eq!(processor.problems().len(), 1);
        assert!(processor.problems()[0].contains("Missing.ufo"));
        assert!(processor.source_font(3).is_none());
        assert_eq!(processor.source_font(0).map(|f| f.format_version), Some(3));
    }

    #[test]
    fn processor_requires_a_default() {
        let mut document = DesignSpaceDocument::new();
        document.add_axis(Axis::new("wght", "weight", 0.0, 0.0, 1000.0));
        document.add_source(Source::new("/nowhere/Bold.ufo", [("weight", 1000.0)]));
        assert!(Processor::new(&document, ProcessOptions::new()).is_err());
    }

    #[test]
    fn masters_for_glyph() {
        let fixture = fixture();
        let processor = Processor::new(&fixture.document, ProcessOptions::new()).unwrap();

        let a: Vec<_> = processor
            .collect_masters_for_glyph("a")
            .into_iter()
            .map(|m| (m.source_name, m.layer_name))
            .collect();
        assert_eq!(
            a,
            vec![
                ("light".to_string(), "foreground".to_string()),
                ("light.support".to_string(), "support".to_string()),
            ]
        );

        let c = processor.collect_masters_for_glyph("c");
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].location, Location::new().with("weight", 1000.0).with("width", 100.0));
        assert!(processor.collect_masters_for_glyph("zzz").is_empty());
    }

    #[test]
    fn plan_bold_instance() {
        let fixture = fixture();
        let processor = Processor::new(&fixture.document, ProcessOptions::new()).unwrap();
        let instance = Instance::new("bold", [("weight", 800.0)])
            .with_path(fixture.dir.path().join("out/Bold.ufo"))
            .with_family_name("Test")
            .with_glyph("b", InstanceGlyph { mute: true, ..Default::default() })
            .with_glyph(
                "dollar",
                InstanceGlyph {
                    unicodes: Some(vec![0x24]),
                    masters: Some(vec![
                        GlyphMaster { font: Some("bold".into()), glyph_name: "dollar.nostroke".into(), location: None },
                        GlyphMaster { font: Some("missing".into()), glyph_name: "dollar".into(), location: None },
                    ]),
                    ..Default::default()
                },
            );

        let plan = processor.plan_instance(&instance);

        assert_eq!(plan.location, Location::new().with("weight", 800.0).with("width", 100.0));
        assert_eq!(plan.normalized_location, Location::new().with("weight", 0.8).with("width", 0.0));
        assert_eq!(plan.copy_info_from, vec!["light"]);
        assert_eq!(plan.copy_features_from, vec!["light"]);
        assert_eq!(plan.muted_glyphs, vec!["b"]);
        assert_eq!(plan.source_muted_glyphs["bold"], vec!["a"]);
        assert_eq!(plan.substitutions, vec![("dollar".to_string(), "dollar.nostroke".to_string())]);

        let dollar = &plan.glyphs["dollar"];
        assert_eq!(dollar.unicodes, Some(vec![0x24]));
        assert_eq!(dollar.masters.len(), 1);
        assert_eq!(dollar.masters[0].glyph_name, "dollar.nostroke");
        assert_eq!(dollar.masters[0].location.value("weight"), Some(1000.0));
        assert!(!plan.glyphs.contains_key("b"));

        let order = plan.lib.get(GLYPH_ORDER_KEY).and_then(Value::as_array).unwrap();
        assert_eq!(order.len(), 5);
        // width is completed in the plan location but not in the lib
        assert_eq!(
            plan.lib.get(DESIGNSPACE_LIB_KEY),
            Some(&Value::Array(vec![Value::Array(vec![Value::from("weight"), Value::Real(800.0)])]))
        );
    }

    #[test]
    fn rules_can_be_disabled() {
        let fixture = fixture();
        let options = ProcessOptions::new().process_rules(false);
        let processor = Processor::new(&fixture.document, options).unwrap();
        let plan = processor.plan_instance(&Instance::new("black", [("weight", 1000.0)]));
        assert!(plan.substitutions.is_empty());
    }

    #[test]
    fn plan_all_skips_newer_outputs() {
        let fixture = fixture();
        let mut document = fixture.document.clone();
        let out = fixture.dir.path().join("out");
        write_ufo(&out.join("Existing.ufo"), 3, &["a"], &[]);
        document.add_instance(Instance::new("new", [("weight", 300.0)]).with_path(out.join("New.ufo")));
        document.add_instance(Instance::new("existing", [("weight", 600.0)]).with_path(out.join("Existing.ufo")));
        document.add_instance(Instance::new("pathless", [("weight", 900.0)]));

        let processor = Processor::new(&document, ProcessOptions::new().ufo_version(2)).unwrap();
        let plan = processor.plan_all();

        let names: Vec<_> = plan.instances.iter().filter_map(|i| i.name.as_deref()).collect();
        assert_eq!(names, vec!["new"]);
        assert_eq!(plan.instances[0].ufo_version, 2);
        assert_eq!(plan.problems.len(), 2);
        assert!(plan.problems[1].starts_with("Can't overwrite existing UFO3 with UFO2"));
    }
}
