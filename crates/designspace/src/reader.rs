//! Reading designspace XML into a [`DesignSpaceDocument`].

use std::path::Path;

use log::{debug, warn};

use crate::{
    axis::{Axis, tag_for_axis_name},
    designspace::{
        DesignSpaceDocument, GlyphMaster, Instance, InstanceGlyph, Source, TEMP_SOURCE_NAME_PREFIX,
    },
    error::{Error, Result},
    lib_data,
    location::{DimensionValue, Location},
    paths,
    rules::{Condition, ConditionSet, Rule},
    xml::{self, Element},
};

/// Format assumed when the root element has no `format` attribute.
const DEFAULT_FORMAT_VERSION: &str = "3.0";

/// Language of the name attributes; localised children carry the others.
const XML_LANG: &str = "xml:lang";

pub(crate) fn read_document(xml: &str, path: Option<&Path>) -> Result<DesignSpaceDocument> {
    let root = xml::parse(xml)?;
    if root.name != "designspace" {
        return Err(Error::WrongRootElement(root.name));
    }

    let mut document = DesignSpaceDocument {
        path: path.map(Path::to_path_buf),
        filename: path
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned()),
        format_version: Some(root.attr("format").unwrap_or(DEFAULT_FORMAT_VERSION).to_string()),
        ..Default::default()
    };

    let reader = DocReader { document_dir: path.and_then(Path::parent) };
    document.axes = reader.read_axes(&root)?;
    document.rules = reader.read_rules(&root)?;
    document.sources = reader.read_sources(&root, &document.axes)?;
    document.instances = reader.read_instances(&root, &document.axes)?;
    if let Some(lib) = root.find_all("lib").last() {
        document.lib = lib_data::dictionary_from_lib(lib)?;
    }

    debug!(
        "Read {} axes, {} rules, {} sources, {} instances",
        document.axes.len(),
        document.rules.len(),
        document.sources.len(),
        document.instances.len()
    );
    Ok(document)
}

struct DocReader<'a> {
    document_dir: Option<&'a Path>,
}

impl DocReader<'_> {
    fn read_axes(&self, root: &Element) -> Result<Vec<Axis>> {
        let Some(axes) = root.find("axes") else {
            return Ok(Vec::new());
        };
        axes.find_all("axis").map(read_axis).collect()
    }

    fn read_rules(&self, root: &Element) -> Result<Vec<Rule>> {
        let Some(rules) = root.find("rules") else {
            return Ok(Vec::new());
        };
        rules.find_all("rule").map(read_rule).collect()
    }

    fn read_sources(&self, root: &Element, axes: &[Axis]) -> Result<Vec<Source>> {
        let Some(sources) = root.find("sources") else {
            return Ok(Vec::new());
        };
        sources
            .find_all("source")
            .enumerate()
            .map(|(idx, element)| self.read_source(idx, element, axes))
            .collect()
    }

    fn read_source(&self, idx: usize, element: &Element, axes: &[Axis]) -> Result<Source> {
        let filename = element.attr("filename").map(str::to_string);
        let name = match element.attr("name") {
            Some(name) => name.to_string(),
            None => format!("{TEMP_SOURCE_NAME_PREFIX}.{idx}"),
        };

        let mut source = Source {
            path: self.resolve(filename.as_deref()),
            filename,
            name: Some(name),
            family_name: element.attr("familyname").map(str::to_string),
            style_name: element.attr("stylename").map(str::to_string),
            layer_name: element.attr("layer").map(str::to_string),
            location: location_from_element(element, axes)?.unwrap_or_default(),
            ..Default::default()
        };

        for child in &element.children {
            match child.name.as_str() {
                "lib" => source.copy_lib |= is_set(child, "copy"),
                "groups" => source.copy_groups |= is_set(child, "copy"),
                "features" => source.copy_features |= is_set(child, "copy"),
                "info" => {
                    source.copy_info |= is_set(child, "copy");
                    source.mute_info |= is_set(child, "mute");
                }
                "kerning" => source.mute_kerning |= is_set(child, "mute"),
                "glyph" => {
                    if let Some(glyph) = child.attr("name")
                        && is_set(child, "mute")
                    {
                        source.muted_glyph_names.push(glyph.to_string());
                    }
                }
                _ => (),
            }
        }
        Ok(source)
    }

    fn read_instances(&self, root: &Element, axes: &[Axis]) -> Result<Vec<Instance>> {
        let Some(instances) = root.find("instances") else {
            return Ok(Vec::new());
        };
        instances
            .find_all("instance")
            .map(|element| self.read_instance(element, axes))
            .collect()
    }

    fn read_instance(&self, element: &Element, axes: &[Axis]) -> Result<Instance> {
        let filename = element.attr("filename").map(str::to_string);
        let mut instance = Instance {
            path: self.resolve(filename.as_deref()),
            filename,
            name: element.attr("name").map(str::to_string),
            family_name: element.attr("familyname").map(str::to_string),
            style_name: element.attr("stylename").map(str::to_string),
            postscript_font_name: element.attr("postscriptfontname").map(str::to_string),
            style_map_family_name: element.attr("stylemapfamilyname").map(str::to_string),
            style_map_style_name: element.attr("stylemapstylename").map(str::to_string),
            location: location_from_element(element, axes)?,
            // kerning and info stay on; their elements never clear them
            ..Default::default()
        };

        for child in &element.children {
            let Some(language) = language_of(child) else {
                continue;
            };
            let text = child.text().unwrap_or_default();
            match child.name.as_str() {
                "stylename" => instance.set_style_name(text, language),
                "familyname" => instance.set_family_name(text, language),
                "stylemapstylename" => instance.set_style_map_style_name(text, language),
                "stylemapfamilyname" => instance.set_style_map_family_name(text, language),
                _ => (),
            }
        }

        if let Some(glyphs) = element.find("glyphs") {
            for glyph in glyphs.find_all("glyph") {
                let (name, data) = read_glyph(glyph, axes)?;
                instance.glyphs.insert(name, data);
            }
        }

        if let Some(lib) = element.find("lib") {
            instance.lib = lib_data::dictionary_from_lib(lib)?;
        }
        Ok(instance)
    }

    fn resolve(&self, filename: Option<&str>) -> Option<std::path::PathBuf> {
        let filename = filename?;
        let dir = self.document_dir?;
        Some(paths::normalize(&dir.join(filename)))
    }
}

fn read_axis(element: &Element) -> Result<Axis> {
    let name = required(element, "axis", "name")?;
    let tag = match element.attr("tag") {
        Some(tag) => tag.to_string(),
        None => {
            let (tag, _) = tag_for_axis_name(name);
            debug!("Axis '{name}' has no tag, using '{tag}'");
            tag
        }
    };

    let mut axis = Axis::new(
        &tag,
        name,
        required_number(element, "axis", "minimum")?,
        required_number(element, "axis", "default")?,
        required_number(element, "axis", "maximum")?,
    );
    axis.hidden = element.attr("hidden").is_some_and(|v| !v.is_empty());

    for child in &element.children {
        match child.name.as_str() {
            "map" => axis.map.push((
                required_number(child, "map", "input")?,
                required_number(child, "map", "output")?,
            )),
            "labelname" => {
                if let Some(language) = language_of(child) {
                    let label = child.text().unwrap_or_default().to_string();
                    axis.label_names.insert(language.to_string(), label);
                }
            }
            _ => (),
        }
    }
    Ok(axis)
}

fn read_rule(element: &Element) -> Result<Rule> {
    let mut rule = Rule { name: element.attr("name").map(str::to_string), ..Default::default() };

    let stray = read_conditions(element)?;
    if !stray.is_empty() {
        warn!("Found stray rule conditions outside a conditionset. Wrapped them in a new conditionset.");
        rule.condition_sets.push(stray);
    }
    for set in element.find_all("conditionset") {
        rule.condition_sets.push(read_conditions(set)?);
    }
    for sub in element.find_all("sub") {
        rule.subs.push((
            required(sub, "sub", "name")?.to_string(),
            required(sub, "sub", "with")?.to_string(),
        ));
    }
    Ok(rule)
}

fn read_conditions(parent: &Element) -> Result<ConditionSet> {
    parent
        .find_all("condition")
        .map(|element| {
            Ok(Condition {
                name: required(element, "condition", "name")?.to_string(),
                minimum: number(element, "condition", "minimum")?,
                maximum: number(element, "condition", "maximum")?,
            })
        })
        .collect()
}

fn read_glyph(element: &Element, axes: &[Axis]) -> Result<(String, InstanceGlyph)> {
    let name = element.attr("name").ok_or(Error::UnnamedGlyph)?.to_string();
    let mut glyph = InstanceGlyph {
        mute: is_set(element, "mute"),
        unicodes: element.attr("unicode").map(parse_unicodes).transpose()?,
        note: element.find("note").map(|note| note.text().unwrap_or_default().to_string()),
        instance_location: location_from_element(element, axes)?,
        masters: None,
    };

    if let Some(masters) = element.find("masters") {
        let masters = masters
            .find_all("master")
            .map(|master| {
                Ok(GlyphMaster {
                    font: master.attr("source").map(str::to_string),
                    glyph_name: master.attr("glyphname").unwrap_or(&name).to_string(),
                    location: location_from_element(master, axes)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if !masters.is_empty() {
            glyph.masters = Some(masters);
        }
    }
    Ok((name, glyph))
}

/// Parse a space separated list of hex code points, with or without `0x`.
fn parse_unicodes(raw: &str) -> Result<Vec<u32>> {
    raw.split_whitespace()
        .map(|value| {
            let digits = value
                .strip_prefix("0x")
                .or_else(|| value.strip_prefix("0X"))
                .unwrap_or(value);
            u32::from_str_radix(digits, 16)
                .map_err(|inner| Error::InvalidUnicode { raw: raw.to_string(), inner })
        })
        .collect()
}

/// Read the first `<location>` child of `element`, if any.
fn location_from_element(element: &Element, axes: &[Axis]) -> Result<Option<Location>> {
    element
        .find("location")
        .map(|location| read_location(location, axes))
        .transpose()
}

fn read_location(element: &Element, axes: &[Axis]) -> Result<Location> {
    if axes.is_empty() {
        return Err(Error::NoAxes);
    }
    let mut location = Location::new();
    for dimension in element.find_all("dimension") {
        let name = dimension.attr("name").unwrap_or_default();
        if !axes.iter().any(|axis| axis.name == name) {
            warn!("Location with undefined axis: \"{name}\".");
            continue;
        }
        let x = required_number(dimension, "dimension", "xvalue")?;
        let y = match dimension.attr("yvalue").map(str::parse::<f64>) {
            Some(Ok(y)) => Some(y),
            Some(Err(_)) => {
                warn!("Ignoring invalid yvalue on dimension \"{name}\".");
                None
            }
            None => None,
        };
        let value = match y {
            Some(y) => DimensionValue::Anisotropic { x, y },
            None => DimensionValue::Isotropic(x),
        };
        location.insert(name, value);
    }
    Ok(location)
}

fn language_of(element: &Element) -> Option<&str> {
    element.attr(XML_LANG)
}

fn is_set(element: &Element, attribute: &str) -> bool {
    element.attr(attribute) == Some("1")
}

fn required<'e>(element: &'e Element, tag: &'static str, attribute: &'static str) -> Result<&'e str> {
    element
        .attr(attribute)
        .ok_or(Error::MissingAttribute { element: tag, attribute })
}

fn number(element: &Element, tag: &'static str, attribute: &'static str) -> Result<Option<f64>> {
    element
        .attr(attribute)
        .map(|value| {
            value.trim().parse::<f64>().map_err(|_| Error::InvalidNumber {
                element: tag,
                attribute,
                value: value.to_string(),
            })
        })
        .transpose()
}

fn required_number(element: &Element, tag: &'static str, attribute: &'static str) -> Result<f64> {
    number(element, tag, attribute)?.ok_or(Error::MissingAttribute { element: tag, attribute })
}
