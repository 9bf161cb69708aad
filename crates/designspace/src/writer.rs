//! Serializing a [`DesignSpaceDocument`] to designspace XML.

use crate::{
    axis::Axis,
    designspace::{DesignSpaceDocument, Instance, InstanceGlyph, Source},
    error::Result,
    lib_data::lib_element,
    location::{DimensionValue, Location},
    rules::Rule,
    xml::{self, Element},
};

/// Format version written to the root element.
pub const FORMAT_VERSION: &str = "4.0";

const XML_LANG: &str = "xml:lang";

pub(crate) fn write_document(document: &DesignSpaceDocument) -> Result<String> {
    let mut root = Element::new("designspace");
    root.set_attr("format", FORMAT_VERSION);

    if !document.axes.is_empty() {
        let mut axes = Element::new("axes");
        for axis in &document.axes {
            axes.push(axis_element(axis));
        }
        root.push(axes);
    }

    if !document.rules.is_empty() {
        let mut rules = Element::new("rules");
        for rule in &document.rules {
            if let Some(element) = rule_element(rule) {
                rules.push(element);
            }
        }
        root.push(rules);
    }

    if !document.sources.is_empty() {
        let mut sources = Element::new("sources");
        for source in &document.sources {
            sources.push(source_element(document, source));
        }
        root.push(sources);
    }

    if !document.instances.is_empty() {
        let mut instances = Element::new("instances");
        for instance in &document.instances {
            instances.push(instance_element(document, instance)?);
        }
        root.push(instances);
    }

    if !document.lib.is_empty() {
        root.push(lib_element(&document.lib)?);
    }

    xml::write(&root)
}

/// Integral values are written without a fraction, everything else with six decimals.
pub(crate) fn int_or_float(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.0}")
    } else {
        format!("{value:.6}")
    }
}

fn axis_element(axis: &Axis) -> Element {
    let mut element = Element::new("axis");
    element.set_attr("tag", axis.tag.as_str());
    element.set_attr("name", axis.name.as_str());
    element.set_attr("minimum", int_or_float(axis.minimum));
    element.set_attr("maximum", int_or_float(axis.maximum));
    element.set_attr("default", int_or_float(axis.default));
    if axis.hidden {
        element.set_attr("hidden", "1");
    }
    for (language, label) in &axis.label_names {
        element.push(localised("labelname", language, label));
    }
    for &(input, output) in &axis.map {
        let mut map = Element::new("map");
        map.set_attr("input", int_or_float(input));
        map.set_attr("output", int_or_float(output));
        element.push(map);
    }
    element
}

/// `None` when nothing of the rule survives: bound-less conditions and
/// empty condition sets are not written.
fn rule_element(rule: &Rule) -> Option<Element> {
    let mut element = Element::new("rule");
    if let Some(name) = &rule.name {
        element.set_attr("name", name.as_str());
    }
    for conditions in &rule.condition_sets {
        let mut set = Element::new("conditionset");
        for condition in conditions {
            if condition.minimum.is_none() && condition.maximum.is_none() {
                continue;
            }
            let mut child = Element::new("condition");
            child.set_attr("name", condition.name.as_str());
            if let Some(minimum) = condition.minimum {
                child.set_attr("minimum", int_or_float(minimum));
            }
            if let Some(maximum) = condition.maximum {
                child.set_attr("maximum", int_or_float(maximum));
            }
            set.push(child);
        }
        if set.has_children() {
            element.push(set);
        }
    }
    for (name, with) in &rule.subs {
        let mut sub = Element::new("sub");
        sub.set_attr("name", name.as_str());
        sub.set_attr("with", with.as_str());
        element.push(sub);
    }
    element.has_children().then_some(element)
}

fn source_element(document: &DesignSpaceDocument, source: &Source) -> Element {
    let mut element = Element::new("source");
    if let Some(filename) = &source.filename {
        element.set_attr("filename", filename.as_str());
    }
    if let Some(name) = &source.name
        && !source.has_temporary_name()
    {
        element.set_attr("name", name.as_str());
    }
    if let Some(family_name) = &source.family_name {
        element.set_attr("familyname", family_name.as_str());
    }
    if let Some(style_name) = &source.style_name {
        element.set_attr("stylename", style_name.as_str());
    }
    if let Some(layer_name) = &source.layer_name {
        element.set_attr("layer", layer_name.as_str());
    }

    for (flag, name) in [
        (source.copy_lib, "lib"),
        (source.copy_groups, "groups"),
        (source.copy_features, "features"),
    ] {
        if flag {
            element.push(flagged(name, "copy"));
        }
    }
    if source.copy_info || source.mute_info {
        let mut info = Element::new("info");
        if source.copy_info {
            info.set_attr("copy", "1");
        }
        if source.mute_info {
            info.set_attr("mute", "1");
        }
        element.push(info);
    }
    if source.mute_kerning {
        element.push(flagged("kerning", "mute"));
    }
    for glyph in &source.muted_glyph_names {
        let mut muted = Element::new("glyph");
        muted.set_attr("name", glyph.as_str());
        muted.set_attr("mute", "1");
        element.push(muted);
    }

    element.push(location_element(document, &source.location));
    element
}

fn instance_element(document: &DesignSpaceDocument, instance: &Instance) -> Result<Element> {
    let mut element = Element::new("instance");
    for (attribute, value) in [
        ("name", &instance.name),
        ("familyname", &instance.family_name),
        ("stylename", &instance.style_name),
        ("filename", &instance.filename),
        ("postscriptfontname", &instance.postscript_font_name),
        ("stylemapfamilyname", &instance.style_map_family_name),
        ("stylemapstylename", &instance.style_map_style_name),
    ] {
        if let Some(value) = value {
            element.set_attr(attribute, value.as_str());
        }
    }

    for (tag, names) in [
        ("stylename", &instance.localised_style_name),
        ("familyname", &instance.localised_family_name),
        ("stylemapstylename", &instance.localised_style_map_style_name),
        ("stylemapfamilyname", &instance.localised_style_map_family_name),
    ] {
        // the English name is the attribute itself
        for (language, name) in names.iter().filter(|(language, _)| *language != "en") {
            element.push(localised(tag, language, name));
        }
    }

    if let Some(location) = &instance.location {
        element.push(location_element(document, location));
    }

    if !instance.glyphs.is_empty() {
        let mut glyphs = Element::new("glyphs");
        for (name, glyph) in &instance.glyphs {
            glyphs.push(glyph_element(document, name, glyph));
        }
        element.push(glyphs);
    }

    if instance.kerning {
        element.push(Element::new("kerning"));
    }
    if instance.info {
        element.push(Element::new("info"));
    }
    if !instance.lib.is_empty() {
        element.push(lib_element(&instance.lib)?);
    }
    Ok(element)
}

fn glyph_element(document: &DesignSpaceDocument, name: &str, glyph: &InstanceGlyph) -> Element {
    let mut element = Element::new("glyph");
    if glyph.mute {
        element.set_attr("mute", "1");
    }
    if let Some(unicodes) = &glyph.unicodes {
        let hex: Vec<String> = unicodes.iter().map(|u| format!("{u:#x}")).collect();
        element.set_attr("unicode", hex.join(" "));
    }
    if let Some(location) = &glyph.instance_location {
        element.push(location_element(document, location));
    }
    element.set_attr("name", name);
    if let Some(note) = &glyph.note {
        element.push(Element::new("note").with_text(note.as_str()));
    }
    if let Some(masters) = &glyph.masters {
        let mut list = Element::new("masters");
        for master in masters {
            let mut child = Element::new("master");
            child.set_attr("glyphname", master.glyph_name.as_str());
            if let Some(font) = &master.font {
                child.set_attr("source", font.as_str());
            }
            if let Some(location) = &master.location {
                child.push(location_element(document, location));
            }
            list.push(child);
        }
        element.push(list);
    }
    element
}

/// Write a location completed against the document axes.
fn location_element(document: &DesignSpaceDocument, location: &Location) -> Element {
    let mut element = Element::new("location");
    for (name, value) in document.complete_location(location).iter() {
        let mut dimension = Element::new("dimension");
        dimension.set_attr("name", name);
        match value {
            DimensionValue::Isotropic(x) => dimension.set_attr("xvalue", int_or_float(x)),
            DimensionValue::Anisotropic { x, y } => {
                dimension.set_attr("xvalue", int_or_float(x));
                dimension.set_attr("yvalue", int_or_float(y));
            }
        }
        element.push(dimension);
    }
    element
}

fn localised(tag: &str, language: &str, text: &str) -> Element {
    let mut element = Element::new(tag).with_text(text);
    element.set_attr(XML_LANG, language);
    element
}

fn flagged(tag: &str, flag: &str) -> Element {
    let mut element = Element::new(tag);
    element.set_attr(flag, "1");
    element
}
