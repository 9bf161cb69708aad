//! Integration tests against the family fixture in `tests/data`.

use std::path::{Path, PathBuf};

use designspace::{
    Condition, DesignSpaceDocument, DimensionValue, Error, Location, Rule, Severity, Source, Value,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

fn fixture_path() -> PathBuf {
    data_dir().join("family.designspace")
}

fn load_fixture() -> DesignSpaceDocument {
    init_logging();
    DesignSpaceDocument::load(fixture_path()).unwrap()
}

// ============================================================================
// Reading
// ============================================================================

#[test]
fn fixture_axes() {
    let doc = load_fixture();

    assert_eq!(doc.format_version.as_deref(), Some("4.0"));
    assert_eq!(doc.axis_order(), vec!["weight", "width", "grade", "custom"]);
    let weight = doc.axis("weight").unwrap();
    assert_eq!((weight.minimum, weight.default, weight.maximum), (100.0, 400.0, 900.0));
    assert_eq!(weight.map_forward(650.0), 290.0);
    assert_eq!(weight.map_backward(290.0), 650.0);
    assert!(doc.axis("grade").unwrap().hidden);
    assert_eq!(doc.axis("custom").unwrap().tag, "cust");
}

#[test]
fn fixture_sources() {
    let doc = load_fixture();

    assert_eq!(doc.sources.len(), 4);
    assert_eq!(doc.default_source().and_then(|s| s.name.as_deref()), Some("master.regular"));

    let regular = doc.source("master.regular").unwrap();
    assert!(regular.copy_lib && regular.copy_groups && regular.copy_features && regular.copy_info);
    assert_eq!(regular.path, Some(data_dir().join("masters").join("Family-Regular.ufo")));

    let thin = doc.source("master.thin").unwrap();
    assert!(thin.mute_kerning);
    assert_eq!(thin.muted_glyph_names, vec!["dollar.nostroke"]);

    assert!(doc.source("master.black").unwrap().mute_info);
    let condensed = doc.source("master.regular.condensed").unwrap();
    assert_eq!(condensed.layer_name.as_deref(), Some("condensed"));
    assert_eq!(condensed.path, regular.path);
}

#[test]
fn fixture_instances() {
    let doc = load_fixture();

    let bold = &doc.instances[0];
    assert_eq!(bold.postscript_font_name.as_deref(), Some("Family-Bold"));
    assert_eq!(bold.style_map_style_name.as_deref(), Some("bold"));
    assert_eq!(bold.style_name_for("de"), Some("Fett"));
    assert_eq!(bold.family_name_for("fr"), Some("Famille"));
    assert!(bold.glyphs["ampersand"].mute);
    let dollar = &bold.glyphs["dollar"];
    assert_eq!(dollar.unicodes, Some(vec![0x24, 0xA2]));
    assert_eq!(dollar.masters.as_ref().map(Vec::len), Some(2));

    let condensed = &doc.instances[1];
    let location = condensed.location.as_ref().unwrap();
    assert_eq!(location.get("weight"), Some(DimensionValue::Anisotropic { x: 300.0, y: 350.0 }));
    assert_eq!(location.value("grade"), Some(-50.5));
    assert_eq!(
        condensed.lib.get("com.example.specimenText").and_then(Value::as_string),
        Some("Hamburgefonstiv")
    );
}

#[test]
fn fixture_lib_is_preserved() {
    let doc = load_fixture();

    let interaction = doc
        .lib_value("com.letterror.skateboard.interactionSources")
        .and_then(Value::as_dictionary)
        .unwrap();
    let horizontal = interaction.get("horizontal").and_then(Value::as_array).unwrap();
    assert_eq!(horizontal, &vec![Value::from("weight")]);
    assert_eq!(interaction.get("ignore").and_then(Value::as_array).map(Vec::len), Some(0));
    let keys: Vec<_> = interaction.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["horizontal", "ignore", "vertical"]);

    let muted = doc.lib_value("com.letterror.skateboard.mutedSources").unwrap();
    assert_eq!(
        muted,
        &Value::Array(vec![Value::Array(vec![
            Value::from("masters/Family-Black.ufo"),
            Value::from("foreground"),
        ])])
    );

    let preview = doc
        .lib_value("com.letterror.skateboard.previewLocation")
        .and_then(Value::as_dictionary)
        .unwrap();
    assert_eq!(preview.get("weight").and_then(Value::as_real), Some(512.5));
    assert_eq!(preview.get("width").and_then(Value::as_signed_integer), Some(100));
}

#[test]
fn fixture_is_valid() {
    let doc = load_fixture();
    assert_eq!(doc.validate(), vec![]);
}

// ============================================================================
// Rules
// ============================================================================

#[test]
fn fixture_rules_at_instances() {
    let doc = load_fixture();
    let glyphs = ["dollar", "cent", "quotesingle", "a"];

    let bold = doc.instances[0].location.as_ref().unwrap();
    assert_eq!(
        doc.process_rules_at(bold, &glyphs),
        vec!["dollar.nostroke", "cent.nostroke", "quotesingle", "a"]
    );

    let condensed = doc.instances[1].location.as_ref().unwrap();
    assert_eq!(
        doc.substitutions_at(condensed, &glyphs),
        vec![("quotesingle".to_string(), "quotesingle.narrow".to_string())]
    );

    // the custom axis alone triggers the second condition set
    let custom = Location::new().with("custom", 0.75);
    assert_eq!(doc.process_rules_at(&custom, &["quotesingle"]), vec!["quotesingle.narrow"]);
}

// ============================================================================
// Writing
// ============================================================================

#[test]
fn fixture_round_trips_exactly() {
    let doc = load_fixture();
    let expected = std::fs::read_to_string(fixture_path()).unwrap();
    assert_eq!(doc.to_xml_string().unwrap(), expected);
}

#[test]
fn write_updates_relative_filenames() {
    let mut doc = load_fixture();
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("nested").join("copy.designspace");
    std::fs::create_dir_all(out.parent().unwrap()).unwrap();

    doc.write(&out).unwrap();
    assert_eq!(doc.filename.as_deref(), Some("copy.designspace"));
    let filename = doc.sources[0].filename.clone().unwrap();
    assert!(filename.starts_with("../"), "{filename}");
    assert!(filename.ends_with("tests/data/masters/Family-Regular.ufo"), "{filename}");

    let reloaded = DesignSpaceDocument::load(&out).unwrap();
    assert_eq!(reloaded.sources[0].path, doc.sources[0].path);
    assert_eq!(reloaded.instances, doc.instances);
    assert_eq!(reloaded.lib, doc.lib);
}

#[test]
fn build_and_write_new_document() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("built.designspace");

    let mut doc = DesignSpaceDocument::new();
    doc.add_axis(designspace::Axis::from_name("weight", 0.0, 0.0, 1000.0));
    doc.add_source(Source::new(dir.path().join("Light.ufo"), [("weight", 0.0)]).with_name("light").copy_all());
    doc.add_source(Source::new(dir.path().join("masters/Bold.ufo"), [("weight", 1000.0)]));
    doc.add_rule(
        Rule::new("bold.a").with_condition_set([Condition::at_least("weight", 600.0)]).with_sub("a", "a.bold"),
    );
    doc.write(&path).unwrap();

    let xml = std::fs::read_to_string(&path).unwrap();
    assert!(xml.contains(r#"<source filename="Light.ufo" name="light">"#), "{xml}");
    assert!(xml.contains(r#"<source filename="masters/Bold.ufo">"#), "{xml}");
    assert!(xml.contains(r#"<labelname xml:lang="en">Weight</labelname>"#), "{xml}");

    let reloaded = DesignSpaceDocument::load(&path).unwrap();
    assert_eq!(reloaded.sources[1].name.as_deref(), Some("temp_master.1"));
    assert_eq!(reloaded.rules, doc.rules);
    assert_eq!(reloaded.default, Some(0));
}

// ============================================================================
// Normalization and older formats
// ============================================================================

#[test]
fn normalize_fixture() {
    let mut doc = load_fixture();
    doc.normalize();

    let condensed = doc.instances[1].location.as_ref().unwrap();
    assert!((condensed.value("weight").unwrap() + 1.0 / 3.0).abs() < 1e-9);
    assert_eq!(condensed.value("width"), Some(-0.8));
    assert_eq!(condensed.value("grade"), Some(-0.505));
    assert_eq!(condensed.value("custom"), Some(1.0));

    let weight = doc.axis("weight").unwrap();
    assert_eq!((weight.minimum, weight.default, weight.maximum), (-1.0, 0.0, 1.0));
    assert_eq!(weight.map[1], (400.0, 0.0));
    assert_eq!(doc.rules[0].condition_sets[0][0], Condition::range("weight", 0.4, 1.0));
}

#[test]
fn format_three_document() {
    init_logging();
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<designspace>
    <axes>
        <axis name="weight" minimum="0" maximum="1000" default="0"/>
    </axes>
    <rules>
        <rule name="stray">
            <condition name="weight" minimum="500"/>
            <sub name="a" with="a.alt"/>
        </rule>
    </rules>
    <sources>
        <source filename="Light.ufo">
            <location><dimension name="weight" xvalue="0"/></location>
        </source>
    </sources>
</designspace>
"#;
    let doc = DesignSpaceDocument::from_xml_str(xml, Some(Path::new("/fonts/old.designspace"))).unwrap();

    assert_eq!(doc.format_version.as_deref(), Some("3.0"));
    assert_eq!(doc.axes[0].tag, "wght");
    assert_eq!(doc.rules[0].condition_sets, vec![vec![Condition::at_least("weight", 500.0)]]);
    assert_eq!(doc.sources[0].name.as_deref(), Some("temp_master.0"));
    assert_eq!(doc.default, Some(0));

    let written = doc.to_xml_string().unwrap();
    let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<designspace format="4.0">
    <axes>
        <axis tag="wght" name="weight" minimum="0" maximum="1000" default="0"/>
    </axes>
    <rules>
        <rule name="stray">
            <conditionset>
                <condition name="weight" minimum="500"/>
            </conditionset>
            <sub name="a" with="a.alt"/>
        </rule>
    </rules>
    <sources>
        <source filename="Light.ufo">
            <location>
                <dimension name="weight" xvalue="0"/>
            </location>
        </source>
    </sources>
</designspace>
"#;
    assert_eq!(written, expected);
}

#[test]
fn problems_in_broken_document() {
    init_logging();
    let xml = r#"<designspace format="4.0">
    <axes>
        <axis tag="wght" name="weight" minimum="0" maximum="1000" default="0"/>
    </axes>
    <rules>
        <rule name="bad">
            <conditionset><condition name="weight" minimum="700" maximum="300"/></conditionset>
        </rule>
    </rules>
    <sources>
        <source filename="Bold.ufo" name="bold">
            <location><dimension name="weight" xvalue="1000"/></location>
        </source>
    </sources>
</designspace>"#;
    let doc = DesignSpaceDocument::from_xml_str(xml, None).unwrap();
    assert_eq!(doc.default, None);

    let problems = doc.validate();
    let severities: Vec<_> = problems.iter().map(|p| p.severity).collect();
    assert_eq!(severities, vec![Severity::Warning, Severity::Error, Severity::Error]);
    assert_eq!(problems[2].message, "no default source");
}

#[test]
fn missing_file_is_an_io_error() {
    let result = DesignSpaceDocument::load(data_dir().join("missing.designspace"));
    assert!(matches!(result, Err(Error::Io { .. })));
}
