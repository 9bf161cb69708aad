//! Reading UFO sources: format version, layers and glyph names.
//!
//! Only the plist files the planner needs are read; glyph data is never parsed.

use std::{collections::BTreeMap, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, de::DeserializeOwned};

use crate::config::{
    CONTENTS_FILENAME, DEFAULT_GLYPHS_DIR, DEFAULT_LAYER_NAME, LAYERCONTENTS_FILENAME,
    METAINFO_FILENAME,
};

#[derive(Deserialize)]
struct MetaInfo {
    #[serde(rename = "formatVersion")]
    format_version: u32,
}

fn read_plist<T: DeserializeOwned>(path: &Path) -> Result<T> {
    plist::from_file(path).with_context(|| format!("Failed to read plist: {}", path.display()))
}

/// The `formatVersion` from the UFO's `metainfo.plist`.
pub fn format_version(ufo: &Path) -> Result<u32> {
    let metainfo: MetaInfo = read_plist(&ufo.join(METAINFO_FILENAME))?;
    Ok(metainfo.format_version)
}

/// `(layer name, directory)` pairs, in drawing order.
///
/// UFOs without `layercontents.plist` have just the default layer.
pub fn layer_contents(ufo: &Path) -> Result<Vec<(String, String)>> {
    let path = ufo.join(LAYERCONTENTS_FILENAME);
    if !path.exists() {
        return Ok(vec![(DEFAULT_LAYER_NAME.to_string(), DEFAULT_GLYPHS_DIR.to_string())]);
    }
    read_plist(&path)
}

/// Glyph names of a layer, or of the default layer when `layer` is `None`, sorted.
pub fn glyph_names(ufo: &Path, layer: Option<&str>) -> Result<Vec<String>> {
    let dir = match layer {
        None => DEFAULT_GLYPHS_DIR.to_string(),
        Some(layer) => layer_contents(ufo)?
            .into_iter()
            .find(|(name, _)| name == layer)
            .map(|(_, dir)| dir)
            .with_context(|| format!("No layer '{layer}' in {}", ufo.display()))?,
    };
    let glyphs: BTreeMap<String, String> = read_plist(&ufo.join(dir).join(CONTENTS_FILENAME))?;
    Ok(glyphs.into_keys().collect())
}


#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{test_support::write_ufo, *};

    #[test]
    fn read_format_version() {
        let dir = TempDir::new().unwrap();
        let ufo = dir.path().join("Test.ufo");
        write_ufo(&ufo, 2, &["a"], &[]);
        assert_eq!(format_version(&ufo).unwrap(), 2);
    }

    #[test]
    fn missing_metainfo_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(format_version(dir.path()).is_err());
    }

    #[test]
    fn glyph_names_of_layers() {
        let dir = TempDir::new().unwrap();
        let ufo = dir.path().join("Test.ufo");
        let support: &[&str] = &["a"];
        write_ufo(&ufo, 3, &["b", "a", "dollar"], &[("support", support)]);

        assert_eq!(glyph_names(&ufo, None).unwrap(), vec!["a", "b", "dollar"]);
        assert_eq!(glyph_names(&ufo, Some("support")).unwrap(), vec!["a"]);
        assert!(glyph_names(&ufo, Some("missing")).is_err());

        let layers = layer_contents(&ufo).unwrap();
        assert_eq!(layers[1], ("support".to_string(), "glyphs.support".to_string()));
    }

    #[test]
    fn malformed_plists_are_errors() {
        let dir = TempDir::new().unwrap();
        let ufo = dir.path().join("Test.ufo");
        write_ufo(&ufo, 3, &["a"], &[]);

        fs::write(ufo.join("metainfo.plist"), "<plist version=\"1.0\"><dict><key>creator</key><string>x</string></dict></plist>").unwrap();
        assert!(format_version(&ufo).is_err());

        fs::write(ufo.join("layercontents.plist"), "<plist version=\"1.0\"><array><string>glyphs</string></array></plist>").unwrap();
        assert!(layer_contents(&ufo).is_err());

        fs::write(ufo.join("glyphs").join("contents.plist"), "<plist version=\"1.0\"><array/></plist>").unwrap();
        assert!(glyph_names(&ufo, None).is_err());
    }

    #[test]
    fn default_layer_without_layercontents() {
        let dir = TempDir::new().unwrap();
        let ufo = dir.path().join("Test.ufo");
        write_ufo(&ufo, 2, &["a"], &[]);
        assert_eq!(
            layer_contents(&ufo).unwrap(),
            vec![("public.default".to_string(), "glyphs".to_string())]
        );
    }
}
