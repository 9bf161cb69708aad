//! The free-form `<lib>` blocks of documents and instances.
//!
//! Lib contents have no schema; whatever a tool stores there is kept as a
//! [`plist::Dictionary`] and written back in the same key order. The `<dict>`
//! subtree is handed to the plist XML codec as its own document.

use plist::{Dictionary, Value};

use crate::{
    error::{Error, Result},
    xml::{self, Element},
};

const PLIST_ELEMENT: &str = "plist";

/// Read the dictionary held by a `<lib>` element. An empty `<lib/>` yields
/// an empty dictionary.
pub(crate) fn dictionary_from_lib(lib: &Element) -> Result<Dictionary> {
    let Some(value) = lib.children.first() else {
        return Ok(Dictionary::new());
    };
    let mut document = Element::new(PLIST_ELEMENT);
    document.set_attr("version", "1.0");
    document.push(value.clone());
    let xml = xml::write(&document)?;

    Value::from_reader_xml(xml.as_bytes())?
        .into_dictionary()
        .ok_or_else(|| Error::LibNotDictionary(value.name.clone()))
}

/// Build a `<lib>` element holding `lib`.
pub(crate) fn lib_element(lib: &Dictionary) -> Result<Element> {
    let mut buffer = Vec::new();
    Value::Dictionary(lib.clone()).to_writer_xml(&mut buffer)?;
    let document = xml::parse(&String::from_utf8_lossy(&buffer))?;

    let mut element = Element::new("lib");
    for child in document.children {
        element.push(child);
    }
    Ok(element)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn lib(xml: &str) -> Result<Dictionary> {
        dictionary_from_lib(&xml::parse(xml)?)
    }

    #[test]
    fn read_nested_values() {
        let dict = lib(r#"<lib>
    <dict>
        <key>com.example.name</key>
        <string>Test &amp; Co</string>
        <key>com.example.flags</key>
        <array>
            <true/>
            <integer>3</integer>
            <real>0.5</real>
        </array>
        <key>com.example.created</key>
        <date>2018-03-01T12:30:00Z</date>
    </dict>
</lib>"#)
        .unwrap();

        assert_eq!(dict.get("com.example.name").and_then(Value::as_string), Some("Test & Co"));
        let flags = dict.get("com.example.flags").and_then(Value::as_array).unwrap();
        assert_eq!(flags[0].as_boolean(), Some(true));
        assert_eq!(flags[1].as_signed_integer(), Some(3));
        assert_eq!(flags[2].as_real(), Some(0.5));
        assert!(dict.get("com.example.created").and_then(Value::as_date).is_some());
    }

    #[test]
    fn key_order_is_kept() {
        let dict = lib("<lib><dict><key>zeta</key><integer>1</integer><key>alpha</key><string>a</string></dict></lib>")
            .unwrap();
        let keys: Vec<_> = dict.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);

        let element = lib_element(&dict).unwrap();
        let written: Vec<_> = element.children[0].find_all("key").filter_map(|k| k.text()).collect();
        assert_eq!(written, vec!["zeta", "alpha"]);
        assert_eq!(dictionary_from_lib(&element).unwrap(), dict);
    }

    #[test]
    fn empty_lib_is_an_empty_dictionary() {
        assert!(lib("<lib/>").unwrap().is_empty());
    }

    #[test]
    fn lib_must_hold_a_dictionary() {
        assert!(matches!(lib("<lib><array/></lib>"), Err(Error::LibNotDictionary(_))));
        assert!(matches!(lib("<lib><dict><key>lonely</key></dict></lib>"), Err(Error::Plist(_))));
    }
}
