//! Swapping glyphs in a generated font, to apply rule substitutions.
//!
//! A rule says "at this location, use `a.alt` where `a` was". In a finished
//! font that means the outline stored under `a` is exchanged with the one
//! under `a.alt`. Everything that refers to either glyph by name is updated
//! so the font still looks the same everywhere else.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use kurbo::{Affine, BezPath};
use log::debug;

/// A component reference to another glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub base: String,
    pub transform: Affine,
}

impl Component {
    pub fn new(base: &str, transform: Affine) -> Self {
        Self { base: base.to_string(), transform }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Glyph {
    pub outline: BezPath,
    pub components: Vec<Component>,
    pub width: f64,
    pub unicodes: Vec<u32>,
}

/// The parts of a generated font that refer to glyphs by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Font {
    pub glyphs: IndexMap<String, Glyph>,
    pub kerning: BTreeMap<(String, String), f64>,
    pub groups: BTreeMap<String, Vec<String>>,
}

impl Font {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_glyph(mut self, name: &str, glyph: Glyph) -> Self {
        self.glyphs.insert(name.to_string(), glyph);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.glyphs.contains_key(name)
    }
}

/// Swap the drawings of two glyphs.
///
/// Outlines, components and advance widths change places; unicodes stay
/// where they are. Component references, kerning pairs and group members
/// naming either glyph are swapped too. Returns false, changing nothing,
/// when either glyph is missing.
pub fn swap_glyph_names(font: &mut Font, old_name: &str, new_name: &str) -> bool {
    if old_name == new_name {
        return font.contains(old_name);
    }
    let (Some(old_idx), Some(new_idx)) =
        (font.glyphs.get_index_of(old_name), font.glyphs.get_index_of(new_name))
    else {
        return false;
    };
    debug!("Swapping glyphs '{old_name}' and '{new_name}'");

    let (old_glyph, new_glyph) = pair_mut(&mut font.glyphs, old_idx, new_idx);
    std::mem::swap(&mut old_glyph.outline, &mut new_glyph.outline);
    std::mem::swap(&mut old_glyph.components, &mut new_glyph.components);
    std::mem::swap(&mut old_glyph.width, &mut new_glyph.width);

    let swapped = |name: &str| -> Option<String> {
        if name == old_name {
            Some(new_name.to_string())
        } else if name == new_name {
            Some(old_name.to_string())
        } else {
            None
        }
    };

    for glyph in font.glyphs.values_mut() {
        for component in &mut glyph.components {
            if let Some(base) = swapped(component.base.as_str()) {
                component.base = base;
            }
        }
    }

    font.kerning = std::mem::take(&mut font.kerning)
        .into_iter()
        .map(|((first, second), value)| {
            let first = swapped(first.as_str()).unwrap_or(first);
            let second = swapped(second.as_str()).unwrap_or(second);
            ((first, second), value)
        })
        .collect();

    for members in font.groups.values_mut() {
        for member in members.iter_mut() {
            if let Some(name) = swapped(member.as_str()) {
                *member = name;
            }
        }
    }
    true
}

/// Apply `(old, new)` rule output to a font, in order.
///
/// Returns how many pairs were applied; pairs naming a missing glyph are skipped.
pub fn apply_substitutions(font: &mut Font, substitutions: &[(String, String)]) -> usize {
    substitutions
        .iter()
        .filter(|(old, new)| swap_glyph_names(font, old, new))
        .count()
}

fn pair_mut<'a>(
    glyphs: &'a mut IndexMap<String, Glyph>,
    a: usize,
    b: usize,
) -> (&'a mut Glyph, &'a mut Glyph) {
    let slice = glyphs.as_mut_slice();
    if a < b {
        let (left, right) = slice.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = slice.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
