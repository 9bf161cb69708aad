//! Conditional glyph substitution rules.

use crate::{designspace::DesignSpaceDocument, location::Location};

/// An axis range. Missing bounds are open-ended; present bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Axis name
    pub name: String,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

impl Condition {
    pub fn new(name: &str, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        Self { name: name.to_string(), minimum, maximum }
    }

    pub fn range(name: &str, minimum: f64, maximum: f64) -> Self {
        Self::new(name, Some(minimum), Some(maximum))
    }

    pub fn at_least(name: &str, minimum: f64) -> Self {
        Self::new(name, Some(minimum), None)
    }

    pub fn at_most(name: &str, maximum: f64) -> Self {
        Self::new(name, None, Some(maximum))
    }

    /// Whether `value` lies inside this range.
    pub fn contains(&self, value: f64) -> bool {
        self.minimum.is_none_or(|min| min <= value) && self.maximum.is_none_or(|max| value <= max)
    }
}

/// A set of conditions that must all hold.
pub type ConditionSet = Vec<Condition>;

/// A named substitution triggered when any of its condition sets holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rule {
    pub name: Option<String>,
    pub condition_sets: Vec<ConditionSet>,
    /// `(glyph, replacement)` pairs
    pub subs: Vec<(String, String)>,
}

impl Rule {
    pub fn new(name: &str) -> Self {
        Self { name: Some(name.to_string()), ..Default::default() }
    }

    pub fn with_condition_set(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.condition_sets.push(conditions.into_iter().collect());
        self
    }

    pub fn with_sub(mut self, glyph: &str, replacement: &str) -> Self {
        self.subs.push((glyph.to_string(), replacement.to_string()));
        self
    }

    /// The replacement for `glyph`, from the first substitution naming it.
    pub fn substitute<'a>(&'a self, glyph: &'a str) -> &'a str {
        self.subs
            .iter()
            .find(|(from, _)| from == glyph)
            .map_or(glyph, |(_, to)| to.as_str())
    }
}

/// Return true if all the conditions match the location.
///
/// Anisotropic coordinates are tested on their x value. A condition on an
/// axis that the location does not name never matches.
pub fn evaluate_conditions(conditions: &[Condition], location: &Location) -> bool {
    conditions.iter().all(|condition| {
        location
            .value(&condition.name)
            .is_some_and(|value| condition.contains(value))
    })
}

/// Return true if any of the rule's condition sets matches the location.
pub fn evaluate_rule(rule: &Rule, location: &Location) -> bool {
    rule.condition_sets
        .iter()
        .any(|conditions| evaluate_conditions(conditions, location))
}

/// Apply the rules at this location to these glyph names.
///
/// Rule order matters: the output of one matching rule is the input of the next.
pub fn process_rules<S: AsRef<str>>(
    rules: &[Rule],
    location: &Location,
    glyph_names: &[S],
) -> Vec<String> {
    let mut names: Vec<String> = glyph_names.iter().map(|n| n.as_ref().to_string()).collect();
    for rule in rules.iter().filter(|rule| evaluate_rule(rule, location)) {
        names = names.iter().map(|name| rule.substitute(name).to_string()).collect();
    }
    names
}

impl DesignSpaceDocument {
    /// Apply the document rules at `location`, with axis defaults filled in
    /// for any axis the location omits.
    pub fn process_rules_at<S: AsRef<str>>(
        &self,
        location: &Location,
        glyph_names: &[S],
    ) -> Vec<String> {
        process_rules(&self.rules, &self.complete_location(location), glyph_names)
    }

    /// The `(old, new)` renames the rules produce at `location`.
    pub fn substitutions_at<S: AsRef<str>>(
        &self,
        location: &Location,
        glyph_names: &[S],
    ) -> Vec<(String, String)> {
        let processed = self.process_rules_at(location, glyph_names);
        glyph_names
            .iter()
            .map(|name| -> &str { name.as_ref() })
            .zip(processed)
            .filter(|(old, new)| *old != new.as_str())
            .map(|(old, new)| (old.to_string(), new))
            .collect()
    }
}
