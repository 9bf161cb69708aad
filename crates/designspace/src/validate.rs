//! Consistency checks for a loaded document.

use std::{collections::HashSet, fmt};

use font_types::Tag;

use crate::{designspace::DesignSpaceDocument, location::Location};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// Something wrong with a document, and where.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub severity: Severity,
    /// Which part of the document, e.g. `source 'master.light'`
    pub context: String,
    pub message: String,
}

impl Problem {
    fn error(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, context: context.into(), message: message.into() }
    }

    fn warning(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, context: context.into(), message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{level}: {}: {}", self.context, self.message)
    }
}

impl DesignSpaceDocument {
    /// Check the document for problems, without stopping at the first one.
    pub fn validate(&self) -> Vec<Problem> {
        let mut problems = Vec::new();
        self.check_axes(&mut problems);
        self.check_rules(&mut problems);
        self.check_sources(&mut problems);
        self.check_instances(&mut problems);
        problems
    }

    fn check_axes(&self, problems: &mut Vec<Problem>) {
        let mut seen = HashSet::new();
        for axis in &self.axes {
            let context = format!("axis '{}'", axis.name);
            if !seen.insert(axis.name.as_str()) {
                problems.push(Problem::error(&context, "duplicate axis name"));
            }
            if let Err(e) = Tag::new_checked(axis.tag.as_bytes()) {
                problems.push(Problem::error(&context, format!("invalid tag '{}': {e}", axis.tag)));
            }
            if !(axis.minimum <= axis.default && axis.default <= axis.maximum) {
                problems.push(Problem::error(
                    &context,
                    format!(
                        "default {} is outside {} … {}",
                        axis.default, axis.minimum, axis.maximum
                    ),
                ));
            }
        }
    }

    fn check_rules(&self, problems: &mut Vec<Problem>) {
        for (idx, rule) in self.rules.iter().enumerate() {
            let context = match &rule.name {
                Some(name) => format!("rule '{name}'"),
                None => format!("rule #{idx}"),
            };
            if rule.subs.is_empty() {
                problems.push(Problem::warning(&context, "rule has no substitutions"));
            }
            for condition in rule.condition_sets.iter().flatten() {
                if self.axis(&condition.name).is_none() {
                    problems.push(Problem::error(
                        &context,
                        format!("condition on undefined axis '{}'", condition.name),
                    ));
                }
                if let (Some(min), Some(max)) = (condition.minimum, condition.maximum)
                    && min > max
                {
                    problems.push(Problem::error(
                        &context,
                        format!("condition on '{}' has minimum {min} above maximum {max}", condition.name),
                    ));
                }
            }
        }
    }

    fn check_sources(&self, problems: &mut Vec<Problem>) {
        for (idx, source) in self.sources.iter().enumerate() {
            let context = match &source.name {
                Some(name) => format!("source '{name}'"),
                None => format!("source #{idx}"),
            };
            if source.filename.is_none() && source.path.is_none() {
                problems.push(Problem::error(&context, "source has no filename"));
            }
            self.check_location(&context, &source.location, problems);
        }
        if !self.sources.is_empty() && self.default_source_index().is_none() {
            problems.push(Problem::error("document", "no default source"));
        }
    }

    fn check_instances(&self, problems: &mut Vec<Problem>) {
        for (idx, instance) in self.instances.iter().enumerate() {
            let context = match &instance.name {
                Some(name) => format!("instance '{name}'"),
                None => format!("instance #{idx}"),
            };
            if let Some(location) = &instance.location {
                self.check_location(&context, location, problems);
            }
            for (glyph_name, glyph) in &instance.glyphs {
                let context = format!("{context}, glyph '{glyph_name}'");
                if let Some(location) = &glyph.instance_location {
                    self.check_location(&context, location, problems);
                }
                for master in glyph.masters.iter().flatten() {
                    if let Some(location) = &master.location {
                        self.check_location(&context, location, problems);
                    }
                    if let Some(font) = &master.font
                        && self.source(font).is_none()
                    {
                        problems.push(Problem::warning(
                            &context,
                            format!("master refers to unknown source '{font}'"),
                        ));
                    }
                }
            }
        }
    }

    fn check_location(&self, context: &str, location: &Location, problems: &mut Vec<Problem>) {
        for name in location.axis_names() {
            if self.axis(name).is_none() {
                problems.push(Problem::error(context, format!("location on undefined axis '{name}'")));
            }
        }
    }
}
