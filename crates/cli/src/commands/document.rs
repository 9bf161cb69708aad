//! Commands working on a single loaded document.

use std::path::Path;

use anyhow::{Context, Result, bail};
use designspace::{DesignSpaceDocument, Location};
use log::{info as log_info, warn};

use super::format_location;

fn load(path: &Path) -> Result<DesignSpaceDocument> {
    DesignSpaceDocument::load(path)
        .with_context(|| format!("Failed to read designspace: {}", path.display()))
}

/// A human-readable overview of a document.
pub fn summary(doc: &DesignSpaceDocument) -> String {
    let mut out = String::new();
    let name = doc.filename.as_deref().unwrap_or("<unsaved>");
    let version = doc.format_version.as_deref().unwrap_or("?");
    out.push_str(&format!("{name} (format {version})\n"));

    out.push_str(&format!("Axes: {}\n", doc.axes.len()));
    for axis in &doc.axes {
        let hidden = if axis.hidden { " hidden" } else { "" };
        out.push_str(&format!(
            "  {} ({}) {}..{}, default {}{hidden}\n",
            axis.name, axis.tag, axis.minimum, axis.maximum, axis.default
        ));
    }

    out.push_str(&format!("Sources: {}\n", doc.sources.len()));
    for (idx, source) in doc.sources.iter().enumerate() {
        let marker = if doc.default == Some(idx) { " (default)" } else { "" };
        let layer = source.layer_name.as_deref().map(|l| format!(" [{l}]")).unwrap_or_default();
        out.push_str(&format!(
            "  {} {}{layer}: {}{marker}\n",
            source.name.as_deref().unwrap_or("<unnamed>"),
            source.filename.as_deref().unwrap_or("<no file>"),
            format_location(&source.location)
        ));
    }

    out.push_str(&format!("Instances: {}\n", doc.instances.len()));
    for instance in &doc.instances {
        let location = instance.location.as_ref().map(format_location).unwrap_or_default();
        out.push_str(&format!(
            "  {} {}: {location}\n",
            instance.name.as_deref().unwrap_or("<unnamed>"),
            instance.filename.as_deref().unwrap_or("<no file>")
        ));
    }

    out.push_str(&format!("Rules: {}\n", doc.rules.len()));
    for rule in &doc.rules {
        out.push_str(&format!(
            "  {}: {} condition sets, {} substitutions\n",
            rule.name.as_deref().unwrap_or("<unnamed>"),
            rule.condition_sets.len(),
            rule.subs.len()
        ));
    }
    out
}

pub fn info(path: &Path) -> Result<()> {
    let doc = load(path)?;
    print!("{}", summary(&doc));
    Ok(())
}

/// Print problems for each document; fails when any has errors.
pub fn validate(paths: &[impl AsRef<Path>]) -> Result<()> {
    let mut errors = 0;
    let mut warnings = 0;
    for path in paths.iter().map(AsRef::as_ref) {
        let doc = match load(path) {
            Ok(doc) => doc,
            Err(e) => {
                println!("{}: error: {e:#}", path.display());
                errors += 1;
                continue;
            }
        };
        let problems = doc.validate();
        if problems.is_empty() {
            println!("{}: ok", path.display());
        }
        for problem in &problems {
            println!("{}: {problem}", path.display());
            if problem.is_error() {
                errors += 1;
            } else {
                warnings += 1;
            }
        }
    }
    println!("Validate: {errors} errors, {warnings} warnings");
    if errors > 0 {
        bail!("Validation failed with {errors} errors");
    }
    Ok(())
}

/// Print what each glyph becomes at the given axis values.
pub fn rules(path: &Path, at: &[(String, f64)], glyphs: &[String]) -> Result<()> {
    let doc = load(path)?;
    for (name, _) in at {
        if doc.axis(name).is_none() {
            warn!("No axis named '{name}' in {}", path.display());
        }
    }
    let location: Location = at.iter().map(|(name, value)| (name.as_str(), *value)).collect();
    let location = doc.complete_location(&location);
    println!("Location: {}", format_location(&location));
    for (glyph, result) in glyphs.iter().zip(doc.process_rules_at(&location, glyphs)) {
        if *glyph == result {
            println!("  {glyph}");
        } else {
            println!("  {glyph} -> {result}");
        }
    }
    Ok(())
}

pub fn normalize(path: &Path, output: &Path) -> Result<()> {
    let mut doc = load(path)?;
    doc.normalize();
    doc.write(output)
        .with_context(|| format!("Failed to write designspace: {}", output.display()))?;
    log_info!("Wrote normalized document to {}", output.display());
    Ok(())
}

/// Rewrite a document, or print it when `output` is `None`.
pub fn format(path: &Path, output: Option<&Path>) -> Result<()> {
    let mut doc = load(path)?;
    match output {
        Some(output) => {
            doc.write(output)
                .with_context(|| format!("Failed to write designspace: {}", output.display()))?;
            log_info!("Wrote {}", output.display());
        }
        None => print!("{}", doc.to_xml_string()?),
    }
    Ok(())
}
