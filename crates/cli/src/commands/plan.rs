//! The `plan` command.

use std::path::Path;

use anyhow::Result;
use ufoproc_core::{DocumentPlan, ProcessOptions, process_path};

use super::format_location;

/// A report of every planned instance and the problems found on the way.
pub fn plan_report(plan: &DocumentPlan) -> String {
    let mut out = String::new();
    let document = plan.document.as_deref().map(|p| p.display().to_string()).unwrap_or_default();
    out.push_str(&format!("{document}: {} instances\n", plan.instances.len()));
    for instance in &plan.instances {
        out.push_str(&format!(
            "  {} -> {} (UFO{})\n",
            instance.name.as_deref().unwrap_or("<unnamed>"),
            instance.path.as_deref().map(|p| p.display().to_string()).unwrap_or_default(),
            instance.ufo_version
        ));
        out.push_str(&format!("    location: {}\n", format_location(&instance.location)));
        out.push_str(&format!("    normalized: {}\n", format_location(&instance.normalized_location)));
        for (old, new) in &instance.substitutions {
            out.push_str(&format!("    swap: {old} <-> {new}\n"));
        }
        if !instance.muted_glyphs.is_empty() {
            out.push_str(&format!("    muted: {}\n", instance.muted_glyphs.join(", ")));
        }
        for (glyph, glyph_plan) in &instance.glyphs {
            let masters: Vec<_> =
                glyph_plan.masters.iter().map(|m| m.source_name.as_str()).collect();
            out.push_str(&format!("    glyph {glyph}: {}\n", masters.join(", ")));
        }
    }
    for problem in &plan.problems {
        out.push_str(&format!("  problem: {problem}\n"));
    }
    out
}

pub fn plan(path: &Path, options: &ProcessOptions) -> Result<()> {
    let (plans, result) = process_path(path, options)?;
    for plan in &plans {
        print!("{}", plan_report(plan));
    }
    result.ok_or_bail("Plan")
}
