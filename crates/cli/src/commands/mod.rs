//! CLI command implementations.

mod document;
mod plan;

pub use document::{format, info, normalize, rules, summary, validate};
pub use plan::{plan, plan_report};

use designspace::{DimensionValue, Location};

/// `weight=400, width=75`, with `x/y` for anisotropic values.
pub fn format_location(location: &Location) -> String {
    location
        .iter()
        .map(|(name, value)| match value {
            DimensionValue::Isotropic(v) => format!("{name}={v}"),
            DimensionValue::Anisotropic { x, y } => format!("{name}={x}/{y}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
