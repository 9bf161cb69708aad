//! # Designspace
//!
//! Read, write and evaluate designspace documents.
//!
//! A designspace describes a multi-axis design space for font interpolation:
//! the axes, the source (master) fonts at their locations, substitution
//! rules, the instances to generate and free-form lib data. This crate reads
//! format 3 and 4 documents, writes format 4, and provides the operations an
//! instance generator needs on top of the data.
//!
//! ## Example
//!
//! ```no_run
//! use designspace::{DesignSpaceDocument, Location};
//!
//! let mut doc = DesignSpaceDocument::load("MyFamily.designspace").unwrap();
//! for problem in doc.validate() {
//!     eprintln!("{problem}");
//! }
//!
//! let bold = Location::new().with("weight", 700.0);
//! let glyphs = doc.process_rules_at(&bold, &["dollar", "cent"]);
//! println!("{glyphs:?}");
//!
//! doc.normalize();
//! doc.write("MyFamily-normalized.designspace").unwrap();
//! ```

mod axis;
mod designspace;
mod error;
mod lib_data;
mod location;
mod normalize;
mod paths;
mod reader;
mod rules;
mod validate;
mod writer;
mod xml;

pub use axis::{Axis, tag_for_axis_name};
pub use designspace::{
    DesignSpaceDocument, GlyphMaster, Instance, InstanceGlyph, Source, TEMP_SOURCE_NAME_PREFIX,
};
pub use error::{Error, Result};
pub use location::{DimensionValue, Location};
pub use normalize::normalize_location;
pub use paths::{normalize as normalize_path, posix, relative_path};
pub use plist::{Dictionary, Value};
pub use rules::{Condition, ConditionSet, Rule, evaluate_conditions, evaluate_rule, process_rules};
pub use validate::{Problem, Severity};
pub use writer::FORMAT_VERSION;
