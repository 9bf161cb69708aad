//! # ufoproc-core
//!
//! Instance planning for designspace documents and their UFO sources.
//!
//! The [`Processor`] reads the sources of a document and works out, per
//! instance, the completed and normalized location, which sources provide
//! copied data, muted glyphs, rule substitutions and the masters behind each
//! glyph. [`swap`] applies rule substitutions to a generated font.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use ufoproc_core::{ProcessOptions, process_path};
//!
//! let options = ProcessOptions::new().ufo_version(3);
//! let (plans, result) = process_path(Path::new("MyFamily.designspace"), &options)?;
//! for plan in &plans {
//!     println!("{} instances", plan.instances.len());
//! }
//! result.ok_or_bail("Plan")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod batch;
pub mod config;
pub mod options;
pub mod plan;
pub mod swap;
pub mod ufo;

pub use batch::{BatchResult, find_documents, plan_document, process_parallel_iter, process_path};
pub use options::ProcessOptions;
pub use plan::{DocumentPlan, GlyphPlan, InstancePlan, MasterGlyph, Processor, SourceFont};
pub use swap::{apply_substitutions, swap_glyph_names};
