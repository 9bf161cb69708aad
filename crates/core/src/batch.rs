//! Processing a document or a directory of documents in parallel.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use designspace::DesignSpaceDocument;
use glob::glob;
use log::{error, info};
use rayon::prelude::*;

use crate::{config::DESIGNSPACE_PATTERN, options::ProcessOptions, plan::{DocumentPlan, Processor}};

/// Result of a parallel batch operation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    pub fn ok_or_bail(&self, operation: &str) -> Result<()> {
        if self.failed > 0 {
            bail!("{operation} failed: {} succeeded, {} failed", self.succeeded, self.failed);
        }
        Ok(())
    }
}

/// Process items in parallel with consistent error reporting.
///
/// Failures are logged and counted; successful outputs are returned in input order.
pub fn process_parallel_iter<T, R, F>(
    label: &str,
    items: impl IntoIterator<Item = T>,
    op: F,
) -> (Vec<R>, BatchResult)
where
    T: Send,
    R: Send,
    F: Fn(T) -> Result<R> + Sync,
{
    let items: Vec<T> = items.into_iter().collect();
    let results: Vec<_> = items.into_par_iter().map(&op).collect();

    let mut outputs = Vec::with_capacity(results.len());
    let mut result = BatchResult::default();
    for r in results {
        match r {
            Ok(output) => {
                outputs.push(output);
                result.succeeded += 1;
            }
            Err(e) => {
                error!("{e:?}");
                result.failed += 1;
            }
        }
    }

    info!("{label}: {} succeeded, {} failed", result.succeeded, result.failed);
    (outputs, result)
}

/// Documents to process: `path` itself, or the designspace files in a directory.
pub fn find_documents(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let pattern = path.join(DESIGNSPACE_PATTERN);
    let pattern_str = pattern.to_str().context("Invalid pattern path")?;
    let mut documents: Vec<PathBuf> = glob(pattern_str)
        .with_context(|| format!("Failed to glob pattern: {pattern_str}"))?
        .filter_map(Result::ok)
        .collect();
    documents.sort();
    Ok(documents)
}

/// Load one document and plan all of its instances.
pub fn plan_document(path: &Path, options: &ProcessOptions) -> Result<DocumentPlan> {
    let document = DesignSpaceDocument::load(path)
        .with_context(|| format!("Failed to read designspace: {}", path.display()))?;
    let processor = Processor::new(&document, options.clone())
        .with_context(|| format!("Failed to process {}", path.display()))?;
    Ok(processor.plan_all())
}

/// Plan a single designspace file, or every designspace file in a directory.
pub fn process_path(path: &Path, options: &ProcessOptions) -> Result<(Vec<DocumentPlan>, BatchResult)> {
    let documents = find_documents(path)?;
    if documents.is_empty() {
        bail!("No designspace documents found in {}", path.display());
    }
    Ok(process_parallel_iter("Plan", documents, |document| plan_document(&document, options)))
}
