//! Keeping source and instance filenames in step with their paths.

use std::path::{Component, Path, PathBuf};

use log::debug;

use crate::designspace::DesignSpaceDocument;

/// Render a path with forward slashes, whatever the platform separator.
pub fn posix(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .filter_map(|component| match component {
            Component::RootDir | Component::Prefix(_) => None,
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect();
    let joined = parts.join("/");
    if path.has_root() { format!("/{joined}") } else { joined }
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => (),
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// The path to `target` relative to the directory `base`, with forward slashes.
pub fn relative_path(target: &Path, base: &Path) -> String {
    let target = normalize(target);
    let base = normalize(base);
    let target_parts: Vec<_> = target.components().collect();
    let base_parts: Vec<_> = base.components().collect();
    let common = target_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &target_parts[common..] {
        relative.push(part.as_os_str());
    }
    if relative.as_os_str().is_empty() {
        return ".".to_string();
    }
    posix(&relative)
}

impl DesignSpaceDocument {
    fn document_dir(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }

    /// Update source and instance filenames from their paths, before saving.
    ///
    /// When both the document and a descriptor have a path, the path wins
    /// and the filename is recomputed relative to the document. Descriptors
    /// without a path keep whatever filename they have.
    pub fn update_paths(&mut self) {
        let Some(dir) = self.document_dir().map(Path::to_path_buf) else {
            return;
        };
        let descriptors = self
            .sources
            .iter_mut()
            .map(|s| (&s.path, &mut s.filename))
            .chain(self.instances.iter_mut().map(|i| (&i.path, &mut i.filename)));
        for (path, filename) in descriptors {
            if let Some(path) = path {
                let expected = relative_path(path, &dir);
                if filename.as_deref() != Some(expected.as_str()) {
                    debug!("Filename {filename:?} updated to '{expected}'");
                    *filename = Some(expected);
                }
            }
        }
    }

    /// Set filenames from paths relative to the document.
    ///
    /// Descriptors that already have a filename are skipped unless `force` is set.
    pub fn update_filename_from_path(&mut self, masters: bool, instances: bool, force: bool) {
        let Some(dir) = self.document_dir().map(Path::to_path_buf) else {
            return;
        };
        let update = |path: &Option<PathBuf>, filename: &mut Option<String>| {
            if filename.is_some() && !force {
                return;
            }
            if let Some(path) = path {
                *filename = Some(relative_path(path, &dir));
            }
        };
        if masters {
            for source in &mut self.sources {
                update(&source.path, &mut source.filename);
            }
        }
        if instances {
            for instance in &mut self.instances {
                update(&instance.path, &mut instance.filename);
            }
        }
    }
}
