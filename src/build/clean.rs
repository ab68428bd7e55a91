//! Transient artifact cleanup.
//!
//! Object files and the resource object only live for the duration of a build.
//! [`CleanupGuard`] removes them when it goes out of scope, so every exit path
//! of a build leaves the working directory clean. `--clean` sweeps leftovers
//! of interrupted builds.

use crate::layout::{OBJECT_EXTENSION, ProjectLayout};
use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Remove a file if present. Missing files are not an error.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Remove every object file directly inside `root`. Returns how many were removed.
pub fn sweep_object_files(root: &Path) -> io::Result<usize> {
    let mut removed = 0;
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().is_some_and(|ext| ext == OBJECT_EXTENSION)
            && remove_if_exists(path)?
        {
            removed += 1;
        }
    }
    Ok(removed)
}

/// The transient files one build may create, relative to `root`.
#[derive(Debug, Clone)]
pub struct Transients {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl Transients {
    pub fn new(root: impl Into<PathBuf>, files: Vec<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files,
        }
    }

    pub fn for_layout(layout: &ProjectLayout) -> Self {
        let mut files: Vec<PathBuf> = layout
            .sources
            .artifacts()
            .into_iter()
            .map(|a| a.object)
            .collect();
        files.extend(layout.resource_object());
        Self {
            root: layout.root.clone(),
            files,
        }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Remove every transient that exists. Safe to call repeatedly.
    pub fn remove(&self) -> io::Result<usize> {
        let mut removed = 0;
        for file in &self.files {
            if remove_if_exists(&self.root.join(file))? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Removes its transients on drop.
pub struct CleanupGuard {
    transients: Transients,
}

impl CleanupGuard {
    pub fn new(transients: Transients) -> Self {
        Self { transients }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        match self.transients.remove() {
            Ok(n) => tracing::debug!(removed = n, "transient artifacts cleaned"),
            Err(e) => tracing::warn!(error = %e, "failed to remove transient artifacts"),
        }
    }
}

/// `--clean`: drop leftover objects and the resource object.
pub fn clean(layout: &ProjectLayout) -> Result<()> {
    let swept = sweep_object_files(&layout.root)
        .with_context(|| format!("Failed to clean {}", layout.root.display()))?;
    let listed = Transients::for_layout(layout)
        .remove()
        .context("Failed to remove transient artifacts")?;
    tracing::debug!(swept, listed, "clean finished");

    println!(
        "{} Successfully cleaned building remaining files.",
        "✓".green()
    );
    Ok(())
}

/// `--package-clean`: packaging leaves nothing behind yet, so this only confirms.
pub fn clean_packaging(_layout: &ProjectLayout) -> Result<()> {
    println!(
        "{} Successfully cleaned packaging remaining files.",
        "✓".green()
    );
    Ok(())
}
