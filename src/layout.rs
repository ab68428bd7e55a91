//! Project layout: the fixed compilation units and the paths around them.
//!
//! The layout defaults to the Dust source tree and can be overridden by an
//! optional `dust.toml` at the project root:
//!
//! ```toml
//! [project]
//! name = "dust"
//! sources = ["src/cli.c", "src/parser.c"]
//! entry = "src/cli.c"
//! include = "include"
//! test_runner = "tests.c"
//! compiler = "gcc"
//! ```
//!
//! Sources are declared, never discovered. Their order is the link order and
//! drives the round-robin assignment to workers.

use crate::error::ValidityError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::env::consts::EXE_SUFFIX;
use std::fs;
use std::path::{Path, PathBuf};

pub const LAYOUT_FILE: &str = "dust.toml";
pub const OBJECT_EXTENSION: &str = "o";

const DEFAULT_SOURCES: [&str; 7] = [
    "src/cli.c",
    "src/ustring.c",
    "src/error.c",
    "src/platform.c",
    "src/tokenizer.c",
    "src/parser.c",
    "src/transpiler.c",
];

#[derive(Deserialize, Debug, Default)]
pub struct LayoutFile {
    #[serde(default)]
    pub project: ProjectSection,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ProjectSection {
    pub name: Option<String>,
    pub sources: Option<Vec<PathBuf>>,
    pub entry: Option<PathBuf>,
    pub include: Option<PathBuf>,
    pub resource: Option<PathBuf>,
    pub test_runner: Option<PathBuf>,
    pub compiler: Option<String>,
    pub resource_compiler: Option<String>,
}

/// A source unit together with the object file it compiles to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectArtifact {
    pub source: PathBuf,
    pub object: PathBuf,
}

/// Object file name for a source unit: its base name with the object extension.
pub fn object_name(source: &Path) -> PathBuf {
    let stem = source.file_stem().unwrap_or(source.as_os_str());
    PathBuf::from(stem).with_extension(OBJECT_EXTENSION)
}

/// Ordered, fixed list of compilation units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet(Vec<PathBuf>);

impl SourceSet {
    pub fn new(units: Vec<PathBuf>) -> Self {
        Self(units)
    }

    pub fn units(&self) -> &[PathBuf] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Expected object artifacts, in source order.
    pub fn artifacts(&self) -> Vec<ObjectArtifact> {
        self.0
            .iter()
            .map(|source| ObjectArtifact {
                source: source.clone(),
                object: object_name(source),
            })
            .collect()
    }

    /// Two units sharing a base name would race on the same object file.
    pub fn check_unique_artifacts(&self) -> Result<(), ValidityError> {
        let mut seen: HashMap<PathBuf, &Path> = HashMap::new();
        for source in &self.0 {
            let object = object_name(source);
            if let Some(first) = seen.get(&object) {
                return Err(ValidityError::DuplicateArtifact {
                    artifact: object,
                    first: first.to_path_buf(),
                    second: source.clone(),
                });
            }
            seen.insert(object, source);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Working directory for every toolchain invocation and every artifact.
    pub root: PathBuf,
    pub name: String,
    pub sources: SourceSet,
    /// Command-line entry point, left out of the test binary.
    pub entry: PathBuf,
    pub include_dir: PathBuf,
    /// Resource descriptor; only set on platforms that embed one.
    pub resource: Option<PathBuf>,
    pub test_runner: PathBuf,
    pub compiler: Option<String>,
    pub resource_compiler: Option<String>,
}

impl ProjectLayout {
    /// The Dust source tree rooted at `root`.
    pub fn dust(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            name: "dust".to_string(),
            sources: SourceSet::new(DEFAULT_SOURCES.iter().map(PathBuf::from).collect()),
            entry: PathBuf::from("src/cli.c"),
            include_dir: PathBuf::from("include"),
            resource: cfg!(windows).then(|| PathBuf::from("assets/dust.rc")),
            test_runner: PathBuf::from("tests.c"),
            compiler: None,
            resource_compiler: None,
        }
    }

    /// Load the layout for `root`, applying `dust.toml` when present.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let mut layout = Self::dust(root);
        let path = layout.root.join(LAYOUT_FILE);
        if !path.exists() {
            return Ok(layout);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: LayoutFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        layout.apply(file.project);
        Ok(layout)
    }

    fn apply(&mut self, section: ProjectSection) {
        if let Some(name) = section.name {
            self.name = name;
        }
        if let Some(sources) = section.sources {
            self.sources = SourceSet::new(sources);
        }
        if let Some(entry) = section.entry {
            self.entry = entry;
        }
        if let Some(include) = section.include {
            self.include_dir = include;
        }
        if cfg!(windows) && section.resource.is_some() {
            self.resource = section.resource;
        }
        if let Some(test_runner) = section.test_runner {
            self.test_runner = test_runner;
        }
        self.compiler = section.compiler.or(self.compiler.take());
        self.resource_compiler = section.resource_compiler.or(self.resource_compiler.take());
    }

    /// Project name for display, e.g. `Dust`.
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn executable_name(&self) -> String {
        format!("{}{}", self.name, EXE_SUFFIX)
    }

    pub fn executable_path(&self) -> PathBuf {
        self.root.join(self.executable_name())
    }

    pub fn test_binary_name(&self) -> String {
        format!("tests{}", EXE_SUFFIX)
    }

    pub fn test_binary_path(&self) -> PathBuf {
        self.root.join(self.test_binary_name())
    }

    /// Transient resource object, relative to the root.
    pub fn resource_object(&self) -> Option<PathBuf> {
        self.resource
            .as_ref()
            .map(|_| PathBuf::from(format!("{}-res.res", self.name)))
    }

    /// Every source unit except the command-line entry point.
    pub fn library_sources(&self) -> Vec<PathBuf> {
        self.sources
            .units()
            .iter()
            .filter(|unit| **unit != self.entry)
            .cloned()
            .collect()
    }

    /// Check everything a build reads exists and no two units share an object file.
    pub fn validate_build(&self) -> Result<(), ValidityError> {
        if self.sources.is_empty() {
            return Err(ValidityError::EmptySourceSet);
        }
        self.sources.check_unique_artifacts()?;
        for unit in self.sources.units() {
            self.require("source file", unit)?;
        }
        self.require("include directory", &self.include_dir)?;
        if let Some(resource) = &self.resource {
            self.require("resource descriptor", resource)?;
        }
        Ok(())
    }

    pub fn validate_tests(&self) -> Result<(), ValidityError> {
        self.require("test runner", &self.test_runner)?;
        for unit in self.library_sources() {
            self.require("source file", &unit)?;
        }
        self.require("include directory", &self.include_dir)
    }

    fn require(&self, what: &'static str, relative: &Path) -> Result<(), ValidityError> {
        let path = self.root.join(relative);
        if path.exists() {
            Ok(())
        } else {
            Err(ValidityError::Missing { what, path })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_tree(root: &Path, files: &[&str]) {
        for file in files {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "int x;\n").unwrap();
        }
    }

    #[test]
    fn test_object_name_uses_base_name() {
        assert_eq!(object_name(Path::new("src/parser.c")), PathBuf::from("parser.o"));
        assert_eq!(object_name(Path::new("lib/a/b.c")), PathBuf::from("b.o"));
    }

    #[test]
    fn test_artifacts_follow_source_order() {
        let layout = ProjectLayout::dust(".");
        let objects: Vec<_> = layout
            .sources
            .artifacts()
            .into_iter()
            .map(|a| a.object)
            .collect();
        let expected: Vec<PathBuf> = [
            "cli.o",
            "ustring.o",
            "error.o",
            "platform.o",
            "tokenizer.o",
            "parser.o",
            "transpiler.o",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(objects, expected);
    }

    #[test]
    fn test_duplicate_base_names_rejected() {
        let set = SourceSet::new(vec![
            PathBuf::from("src/util.c"),
            PathBuf::from("src/main.c"),
            PathBuf::from("vendor/util.c"),
        ]);
        match set.check_unique_artifacts() {
            Err(ValidityError::DuplicateArtifact {
                artifact,
                first,
                second,
            }) => {
                assert_eq!(artifact, PathBuf::from("util.o"));
                assert_eq!(first, PathBuf::from("src/util.c"));
                assert_eq!(second, PathBuf::from("vendor/util.c"));
            }
            other => panic!("expected duplicate artifact, got {other:?}"),
        }
    }

    #[test]
    fn test_library_sources_exclude_entry() {
        let layout = ProjectLayout::dust(".");
        let lib = layout.library_sources();
        assert_eq!(lib.len(), layout.sources.len() - 1);
        assert!(!lib.contains(&PathBuf::from("src/cli.c")));
        assert_eq!(lib[0], PathBuf::from("src/ustring.c"));
    }

    #[test]
    fn test_validate_reports_missing_source() {
        let dir = TempDir::new().unwrap();
        write_tree(dir.path(), &["src/a.c", "include/a.h"]);
        let mut layout = ProjectLayout::dust(dir.path());
        layout.resource = None;
        layout.sources = SourceSet::new(vec![PathBuf::from("src/a.c"), PathBuf::from("src/b.c")]);

        let err = layout.validate_build().unwrap_err();
        assert!(err.to_string().contains("b.c"), "{err}");

        write_tree(dir.path(), &["src/b.c"]);
        layout.validate_build().unwrap();
    }

    #[test]
    fn test_empty_source_set_is_invalid() {
        let mut layout = ProjectLayout::dust(".");
        layout.sources = SourceSet::new(Vec::new());
        assert!(matches!(
            layout.validate_build(),
            Err(ValidityError::EmptySourceSet)
        ));
    }

    #[test]
    fn test_load_applies_layout_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(LAYOUT_FILE),
            r#"
[project]
name = "ember"
sources = ["lib/one.c", "lib/two.c"]
entry = "lib/one.c"
compiler = "clang"
"#,
        )
        .unwrap();

        let layout = ProjectLayout::load(dir.path()).unwrap();
        assert_eq!(layout.name, "ember");
        assert_eq!(layout.display_name(), "Ember");
        assert_eq!(layout.sources.len(), 2);
        assert_eq!(layout.library_sources(), vec![PathBuf::from("lib/two.c")]);
        assert_eq!(layout.compiler.as_deref(), Some("clang"));
        assert_eq!(layout.include_dir, PathBuf::from("include"));
    }

    #[test]
    fn test_load_without_file_uses_dust_defaults() {
        let dir = TempDir::new().unwrap();
        let layout = ProjectLayout::load(dir.path()).unwrap();
        assert_eq!(layout.name, "dust");
        assert_eq!(layout.sources.len(), 7);
        assert_eq!(layout.executable_name(), format!("dust{EXE_SUFFIX}"));
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(LAYOUT_FILE), "[project\nname = ").unwrap();
        let err = ProjectLayout::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
