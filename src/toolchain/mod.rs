//! Toolchain discovery
//!
//! Locates the C compiler and, on Windows, the resource compiler. The compiler
//! comes from `dust.toml`, then the `CC` environment variable, then the first
//! of `gcc`, `cc`, `clang` that answers `--version`.

pub mod invocation;

pub use invocation::Invocation;

use crate::error::ToolchainError;
use crate::layout::ProjectLayout;
use std::path::PathBuf;
use std::process::Command;

const FALLBACK_COMPILERS: [&str; 3] = ["gcc", "cc", "clang"];
const DEFAULT_RESOURCE_COMPILER: &str = "windres";

/// A resolved compiler plus optional resource compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub cc: PathBuf,
    pub resource_compiler: Option<PathBuf>,
    /// First line of `cc --version`, or `unknown`.
    pub version: String,
}

impl Toolchain {
    /// A toolchain for an already known compiler, without probing it.
    pub fn new(cc: impl Into<PathBuf>) -> Self {
        Self {
            cc: cc.into(),
            resource_compiler: None,
            version: "unknown".to_string(),
        }
    }

    pub fn with_resource_compiler(mut self, rc: impl Into<PathBuf>) -> Self {
        self.resource_compiler = Some(rc.into());
        self
    }
}

/// Detect the toolchain for `layout`.
pub fn detect_toolchain(layout: &ProjectLayout) -> Result<Toolchain, ToolchainError> {
    let preferred = layout
        .compiler
        .clone()
        .or_else(|| std::env::var("CC").ok().filter(|cc| !cc.trim().is_empty()));

    let (cc, version) = match preferred {
        Some(cc) => {
            let version = probe_version(&cc).ok_or_else(|| {
                ToolchainError::NotFound(format!("configured compiler '{}' does not run", cc))
            })?;
            (cc, version)
        }
        None => FALLBACK_COMPILERS
            .iter()
            .find_map(|cc| probe_version(cc).map(|v| (cc.to_string(), v)))
            .ok_or_else(|| {
                ToolchainError::NotFound(
                    "no C compiler found. Please install gcc or clang, or set CC.".to_string(),
                )
            })?,
    };

    let resource_compiler = match &layout.resource {
        Some(_) => {
            let rc = layout
                .resource_compiler
                .clone()
                .unwrap_or_else(|| DEFAULT_RESOURCE_COMPILER.to_string());
            if probe_version(&rc).is_none() {
                return Err(ToolchainError::NotFound(format!(
                    "resource compiler '{}' does not run",
                    rc
                )));
            }
            Some(PathBuf::from(rc))
        }
        None => None,
    };

    tracing::debug!(cc = %cc, version = %version, "detected toolchain");

    Ok(Toolchain {
        cc: PathBuf::from(cc),
        resource_compiler,
        version,
    })
}

fn probe_version(program: &str) -> Option<String> {
    let output = Command::new(program).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or("unknown")
        .trim()
        .to_string();
    Some(version)
}
