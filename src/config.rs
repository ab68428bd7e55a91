//! Build configuration parsed from the builder's flag tokens.
//!
//! The configuration is built once per invocation by [`BuildConfiguration::from_tokens`]
//! and never mutated afterwards.
//!
//! ## Recognized flags
//!
//! - `-j<N>` / `-core<N>` - number of compiler processes (default: logical cores)
//! - `-O<0..3>` - optimization level (default: 0)
//! - `--clean` - remove transient build artifacts and exit
//! - `--package`, `--package-dist`, `--package-clean` - packaging modes

use crate::error::OptionError;
use std::num::NonZeroUsize;

/// Compiler optimization level, always within `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct OptLevel(u8);

impl OptLevel {
    pub const MAX: u8 = 3;

    pub fn new(level: u8) -> Option<Self> {
        (level <= Self::MAX).then_some(Self(level))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn description(self) -> &'static str {
        match self.0 {
            0 => "Don't optimize",
            1 => "Optimize moderately",
            2 => "Optimize more",
            _ => "Optimize even more",
        }
    }

    /// GCC-style flag, e.g. `-O2`.
    pub fn flag(self) -> String {
        format!("-O{}", self.0)
    }
}

/// What the invocation should do, resolved from the flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Remove transient artifacts and exit.
    Clean,
    /// Remove leftovers of a previous packaging run and exit.
    PackageClean,
    /// Package the project. `dist_only` skips rebuilding dependencies.
    Package { dist_only: bool },
    /// Normal full rebuild.
    Build,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
    pub workers: NonZeroUsize,
    pub optimization: OptLevel,
    pub clean: bool,
    pub package: bool,
    pub package_dist: bool,
    pub package_clean: bool,
    /// Toolchain link arguments for the host platform.
    pub link_args: Vec<String>,
}

impl Default for BuildConfiguration {
    fn default() -> Self {
        Self {
            workers: host_cores(),
            optimization: OptLevel::default(),
            clean: false,
            package: false,
            package_dist: false,
            package_clean: false,
            link_args: platform_link_args(),
        }
    }
}

impl BuildConfiguration {
    /// Parse the builder's flag tokens.
    ///
    /// Fails on the first malformed or unknown token; no partial configuration is returned.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, OptionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();

        for token in tokens {
            let token = token.as_ref();
            match token {
                "--clean" => config.clean = true,
                "--package" => config.package = true,
                "--package-dist" => {
                    config.package = true;
                    config.package_dist = true;
                }
                "--package-clean" => config.package_clean = true,
                _ => {
                    if let Some(value) = token.strip_prefix("-core") {
                        config.workers = parse_workers("-core", value)?;
                    } else if let Some(value) = token.strip_prefix("-j") {
                        config.workers = parse_workers("-j", value)?;
                    } else if let Some(value) = token.strip_prefix("-O") {
                        config.optimization = parse_opt_level(value)?;
                    } else {
                        return Err(OptionError::UnknownOption(token.to_string()));
                    }
                }
            }
        }

        Ok(config)
    }

    /// Clean-only wins over packaging, which wins over a normal build.
    pub fn mode(&self) -> Mode {
        if self.clean {
            Mode::Clean
        } else if self.package_clean {
            Mode::PackageClean
        } else if self.package {
            Mode::Package {
                dist_only: self.package_dist,
            }
        } else {
            Mode::Build
        }
    }

    /// Arguments appended to every link (or single-shot) invocation.
    pub fn link_flags(&self) -> Vec<String> {
        let mut flags = self.link_args.clone();
        flags.push(self.optimization.flag());
        flags
    }
}

fn parse_workers(flag: &str, value: &str) -> Result<NonZeroUsize, OptionError> {
    value
        .parse::<NonZeroUsize>()
        .map_err(|_| OptionError::InvalidWorkerCount {
            flag: flag.to_string(),
            value: value.to_string(),
        })
}

fn parse_opt_level(value: &str) -> Result<OptLevel, OptionError> {
    value
        .parse::<u8>()
        .ok()
        .and_then(OptLevel::new)
        .ok_or_else(|| OptionError::InvalidOptimization(value.to_string()))
}

/// Logical core count of the host, at least one.
pub fn host_cores() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

fn platform_link_args() -> Vec<String> {
    if cfg!(windows) {
        vec!["-lws2_32".to_string()]
    } else {
        vec!["-lm".to_string()]
    }
}
