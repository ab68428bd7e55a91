//! Toolchain invocations as plain values.
//!
//! Every compiler call the builder makes is first constructed here, so the
//! argument lists can be logged and checked without running anything.

use super::Toolchain;
use crate::config::BuildConfiguration;
use crate::error::ToolchainError;
use crate::layout::ProjectLayout;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// A `Command` running in `cwd`.
    pub fn command(&self, cwd: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(cwd);
        cmd
    }

    /// Run to completion, capturing stdout and stderr.
    pub fn output(&self, cwd: &Path) -> Result<Output, ToolchainError> {
        tracing::debug!(command = %self, "invoking toolchain");
        self.command(cwd)
            .output()
            .map_err(|source| ToolchainError::Spawn {
                program: self.program.display().to_string(),
                source,
            })
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

fn include_flag(layout: &ProjectLayout) -> String {
    format!("-I{}", layout.include_dir.display())
}

impl Toolchain {
    /// Compile and link every unit into the executable in one call.
    pub fn single_build(&self, layout: &ProjectLayout, config: &BuildConfiguration) -> Invocation {
        Invocation::new(&self.cc)
            .arg("-o")
            .arg(layout.executable_name())
            .args(layout.sources.units())
            .args(layout.resource_object())
            .arg(include_flag(layout))
            .args(config.link_flags())
    }

    /// Compile `units` to object files in the working directory, without linking.
    pub fn compile_objects(
        &self,
        units: &[PathBuf],
        layout: &ProjectLayout,
        config: &BuildConfiguration,
    ) -> Invocation {
        Invocation::new(&self.cc)
            .arg("-c")
            .args(units)
            .arg(include_flag(layout))
            .arg(config.optimization.flag())
    }

    /// Link object files (and the resource object, if any) into the executable.
    pub fn link(
        &self,
        objects: &[PathBuf],
        layout: &ProjectLayout,
        config: &BuildConfiguration,
    ) -> Invocation {
        Invocation::new(&self.cc)
            .arg("-o")
            .arg(layout.executable_name())
            .args(objects)
            .args(layout.resource_object())
            .args(config.link_flags())
    }

    /// Compile the resource descriptor, when the layout has one.
    pub fn resource(&self, layout: &ProjectLayout) -> Option<Invocation> {
        let rc = self.resource_compiler.as_ref()?;
        let descriptor = layout.resource.as_ref()?;
        let object = layout.resource_object()?;
        Some(
            Invocation::new(rc)
                .arg(descriptor)
                .args(["-O", "coff", "-o"])
                .arg(object),
        )
    }

    /// Build the test binary from the test runner and the library units.
    pub fn test_build(&self, layout: &ProjectLayout, config: &BuildConfiguration) -> Invocation {
        Invocation::new(&self.cc)
            .arg("-o")
            .arg(layout.test_binary_name())
            .arg(&layout.test_runner)
            .args(layout.library_sources())
            .arg(include_flag(layout))
            .args(&config.link_args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::SourceSet;
    use std::env::consts::EXE_SUFFIX;

    fn setup() -> (Toolchain, ProjectLayout, BuildConfiguration) {
        let mut layout = ProjectLayout::dust("/project");
        layout.resource = None;
        layout.sources = SourceSet::new(vec![
            PathBuf::from("src/cli.c"),
            PathBuf::from("src/parser.c"),
        ]);
        let config = BuildConfiguration::from_tokens(["-O2"]).unwrap();
        (Toolchain::new("gcc"), layout, config)
    }

    fn args(inv: &Invocation) -> Vec<String> {
        inv.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_single_build_arguments() {
        let (tc, layout, config) = setup();
        let inv = tc.single_build(&layout, &config);
        assert_eq!(inv.program, PathBuf::from("gcc"));
        let a = args(&inv);
        assert_eq!(a[0], "-o");
        assert_eq!(a[1], format!("dust{EXE_SUFFIX}"));
        assert_eq!(&a[2..5], ["src/cli.c", "src/parser.c", "-Iinclude"]);
        assert_eq!(a.last().unwrap(), "-O2");
    }

    #[test]
    fn test_compile_objects_is_compile_only() {
        let (tc, layout, config) = setup();
        let inv = tc.compile_objects(&[PathBuf::from("src/parser.c")], &layout, &config);
        assert_eq!(args(&inv), ["-c", "src/parser.c", "-Iinclude", "-O2"]);
    }

    #[test]
    fn test_link_keeps_object_order() {
        let (tc, layout, config) = setup();
        let objects = [PathBuf::from("cli.o"), PathBuf::from("parser.o")];
        let a = args(&tc.link(&objects, &layout, &config));
        assert_eq!(&a[2..4], ["cli.o", "parser.o"]);
        assert!(!a.iter().any(|x| x == "-c"));
    }

    #[test]
    fn test_resource_requires_compiler_and_descriptor() {
        let (tc, mut layout, _config) = setup();
        assert!(tc.resource(&layout).is_none());

        layout.resource = Some(PathBuf::from("assets/dust.rc"));
        assert!(tc.resource(&layout).is_none());

        let tc = tc.with_resource_compiler("windres");
        let inv = tc.resource(&layout).unwrap();
        assert_eq!(
            args(&inv),
            ["assets/dust.rc", "-O", "coff", "-o", "dust-res.res"]
        );
        let config = BuildConfiguration::from_tokens(["-O0"]).unwrap();
        let link = args(&tc.link(&[PathBuf::from("cli.o")], &layout, &config));
        assert_eq!(link[3], "dust-res.res");
    }

    #[test]
    fn test_test_build_excludes_entry_point() {
        let (tc, layout, config) = setup();
        let a = args(&tc.test_build(&layout, &config));
        assert_eq!(a[1], format!("tests{EXE_SUFFIX}"));
        assert_eq!(a[2], "tests.c");
        assert!(a.contains(&"src/parser.c".to_string()));
        assert!(!a.contains(&"src/cli.c".to_string()));
    }

    #[test]
    fn test_display_joins_arguments() {
        let inv = Invocation::new("gcc").args(["-c", "a.c"]);
        assert_eq!(inv.to_string(), "gcc -c a.c");
    }
}
