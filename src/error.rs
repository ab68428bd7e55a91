//! Error types for configuration, validation, toolchain and test operations.

use std::path::PathBuf;
use thiserror::Error;

/// Malformed or unknown command-line flag.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("positive integer expected after {flag} flag (-j1, -j4, etc..), got '{value}'")]
    InvalidWorkerCount { flag: String, value: String },

    #[error("optimization level must be one of -O0, -O1, -O2, -O3, got '-O{0}'")]
    InvalidOptimization(String),
}

/// The project on disk does not match what the build expects.
#[derive(Error, Debug)]
pub enum ValidityError {
    #[error("{what} not found: {}", .path.display())]
    Missing { what: &'static str, path: PathBuf },

    #[error(
        "source units {} and {} would both produce {}",
        .first.display(),
        .second.display(),
        .artifact.display()
    )]
    DuplicateArtifact {
        artifact: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("no compilation units configured")]
    EmptySourceSet,
}

/// The compiler or resource compiler could not be run or reported failure.
#[derive(Error, Debug)]
pub enum ToolchainError {
    #[error("toolchain not found: {0}")]
    NotFound(String),

    #[error("failed to execute '{program}'")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("resource compiler failed")]
    ResourceFailed { stderr: String },

    #[error("compilation failed for {}", .units.join(", "))]
    CompileFailed { units: Vec<String> },

    #[error("compiling and linking in a single call failed")]
    BuildFailed { stderr: String },

    #[error("linking failed")]
    LinkFailed { stderr: String },

    #[error("failed to start compiler workers: {0}")]
    WorkerPool(String),
}

/// Malformed test-binary output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("test output has no 'tests:<N>' summary line")]
    MissingTotal,

    #[error("test output has no 'fails:<N>' summary line")]
    MissingFailures,

    #[error("malformed summary line '{line}'")]
    MalformedSummary { line: String },
}

#[derive(Error, Debug)]
pub enum TestError {
    #[error("failed to build the test binary")]
    Build { stderr: String },

    #[error("test binary did not run to completion: {reason}")]
    Execution { reason: String },

    #[error("unexpected test output")]
    Protocol(#[from] ProtocolError),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Option(#[from] OptionError),

    #[error(transparent)]
    Validity(#[from] ValidityError),

    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    #[error(transparent)]
    Test(#[from] TestError),

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
