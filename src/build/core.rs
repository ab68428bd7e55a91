use super::clean::{CleanupGuard, Transients, remove_if_exists};
use super::distribute::CompilePlan;
use super::feedback::FeedbackAnalyzer;
use crate::config::BuildConfiguration;
use crate::error::{Result, ToolchainError};
use crate::layout::ProjectLayout;
use crate::toolchain::{Invocation, Toolchain};
use crate::ui;
use colored::*;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Outcome of one compile-only worker process.
#[derive(Debug, Clone)]
pub struct CompileResult {
    pub units: Vec<PathBuf>,
    /// Object files this worker was expected to write, in unit order.
    pub objects: Vec<PathBuf>,
    pub success: bool,
    pub stderr: String,
}

impl CompileResult {
    /// Units whose object file is missing after the worker exited.
    ///
    /// A worker that failed without leaving any object missing is blamed as a whole.
    pub fn failed_units(&self, root: &Path) -> Vec<PathBuf> {
        let missing: Vec<PathBuf> = self
            .units
            .iter()
            .zip(&self.objects)
            .filter(|(_, object)| !root.join(object).exists())
            .map(|(unit, _)| unit.clone())
            .collect();

        if missing.is_empty() && !self.success {
            self.units.clone()
        } else {
            missing
        }
    }
}

// --- CORE: Compile Project ---
/// Full rebuild of the project executable.
///
/// Returns the time spent compiling and linking. Transient artifacts are
/// removed before this returns, on success and on failure.
pub fn compile(
    config: &BuildConfiguration,
    layout: &ProjectLayout,
    toolchain: &Toolchain,
) -> Result<Duration> {
    layout.sources.check_unique_artifacts()?;

    // A stale executable must never pass for a fresh build.
    let executable = layout.executable_path();
    if remove_if_exists(&executable)? {
        tracing::debug!(path = %executable.display(), "removed previous executable");
    }

    let transients = Transients::for_layout(layout);
    let _guard = CleanupGuard::new(transients.clone());

    let pb = ui::spinner("Compiling...");
    let plan = CompilePlan::new(layout.sources.units(), config.workers);
    let result = match plan {
        CompilePlan::Single(_) => compile_single(config, layout, toolchain, &pb),
        CompilePlan::Parallel(_) => {
            transients.remove()?;
            compile_parallel(config, layout, toolchain, &plan.active_buckets(), &pb)
        }
    };
    pb.finish_and_clear();
    result
}

fn compile_single(
    config: &BuildConfiguration,
    layout: &ProjectLayout,
    toolchain: &Toolchain,
    pb: &ProgressBar,
) -> Result<Duration> {
    compile_resource(layout, toolchain, pb)?;

    let invocation = toolchain.single_build(layout, config);
    let start = Instant::now();
    let output = invocation.output(&layout.root)?;
    let elapsed = start.elapsed();

    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    if !output.status.success() {
        report_failure(pb, &format!("building {}", layout.executable_name()), &stderr);
        return Err(ToolchainError::BuildFailed { stderr }.into());
    }
    report_warnings(pb, &layout.executable_name(), &stderr);
    Ok(elapsed)
}

fn compile_parallel(
    config: &BuildConfiguration,
    layout: &ProjectLayout,
    toolchain: &Toolchain,
    active: &[&[PathBuf]],
    pb: &ProgressBar,
) -> Result<Duration> {
    compile_resource(layout, toolchain, pb)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(active.len())
        .thread_name(|i| format!("compile-worker-{i}"))
        .build()
        .map_err(|e| ToolchainError::WorkerPool(e.to_string()))?;

    let start = Instant::now();

    // Every worker runs to completion before anything is linked.
    let outcomes: Vec<std::result::Result<CompileResult, ToolchainError>> = pool.install(|| {
        active
            .par_iter()
            .with_max_len(1)
            .map(|units| run_worker(toolchain.compile_objects(units, layout, config), units, layout))
            .collect()
    });

    let mut results = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        results.push(outcome?);
    }

    let mut failed: Vec<PathBuf> = Vec::new();
    for result in &results {
        let units = result.failed_units(&layout.root);
        if !result.success {
            let names: Vec<String> = units.iter().map(|u| u.display().to_string()).collect();
            report_failure(pb, &names.join(", "), &result.stderr);
        } else {
            let names: Vec<String> = result.units.iter().map(|u| u.display().to_string()).collect();
            report_warnings(pb, &names.join(", "), &result.stderr);
        }
        failed.extend(units);
    }
    if !failed.is_empty() {
        failed.sort_by_key(|unit| {
            layout
                .sources
                .units()
                .iter()
                .position(|u| u == unit)
                .unwrap_or(usize::MAX)
        });
        return Err(ToolchainError::CompileFailed {
            units: failed.iter().map(|u| u.display().to_string()).collect(),
        }
        .into());
    }

    // Link in source order, not bucket order.
    let objects: Vec<PathBuf> = layout
        .sources
        .artifacts()
        .into_iter()
        .map(|a| a.object)
        .collect();
    let output = toolchain.link(&objects, layout, config).output(&layout.root)?;
    let elapsed = start.elapsed();

    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    if !output.status.success() {
        report_failure(pb, &format!("linking {}", layout.executable_name()), &stderr);
        return Err(ToolchainError::LinkFailed { stderr }.into());
    }
    report_warnings(pb, &layout.executable_name(), &stderr);
    Ok(elapsed)
}

fn run_worker(
    invocation: Invocation,
    units: &[PathBuf],
    layout: &ProjectLayout,
) -> std::result::Result<CompileResult, ToolchainError> {
    let output = invocation.output(&layout.root)?;
    let objects = units
        .iter()
        .map(|unit| crate::layout::object_name(unit))
        .collect();
    Ok(CompileResult {
        units: units.to_vec(),
        objects,
        success: output.status.success(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

fn compile_resource(layout: &ProjectLayout, toolchain: &Toolchain, pb: &ProgressBar) -> Result<()> {
    let Some(invocation) = toolchain.resource(layout) else {
        return Ok(());
    };
    let output = invocation.output(&layout.root)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        report_failure(pb, "resources", &stderr);
        return Err(ToolchainError::ResourceFailed { stderr }.into());
    }
    Ok(())
}

fn report_failure(pb: &ProgressBar, what: &str, stderr: &str) {
    pb.suspend(|| {
        eprintln!("{} Error {}:\n{}", "x".red(), what, stderr.trim_end());
        if let Some(hint) = FeedbackAnalyzer::analyze(stderr) {
            eprintln!("{} {}", "?".cyan(), hint);
        }
    });
}

fn report_warnings(pb: &ProgressBar, what: &str, stderr: &str) {
    if !stderr.trim().is_empty() {
        pb.suspend(|| eprintln!("{} Warning in {}:\n{}", "!".yellow(), what, stderr.trim_end()));
    }
}
