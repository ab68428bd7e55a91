mod clean;
mod core;
pub mod distribute;
mod feedback;
pub mod protocol;

pub use clean::{
    CleanupGuard, Transients, clean, clean_packaging, remove_if_exists, sweep_object_files,
};
pub use core::{CompileResult, compile};
pub use distribute::{CompilePlan, round_robin};
pub use feedback::FeedbackAnalyzer;
pub use protocol::{Outcome, TestRecord, TestReport, parse_test_output};
pub use test::{TestRun, print_report, render_report, run_tests};
