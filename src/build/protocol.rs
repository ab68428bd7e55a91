//! Line protocol spoken by the test binary on stdout.
//!
//! ```text
//! [PASSED] add_integers
//! [FAILED] divide_by_zero: expected error, got 0
//! tests:2
//! fails:1
//! ```
//!
//! Each line is classified on its own, so the order of records, summary lines
//! and free text does not matter.

use crate::error::ProtocolError;

pub const PASSED_MARKER: &str = "[PASSED]";
pub const FAILED_MARKER: &str = "[FAILED]";
pub const TOTAL_PREFIX: &str = "tests:";
pub const FAILURES_PREFIX: &str = "fails:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRecord {
    /// Text before the first `:` of the description, or `#<index>` when empty.
    pub name: String,
    pub outcome: Outcome,
    /// Full description of a failure; `None` for passing tests.
    pub message: Option<String>,
    /// Everything after the marker, exactly as printed.
    pub description: String,
}

impl TestRecord {
    fn new(index: usize, outcome: Outcome, description: &str) -> Self {
        let text = description.trim();
        let name = text
            .split(':')
            .next()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", index + 1));
        let message = match outcome {
            Outcome::Passed => None,
            Outcome::Failed => Some(text.to_string()),
        };
        Self {
            name,
            outcome,
            message,
            description: description.to_string(),
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }

    /// The line as the test binary printed it.
    pub fn raw_line(&self) -> String {
        let marker = match self.outcome {
            Outcome::Passed => PASSED_MARKER,
            Outcome::Failed => FAILED_MARKER,
        };
        format!("{}{}", marker, self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestReport {
    pub total: usize,
    pub failures: usize,
    pub records: Vec<TestRecord>,
    /// Lines that are neither records nor summary lines, in output order.
    pub trailer: Vec<String>,
    /// Records and trailer lines interleaved as the binary printed them.
    pub body: Vec<BodyLine>,
}

/// Index into [`TestReport::records`] or [`TestReport::trailer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLine {
    Record(usize),
    Trailer(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Pass(&'a str),
    Fail(&'a str),
    Total(usize),
    Failures(usize),
    Trailer(&'a str),
}

/// Classify a single output line.
pub fn classify(line: &str) -> Result<LineKind<'_>, ProtocolError> {
    if let Some(rest) = line.strip_prefix(PASSED_MARKER) {
        return Ok(LineKind::Pass(rest));
    }
    if let Some(rest) = line.strip_prefix(FAILED_MARKER) {
        return Ok(LineKind::Fail(rest));
    }
    if let Some(value) = line.strip_prefix(TOTAL_PREFIX) {
        return parse_count(line, value).map(LineKind::Total);
    }
    if let Some(value) = line.strip_prefix(FAILURES_PREFIX) {
        return parse_count(line, value).map(LineKind::Failures);
    }
    Ok(LineKind::Trailer(line))
}

fn parse_count(line: &str, value: &str) -> Result<usize, ProtocolError> {
    value
        .parse::<usize>()
        .map_err(|_| ProtocolError::MalformedSummary {
            line: line.to_string(),
        })
}

/// Parse the complete stdout of the test binary.
pub fn parse_test_output(output: &str) -> Result<TestReport, ProtocolError> {
    let mut total = None;
    let mut failures = None;
    let mut records = Vec::new();
    let mut trailer = Vec::new();
    let mut body = Vec::new();

    for line in output.lines() {
        let line = line.trim_end_matches('\r');
        match classify(line)? {
            LineKind::Pass(rest) => {
                body.push(BodyLine::Record(records.len()));
                records.push(TestRecord::new(records.len(), Outcome::Passed, rest));
            }
            LineKind::Fail(rest) => {
                body.push(BodyLine::Record(records.len()));
                records.push(TestRecord::new(records.len(), Outcome::Failed, rest));
            }
            LineKind::Total(n) => total = Some(n),
            LineKind::Failures(n) => failures = Some(n),
            LineKind::Trailer(text) => {
                body.push(BodyLine::Trailer(trailer.len()));
                trailer.push(text.to_string());
            }
        }
    }

    // Blank lines after the last printed line are dropped.
    while let Some(&BodyLine::Trailer(i)) = body.last()
        && trailer[i].trim().is_empty()
    {
        body.pop();
        trailer.pop();
    }

    let total = total.ok_or(ProtocolError::MissingTotal)?;
    let failures = failures.ok_or(ProtocolError::MissingFailures)?;

    let failed_records = records.iter().filter(|r| !r.passed()).count();
    if failed_records != failures {
        tracing::warn!(
            reported = failures,
            records = failed_records,
            "failure count does not match [FAILED] lines"
        );
    }

    Ok(TestReport {
        total,
        failures,
        records,
        trailer,
        body,
    })
}
