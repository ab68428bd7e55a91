use colored::*;

/// Turns raw compiler diagnostics into a short hint for the user.
pub struct FeedbackAnalyzer;

impl FeedbackAnalyzer {
    pub fn analyze(output: &str) -> Option<String> {
        // 1. Entry point missing from the unit list
        if output.contains("undefined reference to `main'")
            || output.contains("undefined reference to `WinMain")
            || output.contains("entry point must be defined")
        {
            return Some(format!(
                "The executable has no {} function.\nCheck that the entry unit is listed in {} under {}.",
                "main()".bold().yellow(),
                "dust.toml".bold().yellow(),
                "sources".bold().green()
            ));
        }

        // 2. Unresolved symbol from a library or a unit that was not compiled
        if output.contains("undefined reference to") || output.contains("ld returned 1 exit status")
        {
            return Some(format!(
                "It looks like a {} error.\nA source unit may be missing from the build or a link library is not available.",
                "Linker".bold().red(),
            ));
        }

        // 3. Header not found on the include path
        if output.contains("fatal error: ") && output.contains("No such file or directory") {
            return Some(format!(
                "It looks like a {} error.\nCheck that the {} directory exists and contains the header.",
                "Missing Header".bold().red(),
                "include".bold().yellow()
            ));
        }

        None
    }
}
