//! User-facing progress output of a batch run

/// Sink for the progress and error lines printed during a run.
///
/// Diagnostics go through `tracing`; these lines are the tool's stdout and
/// stderr output.
pub trait Console: Sync {
    fn out(&self, line: &str);
    fn err(&self, line: &str);
}

/// Prints to the process stdout and stderr.
pub struct StdConsole;

impl Console for StdConsole {
    fn out(&self, line: &str) {
        println!("{line}");
    }

    fn err(&self, line: &str) {
        eprintln!("{line}");
    }
}
