//! `mockfs run` command.

use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use super::show::render_table;
use crate::adapters::memory::{MemoryStore, NodeSnapshot};
use crate::config::HarnessConfig;
use crate::context::ServiceContext;
use crate::ports::store::VirtualStore;
use crate::script::{Outcome, Script, ScriptRunner, StepOutcome};

/// Options for a `run` invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions<'a> {
    /// Harness config path.
    pub config: Option<&'a Path>,
    /// Journal output path.
    pub journal: Option<&'a Path>,
    /// Print JSON instead of text.
    pub json: bool,
}

/// Step outcomes plus the store contents after the script finished.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// One entry per script step.
    pub steps: Vec<StepOutcome>,
    /// Every node in the store, sorted by path.
    pub files: Vec<NodeSnapshot>,
}

/// Execute the `run` command.
///
/// Step failures are part of the report, not errors: only problems loading
/// the config or script, or writing the journal, fail the command.
///
/// # Errors
///
/// Returns an error string if the config, script or journal cannot be
/// handled.
pub fn run(script: &Path, options: RunOptions<'_>) -> Result<(), String> {
    let config = HarnessConfig::resolve(options.config).map_err(|e| e.to_string())?;
    let script = Script::load(script).map_err(|e| e.to_string())?;
    let store = Arc::new(config.build_store().map_err(|e| e.to_string())?);

    let report = execute(&script, &store, options.journal)?;

    if options.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Failed to serialize report: {e}"))?;
        println!("{json}");
    } else {
        print!("{}", render_report(&report));
    }
    Ok(())
}

/// Runs `script` against `store`, journaling store calls when `journal` is set.
///
/// # Errors
///
/// Returns an error string if the journal cannot be written.
pub fn execute(
    script: &Script,
    store: &Arc<MemoryStore>,
    journal: Option<&Path>,
) -> Result<RunReport, String> {
    let backing = Arc::clone(store) as Arc<dyn VirtualStore>;
    let ctx = match journal {
        Some(path) => ServiceContext::recording(backing, path),
        None => ServiceContext::with_store(backing),
    };

    let steps = ScriptRunner::new(&ctx).run(script);

    if let Some(path) = ctx.save_journal().map_err(|e| format!("Failed to write journal: {e}"))? {
        eprintln!("Journal saved to: {}", path.display());
    }
    Ok(RunReport {
        steps,
        files: store.snapshot(),
    })
}

/// Formats a report as text: one line per step, then the store table.
#[must_use]
pub fn render_report(report: &RunReport) -> String {
    let mut out = String::new();
    for step in &report.steps {
        let _ = write!(out, "[{}] {} {}: ", step.index, step.op, step.stream);
        let _ = match &step.outcome {
            Outcome::Ok { detail: Some(detail) } => writeln!(out, "ok ({detail})"),
            Outcome::Ok { detail: None } => writeln!(out, "ok"),
            Outcome::Failed { kind, message } => writeln!(out, "{kind}: {message}"),
        };
    }
    let failed = report.steps.iter().filter(|s| !s.is_ok()).count();
    let _ = writeln!(out, "\n{} step(s), {failed} failed.\n", report.steps.len());
    out.push_str(&render_table(&report.files));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::format::Journal;

    fn script(yaml: &str) -> Script {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn execute_reports_steps_and_files() {
        let store = Arc::new(MemoryStore::new());
        let report = execute(
            &script(
                "steps:
  - {op: open, stream: a, path: /tmp/x}
  - {op: write, stream: a, data: hi}
",
            ),
            &store,
            None,
        )
        .unwrap();
        assert_eq!(report.steps.len(), 2);
        let file = report.files.iter().find(|f| f.path == "/tmp/x").unwrap();
        assert_eq!(file.content, "hi");

        let text = render_report(&report);
        assert!(text.contains("[1] write a: ok"));
        assert!(text.contains("2 step(s), 0 failed."));
    }

    #[test]
    fn execute_writes_journal() {
        let dir = std::env::temp_dir().join("mockfs_run_test_journal");
        std::fs::create_dir_all(&dir).unwrap();
        let journal_path = dir.join("run.journal.yaml");

        let store = Arc::new(MemoryStore::new());
        store.inject_fault("/tmp/x");
        let report = execute(
            &script(
                "steps:
  - {op: open, stream: a, path: /tmp/x}
  - {op: close, stream: a}
",
            ),
            &store,
            Some(&journal_path),
        )
        .unwrap();
        assert_eq!(report.steps[1].error_kind(), Some("injected_fault"));
        assert!(render_report(&report).contains("1 failed"));

        let journal: Journal =
            serde_yaml::from_str(&std::fs::read_to_string(&journal_path).unwrap()).unwrap();
        let faults: Vec<_> = journal.calls("should_inject_fault").collect();
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].result, serde_json::json!(true));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn run_fails_on_missing_script() {
        let result = run(Path::new("/no/such/script.yaml"), RunOptions::default());
        assert!(result.unwrap_err().contains("failed to read script"));
    }
}
