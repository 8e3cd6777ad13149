//! `mockfs show` command.

use std::fmt::Write;
use std::path::Path;

use crate::adapters::memory::{NodeKind, NodeSnapshot};
use crate::config::HarnessConfig;

/// Execute the `show` command.
///
/// Builds the store described by the config and prints it as a table.
///
/// # Errors
///
/// Returns an error string if the config cannot be loaded or applied.
pub fn run(config: Option<&Path>) -> Result<(), String> {
    let config = HarnessConfig::resolve(config).map_err(|e| e.to_string())?;
    let store = config.build_store().map_err(|e| e.to_string())?;
    print!("{}", render_table(&store.snapshot()));
    if !config.faults.is_empty() {
        println!("\nFaults: {}", config.faults.join(", "));
    }
    Ok(())
}

/// Formats a store snapshot as an aligned text table.
#[must_use]
pub fn render_table(nodes: &[NodeSnapshot]) -> String {
    let rows: Vec<(String, &str, &str, String)> = nodes
        .iter()
        .map(|node| {
            let kind = match node.kind {
                NodeKind::File => "file",
                NodeKind::Folder => "folder",
            };
            let mode = if node.writable { "rw" } else { "ro" };
            (node.path.clone(), kind, mode, node.len.to_string())
        })
        .collect();

    let path_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(4).max(4);
    let size_width = rows.iter().map(|r| r.3.len()).max().unwrap_or(4).max(4);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<path_width$}  {:<6}  {:<4}  {:>size_width$}",
        "PATH", "KIND", "MODE", "SIZE"
    );
    let _ = writeln!(out, "{:-<path_width$}  {:-<6}  {:-<4}  {:->size_width$}", "", "", "", "");
    for (path, kind, mode, size) in &rows {
        let _ = writeln!(out, "{path:<path_width$}  {kind:<6}  {mode:<4}  {size:>size_width$}");
    }
    out
}
