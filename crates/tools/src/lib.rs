//! Built-in tool implementations for RustedReason.
//!
//! Tools give the loop the ability to interact with the world:
//! run shell commands, read files, and do math.

mod args;
pub mod calculator;
pub mod file_read;
pub mod shell;

use rustedreason_core::tool::ToolCatalog;

pub use calculator::CalculatorTool;
pub use file_read::FileReadTool;
pub use shell::ShellTool;

/// Create a catalog with all built-in tools, in a stable order.
///
/// Security defaults come from the caller:
/// - Shell: only `allowed_commands` may run (empty = all)
/// - File read: confined to `allowed_roots` (empty = anywhere)
pub fn default_catalog(allowed_commands: Vec<String>, allowed_roots: Vec<String>) -> ToolCatalog {
    let mut catalog = ToolCatalog::new();
    catalog.register(CalculatorTool);
    catalog.register(FileReadTool::with_roots(allowed_roots));
    catalog.register(ShellTool::new(allowed_commands));
    catalog
}
