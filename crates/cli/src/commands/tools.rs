//! `rustedreason tools`: list the built-in tools.

use rustedreason_config::AppConfig;
use rustedreason_core::tool::Tool;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let catalog = rustedreason_tools::default_catalog(
        config.tools.shell.allowed_commands.clone(),
        config.tools.file_read.allowed_roots.clone(),
    );

    println!();
    println!("  Built-in tools ({}):", catalog.len());
    println!();
    for tool in catalog.iter() {
        println!("  {:<12} {}", tool.name(), tool.description());
    }
    println!();

    let allowed = &config.tools.shell.allowed_commands;
    if allowed.is_empty() {
        println!("  shell allowlist: (any command)");
    } else {
        println!("  shell allowlist: {}", allowed.join(", "));
    }
    let roots = &config.tools.file_read.allowed_roots;
    if roots.is_empty() {
        println!("  file_read roots: (anywhere)");
    } else {
        println!("  file_read roots: {}", roots.join(", "));
    }
    println!();
    Ok(())
}
