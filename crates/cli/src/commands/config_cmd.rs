//! `rustedreason config`: show configuration.

use rustedreason_config::AppConfig;

pub fn run(default: bool) -> Result<(), Box<dyn std::error::Error>> {
    if default {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if config.api_key.is_some() {
        config.api_key = Some("***".into());
    }

    println!(
        "# {}",
        AppConfig::config_dir().join("config.toml").display()
    );
    print!("{}", toml::to_string_pretty(&config)?);

    if !config.has_api_key() && !matches!(config.default_provider.as_str(), "ollama" | "vllm") {
        eprintln!();
        eprintln!("  ⚠️  No API key set (RUSTEDREASON_API_KEY, OPENAI_API_KEY or OPENROUTER_API_KEY)");
    }
    Ok(())
}
