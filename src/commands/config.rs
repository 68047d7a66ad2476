use colored::*;
use eyre::Result;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "hookcast configuration".bold());
            println!();

            println!("  log_level: {}", config.log_level.as_filter());
            println!("  app_name: {}", config.resolve_app_name());
            println!();

            println!("{}:", "observability".cyan());
            println!("  enabled: {}", config.observability.enabled);
            println!("  server_url: {}", config.observability.server_url);
            println!("  timeout_ms: {}", config.observability.timeout_ms);
            println!("  flush_grace_ms: {}", config.observability.flush_grace_ms);
            println!();

            println!("{}:", "notify".cyan());
            println!("  enabled: {}", config.notify.enabled);
            println!("  skip_phrases: {:?}", config.notify.skip_phrases);
            if !config.notify.skip_patterns.is_empty() {
                println!("  skip_patterns: {:?}", config.notify.skip_patterns);
            }
            println!("  display_name_env: {}", config.notify.display_name_env);
            println!();

            println!("{}:", "tts".cyan());
            println!("  scripts_dir: {}", config.tts.scripts_dir.display());
            println!("  timeout_secs: {}", config.tts.timeout_secs);
        }
    }

    Ok(())
}

fn lookup(key: &str, config: &Config) -> Option<String> {
    let value = match key {
        "log_level" | "log-level" => config.log_level.as_filter().to_string(),
        "app_name" | "app-name" => config.resolve_app_name(),
        "observability.enabled" => config.observability.enabled.to_string(),
        "observability.server_url" => config.observability.server_url.clone(),
        "observability.timeout_ms" => config.observability.timeout_ms.to_string(),
        "observability.flush_grace_ms" => config.observability.flush_grace_ms.to_string(),
        "notify.enabled" => config.notify.enabled.to_string(),
        "notify.display_name_env" => config.notify.display_name_env.clone(),
        "tts.scripts_dir" => config.tts.scripts_dir.display().to_string(),
        "tts.timeout_secs" => config.tts.timeout_secs.to_string(),
        _ => return None,
    };
    Some(value)
}

fn get(key: &str, config: &Config) -> Result<()> {
    match lookup(key, config) {
        Some(v) => println!("{}", v),
        None => {
            eprintln!("{} Unknown config key: {}", "✗".red(), key);
            std::process::exit(1);
        }
    }

    Ok(())
}
