use colored::*;
use eyre::{Context, Result};
use std::time::Instant;

use crate::config::Config;
use crate::notify::{Credentials, ScriptSpeaker, Speaker, TtsBackend, select_backend};

pub fn run(message: &str, backend: Option<&str>, config: &Config) -> Result<()> {
    let scripts_dir = Config::expand_path(&config.tts.scripts_dir);
    let credentials = Credentials::from_env();

    let backend = match backend {
        Some(name) => {
            let backend: TtsBackend = name.parse()?;
            if !backend.is_available(&scripts_dir, &credentials) {
                eyre::bail!(
                    "{} is not available: needs {} and {}",
                    backend.name(),
                    backend.env_var().unwrap_or("no credential"),
                    backend.script_path(&scripts_dir).display()
                );
            }
            backend
        }
        None => match select_backend(&scripts_dir, &credentials) {
            Some(backend) => backend,
            None => {
                println!(
                    "{} No TTS backend available in {}",
                    "⚠".yellow(),
                    scripts_dir.display()
                );
                println!("  Run {} for details", "hookcast doctor".cyan());
                return Ok(());
            }
        },
    };

    println!("{} Speaking via {}: {}", "→".blue(), backend.name().cyan(), message.dimmed());

    let speaker = ScriptSpeaker::new(scripts_dir, config.tts.timeout()).with_inherited_output();
    let start = Instant::now();
    speaker
        .speak(backend, message)
        .with_context(|| format!("{} backend failed", backend.name()))?;

    println!("  {} Done in {:.1}s", "✓".green(), start.elapsed().as_secs_f64());
    Ok(())
}
