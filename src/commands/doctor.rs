//! Diagnose hookcast setup issues

use colored::*;
use eyre::{Context, Result};
use std::path::Path;
use std::time::Duration;
use terminal_size::{Width, terminal_size};
use walkdir::WalkDir;

use crate::config::Config;
use crate::notify::{Credentials, TtsBackend, select_backend};

fn rule_width() -> usize {
    terminal_size().map(|(Width(w), _)| w as usize).unwrap_or(50).min(50)
}

pub fn run(config: &Config) -> Result<()> {
    println!("{}", "hookcast doctor".bold());
    println!("{}", "═".repeat(rule_width()));
    println!();

    let mut issues = 0;

    // Observability server
    println!("{}", "Observability:".bold());
    let obs = &config.observability;
    if obs.enabled {
        println!("  {} Forwarding enabled", "✓".green());
    } else {
        println!("  {} Forwarding disabled in config", "⚠".yellow());
    }
    println!("  App:      {}", config.resolve_app_name().cyan());
    println!("  Endpoint: {}", obs.server_url.cyan());
    println!("  Timeout:  {}ms (grace {}ms)", obs.timeout_ms, obs.flush_grace().as_millis());

    let health_url = obs.health_url();
    match check_health(&health_url, obs.timeout()) {
        Ok(200..=299) => println!("  {} Server healthy ({})", "✓".green(), health_url),
        Ok(status) => {
            println!("  {} Server answered {} ({})", "⚠".yellow(), status, health_url);
        }
        Err(e) => {
            println!("  {} Server unreachable: {:#}", "✗".red(), e);
            if obs.enabled {
                issues += 1;
            }
        }
    }
    println!();

    // TTS scripts
    let scripts_dir = Config::expand_path(&config.tts.scripts_dir);
    println!("{}", "TTS:".bold());
    if scripts_dir.is_dir() {
        let scripts = list_scripts(&scripts_dir);
        println!(
            "  {} Scripts directory: {} ({} scripts)",
            "✓".green(),
            scripts_dir.display(),
            scripts.len()
        );
        for script in scripts {
            println!("    - {}", script.dimmed());
        }
    } else {
        println!("  {} Scripts directory missing: {}", "✗".red(), scripts_dir.display());
        issues += 1;
    }

    let credentials = Credentials::from_env();
    for backend in TtsBackend::PRIORITY {
        let script_ok = backend.script_path(&scripts_dir).is_file();
        let credential_ok = backend.env_var().is_none_or(|var| credentials.has(var));

        match (script_ok, credential_ok) {
            (true, true) => println!("  {} {}", "✓".green(), backend.name()),
            (false, _) => println!("  {} {} (missing {})", "⚠".yellow(), backend.name(), backend.script_name()),
            (true, false) => println!(
                "  {} {} (set {})",
                "⚠".yellow(),
                backend.name(),
                backend.env_var().unwrap_or_default()
            ),
        }
    }

    match select_backend(&scripts_dir, &credentials) {
        Some(backend) => println!("  Selected: {}", backend.name().green()),
        None => println!("  Selected: {}", "none (notifications stay silent)".yellow()),
    }
    println!(
        "  Speak by default: {}",
        if config.notify.enabled {
            "yes".green()
        } else {
            "no (pass --notify)".yellow()
        }
    );
    println!();

    // Environment
    println!("{}", "Environment:".bold());
    for var in TtsBackend::PRIORITY.iter().filter_map(|b| b.env_var()) {
        let state = if credentials.has(var) { "Set".green() } else { "Not set".dimmed() };
        println!("  {}: {}", var, state);
    }
    let display_var = &config.notify.display_name_env;
    match std::env::var(display_var) {
        Ok(name) if !name.trim().is_empty() => println!("  {}: {}", display_var, name.cyan()),
        _ => println!("  {}: {}", display_var, "Not set".dimmed()),
    }
    println!();

    // Dependencies
    println!("{}", "Dependencies:".bold());
    if which::which("uv").is_ok() {
        println!("  {} uv", "✓".green());
    } else if which::which("python3").is_ok() {
        println!("  {} python3 (uv recommended)", "⚠".yellow());
    } else {
        println!("  {} python3/uv (needed to run TTS scripts)", "✗".red());
        issues += 1;
    }
    println!();

    // Summary
    println!("{}", "═".repeat(rule_width()));
    if issues == 0 {
        println!("{} All checks passed!", "✓".green().bold());
    } else {
        println!("{} {} issue(s) found", "⚠".yellow().bold(), issues);
    }

    Ok(())
}

/// Status code of the health endpoint
fn check_health(url: &str, timeout: Duration) -> Result<u16> {
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into();

    let response = agent.get(url).call().with_context(|| format!("GET {}", url))?;
    Ok(response.status().as_u16())
}

/// Python scripts directly inside `dir`, sorted
fn list_scripts(dir: &Path) -> Vec<String> {
    let mut scripts: Vec<String> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.path().extension().is_some_and(|ext| ext == "py"))
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    scripts.sort();
    scripts
}
