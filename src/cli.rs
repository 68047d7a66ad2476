use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "hookcast",
    about = "Lifecycle hooks that forward assistant events to an observability server",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/hookcast/logs/hookcast.log\n\nSymlink hookcast to a hook name (e.g. `notification`) to run it as `hookcast hook notification`."
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to hookcast.yaml config file")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a single event to the observability server
    Send {
        /// Event type label
        event_type: String,

        /// Event data (JSON; anything else is sent as a string)
        #[arg(long)]
        data: Option<String>,

        /// Extra metadata as key=value (repeatable)
        #[arg(long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,

        /// Print the event instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Run a hook: forward its stdin payload and dispatch it to handlers
    Hook {
        /// Hook name (PreToolUse, notification, stop, ...)
        name: String,

        /// Speak notifications aloud
        #[arg(long)]
        notify: bool,

        /// Event payload JSON (reads from stdin if not provided)
        #[arg(long)]
        payload: Option<String>,
    },

    /// Speak a message through a TTS backend
    Speak {
        /// Text to speak
        message: String,

        /// Force a backend (elevenlabs, openai, pyttsx3) instead of picking by credentials
        #[arg(long)]
        backend: Option<String>,
    },

    /// Check the observability server and TTS setup
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a configuration value
    Get {
        /// Configuration key (dot notation)
        key: String,
    },
}
