//! Text-to-speech backends
//!
//! Each backend is a script in the TTS scripts directory that takes the text
//! to speak as its last argument. Cloud backends need an API key in the
//! environment; the local engine needs nothing but its script.

use eyre::{Context, Result};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Supported speech backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TtsBackend {
    ElevenLabs,
    OpenAi,
    Pyttsx3,
}

impl std::str::FromStr for TtsBackend {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "elevenlabs" | "eleven" => Ok(TtsBackend::ElevenLabs),
            "openai" => Ok(TtsBackend::OpenAi),
            "pyttsx3" | "local" => Ok(TtsBackend::Pyttsx3),
            _ => eyre::bail!("Unknown TTS backend: {}. Supported: elevenlabs, openai, pyttsx3", s),
        }
    }
}

impl TtsBackend {
    /// Highest priority first
    pub const PRIORITY: [TtsBackend; 3] = [TtsBackend::ElevenLabs, TtsBackend::OpenAi, TtsBackend::Pyttsx3];

    /// Credential the backend needs, if any
    pub fn env_var(&self) -> Option<&'static str> {
        match self {
            TtsBackend::ElevenLabs => Some("ELEVENLABS_API_KEY"),
            TtsBackend::OpenAi => Some("OPENAI_API_KEY"),
            TtsBackend::Pyttsx3 => None,
        }
    }

    pub fn script_name(&self) -> &'static str {
        match self {
            TtsBackend::ElevenLabs => "elevenlabs_tts.py",
            TtsBackend::OpenAi => "openai_tts.py",
            TtsBackend::Pyttsx3 => "pyttsx3_tts.py",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TtsBackend::ElevenLabs => "ElevenLabs",
            TtsBackend::OpenAi => "OpenAI",
            TtsBackend::Pyttsx3 => "pyttsx3",
        }
    }

    pub fn script_path(&self, scripts_dir: &Path) -> PathBuf {
        scripts_dir.join(self.script_name())
    }

    /// Usable when its credential is present and its script exists
    pub fn is_available(&self, scripts_dir: &Path, credentials: &Credentials) -> bool {
        let has_credential = self.env_var().is_none_or(|var| credentials.has(var));
        has_credential && self.script_path(scripts_dir).is_file()
    }
}

/// Snapshot of the credential variables the backends look at
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    vars: HashMap<String, String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        let vars = TtsBackend::PRIORITY
            .iter()
            .filter_map(|b| b.env_var())
            .filter_map(|var| std::env::var(var).ok().map(|value| (var.to_string(), value)))
            .collect();
        Self { vars }
    }

    #[cfg(test)]
    pub fn with(mut self, var: &str, value: &str) -> Self {
        self.vars.insert(var.to_string(), value.to_string());
        self
    }

    /// Set and non-blank
    pub fn has(&self, var: &str) -> bool {
        self.vars.get(var).is_some_and(|v| !v.trim().is_empty())
    }
}

/// First available backend in priority order
pub fn select_backend(scripts_dir: &Path, credentials: &Credentials) -> Option<TtsBackend> {
    TtsBackend::PRIORITY
        .into_iter()
        .find(|backend| backend.is_available(scripts_dir, credentials))
}

/// Something that can speak text through a backend
pub trait Speaker: Send + Sync {
    fn speak(&self, backend: TtsBackend, text: &str) -> Result<()>;
}

/// Runs backend scripts as subprocesses
pub struct ScriptSpeaker {
    scripts_dir: PathBuf,
    timeout: Duration,
    inherit_output: bool,
    search_path: Option<OsString>,
}

impl ScriptSpeaker {
    /// Quiet speaker for hooks: the host reads the hook's stdout, so the child's output is discarded
    pub fn new(scripts_dir: PathBuf, timeout: Duration) -> Self {
        // The child runs inside scripts_dir, so a relative path would resolve twice
        let scripts_dir = std::path::absolute(&scripts_dir).unwrap_or(scripts_dir);

        Self {
            scripts_dir,
            timeout,
            inherit_output: false,
            search_path: std::env::var_os("PATH"),
        }
    }

    /// Let the backend write to this process's stdout/stderr
    pub fn with_inherited_output(mut self) -> Self {
        self.inherit_output = true;
        self
    }

    /// Look for `uv` and `python3` in `path` instead of `$PATH`
    #[cfg(test)]
    fn with_search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    fn find(&self, program: &str) -> Option<PathBuf> {
        which::which_in(program, self.search_path.as_ref(), &self.scripts_dir).ok()
    }

    fn command(&self, backend: TtsBackend, text: &str) -> Command {
        let script = backend.script_path(&self.scripts_dir);

        // Try uv first, fall back to python
        let mut cmd = match self.find("uv") {
            Some(uv) => {
                let mut cmd = Command::new(uv);
                cmd.arg("run").arg(&script);
                cmd
            }
            None => {
                let mut cmd = Command::new(self.find("python3").unwrap_or_else(|| PathBuf::from("python3")));
                cmd.arg(&script);
                cmd
            }
        };
        cmd.arg(text).current_dir(&self.scripts_dir).stdin(Stdio::null());

        if self.inherit_output {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
        cmd
    }
}

impl Speaker for ScriptSpeaker {
    fn speak(&self, backend: TtsBackend, text: &str) -> Result<()> {
        let mut child = self
            .command(backend, text)
            .spawn()
            .with_context(|| format!("Failed to spawn {} backend", backend.name()))?;

        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = child.try_wait().context("Failed to poll TTS backend")? {
                if status.success() {
                    return Ok(());
                }
                eyre::bail!("{} backend exited with {}", backend.name(), status);
            }

            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                eyre::bail!("{} backend timed out after {:?}", backend.name(), self.timeout);
            }

            thread::sleep(Duration::from_millis(50));
        }
    }
}
