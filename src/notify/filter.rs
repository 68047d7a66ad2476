//! Suppression of low-value notification messages

use regex::Regex;

use crate::config::NotifyConfig;

/// Decides which notification messages are not worth speaking
pub struct MessageFilter {
    phrases: Vec<String>,
    patterns: Vec<Regex>,
}

impl MessageFilter {
    /// Invalid patterns are logged and skipped
    pub fn new(phrases: &[String], patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(re) => Some(re),
                Err(e) => {
                    log::warn!("Ignoring invalid skip pattern {:?}: {}", p, e);
                    None
                }
            })
            .collect();

        Self {
            phrases: phrases.iter().filter(|p| !p.is_empty()).cloned().collect(),
            patterns,
        }
    }

    pub fn from_config(config: &NotifyConfig) -> Self {
        Self::new(&config.skip_phrases, &config.skip_patterns)
    }

    pub fn is_suppressed(&self, message: &str) -> bool {
        if message.trim().is_empty() {
            return true;
        }

        self.phrases.iter().any(|phrase| message.contains(phrase.as_str()))
            || self.patterns.iter().any(|re| re.is_match(message))
    }
}
