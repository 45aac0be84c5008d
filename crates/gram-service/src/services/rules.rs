//! Keyword auto-tag rules
//!
//! A plain `pattern=emoji` lines file maps keywords to the reaction the
//! bot adds on matching posts. Rules are loaded once at startup and
//! matched against accent-folded lowercased content with word boundaries,
//! so `velo` tags "Mon vélo !" but not "vélocité".

use std::fs;
use std::io;
use std::path::Path;

use regex::Regex;
use tracing::warn;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// One keyword rule with its compiled word-boundary pattern
#[derive(Debug)]
struct TagRule {
    emoji: String,
    regex: Regex,
}

/// Immutable keyword-to-emoji rule table
#[derive(Debug, Default)]
pub struct TagRules {
    rules: Vec<TagRule>,
}

impl TagRules {
    /// Load rules from a `pattern=emoji` lines file
    ///
    /// # Errors
    /// Returns an error when the file cannot be read; malformed lines
    /// inside it are skipped with a warning instead.
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    /// Parse rule lines, skipping blanks, `#` comments, and malformed rows
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut rules = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((pattern, emoji)) = line.split_once('=') else {
                warn!(line = index + 1, "Skipping malformed tag rule");
                continue;
            };
            let pattern = pattern.trim();
            let emoji = emoji.trim();
            if pattern.is_empty() || emoji.is_empty() {
                warn!(line = index + 1, "Skipping malformed tag rule");
                continue;
            }

            match Regex::new(&format!(r"\b{}\b", regex::escape(pattern))) {
                Ok(regex) => rules.push(TagRule {
                    emoji: emoji.to_string(),
                    regex,
                }),
                Err(error) => {
                    warn!(line = index + 1, pattern, %error, "Skipping unusable tag rule");
                }
            }
        }

        Self { rules }
    }

    /// Emojis whose keyword matches the content, deduplicated, in rule order
    #[must_use]
    pub fn matches(&self, content: &str) -> Vec<&str> {
        let folded = fold(content);
        let mut matched: Vec<&str> = Vec::new();

        for rule in &self.rules {
            if rule.regex.is_match(&folded) && !matched.contains(&rule.emoji.as_str()) {
                matched.push(&rule.emoji);
            }
        }

        matched
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Lowercase, then strip combining marks after NFKD decomposition
fn fold(text: &str) -> String {
    text.to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}
