//! Caption derivation: optional word masking plus the attribution line.

use log::info;
use regex::{Captures, Regex, RegexBuilder};

use crate::domain::Submission;
use crate::error::{RelayError, Result};

/// Masks configured sensitive words in titles.
///
/// Matching is case-insensitive and replaces every occurrence.
#[derive(Debug, Clone, Default)]
pub struct WordFilter {
    pattern: Option<Regex>,
}

impl WordFilter {
    /// A filter that leaves titles unchanged.
    pub fn disabled() -> Self {
        Self { pattern: None }
    }

    /// Compile `pattern` into an active filter.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| RelayError::Config(format!("Invalid filter pattern '{}': {}", pattern, e)))?;
        Ok(Self { pattern: Some(regex) })
    }

    /// Build from the `filter` config section.
    pub fn from_settings(enabled: bool, pattern: &str) -> Result<Self> {
        if enabled && !pattern.is_empty() {
            Self::new(pattern)
        } else {
            Ok(Self::disabled())
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.pattern.is_some()
    }

    /// Mask every match in `title`.
    pub fn apply(&self, title: &str) -> String {
        let Some(regex) = &self.pattern else {
            return title.to_string();
        };

        info!("> Filtering words.");
        regex
            .replace_all(title, |caps: &Captures| {
                let word = &caps[0];
                info!("> Filtering {}", word);
                mask_word(word)
            })
            .into_owned()
    }
}

/// Keep the first and last character, star out the rest.
///
/// Length in characters is unchanged; words shorter than three characters
/// come back as-is.
pub fn mask_word(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() < 3 {
        return word.to_string();
    }

    let mut masked = String::with_capacity(word.len());
    masked.push(chars[0]);
    masked.extend(std::iter::repeat_n('*', chars.len() - 2));
    masked.push(chars[chars.len() - 1]);
    masked
}

/// Build the status text for a relayed submission.
pub fn build_caption(submission: &Submission, feed_name: &str, filter: &WordFilter) -> String {
    let title = filter.apply(&submission.title);
    info!("> New title: {}", title);

    format!(
        "{}\n\n- Posted by u/{} on r/{} ({})",
        title,
        submission.author,
        feed_name,
        submission.permalink()
    )
}
