use contracts::shared::logger::{LogBucket, LogEntry, TokenState, TokenStatus};

use crate::shared::config::ClassificationConfig;

/// Keyword rules that decide the secondary flags of a log entry.
///
/// Keywords are matched case-insensitively against the title, the message and
/// the serialized `details` of an entry.
#[derive(Debug, Clone)]
pub struct ClassificationRules {
    episode_keywords: Vec<String>,
    grab_keywords: Vec<String>,
    token_keywords: Vec<String>,
    token_expired_keywords: Vec<String>,
    token_refresh_keywords: Vec<String>,
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self::from_config(&ClassificationConfig::default())
    }
}

/// Everything the aggregation engine needs to know about one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub bucket: LogBucket,
    pub critical: bool,
    pub episode_failure: bool,
    pub successful_grab: bool,
    pub token_related: bool,
}

impl ClassificationRules {
    pub fn from_config(config: &ClassificationConfig) -> Self {
        Self {
            episode_keywords: normalize(&config.episode_keywords),
            grab_keywords: normalize(&config.grab_keywords),
            token_keywords: normalize(&config.token_keywords),
            token_expired_keywords: normalize(&config.token_expired_keywords),
            token_refresh_keywords: normalize(&config.token_refresh_keywords),
        }
    }

    pub fn classify(&self, entry: &LogEntry) -> Classification {
        let level = entry.parsed_level();
        let bucket = level.bucket();
        let text = searchable_text(entry);

        Classification {
            bucket,
            critical: level.is_critical(),
            episode_failure: bucket == LogBucket::Error
                && contains_any(&text, &self.episode_keywords),
            successful_grab: contains_any(&text, &self.grab_keywords),
            token_related: contains_any(&text, &self.token_keywords),
        }
    }

    /// Map a token-related entry to its token state.
    pub fn token_state(&self, entry: &LogEntry) -> TokenState {
        let text = searchable_text(entry);
        if contains_any(&text, &self.token_expired_keywords) {
            return TokenState::Expired;
        }
        match entry.bucket() {
            LogBucket::Error => TokenState::Error,
            _ if contains_any(&text, &self.token_refresh_keywords) => TokenState::Refreshed,
            _ => TokenState::Healthy,
        }
    }

    /// Token status from the first token-related entry of a newest-first window.
    pub fn latest_token_status(&self, newest_first: &[LogEntry]) -> Option<TokenStatus> {
        newest_first
            .iter()
            .find(|entry| contains_any(&searchable_text(entry), &self.token_keywords))
            .map(|entry| TokenStatus {
                status: self.token_state(entry),
                timestamp: entry.timestamp,
                title: entry.title.clone(),
                message: entry.message.clone(),
            })
    }
}

fn normalize(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

fn searchable_text(entry: &LogEntry) -> String {
    let mut text = format!("{}\n{}", entry.title, entry.message);
    if let Some(details) = &entry.details {
        text.push('\n');
        text.push_str(&details.to_string());
    }
    text.to_lowercase()
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| text.contains(k.as_str()))
}
