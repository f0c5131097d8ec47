//! Cue segmentation engine.
//!
//! Groups consecutive timed words into cues, closing a cue when it reaches
//! the word limit or when the next word would end too long after the cue's
//! first word started.

use crate::transcription::TimedWord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const WORDS_PER_CUE_ENV: &str = "TRANSCUE_WORDS_PER_CUE";
pub const MAX_CUE_DURATION_ENV: &str = "TRANSCUE_MAX_CUE_DURATION";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("words_per_cue must be at least 1")]
    ZeroWordsPerCue,
    #[error("max_cue_duration must be a positive number of seconds, got {0}")]
    InvalidDuration(f64),
}

/// Configuration for cue segmentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CueConfig {
    /// Maximum number of words in one cue (default: 8)
    pub words_per_cue: usize,
    /// Maximum cue span in seconds, measured from the first word's start (default: 5.0)
    pub max_cue_duration: f64,
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            words_per_cue: 8,
            max_cue_duration: 5.0,
        }
    }
}

impl CueConfig {
    pub fn with_words_per_cue(mut self, words_per_cue: usize) -> Self {
        self.words_per_cue = words_per_cue;
        self
    }

    pub fn with_max_cue_duration(mut self, max_cue_duration: f64) -> Self {
        self.max_cue_duration = max_cue_duration;
        self
    }

    /// Load limits from `TRANSCUE_WORDS_PER_CUE` and `TRANSCUE_MAX_CUE_DURATION`,
    /// keeping the defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(WORDS_PER_CUE_ENV) {
            config.words_per_cue = value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: WORDS_PER_CUE_ENV,
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup(MAX_CUE_DURATION_ENV) {
            config.max_cue_duration = value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: MAX_CUE_DURATION_ENV,
                value: value.clone(),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject limits that would make every word its own cue.
    ///
    /// The segmenter itself accepts any limits; this is for user-supplied
    /// configuration only.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.words_per_cue == 0 {
            return Err(ConfigError::ZeroWordsPerCue);
        }
        if !(self.max_cue_duration.is_finite() && self.max_cue_duration > 0.0) {
            return Err(ConfigError::InvalidDuration(self.max_cue_duration));
        }
        Ok(())
    }
}

/// A timed subtitle cue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Start time in seconds
    pub start_time: f64,
    /// End time in seconds
    pub end_time: f64,
    /// Cue text
    pub text: String,
}

impl Cue {
    /// Duration of the cue in seconds
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Whether `time` falls within the cue, both ends inclusive
    pub fn is_active_at(&self, time: f64) -> bool {
        time >= self.start_time && time <= self.end_time
    }

    /// Build a cue from a non-empty run of words
    fn from_words(words: &[TimedWord]) -> Self {
        Self {
            start_time: words[0].start,
            end_time: words[words.len() - 1].end,
            text: words
                .iter()
                .map(|w| w.word.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Segments timed words into cues
pub struct Segmenter {
    config: CueConfig,
}

impl Segmenter {
    pub fn new(config: CueConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(CueConfig::default())
    }

    /// Greedy single pass over `words`.
    ///
    /// A word joins the open cue while the cue holds fewer than
    /// `words_per_cue` words and the word's end is within
    /// `max_cue_duration` of the cue's first start. A word that cannot open
    /// a cue on its own (its own span is too long, or its times are `NaN`)
    /// becomes a single-word cue.
    pub fn segment(&self, words: &[TimedWord]) -> Vec<Cue> {
        let words_per_cue = self.config.words_per_cue;
        let max_cue_duration = self.config.max_cue_duration;

        let mut cues = Vec::new();
        let mut i = 0;

        while i < words.len() {
            let chunk_start = i;
            let anchor_start = words[i].start;

            while i < words.len()
                && i - chunk_start < words_per_cue
                && words[i].end - anchor_start <= max_cue_duration
            {
                i += 1;
            }

            if i == chunk_start {
                i += 1;
            }

            cues.push(Cue::from_words(&words[chunk_start..i]));
        }

        cues
    }

    pub fn config(&self) -> &CueConfig {
        &self.config
    }
}

/// Segment `words` with the given limits
pub fn segment_words(words: &[TimedWord], config: &CueConfig) -> Vec<Cue> {
    Segmenter::new(config.clone()).segment(words)
}
