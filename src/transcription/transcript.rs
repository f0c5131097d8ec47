//! Transcript types and JSON shape normalization.
//!
//! Accepts a flat word array, an object with a `words` array, or an object
//! with `segments` that each carry their own `words`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const INVALID_FORMAT: &str =
    "Invalid transcript format: expected array or object with words/segments property";

#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("Invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("{0}")]
    Format(String),
}

/// A word with timing information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedWord {
    /// The word text
    pub word: String,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

impl TimedWord {
    pub fn new(word: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            word: word.into(),
            start,
            end,
        }
    }

    /// Duration of the word in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Build a word from any JSON value without rejecting it.
    ///
    /// Times are coerced the way loosely typed transcript producers expect:
    /// numbers as-is, numeric strings parsed, `null`/`false` as zero and
    /// `true` as one. Anything else, including a missing field, becomes
    /// `NaN` and flows through to the formatted timestamps unchanged.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self {
                word: map.get("word").map(word_text).unwrap_or_default(),
                start: map.get("start").map(coerce_seconds).unwrap_or(f64::NAN),
                end: map.get("end").map(coerce_seconds).unwrap_or(f64::NAN),
            },
            _ => Self {
                word: String::new(),
                start: f64::NAN,
                end: f64::NAN,
            },
        }
    }
}

fn word_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            // f64 Display drops the fraction of whole numbers: 1.0 -> "1"
            Some(f) if f == 0.0 => "0".to_string(),
            Some(f) => f.to_string(),
            None => n.to_string(),
        },
        Value::Array(items) => items.iter().map(word_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn coerce_seconds(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_loose_number(s),
        Value::Bool(true) => 1.0,
        Value::Bool(false) | Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// Whole-string numeric coercion.
///
/// Blank is zero, `0x`/`0o`/`0b` prefixes select a radix, and only the
/// exact spellings `Infinity`/`+Infinity`/`-Infinity` are infinite.
/// `inf`, `nan` and anything with trailing junk are `NaN`.
fn parse_loose_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        if digits.is_empty() {
            return f64::NAN;
        }
        return digits
            .chars()
            .try_fold(0.0, |acc, c| c.to_digit(radix).map(|d| acc * radix as f64 + d as f64))
            .unwrap_or(f64::NAN);
    }

    let decimal = s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'+' | b'-' | b'e' | b'E'));
    if decimal {
        s.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// Whether a field counts as present when picking the transcript shape.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn field<'a>(data: &'a Value, name: &str) -> Option<&'a Value> {
    data.get(name).filter(|v| is_truthy(v))
}

fn words_from_values(items: &[Value]) -> Vec<TimedWord> {
    items.iter().map(TimedWord::from_value).collect()
}

/// Resolve an already decoded JSON document into its ordered word list.
///
/// Shapes are tried in order: bare array, `words`, then `segments`.
/// A `words` field that is not an array yields no words.
pub fn parse_transcript_value(data: &Value) -> Result<Vec<TimedWord>, TranscriptError> {
    if let Value::Array(items) = data {
        return Ok(words_from_values(items));
    }

    if let Some(words) = field(data, "words") {
        return Ok(match words {
            Value::Array(items) => words_from_values(items),
            _ => Vec::new(),
        });
    }

    if let Some(segments) = field(data, "segments") {
        let Value::Array(segments) = segments else {
            return Err(TranscriptError::Format(
                "Invalid transcript format: segments must be an array".to_string(),
            ));
        };

        let mut words = Vec::new();
        for segment in segments {
            match field(segment, "words") {
                Some(Value::Array(items)) => words.extend(items.iter().map(TimedWord::from_value)),
                Some(other) => words.push(TimedWord::from_value(other)),
                None => {}
            }
        }
        debug!("Flattened {} segments into {} words", segments.len(), words.len());
        return Ok(words);
    }

    Err(TranscriptError::Format(INVALID_FORMAT.to_string()))
}

/// Parse transcript JSON text into an ordered word list.
pub fn parse_transcript_json(content: &str) -> Result<Vec<TimedWord>, TranscriptError> {
    let data: Value = serde_json::from_str(content)?;
    let words = parse_transcript_value(&data)?;
    debug!("Parsed transcript with {} words", words.len());
    Ok(words)
}
