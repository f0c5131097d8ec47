//! Word-timed transcript parsing and retrieval.

pub mod fetch;
pub mod transcript;

pub use fetch::{FetchError, TranscriptFetcher, load_json_transcript};
pub use transcript::{TimedWord, TranscriptError, parse_transcript_json, parse_transcript_value};
