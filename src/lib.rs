//! Convert word-timed JSON transcripts into WebVTT subtitles.

pub mod subtitle;
pub mod transcription;

pub use subtitle::{Cue, CueConfig, Segmenter, format_vtt, format_vtt_time, json_to_vtt};
pub use transcription::{TimedWord, TranscriptError, load_json_transcript, parse_transcript_json};
