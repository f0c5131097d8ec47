//! Subtitle cue segmentation and WebVTT handling.
//!
//! Turns timed words into WebVTT cues and reads WebVTT back into tracks.

pub mod segment;
pub mod track;
pub mod vtt;

pub use segment::{ConfigError, Cue, CueConfig, Segmenter, segment_words};
pub use track::{
    SubtitleLibrary, SubtitleTrack, load_subtitle_content, parse_vtt, parse_vtt_time,
};
pub use vtt::{
    VTT_HEADER, format_vtt, format_vtt_time, json_to_vtt, transcript_to_vtt, value_to_vtt,
};
