//! WebVTT serialization.
//!
//! Cues are written unnumbered: a timing line, one text line and a blank
//! separator line each, after the `WEBVTT` header.

use super::segment::{Cue, CueConfig, segment_words};
use crate::transcription::{TimedWord, TranscriptError, parse_transcript_json};
use serde_json::Value;
use std::fmt::Write as FmtWrite;
use tracing::info;

/// Header and blank line that open every WebVTT document
pub const VTT_HEADER: &str = "WEBVTT\n\n";

/// Format seconds as a WebVTT timestamp (HH:MM:SS.mmm).
///
/// Hours are never capped. Milliseconds come from `{:.3}` formatting,
/// which rounds the exact binary value to nearest, ties to even.
/// `NaN` is rendered as text rather than rejected.
pub fn format_vtt_time(seconds: f64) -> String {
    let hours = (seconds / 3600.0).floor();
    let mins = ((seconds % 3600.0) / 60.0).floor();
    let secs = seconds % 60.0;

    format!("{}:{}:{}", pad_whole(hours), pad_whole(mins), pad_seconds(secs))
}

fn pad_whole(value: f64) -> String {
    if value.is_finite() {
        format!("{:02}", value as i64)
    } else {
        non_finite(value).to_string()
    }
}

fn pad_seconds(secs: f64) -> String {
    if secs.is_finite() {
        // -0.0 would otherwise print with a sign
        let secs = if secs == 0.0 { 0.0 } else { secs };
        format!("{:06.3}", secs)
    } else {
        format!("{:0>6}", non_finite(secs))
    }
}

fn non_finite(value: f64) -> &'static str {
    if value.is_nan() {
        "NaN"
    } else if value > 0.0 {
        "Infinity"
    } else {
        "-Infinity"
    }
}

/// Serialize cues into a WebVTT document
pub fn format_vtt(cues: &[Cue]) -> String {
    let mut output = String::from(VTT_HEADER);

    for cue in cues {
        let _ = writeln!(
            output,
            "{} --> {}",
            format_vtt_time(cue.start_time),
            format_vtt_time(cue.end_time)
        );
        let _ = writeln!(output, "{}", cue.text);
        let _ = writeln!(output);
    }

    output
}

/// Segment words into cues and serialize them as WebVTT
pub fn json_to_vtt(words: &[TimedWord], config: &CueConfig) -> String {
    if words.is_empty() {
        return VTT_HEADER.to_string();
    }

    let cues = segment_words(words, config);
    info!("Converted {} words into {} cues", words.len(), cues.len());

    format_vtt(&cues)
}

/// Convert a decoded JSON word list to WebVTT.
///
/// Anything other than a JSON array produces an empty document.
pub fn value_to_vtt(value: &Value, config: &CueConfig) -> String {
    match value {
        Value::Array(items) => {
            let words: Vec<TimedWord> = items.iter().map(TimedWord::from_value).collect();
            json_to_vtt(&words, config)
        }
        _ => VTT_HEADER.to_string(),
    }
}

/// Parse transcript JSON text and convert it to WebVTT
pub fn transcript_to_vtt(content: &str, config: &CueConfig) -> Result<String, TranscriptError> {
    let words = parse_transcript_json(content)?;
    Ok(json_to_vtt(&words, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vtt_time_format() {
        assert_eq!(format_vtt_time(0.0), "00:00:00.000");
        assert_eq!(format_vtt_time(1.5), "00:00:01.500");
        assert_eq!(format_vtt_time(65.123), "00:01:05.123");
        assert_eq!(format_vtt_time(3661.5), "01:01:01.500");
        assert_eq!(format_vtt_time(59.25), "00:00:59.250");
    }

    #[test]
    fn test_vtt_time_hours_not_capped() {
        assert_eq!(format_vtt_time(360_000.0), "100:00:00.000");
        assert_eq!(format_vtt_time(86_400.0 + 0.001), "24:00:00.001");
    }

    #[test]
    fn test_vtt_time_rounds_milliseconds() {
        assert_eq!(format_vtt_time(0.0004), "00:00:00.000");
        assert_eq!(format_vtt_time(0.0006), "00:00:00.001");
        assert_eq!(format_vtt_time(12.3456), "00:00:12.346");
    }

    #[test]
    fn test_vtt_time_ties_round_to_even() {
        assert_eq!(format_vtt_time(0.0625), "00:00:00.062");
        assert_eq!(format_vtt_time(0.1875), "00:00:00.188");
        assert_eq!(format_vtt_time(1.0625), "00:00:01.062");
    }

    #[test]
    fn test_vtt_time_nan_propagates() {
        assert_eq!(format_vtt_time(f64::NAN), "NaN:NaN:000NaN");
        assert_eq!(format_vtt_time(f64::INFINITY), "Infinity:NaN:000NaN");
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format_vtt(&[]), "WEBVTT\n\n");
    }

    #[test]
    fn test_format_cues() {
        let cues = vec![
            Cue {
                start_time: 0.0,
                end_time: 1.0,
                text: "first cue".to_string(),
            },
            Cue {
                start_time: 1.25,
                end_time: 2.5,
                text: "second".to_string(),
            },
        ];

        assert_eq!(
            format_vtt(&cues),
            "WEBVTT\n\n\
             00:00:00.000 --> 00:00:01.000\nfirst cue\n\n\
             00:00:01.250 --> 00:00:02.500\nsecond\n\n"
        );
    }

    #[test]
    fn test_json_to_vtt_hello_world() {
        let words = vec![
            TimedWord::new("Hello", 0.0, 0.5),
            TimedWord::new("world", 0.6, 1.0),
        ];
        assert_eq!(
            json_to_vtt(&words, &CueConfig::default()),
            "WEBVTT\n\n00:00:00.000 --> 00:00:01.000\nHello world\n\n"
        );
    }

    #[test]
    fn test_json_to_vtt_empty() {
        assert_eq!(json_to_vtt(&[], &CueConfig::default()), "WEBVTT\n\n");
    }

    #[test]
    fn test_json_to_vtt_forced_long_word() {
        let words = vec![TimedWord::new("loooong", 0.0, 10.0)];
        assert_eq!(
            json_to_vtt(&words, &CueConfig::default().with_max_cue_duration(5.0)),
            "WEBVTT\n\n00:00:00.000 --> 00:00:10.000\nloooong\n\n"
        );
    }

    #[test]
    fn test_json_to_vtt_custom_word_limit() {
        let words = vec![
            TimedWord::new("one", 0.0, 0.2),
            TimedWord::new("two", 0.3, 0.5),
            TimedWord::new("three", 0.6, 0.9),
        ];
        assert_eq!(
            json_to_vtt(&words, &CueConfig::default().with_words_per_cue(2)),
            "WEBVTT\n\n\
             00:00:00.000 --> 00:00:00.500\none two\n\n\
             00:00:00.600 --> 00:00:00.900\nthree\n\n"
        );
    }

    #[test]
    fn test_json_to_vtt_nan_times_in_output() {
        let words = vec![TimedWord::from_value(&json!({"word": "lost"}))];
        assert_eq!(
            json_to_vtt(&words, &CueConfig::default()),
            "WEBVTT\n\nNaN:NaN:000NaN --> NaN:NaN:000NaN\nlost\n\n"
        );
    }

    #[test]
    fn test_value_to_vtt_non_array_is_empty_document() {
        let config = CueConfig::default();
        assert_eq!(value_to_vtt(&json!({"words": []}), &config), "WEBVTT\n\n");
        assert_eq!(value_to_vtt(&json!("Hello"), &config), "WEBVTT\n\n");
        assert_eq!(value_to_vtt(&json!(null), &config), "WEBVTT\n\n");
        assert_eq!(value_to_vtt(&json!([]), &config), "WEBVTT\n\n");
    }

    #[test]
    fn test_value_to_vtt_array() {
        let value = json!([{"word": "Hi", "start": 2, "end": 2.75}]);
        assert_eq!(
            value_to_vtt(&value, &CueConfig::default()),
            "WEBVTT\n\n00:00:02.000 --> 00:00:02.750\nHi\n\n"
        );
    }

    #[test]
    fn test_transcript_to_vtt() {
        let vtt = transcript_to_vtt(
            r#"{"segments":[{"words":[{"word":"a","start":0,"end":1}]},{"words":[{"word":"b","start":1,"end":2}]}]}"#,
            &CueConfig::default(),
        )
        .unwrap();
        assert_eq!(vtt, "WEBVTT\n\n00:00:00.000 --> 00:00:02.000\na b\n\n");

        assert!(matches!(
            transcript_to_vtt(r#"{"foo":1}"#, &CueConfig::default()),
            Err(TranscriptError::Format(_))
        ));
    }
}
