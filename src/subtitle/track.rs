//! Subtitle tracks loaded from WebVTT or JSON transcript content.
//!
//! The reader only looks for timing lines and collects every other
//! non-blank line as cue text.

use super::segment::{Cue, CueConfig};
use super::vtt::transcript_to_vtt;
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

fn cue_timing() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"([0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{3}|[0-9]{2}:[0-9]{2}\.[0-9]{3})\s-->\s([0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{3}|[0-9]{2}:[0-9]{2}\.[0-9]{3})",
        )
        .expect("cue timing pattern is valid")
    })
}

/// Convert a WebVTT timestamp (`HH:MM:SS.mmm` or `MM:SS.mmm`) to seconds
pub fn parse_vtt_time(timestamp: &str) -> f64 {
    let parts: Vec<&str> = timestamp.split(':').collect();

    match parts.as_slice() {
        [hours, mins, secs] => whole(hours) * 3600.0 + whole(mins) * 60.0 + fraction(secs),
        [mins, secs] => whole(mins) * 60.0 + fraction(secs),
        _ => 0.0,
    }
}

/// Leading integer of `s`, ignoring anything after it
fn whole(s: &str) -> f64 {
    let (sign, rest) = split_sign(s.trim_start());
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return f64::NAN;
    }
    rest[..digits].parse::<f64>().map_or(f64::NAN, |v| sign * v)
}

/// Leading decimal number of `s`, ignoring anything after it
fn fraction(s: &str) -> f64 {
    let s = s.trim_start();
    let (sign, rest) = split_sign(s);
    let bytes = rest.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let int_end = digits_from(0);
    let mut end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if frac_end > end + 1 || int_end > 0 {
            end = frac_end;
        }
    }
    if end == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    rest[..end].parse::<f64>().map_or(f64::NAN, |v| sign * v)
}

fn split_sign(s: &str) -> (f64, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (-1.0, rest)
    } else {
        (1.0, s.strip_prefix('+').unwrap_or(s))
    }
}

/// Read cues out of WebVTT text.
///
/// Lines are trimmed, blank lines and the `WEBVTT` header are skipped, and
/// text before the first timing line is ignored. Multi-line cue text is
/// joined with `\n`.
pub fn parse_vtt(content: &str) -> Vec<Cue> {
    let mut cues = Vec::new();
    let mut current: Option<Cue> = None;

    let lines = content
        .split("\r\n")
        .flat_map(|chunk| chunk.split(['\n', '\r']));

    for line in lines {
        let line = line.trim();
        if line.is_empty() || line == "WEBVTT" {
            continue;
        }

        if let Some(caps) = cue_timing().captures(line) {
            if let Some(cue) = current.take() {
                cues.push(cue);
            }
            current = Some(Cue {
                start_time: parse_vtt_time(&caps[1]),
                end_time: parse_vtt_time(&caps[2]),
                text: String::new(),
            });
        } else if let Some(cue) = current.as_mut() {
            if !cue.text.is_empty() {
                cue.text.push('\n');
            }
            cue.text.push_str(line);
        }
    }

    cues.extend(current);
    debug!("Parsed {} subtitle cues", cues.len());

    cues
}

/// Read subtitle content that may be either WebVTT or a JSON transcript.
///
/// Content that looks like JSON is converted first; if the conversion fails
/// the content is read as WebVTT unchanged.
pub fn load_subtitle_content(content: &str, config: &CueConfig) -> Vec<Cue> {
    let trimmed = content.trim();
    let mut vtt = Cow::Borrowed(content);

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        match transcript_to_vtt(content, config) {
            Ok(converted) => {
                info!("Converted JSON transcript to WebVTT");
                vtt = Cow::Owned(converted);
            }
            Err(e) => {
                warn!("Failed to parse as JSON transcript, treating as WebVTT: {}", e);
            }
        }
    }

    parse_vtt(&vtt)
}

/// A named set of cues
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleTrack {
    pub id: String,
    pub name: String,
    pub cues: Vec<Cue>,
}

impl SubtitleTrack {
    /// All cues showing at `time` (seconds)
    pub fn active_cues(&self, time: f64) -> Vec<&Cue> {
        self.cues.iter().filter(|cue| cue.is_active_at(time)).collect()
    }
}

/// Loaded subtitle tracks and the currently selected one
#[derive(Debug, Default)]
pub struct SubtitleLibrary {
    config: CueConfig,
    tracks: Vec<SubtitleTrack>,
    track_counter: usize,
    active_track_id: Option<String>,
}

impl SubtitleLibrary {
    pub fn new(config: CueConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Load content as a new `Custom N` track and make it active
    pub fn add_track(&mut self, content: &str) -> &SubtitleTrack {
        let cues = load_subtitle_content(content, &self.config);

        self.track_counter += 1;
        let track = SubtitleTrack {
            id: format!("custom-{}", self.track_counter),
            name: format!("Custom {}", self.track_counter),
            cues,
        };

        info!(
            "Subtitles loaded as \"{}\" ({} cues)",
            track.name,
            track.cues.len()
        );

        self.active_track_id = Some(track.id.clone());
        self.tracks.push(track);
        &self.tracks[self.tracks.len() - 1]
    }

    /// Select a track by id; `None` turns subtitles off.
    ///
    /// Returns false if no track has that id.
    pub fn set_active(&mut self, id: Option<&str>) -> bool {
        match id {
            None => {
                self.active_track_id = None;
                true
            }
            Some(id) if self.tracks.iter().any(|t| t.id == id) => {
                self.active_track_id = Some(id.to_string());
                true
            }
            Some(_) => false,
        }
    }

    pub fn remove_track(&mut self, id: &str) -> Option<SubtitleTrack> {
        let index = self.tracks.iter().position(|t| t.id == id)?;
        if self.active_track_id.as_deref() == Some(id) {
            self.active_track_id = None;
        }
        Some(self.tracks.remove(index))
    }

    pub fn active_track(&self) -> Option<&SubtitleTrack> {
        let id = self.active_track_id.as_deref()?;
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Cues of the active track showing at `time`
    pub fn active_cues(&self, time: f64) -> Vec<&Cue> {
        self.active_track()
            .map(|track| track.active_cues(time))
            .unwrap_or_default()
    }

    pub fn tracks(&self) -> &[SubtitleTrack] {
        &self.tracks
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.active_track_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "WEBVTT\n\n\
        00:00:01.000 --> 00:00:03.500\n\
        Hello there\n\
        second line\n\
        \n\
        00:04.000 --> 00:05.250\n\
        Short timestamps\n";

    #[test]
    fn test_parse_vtt_time() {
        assert_eq!(parse_vtt_time("00:00:01.500"), 1.5);
        assert_eq!(parse_vtt_time("01:01:01.500"), 3661.5);
        assert_eq!(parse_vtt_time("02:03.250"), 123.25);
        assert_eq!(parse_vtt_time("garbage"), 0.0);
    }

    #[test]
    fn test_parse_vtt_time_reads_leading_numbers() {
        assert_eq!(parse_vtt_time("1.5:30.25"), 90.25);
        assert_eq!(parse_vtt_time("00:01:02.5xyz"), 62.5);
        assert_eq!(parse_vtt_time(" 2:-1.5"), 118.5);
        assert_eq!(parse_vtt_time("00:1e1"), 10.0);
        assert!(parse_vtt_time("aa:10.0").is_nan());
        assert!(parse_vtt_time("00:.").is_nan());
    }

    #[test]
    fn test_parse_vtt() {
        let cues = parse_vtt(SAMPLE);
        assert_eq!(cues.len(), 2);
        assert_eq!((cues[0].start_time, cues[0].end_time), (1.0, 3.5));
        assert_eq!(cues[0].text, "Hello there\nsecond line");
        assert_eq!((cues[1].start_time, cues[1].end_time), (4.0, 5.25));
        assert_eq!(cues[1].text, "Short timestamps");
    }

    #[test]
    fn test_parse_vtt_line_endings() {
        let crlf = SAMPLE.replace('\n', "\r\n");
        let cr = SAMPLE.replace('\n', "\r");
        assert_eq!(parse_vtt(&crlf), parse_vtt(SAMPLE));
        assert_eq!(parse_vtt(&cr), parse_vtt(SAMPLE));
    }

    #[test]
    fn test_parse_vtt_ignores_text_before_first_cue() {
        let cues = parse_vtt("WEBVTT\n\nNOTE stray text\n\n00:00:00.000 --> 00:00:01.000\nhi\n");
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "hi");
    }

    #[test]
    fn test_parse_vtt_empty() {
        assert!(parse_vtt("").is_empty());
        assert!(parse_vtt("WEBVTT\n\n").is_empty());
    }

    #[test]
    fn test_load_subtitle_content_converts_json() {
        let json = r#"[{"word":"Hello","start":0.0,"end":0.5},{"word":"world","start":0.6,"end":1.0}]"#;
        let cues = load_subtitle_content(json, &CueConfig::default());
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "Hello world");
        assert_eq!((cues[0].start_time, cues[0].end_time), (0.0, 1.0));
    }

    #[test]
    fn test_load_subtitle_content_falls_back_to_vtt() {
        let cues = load_subtitle_content("{ not json", &CueConfig::default());
        assert!(cues.is_empty());

        let cues = load_subtitle_content(SAMPLE, &CueConfig::default());
        assert_eq!(cues.len(), 2);
    }

    #[test]
    fn test_track_active_cues() {
        let track = SubtitleTrack {
            id: "t".to_string(),
            name: "T".to_string(),
            cues: parse_vtt(SAMPLE),
        };
        assert_eq!(track.active_cues(2.0).len(), 1);
        assert_eq!(track.active_cues(3.5)[0].text, "Hello there\nsecond line");
        assert!(track.active_cues(3.75).is_empty());
    }

    #[test]
    fn test_library_names_and_selects_tracks() {
        let mut library = SubtitleLibrary::new(CueConfig::default());

        let first = library.add_track(SAMPLE);
        assert_eq!(first.id, "custom-1");
        assert_eq!(first.name, "Custom 1");

        let second = library.add_track(r#"{"words":[{"word":"hey","start":10,"end":11}]}"#);
        assert_eq!(second.id, "custom-2");

        assert_eq!(library.active_track().map(|t| t.id.as_str()), Some("custom-2"));
        assert_eq!(library.active_cues(10.5)[0].text, "hey");
        assert!(library.active_cues(2.0).is_empty());

        assert!(library.set_active(Some("custom-1")));
        assert_eq!(library.active_cues(2.0).len(), 1);
        assert!(!library.set_active(Some("custom-9")));

        assert!(library.remove_track("custom-1").is_some());
        assert!(library.active_track().is_none());
        assert_eq!(library.tracks().len(), 1);

        // Ids keep counting after removals
        assert_eq!(library.add_track(SAMPLE).id, "custom-3");

        library.clear();
        assert!(library.tracks().is_empty());
        assert!(library.active_cues(2.0).is_empty());
    }
}
