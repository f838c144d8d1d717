//! Derivation of displayed evidence from an answer's citation markers.
//!
//! An answer cites evidence with bracketed ordinals: `[1]` refers to the first
//! entry of the item's `source_contexts`. [`lift_citations`] is the single
//! definition of what a marker is; everything else (displayed tags, marker
//! stripping, rendering) derives from it. The remaining functions compute
//! which contexts are actually referenced and format the labels shown on
//! their tags.

use crate::models::ContextUnit;

/// A piece of an answer after citation lifting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Plain answer text, still subject to markdown transformation.
    Text(String),
    /// A citation marker, kept as a first-class unit.
    Citation {
        /// The 1-based ordinal the marker carries.
        ordinal: usize,
        /// The exact matched text, e.g. `"[12]"`, displayed unchanged.
        literal: String,
    },
}

/// Splits an answer into text and citation segments.
///
/// At each position, the scanner consumes exactly `[` + one or more digits +
/// `]` as a citation; everything else remains text. `"[note]"`, `"[1a]"`,
/// and an unterminated `"[12"` are not citations.
pub fn lift_citations(answer: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let bytes = answer.as_bytes();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'[' {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j > i + 1
                && j < bytes.len()
                && bytes[j] == b']'
                && let Ok(ordinal) = answer[i + 1..j].parse::<usize>()
            {
                if text_start < i {
                    segments.push(Segment::Text(answer[text_start..i].to_string()));
                }
                segments.push(Segment::Citation {
                    ordinal,
                    literal: answer[i..=j].to_string(),
                });
                i = j + 1;
                text_start = i;
                continue;
            }
        }
        i += 1;
    }

    if text_start < bytes.len() {
        segments.push(Segment::Text(answer[text_start..].to_string()));
    }

    segments
}

/// A context unit that is actually referenced by an answer.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedCitation<'a> {
    /// 1-based position of the context in the item's evidence list. This is
    /// the number that appears inside the marker, not a display index.
    pub ordinal: usize,
    /// The referenced evidence.
    pub context: &'a ContextUnit,
}

/// Returns the contexts whose marker appears literally in `answer`.
///
/// `contexts[i]` is displayed iff the answer contains the substring
/// `"[i+1]"`. Output preserves the original `contexts` order, not the order
/// of first textual appearance. A marker referencing an index with no
/// corresponding context simply produces no tag.
pub fn displayed_citations<'a>(
    answer: &str,
    contexts: &'a [ContextUnit],
) -> Vec<DisplayedCitation<'a>> {
    contexts
        .iter()
        .enumerate()
        .filter(|(i, _)| answer.contains(&format!("[{}]", i + 1)))
        .map(|(i, context)| DisplayedCitation {
            ordinal: i + 1,
            context,
        })
        .collect()
}

/// Formats a position in seconds as `MM:SS`.
///
/// Uses truncating division: fractional seconds are discarded, not rounded,
/// and both fields are zero-padded to width 2.
pub fn timestamp_label(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Formats the `MM:SS - MM:SS` range label for an evidence excerpt.
pub fn time_range_label(start: f64, end: f64) -> String {
    format!("{} - {}", timestamp_label(start), timestamp_label(end))
}

/// Short display label for a video path: the last path segment, truncated to
/// its first 10 characters with an ellipsis when longer.
pub fn short_video_label(video_path: &str) -> String {
    let name = video_path.rsplit('/').next().unwrap_or(video_path);
    if name.chars().count() > 10 {
        let head: String = name.chars().take(10).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

/// The full tag label for a displayed citation: short video name plus the
/// time range, e.g. `clip.mp4 (02:05 - 03:05)`.
pub fn citation_tag_label(context: &ContextUnit) -> String {
    format!(
        "{} ({})",
        short_video_label(&context.video_path),
        time_range_label(context.start_time, context.end_time)
    )
}

/// Removes every `[digits]` citation marker from an answer, for plain-text
/// export of the generated prose. Reuses the [`lift_citations`] scan so both
/// paths agree on what counts as a marker.
pub fn strip_citation_markers(answer: &str) -> String {
    lift_citations(answer)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Text(text) => Some(text),
            Segment::Citation { .. } => None,
        })
        .collect()
}
