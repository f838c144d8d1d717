//! Playback deep links for cited video segments.
//!
//! A citation tag or a video row resolves to a [`WatchTarget`]: the absolute
//! media URL, a display title, and a start offset in seconds. Targets encode
//! to a percent-encoded link and decode back on the receiving side, where a
//! non-numeric or missing start offset must fall back to `0`.

use reqwest::Url;

use crate::models::{ContextUnit, Video};

/// Scheme-qualified prefix for watch links produced by [`WatchTarget::to_link`].
const WATCH_LINK_BASE: &str = "vidqa://watch";

/// Title used when a decoded link carries none.
const DEFAULT_TITLE: &str = "Video Player";

/// A resolved playback target.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchTarget {
    /// Absolute media URL.
    pub url: String,
    /// Display title, the media filename.
    pub title: String,
    /// Seek position in seconds.
    pub start_time: f64,
}

impl WatchTarget {
    /// Builds a target pointing into the cited segment of a context unit.
    pub fn from_context(asset_base: &str, context: &ContextUnit) -> Self {
        Self {
            url: media_url(asset_base, &context.video_path),
            title: last_segment(&context.video_path).to_string(),
            start_time: context.start_time,
        }
    }

    /// Builds a target playing a video from the beginning.
    pub fn from_video(asset_base: &str, video: &Video) -> Self {
        Self {
            url: media_url(asset_base, &video.file_path),
            title: video.filename.clone(),
            start_time: 0.0,
        }
    }

    /// Encodes the target as a deep link with percent-encoded parameters.
    pub fn to_link(&self) -> String {
        let mut link = Url::parse(WATCH_LINK_BASE).expect("valid watch link base");
        link.query_pairs_mut()
            .append_pair("url", &self.url)
            .append_pair("title", &self.title)
            .append_pair("start_time", &self.start_time.to_string());
        link.to_string()
    }

    /// Decodes a deep link back into a target.
    ///
    /// Returns `None` when the link is unparseable or carries no media URL.
    /// A missing title falls back to a generic one, and a missing or
    /// non-numeric start offset falls back to `0`.
    pub fn parse_link(link: &str) -> Option<Self> {
        let parsed = Url::parse(link).ok()?;

        let mut url = None;
        let mut title = None;
        let mut start_time = 0.0;

        for (key, value) in parsed.query_pairs() {
            match key.as_ref() {
                "url" => url = Some(value.into_owned()),
                "title" => title = Some(value.into_owned()),
                "start_time" => {
                    start_time = value
                        .parse::<f64>()
                        .ok()
                        .filter(|t| t.is_finite())
                        .unwrap_or(0.0);
                }
                _ => {}
            }
        }

        Some(Self {
            url: url?,
            title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            start_time,
        })
    }
}

/// Joins the static-asset base with the last two segments of a stored
/// relative media path.
fn media_url(asset_base: &str, media_path: &str) -> String {
    let segments: Vec<&str> = media_path.split('/').filter(|s| !s.is_empty()).collect();
    let tail = &segments[segments.len().saturating_sub(2)..];
    format!(
        "{}/static/videos/{}",
        asset_base.trim_end_matches('/'),
        tail.join("/")
    )
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Playback state for the receiving watch view.
///
/// Seeks to the start offset exactly once, gated on the first metadata-ready
/// signal. Repeated signals never re-seek; they only re-apply autoplay.
#[derive(Debug, Clone)]
pub struct PlayerState {
    start_at: f64,
    autoplay: bool,
    has_seeked: bool,
    playing: bool,
}

impl PlayerState {
    /// Creates playback state seeking to `start_at` seconds, with autoplay on.
    pub fn new(start_at: f64) -> Self {
        Self {
            start_at,
            autoplay: true,
            has_seeked: false,
            playing: false,
        }
    }

    /// Overrides the autoplay behavior.
    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    /// Handles a metadata-ready signal from the player backend.
    ///
    /// Returns the position to seek to on the first signal when the start
    /// offset is positive; all later signals return `None`.
    pub fn on_metadata_ready(&mut self) -> Option<f64> {
        let seek = if !self.has_seeked && self.start_at > 0.0 {
            self.has_seeked = true;
            Some(self.start_at)
        } else {
            None
        };

        if self.autoplay {
            self.playing = true;
        }

        seek
    }

    /// Returns whether playback has begun.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Returns the configured start offset.
    pub fn start_at(&self) -> f64 {
        self.start_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VideoId;

    fn context(path: &str, start: f64) -> ContextUnit {
        ContextUnit {
            id: "ctx-1".to_string(),
            video_id: VideoId::new("vid-1"),
            video_path: path.to_string(),
            text: "excerpt".to_string(),
            start_time: start,
            end_time: start + 10.0,
        }
    }

    #[test]
    fn from_context_joins_last_two_path_segments() {
        let ctx = context("data/videos/ws-1/lecture.mp4", 42.0);
        let target = WatchTarget::from_context("http://localhost:8000", &ctx);

        assert_eq!(
            target.url,
            "http://localhost:8000/static/videos/ws-1/lecture.mp4"
        );
        assert_eq!(target.title, "lecture.mp4");
        assert_eq!(target.start_time, 42.0);
    }

    #[test]
    fn from_context_tolerates_trailing_slash_on_base() {
        let ctx = context("data/videos/ws-1/clip.mp4", 0.0);
        let target = WatchTarget::from_context("http://localhost:8000/", &ctx);
        assert_eq!(
            target.url,
            "http://localhost:8000/static/videos/ws-1/clip.mp4"
        );
    }

    #[test]
    fn from_video_starts_at_zero() {
        let video = Video {
            id: VideoId::new("vid-1"),
            workspace_id: crate::models::WorkspaceId::new("ws-1"),
            filename: "clip one.mp4".to_string(),
            file_path: "data/videos/ws-1/clip one.mp4".to_string(),
            file_size: 1,
            duration: 30.0,
            processing_status: "completed".to_string(),
            created_at: time::OffsetDateTime::now_utc(),
            processed_at: None,
        };

        let target = WatchTarget::from_video("http://localhost:8000", &video);
        assert_eq!(target.start_time, 0.0);
        assert_eq!(target.title, "clip one.mp4");
    }

    #[test]
    fn link_roundtrip_recovers_title_and_start_time() {
        let target = WatchTarget {
            url: "http://localhost:8000/static/videos/ws-1/clip one.mp4".to_string(),
            title: "clip one.mp4".to_string(),
            start_time: 7.5,
        };

        let link = target.to_link();
        let decoded = WatchTarget::parse_link(&link).expect("link should parse");

        assert_eq!(decoded.url, target.url);
        assert_eq!(decoded.title, "clip one.mp4");
        assert!((decoded.start_time - 7.5).abs() < f64::EPSILON);
    }

    #[test]
    fn link_percent_encodes_parameters() {
        let target = WatchTarget {
            url: "http://localhost:8000/static/videos/ws-1/clip one.mp4".to_string(),
            title: "clip one.mp4".to_string(),
            start_time: 7.5,
        };

        let link = target.to_link();
        // Raw spaces never appear in the encoded link
        assert!(!link.contains(' '));
        assert!(link.starts_with("vidqa://watch?"));
    }

    #[test]
    fn non_numeric_start_time_defaults_to_zero() {
        let decoded =
            WatchTarget::parse_link("vidqa://watch?url=http%3A%2F%2Fh%2Fv.mp4&start_time=abc")
                .expect("link should parse");
        assert_eq!(decoded.start_time, 0.0);
    }

    #[test]
    fn missing_start_time_defaults_to_zero() {
        let decoded = WatchTarget::parse_link("vidqa://watch?url=http%3A%2F%2Fh%2Fv.mp4")
            .expect("link should parse");
        assert_eq!(decoded.start_time, 0.0);
    }

    #[test]
    fn nan_start_time_defaults_to_zero() {
        let decoded =
            WatchTarget::parse_link("vidqa://watch?url=http%3A%2F%2Fh%2Fv.mp4&start_time=NaN")
                .expect("link should parse");
        assert_eq!(decoded.start_time, 0.0);
    }

    #[test]
    fn missing_url_yields_no_target() {
        assert!(WatchTarget::parse_link("vidqa://watch?title=x").is_none());
        assert!(WatchTarget::parse_link("not a link").is_none());
    }

    #[test]
    fn missing_title_falls_back_to_generic() {
        let decoded = WatchTarget::parse_link("vidqa://watch?url=http%3A%2F%2Fh%2Fv.mp4")
            .expect("link should parse");
        assert_eq!(decoded.title, "Video Player");
    }

    #[test]
    fn player_seeks_exactly_once() {
        let mut player = PlayerState::new(7.5);

        assert_eq!(player.on_metadata_ready(), Some(7.5));
        // Later metadata-ready signals never re-seek
        assert_eq!(player.on_metadata_ready(), None);
        assert_eq!(player.on_metadata_ready(), None);
    }

    #[test]
    fn player_with_zero_start_never_seeks() {
        let mut player = PlayerState::new(0.0);
        assert_eq!(player.on_metadata_ready(), None);
        assert!(player.is_playing());
    }

    #[test]
    fn player_autoplay_can_be_disabled() {
        let mut player = PlayerState::new(5.0).with_autoplay(false);
        assert_eq!(player.on_metadata_ready(), Some(5.0));
        assert!(!player.is_playing());
    }
}
