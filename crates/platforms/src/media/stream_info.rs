use crate::media::{MediaFormat, StreamFormat};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

/// One concrete, fetchable encoding of a media item.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StreamInfo {
    // Label of the stream, e.g. "RTMP-hd", "HLS-1500"
    pub format_id: String,
    // Url of the stream, or the RTMP application url when `play_path` is set
    pub url: String,
    pub stream_format: StreamFormat,
    pub media_format: MediaFormat,
    pub play_path: Option<String>,
    // Bitrate of the stream in kbit/s
    pub bitrate: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub codec: Option<String>,
    pub fps: Option<f64>,
    /// The stream has no end marker and must be downloaded as a live session.
    pub is_live: bool,
}

#[derive(Debug, Clone)]
pub struct StreamInfoBuilder {
    inner: StreamInfo,
}

impl StreamInfo {
    pub fn builder(
        url: impl Into<String>,
        stream_format: StreamFormat,
        media_format: MediaFormat,
    ) -> StreamInfoBuilder {
        StreamInfoBuilder {
            inner: StreamInfo {
                format_id: stream_format.as_str().to_string(),
                url: url.into(),
                stream_format,
                media_format,
                play_path: None,
                bitrate: None,
                width: None,
                height: None,
                codec: None,
                fps: None,
                is_live: false,
            },
        }
    }

    fn known_attributes(&self) -> usize {
        [
            self.bitrate.is_some(),
            self.width.is_some(),
            self.height.is_some(),
            self.codec.is_some(),
            self.fps.is_some(),
        ]
        .into_iter()
        .filter(|known| *known)
        .count()
    }

    pub fn pretty_print(&self, index: usize, width: usize) -> String {
        let mut lines = vec![
            format!("  [{index}] {self}"),
            format!("      url: {}", truncate(&self.url, 48)),
        ];
        if let Some(play_path) = &self.play_path {
            lines.push(format!("      play path: {}", truncate(play_path, 42)));
        }
        if let Some(codec) = &self.codec {
            lines.push(format!("      codec: {codec}"));
        }
        lines
            .iter()
            .map(|line| boxed_line(line, width))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl StreamInfoBuilder {
    pub fn format_id(mut self, format_id: impl Into<String>) -> Self {
        self.inner.format_id = format_id.into();
        self
    }

    pub fn play_path(mut self, play_path: impl Into<String>) -> Self {
        self.inner.play_path = Some(play_path.into());
        self
    }

    pub fn bitrate_opt(mut self, bitrate: Option<u64>) -> Self {
        self.inner.bitrate = bitrate;
        self
    }

    pub fn width_opt(mut self, width: Option<u32>) -> Self {
        self.inner.width = width;
        self
    }

    pub fn height_opt(mut self, height: Option<u32>) -> Self {
        self.inner.height = height;
        self
    }

    pub fn codec_opt(mut self, codec: Option<String>) -> Self {
        self.inner.codec = codec;
        self
    }

    pub fn fps_opt(mut self, fps: Option<f64>) -> Self {
        self.inner.fps = fps;
        self
    }

    pub fn is_live(mut self, is_live: bool) -> Self {
        self.inner.is_live = is_live;
        self
    }

    pub fn build(self) -> StreamInfo {
        self.inner
    }
}

impl fmt::Display for StreamInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{})",
            self.format_id, self.stream_format, self.media_format
        )?;
        if let Some(height) = self.height {
            write!(f, " {height}p")?;
        }
        if let Some(bitrate) = self.bitrate {
            write!(f, " {bitrate}kbps")?;
        }
        if self.is_live {
            write!(f, " [live]")?;
        }
        Ok(())
    }
}

/// Sorts streams best first.
///
/// Higher `height` wins, then higher `bitrate`; unknown values rank below any
/// known value. Remaining ties prefer the stream with more known attributes,
/// then fall back to `format_id` and `url` so the order is total.
pub fn sort_streams(streams: &mut [StreamInfo]) {
    streams.sort_by(compare_quality);
}

fn compare_quality(a: &StreamInfo, b: &StreamInfo) -> Ordering {
    desc_known(a.height, b.height)
        .then_with(|| desc_known(a.bitrate, b.bitrate))
        .then_with(|| b.known_attributes().cmp(&a.known_attributes()))
        .then_with(|| a.format_id.cmp(&b.format_id))
        .then_with(|| a.url.cmp(&b.url))
}

fn desc_known<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub(crate) fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() > max_chars {
        let head: String = value.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        value.to_string()
    }
}

pub(crate) fn boxed_line(content: &str, width: usize) -> String {
    let padding = width.saturating_sub(content.chars().count());
    format!("║{}{}║", content, " ".repeat(padding))
}
