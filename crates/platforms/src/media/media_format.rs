use serde::{Deserialize, Serialize};
use std::fmt;

/// Container of the downloaded media.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    Flv,
    Mp4,
}

impl MediaFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaFormat::Flv => "flv",
            MediaFormat::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport used to fetch a stream.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StreamFormat {
    /// Plain progressive download.
    Http,
    /// RTMP-style streaming, usually paired with a play path.
    Rtmp,
    /// Segmented HLS playlist, fetched natively segment by segment.
    Hls,
}

impl StreamFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamFormat::Http => "http",
            StreamFormat::Rtmp => "rtmp",
            StreamFormat::Hls => "hls",
        }
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
