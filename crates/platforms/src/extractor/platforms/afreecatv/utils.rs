use std::sync::LazyLock;

use regex::Regex;

static VIDEO_KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<upload_date>\d{8})_\w+_(?P<part>\d+)$").unwrap());

/// Fields encoded in a per-part file key such as `20160502_abc_2`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoKeyInfo {
    /// `YYYYMMDD`
    pub upload_date: Option<String>,
    pub part: Option<String>,
}

impl VideoKeyInfo {
    pub fn is_empty(&self) -> bool {
        self.upload_date.is_none() && self.part.is_none()
    }
}

/// Parses a `<date>_<token>_<part>` file key. A key of any other shape
/// yields an empty [`VideoKeyInfo`].
pub fn parse_video_key(key: &str) -> VideoKeyInfo {
    match VIDEO_KEY_REGEX.captures(key) {
        Some(caps) => VideoKeyInfo {
            upload_date: caps.name("upload_date").map(|m| m.as_str().to_owned()),
            part: caps.name("part").map(|m| m.as_str().to_owned()),
        },
        None => VideoKeyInfo::default(),
    }
}

/// Title shown for an ongoing broadcast.
pub fn live_title(title: &str) -> String {
    format!("{title} (live)")
}
