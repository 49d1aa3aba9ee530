//! Response schemas of the AfreecaTV APIs.
//!
//! Optional fields that may be missing, `null` or malformed upstream are
//! modelled as `Option`s and resolved leniently at this boundary.

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;

use crate::extractor::error::ExtractorError;
use crate::extractor::utils::{
    deserialize_int_or_none, deserialize_non_empty_str, deserialize_null_default,
    str_int_or_none,
};

/// `get_video_info.php` response: the children of `<track>` under the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoInfoXml {
    /// Text of every `track/video` element, in document order. Elements
    /// without text are kept as `None` so indices stay meaningful.
    pub videos: Vec<Option<String>>,
    pub title: Option<String>,
    pub nickname: Option<String>,
    pub bj_id: Option<String>,
    pub duration: Option<String>,
    pub title_image: Option<String>,
}

impl VideoInfoXml {
    pub fn parse(xml: &str) -> Result<Self, ExtractorError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut info = Self::default();
        let mut path: Vec<String> = Vec::new();
        let mut text = String::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                    if is_track_field(&path) {
                        text.clear();
                    }
                }
                Event::Empty(e) => {
                    path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                    if is_track_field(&path) {
                        info.set_field(&path[2], None);
                    }
                    path.pop();
                }
                Event::Text(e) if is_track_field(&path) => {
                    text.push_str(&e.unescape()?);
                }
                Event::CData(e) if is_track_field(&path) => {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
                Event::End(_) => {
                    if is_track_field(&path) {
                        // Trimmed on purpose: whitespace-only text counts as absent.
                        let value = text.trim();
                        let value = (!value.is_empty()).then(|| value.to_owned());
                        info.set_field(&path[2], value);
                        text.clear();
                    }
                    path.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(info)
    }

    fn set_field(&mut self, name: &str, value: Option<String>) {
        // xpath semantics: the first matching element wins
        let slot = match name {
            "video" => {
                self.videos.push(value);
                return;
            }
            "title" => &mut self.title,
            "nickname" => &mut self.nickname,
            "bj_id" => &mut self.bj_id,
            "duration" => &mut self.duration,
            "titleImage" => &mut self.title_image,
            _ => return,
        };
        if slot.is_none() {
            *slot = value;
        }
    }

    pub fn duration_secs(&self) -> Option<u64> {
        self.duration
            .as_deref()
            .and_then(str_int_or_none)
            .and_then(|d| u64::try_from(d).ok())
    }
}

/// `root/track/<field>`
fn is_track_field(path: &[String]) -> bool {
    path.len() == 3 && path[1] == "track"
}

/// Envelope of the global `view_video.php` / `view_live.php` responses.
#[derive(Debug, Deserialize)]
pub struct GlobalResponse {
    pub channel: Channel,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Channel {
    #[serde(deserialize_with = "deserialize_int_or_none")]
    pub result: Option<i64>,
    #[serde(deserialize_with = "deserialize_non_empty_str")]
    pub remsg: Option<String>,
    pub title: Option<String>,
    #[serde(deserialize_with = "deserialize_non_empty_str")]
    pub thumb: Option<String>,
    #[serde(deserialize_with = "deserialize_int_or_none")]
    pub vcnt: Option<u64>,
    #[serde(deserialize_with = "deserialize_int_or_none")]
    pub grade: Option<u32>,
    #[serde(deserialize_with = "deserialize_non_empty_str")]
    pub cname: Option<String>,
    #[serde(deserialize_with = "deserialize_int_or_none")]
    pub length: Option<u64>,
    /// Parts of an on-demand video.
    #[serde(deserialize_with = "deserialize_null_default")]
    pub flist: Vec<FileEntry>,
    /// Streams of a live channel.
    #[serde(deserialize_with = "deserialize_null_default")]
    pub strm: Vec<StreamEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileEntry {
    #[serde(deserialize_with = "deserialize_non_empty_str")]
    pub key: Option<String>,
    #[serde(deserialize_with = "deserialize_non_empty_str")]
    pub file: Option<String>,
    #[serde(deserialize_with = "deserialize_int_or_none")]
    pub length: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StreamEntry {
    #[serde(deserialize_with = "deserialize_non_empty_str")]
    pub purl: Option<String>,
    #[serde(deserialize_with = "deserialize_non_empty_str")]
    pub stype: Option<String>,
    #[serde(deserialize_with = "deserialize_non_empty_str")]
    pub label: Option<String>,
    #[serde(deserialize_with = "deserialize_int_or_none")]
    pub bps: Option<u64>,
    #[serde(deserialize_with = "deserialize_int_or_none")]
    pub brt: Option<u32>,
}
