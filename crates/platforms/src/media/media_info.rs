use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::stream_info::{StreamInfo, boxed_line, truncate};

/// What a [`MediaInfo`] carries: its own streams, or an ordered list of parts.
///
/// A record is never both, so the two shapes are separate variants instead
/// of two optional fields.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaContent {
    /// A single playable item. An empty list means no stream could be found.
    Single { streams: Vec<StreamInfo> },
    /// A multi-part video; every entry is a playable part, in upload order.
    MultiVideo { entries: Vec<MediaInfo> },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Metadata and stream information resolved from a page URL.
///
/// # Fields
///
/// * `site_url` - The page URL the record was resolved from
/// * `id` - Platform identifier of the item (title number, video number or channel id)
/// * `title` - Title of the video, decorated with a live marker for live channels
/// * `uploader` / `uploader_id` - Display name and identifier of the broadcaster
/// * `duration` - Length in seconds, when known
/// * `upload_date` - Upload date as `YYYYMMDD`
/// * `is_live` - Whether the item is an ongoing broadcast
/// * `content` - The streams of the item, or its parts
/// * `headers` - HTTP headers the downloader should send along
///
/// # Examples
///
/// ```rust
/// use afreecatv_parser::media::media_info::MediaInfo;
///
/// let media = MediaInfo::builder("http://afreeca.tv/36853014", "36853014", "Sample Stream")
///     .uploader_opt(Some("Sample Artist".to_string()))
///     .is_live(true)
///     .streams(vec![])
///     .build();
/// assert!(!media.is_container());
/// ```
pub struct MediaInfo {
    pub site_url: String,
    pub id: String,
    pub title: String,
    pub uploader: Option<String>,
    pub uploader_id: Option<String>,
    pub duration: Option<u64>,
    pub thumbnail: Option<String>,
    pub upload_date: Option<String>,
    pub view_count: Option<u64>,
    pub age_limit: Option<u32>,
    pub is_live: bool,
    pub content: MediaContent,
    pub headers: Option<FxHashMap<String, String>>,
}

#[derive(Debug, Clone)]
pub struct MediaInfoBuilder {
    site_url: String,
    id: String,
    title: String,
    uploader: Option<String>,
    uploader_id: Option<String>,
    duration: Option<u64>,
    thumbnail: Option<String>,
    upload_date: Option<String>,
    view_count: Option<u64>,
    age_limit: Option<u32>,
    is_live: bool,
    content: MediaContent,
    headers: Option<FxHashMap<String, String>>,
}

impl MediaInfo {
    pub fn builder(
        site_url: impl Into<String>,
        id: impl Into<String>,
        title: impl Into<String>,
    ) -> MediaInfoBuilder {
        MediaInfoBuilder::new(site_url, id, title)
    }

    pub fn is_container(&self) -> bool {
        matches!(self.content, MediaContent::MultiVideo { .. })
    }

    /// Streams of a single item; empty for multi-part records.
    pub fn streams(&self) -> &[StreamInfo] {
        match &self.content {
            MediaContent::Single { streams } => streams,
            MediaContent::MultiVideo { .. } => &[],
        }
    }

    /// Parts of a multi-part record; empty for single items.
    pub fn entries(&self) -> &[MediaInfo] {
        match &self.content {
            MediaContent::Single { .. } => &[],
            MediaContent::MultiVideo { entries } => entries,
        }
    }

    /// Serialize the MediaInfo to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize the MediaInfo to a pretty-formatted JSON string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a MediaInfo from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Returns a boxed, human-readable rendering of the record, parts included.
    pub fn pretty_print(&self) -> String {
        use std::fmt::Write;

        let width = 64;
        let mut output = String::new();
        let border_top = format!("╔{}╗", "═".repeat(width));
        let border_bottom = format!("╚{}╝", "═".repeat(width));
        let separator = format!("╠{}╣", "═".repeat(width));
        let thin_separator = format!("╟{}╢", "─".repeat(width));

        let line = |label: &str, value: &str| boxed_line(&format!("  {label} {value}"), width);
        let title_line = |title: &str| {
            let padding_total = width.saturating_sub(title.chars().count());
            let left_pad = padding_total / 2;
            format!(
                "║{}{}{}║",
                " ".repeat(left_pad),
                title,
                " ".repeat(padding_total - left_pad)
            )
        };

        let _ = writeln!(output, "{border_top}");
        let _ = writeln!(output, "{}", title_line("MEDIA INFO"));
        let _ = writeln!(output, "{separator}");
        let _ = writeln!(output, "{}", line("Id:", &self.id));
        let _ = writeln!(output, "{}", line("Title:", &truncate(&self.title, 48)));
        if let Some(uploader) = &self.uploader {
            let uploader = match &self.uploader_id {
                Some(uploader_id) => format!("{uploader} ({uploader_id})"),
                None => uploader.clone(),
            };
            let _ = writeln!(output, "{}", line("Uploader:", &uploader));
        }
        let _ = writeln!(output, "{}", line("Site:", &truncate(&self.site_url, 48)));
        let status = if self.is_live { "LIVE" } else { "VOD" };
        let _ = writeln!(output, "{}", line("Status:", status));
        if let Some(duration) = self.duration {
            let _ = writeln!(output, "{}", line("Duration:", &format_duration(duration)));
        }
        if let Some(upload_date) = &self.upload_date {
            let _ = writeln!(output, "{}", line("Uploaded:", upload_date));
        }
        if let Some(view_count) = self.view_count {
            let _ = writeln!(output, "{}", line("Views:", &view_count.to_string()));
        }
        if let Some(age_limit) = self.age_limit {
            let _ = writeln!(output, "{}", line("Age limit:", &age_limit.to_string()));
        }
        if let Some(thumbnail) = &self.thumbnail {
            let _ = writeln!(output, "{}", line("Thumbnail:", &truncate(thumbnail, 44)));
        }

        match &self.content {
            MediaContent::Single { streams } => {
                let _ = writeln!(output, "{thin_separator}");
                let _ = writeln!(output, "{}", title_line("STREAMS"));
                if streams.is_empty() {
                    let _ = writeln!(output, "{}", boxed_line("  (none)", width));
                }
                for (i, stream) in streams.iter().enumerate() {
                    let _ = writeln!(output, "{}", stream.pretty_print(i + 1, width));
                }
            }
            MediaContent::MultiVideo { entries } => {
                let _ = writeln!(output, "{thin_separator}");
                let _ = writeln!(output, "{}", title_line("PARTS"));
                for (i, entry) in entries.iter().enumerate() {
                    let duration = entry.duration.map(format_duration).unwrap_or_default();
                    let header = format!("  [{}] {} {}", i + 1, entry.id, duration);
                    let _ = writeln!(output, "{}", boxed_line(header.trim_end(), width));
                    for stream in entry.streams() {
                        let url = format!("      {}", truncate(&stream.url, 52));
                        let _ = writeln!(output, "{}", boxed_line(&url, width));
                    }
                }
            }
        }

        let _ = write!(output, "{border_bottom}");
        output
    }
}

fn format_duration(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

impl MediaInfoBuilder {
    pub fn new(site_url: impl Into<String>, id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
            id: id.into(),
            title: title.into(),
            uploader: None,
            uploader_id: None,
            duration: None,
            thumbnail: None,
            upload_date: None,
            view_count: None,
            age_limit: None,
            is_live: false,
            content: MediaContent::Single {
                streams: Vec::new(),
            },
            headers: None,
        }
    }

    pub fn uploader_opt(mut self, uploader: Option<String>) -> Self {
        self.uploader = uploader;
        self
    }

    pub fn uploader_id(mut self, uploader_id: impl Into<String>) -> Self {
        self.uploader_id = Some(uploader_id.into());
        self
    }

    pub fn uploader_id_opt(mut self, uploader_id: Option<String>) -> Self {
        self.uploader_id = uploader_id;
        self
    }

    pub fn duration_opt(mut self, duration: Option<u64>) -> Self {
        self.duration = duration;
        self
    }

    pub fn thumbnail_opt(mut self, thumbnail: Option<String>) -> Self {
        self.thumbnail = thumbnail;
        self
    }

    pub fn upload_date_opt(mut self, upload_date: Option<String>) -> Self {
        self.upload_date = upload_date;
        self
    }

    pub fn view_count_opt(mut self, view_count: Option<u64>) -> Self {
        self.view_count = view_count;
        self
    }

    pub fn age_limit_opt(mut self, age_limit: Option<u32>) -> Self {
        self.age_limit = age_limit;
        self
    }

    pub fn is_live(mut self, is_live: bool) -> Self {
        self.is_live = is_live;
        self
    }

    pub fn streams(mut self, streams: Vec<StreamInfo>) -> Self {
        self.content = MediaContent::Single { streams };
        self
    }

    pub fn entries(mut self, entries: Vec<MediaInfo>) -> Self {
        self.content = MediaContent::MultiVideo { entries };
        self
    }

    pub fn headers_opt(mut self, headers: Option<FxHashMap<String, String>>) -> Self {
        self.headers = headers;
        self
    }

    pub fn build(self) -> MediaInfo {
        MediaInfo {
            site_url: self.site_url,
            id: self.id,
            title: self.title,
            uploader: self.uploader,
            uploader_id: self.uploader_id,
            duration: self.duration,
            thumbnail: self.thumbnail,
            upload_date: self.upload_date,
            view_count: self.view_count,
            age_limit: self.age_limit,
            is_live: self.is_live,
            content: self.content,
            headers: self.headers,
        }
    }
}
