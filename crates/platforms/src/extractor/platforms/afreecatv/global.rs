use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, warn};

use crate::{
    extractor::{
        error::ExtractorError,
        hls_extractor::HlsExtractor,
        platform_configs::AfreecaTvConfig,
        platform_extractor::{Extractor, PlatformExtractor},
        platforms::afreecatv::{
            models::{Channel, FileEntry, GlobalResponse, StreamEntry},
            utils::{live_title, parse_video_key},
        },
        utils::{capture_named, capture_named_or_invalid_url},
    },
    media::{
        MediaFormat, MediaInfo, StreamFormat, StreamInfo, media_info::MediaInfoBuilder,
        sort_streams,
    },
};

pub static GLOBAL_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?afreeca\.tv/(?P<channel_id>\d+)(?:/v/(?P<video_id>\d+))?")
        .unwrap()
});

/// Identifiers captured from a global page URL. Without a video id the URL
/// points at the channel's live broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelReference {
    pub channel_id: String,
    pub video_id: Option<String>,
}

/// Channel fields copied onto every record built from one response.
#[derive(Debug, Clone)]
struct SharedInfo {
    thumbnail: Option<String>,
    view_count: Option<u64>,
    age_limit: Option<u32>,
    uploader_id: String,
    uploader: Option<String>,
}

impl SharedInfo {
    fn from_channel(channel: &Channel, channel_id: &str) -> Self {
        Self {
            thumbnail: channel.thumb.clone(),
            view_count: channel.vcnt,
            age_limit: channel.grade,
            uploader_id: channel_id.to_owned(),
            uploader: channel.cname.clone(),
        }
    }

    fn apply(self, builder: MediaInfoBuilder) -> MediaInfoBuilder {
        builder
            .thumbnail_opt(self.thumbnail)
            .view_count_opt(self.view_count)
            .age_limit_opt(self.age_limit)
            .uploader_id(self.uploader_id)
            .uploader_opt(self.uploader)
    }
}

/// Extractor for `afreeca.tv` live channels and on-demand videos.
pub struct AfreecaTvGlobal {
    pub extractor: Extractor,
    config: AfreecaTvConfig,
}

impl AfreecaTvGlobal {
    pub const NAME: &str = "afreecatv:global";
    const BASE_URL: &str = "http://afreeca.tv";

    pub fn new(
        url: String,
        client: Client,
        cookies: Option<String>,
        extras: Option<serde_json::Value>,
    ) -> Self {
        let mut extractor = Extractor::new(Self::NAME, url, client);
        extractor.add_header_str(reqwest::header::ORIGIN.as_str(), Self::BASE_URL);
        extractor.set_referer_static(Self::BASE_URL);
        if let Some(cookies) = cookies {
            extractor.set_cookies_from_string(&cookies);
        }
        Self {
            extractor,
            config: AfreecaTvConfig::from_extras(extras.as_ref()),
        }
    }

    pub fn extract_reference(&self) -> Result<ChannelReference, ExtractorError> {
        let url = &self.extractor.url;
        let channel_id = capture_named_or_invalid_url(&GLOBAL_URL_REGEX, url, "channel_id")?;
        Ok(ChannelReference {
            channel_id: channel_id.to_owned(),
            video_id: capture_named(&GLOBAL_URL_REGEX, url, "video_id").map(str::to_owned),
        })
    }

    async fn fetch_channel(&self, reference: &ChannelReference) -> Result<Channel, ExtractorError> {
        let video_type = if reference.video_id.is_some() {
            "video"
        } else {
            "live"
        };
        let url = format!(
            "{}/{video_type}/view_{video_type}.php",
            self.config.global_api_base()
        );

        let mut query = vec![("pt", "view"), ("bid", reference.channel_id.as_str())];
        if let Some(video_id) = &reference.video_id {
            query.push(("vno", video_id.as_str()));
        }
        debug!(%url, ?query, "Fetching channel info");

        let body = self
            .extractor
            .get(&url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Self::parse_channel(&body)
    }

    /// Decodes a response body and rejects responses flagged as failed.
    pub(crate) fn parse_channel(body: &str) -> Result<Channel, ExtractorError> {
        let response: GlobalResponse = serde_json::from_str(body)?;
        let channel = response.channel;
        if channel.result != Some(1) {
            return Err(ExtractorError::Upstream {
                platform: Self::NAME,
                message: channel
                    .remsg
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        Ok(channel)
    }

    /// Builds the record of an on-demand video.
    ///
    /// One valid part is promoted to a single record carrying the channel
    /// metadata; several parts become a multi-video record.
    pub(crate) fn build_video_info(
        &self,
        channel_id: &str,
        video_id: &str,
        channel: Channel,
    ) -> Result<MediaInfo, ExtractorError> {
        let title = channel
            .title
            .clone()
            .ok_or(ExtractorError::MissingField("title"))?;
        let shared = SharedInfo::from_channel(&channel, channel_id);

        let mut entries: Vec<MediaInfo> = channel
            .flist
            .iter()
            .enumerate()
            .filter_map(|(i, f)| self.build_part(video_id, &title, &shared, i, f))
            .collect();
        debug!(
            video_id,
            parts = entries.len(),
            listed = channel.flist.len(),
            "Parsed video parts"
        );

        if entries.len() == 1
            && let Some(mut part) = entries.pop()
        {
            part.duration = part.duration.or(channel.length);
            return Ok(part);
        }

        let builder = MediaInfo::builder(self.extractor.url.clone(), video_id, title)
            .duration_opt(channel.length)
            .headers_opt(Some(self.extractor.get_platform_headers_map()));
        let builder = if entries.is_empty() {
            warn!(video_id, "No playable parts found");
            builder.streams(vec![])
        } else {
            builder.entries(entries)
        };
        Ok(shared.apply(builder).build())
    }

    fn build_part(
        &self,
        video_id: &str,
        title: &str,
        shared: &SharedInfo,
        index: usize,
        entry: &FileEntry,
    ) -> Option<MediaInfo> {
        let key = parse_video_key(entry.key.as_deref().unwrap_or_default());
        if key.is_empty() {
            debug!(key = ?entry.key, "Skipping part with unparseable key");
            return None;
        }
        let file = entry.file.as_deref()?;

        let part = key.part.unwrap_or_else(|| (index + 1).to_string());
        let stream = StreamInfo::builder(file, StreamFormat::Hls, MediaFormat::Mp4)
            .format_id("hls")
            .build();

        let builder = MediaInfo::builder(
            self.extractor.url.clone(),
            format!("{video_id}_{part}"),
            title,
        )
        .upload_date_opt(key.upload_date)
        .duration_opt(entry.length)
        .streams(vec![stream])
        .headers_opt(Some(self.extractor.get_platform_headers_map()));
        Some(shared.clone().apply(builder).build())
    }

    /// Builds the record of a live channel. Stream entries that cannot be
    /// resolved are skipped; this never fails once the response is decoded.
    pub(crate) async fn build_live_info(
        &self,
        channel_id: &str,
        channel: Channel,
    ) -> Result<MediaInfo, ExtractorError> {
        let title = channel
            .title
            .as_deref()
            .ok_or(ExtractorError::MissingField("title"))?;
        let shared = SharedInfo::from_channel(&channel, channel_id);

        let mut streams = Vec::new();
        for entry in &channel.strm {
            streams.extend(self.resolve_live_stream(channel_id, entry).await);
        }
        sort_streams(&mut streams);

        let builder = MediaInfo::builder(self.extractor.url.clone(), channel_id, live_title(title))
            .is_live(true)
            .streams(streams)
            .headers_opt(Some(self.extractor.get_platform_headers_map()));
        Ok(shared.apply(builder).build())
    }

    async fn resolve_live_stream(&self, channel_id: &str, entry: &StreamEntry) -> Vec<StreamInfo> {
        let Some(url) = entry.purl.as_deref() else {
            return vec![];
        };

        match entry.stype.as_deref() {
            Some(stype @ "HLS") => match self
                .extract_hls_stream(
                    &self.extractor.client,
                    Some(self.extractor.get_platform_headers()),
                    url,
                    stype,
                )
                .await
            {
                Ok(streams) => streams,
                Err(e) => {
                    warn!(channel_id, url, error = %e, "Failed to expand HLS playlist; skipping");
                    vec![]
                }
            },
            Some(stype @ "RTMP") => {
                let format_id = match entry.label.as_deref() {
                    Some(label) => format!("{stype}-{label}"),
                    None => stype.to_string(),
                };
                // `brt` is reported as the height, as the web player does.
                vec![
                    StreamInfo::builder(url, StreamFormat::Rtmp, MediaFormat::Flv)
                        .format_id(format_id)
                        .bitrate_opt(entry.bps)
                        .height_opt(entry.brt)
                        .is_live(true)
                        .build(),
                ]
            }
            other => {
                debug!(channel_id, stype = ?other, "Skipping unsupported stream type");
                vec![]
            }
        }
    }
}

impl HlsExtractor for AfreecaTvGlobal {}

#[async_trait]
impl PlatformExtractor for AfreecaTvGlobal {
    fn get_extractor(&self) -> &Extractor {
        &self.extractor
    }

    async fn extract(&self) -> Result<MediaInfo, ExtractorError> {
        let reference = self.extract_reference()?;
        let channel = self.fetch_channel(&reference).await?;

        match &reference.video_id {
            Some(video_id) => self.build_video_info(&reference.channel_id, video_id, channel),
            None => self.build_live_info(&reference.channel_id, channel).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaContent;

    fn extractor(url: &str) -> AfreecaTvGlobal {
        AfreecaTvGlobal::new(url.to_string(), Client::new(), None, None)
    }

    fn channel(json: &str) -> Channel {
        AfreecaTvGlobal::parse_channel(json).unwrap()
    }

    #[test]
    fn test_extract_reference() {
        let reference = extractor("http://afreeca.tv/36853014/v/58301")
            .extract_reference()
            .unwrap();
        assert_eq!(reference.channel_id, "36853014");
        assert_eq!(reference.video_id.as_deref(), Some("58301"));

        let reference = extractor("https://www.afreeca.tv/36853014")
            .extract_reference()
            .unwrap();
        assert_eq!(reference.channel_id, "36853014");
        assert_eq!(reference.video_id, None);

        assert!(matches!(
            extractor("http://afreeca.tv/someone").extract_reference(),
            Err(ExtractorError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_upstream_failure() {
        let result = AfreecaTvGlobal::parse_channel(
            r#"{"channel": {"result": 0, "remsg": "This video has been deleted."}}"#,
        );
        match result {
            Err(e @ ExtractorError::Upstream { .. }) => {
                assert_eq!(
                    e.to_string(),
                    "afreecatv:global said: This video has been deleted."
                );
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_result_is_failure() {
        assert!(matches!(
            AfreecaTvGlobal::parse_channel(r#"{"channel": {"title": "x"}}"#),
            Err(ExtractorError::Upstream { .. })
        ));
        assert!(matches!(
            AfreecaTvGlobal::parse_channel(r#"{"nothing": 1}"#),
            Err(ExtractorError::JsonError(_))
        ));
    }

    #[test]
    fn test_single_part_is_promoted() {
        let extractor = extractor("http://afreeca.tv/36853014/v/58301");
        let channel = channel(
            r#"{"channel": {
                "result": 1, "title": "tryhard top100", "thumb": "http://img/thumb.jpg",
                "vcnt": 1500, "grade": 0, "cname": "makgi Hearthstone Live!", "length": 7200,
                "flist": [
                    {"key": "broken", "file": "http://cdn/skip.m3u8"},
                    {"key": "20160502_abc_3", "file": "http://cdn/part3.m3u8", "length": "3600"}
                ]
            }}"#,
        );
        let media = extractor
            .build_video_info("36853014", "58301", channel)
            .unwrap();

        assert_eq!(media.id, "58301_3");
        assert_eq!(media.title, "tryhard top100");
        assert_eq!(media.upload_date.as_deref(), Some("20160502"));
        assert_eq!(media.duration, Some(3600));
        assert_eq!(media.uploader.as_deref(), Some("makgi Hearthstone Live!"));
        assert_eq!(media.uploader_id.as_deref(), Some("36853014"));
        assert_eq!(media.thumbnail.as_deref(), Some("http://img/thumb.jpg"));
        assert_eq!(media.view_count, Some(1500));
        assert_eq!(media.age_limit, Some(0));
        assert!(!media.is_container());
        assert_eq!(media.streams().len(), 1);
        assert_eq!(media.streams()[0].url, "http://cdn/part3.m3u8");
        assert_eq!(media.streams()[0].stream_format, StreamFormat::Hls);
        assert_eq!(media.streams()[0].media_format, MediaFormat::Mp4);
    }

    #[test]
    fn test_promoted_part_falls_back_to_channel_duration() {
        let extractor = extractor("http://afreeca.tv/1/v/2");
        let channel = channel(
            r#"{"channel": {"result": 1, "title": "t", "length": 7200,
                "flist": [{"key": "20160502_abc_1", "file": "http://cdn/p.m3u8"}]}}"#,
        );
        let media = extractor.build_video_info("1", "2", channel).unwrap();
        assert_eq!(media.id, "2_1");
        assert_eq!(media.duration, Some(7200));
    }

    #[test]
    fn test_multiple_parts() {
        let extractor = extractor("http://afreeca.tv/36853014/v/58301");
        let channel = channel(
            r#"{"channel": {
                "result": 1, "title": "tryhard top100", "cname": "makgi",
                "flist": [
                    {"key": "20160502_abc_1", "file": "http://cdn/part1.m3u8", "length": 100},
                    {"key": "20160502_abc_2", "file": null, "length": 150},
                    {"key": "20160503_def_2", "file": "http://cdn/part2.m3u8", "length": 200}
                ]
            }}"#,
        );
        let media = extractor
            .build_video_info("36853014", "58301", channel)
            .unwrap();

        assert_eq!(media.id, "58301");
        assert!(media.is_container());
        assert!(media.streams().is_empty());
        let ids: Vec<_> = media.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["58301_1", "58301_2"]);
        assert_eq!(media.entries()[1].upload_date.as_deref(), Some("20160503"));
        assert_eq!(media.entries()[1].duration, Some(200));
        assert_eq!(media.entries()[0].streams()[0].url, "http://cdn/part1.m3u8");
        assert_eq!(media.uploader.as_deref(), Some("makgi"));
        assert_eq!(media.entries()[0].uploader.as_deref(), Some("makgi"));
        assert_eq!(media.entries()[0].uploader_id.as_deref(), Some("36853014"));
    }

    #[test]
    fn test_no_valid_parts() {
        let extractor = extractor("http://afreeca.tv/1/v/2");
        let channel = channel(
            r#"{"channel": {"result": 1, "title": "t",
                "flist": [{"key": "nope", "file": "http://cdn/p.m3u8"}]}}"#,
        );
        let media = extractor.build_video_info("1", "2", channel).unwrap();
        assert_eq!(media.id, "2");
        assert!(matches!(&media.content, MediaContent::Single { streams } if streams.is_empty()));
    }

    #[test]
    fn test_video_title_required() {
        let extractor = extractor("http://afreeca.tv/1/v/2");
        let channel = channel(r#"{"channel": {"result": 1}}"#);
        assert!(matches!(
            extractor.build_video_info("1", "2", channel),
            Err(ExtractorError::MissingField("title"))
        ));
    }

    #[tokio::test]
    async fn test_live_rtmp_streams() {
        let extractor = extractor("http://afreeca.tv/36853014");
        let channel = channel(
            r#"{"channel": {
                "result": 1, "title": "makgi", "cname": "makgi Hearthstone Live!", "vcnt": "42",
                "strm": [
                    {"stype": "RTMP", "purl": "rtmp://live/app/low", "label": "sd", "bps": 500, "brt": 360},
                    {"stype": "RTMP", "purl": "rtmp://live/app/high", "bps": "2000", "brt": "720"},
                    {"stype": "RTMP", "label": "missing-url"},
                    {"stype": "FLASH", "purl": "http://live/unknown"}
                ]
            }}"#,
        );
        let media = extractor.build_live_info("36853014", channel).await.unwrap();

        assert_eq!(media.id, "36853014");
        assert_eq!(media.title, "makgi (live)");
        assert!(media.is_live);
        assert_eq!(media.view_count, Some(42));

        let ids: Vec<_> = media.streams().iter().map(|s| s.format_id.as_str()).collect();
        assert_eq!(ids, ["RTMP", "RTMP-sd"]);
        let best = &media.streams()[0];
        assert_eq!(best.bitrate, Some(2000));
        // brt is carried over as the height
        assert_eq!(best.height, Some(720));
        assert_eq!(best.media_format, MediaFormat::Flv);
        assert!(best.is_live);
    }

    #[tokio::test]
    async fn test_live_hls_failure_is_skipped() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
        let extractor = extractor("http://afreeca.tv/36853014");
        let channel = channel(
            r#"{"channel": {
                "result": 1, "title": "makgi",
                "strm": [
                    {"stype": "HLS", "purl": "http://127.0.0.1:9/live/playlist.m3u8"},
                    {"stype": "HLS", "purl": "not a url"},
                    {"stype": "RTMP", "purl": "rtmp://live/app/stream", "label": "hd"}
                ]
            }}"#,
        );
        let media = extractor.build_live_info("36853014", channel).await.unwrap();
        assert_eq!(media.streams().len(), 1);
        assert_eq!(media.streams()[0].format_id, "RTMP-hd");
    }

    #[tokio::test]
    #[ignore]
    async fn test_extract() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
        let extractor = extractor("http://afreeca.tv/36853014/v/58301");
        let media_info = extractor.extract().await.unwrap();
        println!("{}", media_info.pretty_print());
    }
}
