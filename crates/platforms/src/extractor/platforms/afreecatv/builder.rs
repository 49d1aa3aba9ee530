use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::debug;

use crate::{
    extractor::{
        error::ExtractorError,
        platform_configs::AfreecaTvConfig,
        platform_extractor::{Extractor, PlatformExtractor},
        platforms::afreecatv::models::VideoInfoXml,
        utils::capture_named_or_invalid_url,
    },
    media::{MediaFormat, MediaInfo, StreamFormat, StreamInfo},
};

pub static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^https?://
        (?:
            (?:(?:live|afbbs|www)\.)?afreeca(?:tv)?\.com(?::\d+)?
            (?:
                /app/(?:index|read_ucc_bbs)\.cgi|
                /player/[Pp]layer\.(?:swf|html)
            )\?.*?\bnTitleNo=|
            vod\.afreecatv\.com/PLAYER/STATION/
        )
        (?P<id>\d+)",
    )
    .unwrap()
});

const PLAY_PATH_MARKER: &str = "mp4:";

/// Identifier captured from a legacy page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReference {
    pub title_no: String,
}

/// Extractor for the legacy `afreecatv.com` VOD and bulletin-board pages.
///
/// The video info API returns an RTMP application URL and play path; the
/// stream has no end marker, so it is flagged live for the downloader.
pub struct AfreecaTv {
    pub extractor: Extractor,
    config: AfreecaTvConfig,
}

impl AfreecaTv {
    pub const NAME: &str = "afreecatv";
    const BASE_URL: &str = "http://www.afreecatv.com/";

    pub fn new(
        url: String,
        client: Client,
        cookies: Option<String>,
        extras: Option<serde_json::Value>,
    ) -> Self {
        let mut extractor = Extractor::new(Self::NAME, url, client);
        extractor.set_referer_static(Self::BASE_URL);
        if let Some(cookies) = cookies {
            extractor.set_cookies_from_string(&cookies);
        }
        Self {
            extractor,
            config: AfreecaTvConfig::from_extras(extras.as_ref()),
        }
    }

    /// The `nTitleNo` of the page.
    pub fn extract_reference(&self) -> Result<VideoReference, ExtractorError> {
        let title_no = capture_named_or_invalid_url(&URL_REGEX, &self.extractor.url, "id")?;
        Ok(VideoReference {
            title_no: title_no.to_owned(),
        })
    }

    fn video_info_url(&self) -> String {
        format!("{}/api/video/get_video_info.php", self.config.api_base())
    }

    async fn fetch_video_info(&self, title_no: &str) -> Result<VideoInfoXml, ExtractorError> {
        let url = self.video_info_url();
        debug!(%url, title_no, "Fetching video info");
        let body = self
            .extractor
            .get(&url)
            .query(&[("nTitleNo", title_no)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        VideoInfoXml::parse(&body)
    }

    pub(crate) fn build_media_info(
        &self,
        title_no: &str,
        info: VideoInfoXml,
    ) -> Result<MediaInfo, ExtractorError> {
        // The first video element is a placeholder; the real one comes second.
        let raw_url = info
            .videos
            .get(1)
            .and_then(|v| v.as_deref())
            .ok_or_else(|| {
                ExtractorError::ContentUnavailable(
                    "Specified AfreecaTV video does not exist".to_string(),
                )
            })?;

        let (app, play_path) = raw_url.split_once(PLAY_PATH_MARKER).ok_or_else(|| {
            ExtractorError::InvalidResponse(format!("video url without play path: {raw_url}"))
        })?;

        let duration = info.duration_secs();
        let title = info.title.ok_or(ExtractorError::MissingField("title"))?;

        let stream = StreamInfo::builder(app, StreamFormat::Rtmp, MediaFormat::Flv)
            .format_id("RTMP")
            .play_path(format!("{PLAY_PATH_MARKER}{play_path}"))
            .is_live(true)
            .build();

        Ok(
            MediaInfo::builder(self.extractor.url.clone(), title_no, title)
                .uploader_opt(info.nickname)
                .uploader_id_opt(info.bj_id)
                .duration_opt(duration)
                .thumbnail_opt(info.title_image)
                .streams(vec![stream])
                .headers_opt(Some(self.extractor.get_platform_headers_map()))
                .build(),
        )
    }
}

#[async_trait]
impl PlatformExtractor for AfreecaTv {
    fn get_extractor(&self) -> &Extractor {
        &self.extractor
    }

    async fn extract(&self) -> Result<MediaInfo, ExtractorError> {
        let reference = self.extract_reference()?;
        let info = self.fetch_video_info(&reference.title_no).await?;
        self.build_media_info(&reference.title_no, info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(url: &str) -> AfreecaTv {
        AfreecaTv::new(url.to_string(), Client::new(), None, None)
    }

    fn video_info(videos: Vec<Option<&str>>) -> VideoInfoXml {
        VideoInfoXml {
            videos: videos.into_iter().map(|v| v.map(str::to_owned)).collect(),
            title: Some("오늘은 다르다!".to_string()),
            nickname: Some("윈아디".to_string()),
            bj_id: Some("badkids".to_string()),
            duration: Some("613".to_string()),
            title_image: Some("http://stimg.afreecatv.com/thumb.jpg".to_string()),
        }
    }

    #[test]
    fn test_url_regex_shapes() {
        let cases = [
            (
                "http://live.afreecatv.com:8079/app/index.cgi?szType=read_ucc_bbs&szBjId=dailyapril&nStationNo=16711924&nBbsNo=18605867&nTitleNo=36164052&szSkin=",
                "36164052",
            ),
            (
                "http://afbbs.afreecatv.com:8080/app/read_ucc_bbs.cgi?nStationNo=16711924&nTitleNo=36153164&szBjId=dailyapril&nBbsNo=18605867",
                "36153164",
            ),
            ("http://vod.afreecatv.com/PLAYER/STATION/18650793", "18650793"),
            (
                "http://www.afreecatv.com/player/Player.swf?szType=szBjId=djleegoon&nStationNo=11273158&nBbsNo=13161095&nTitleNo=36327652",
                "36327652",
            ),
            ("http://vod.afreecatv.com/PLAYER/STATION/15055030", "15055030"),
            ("https://afreeca.com/player/player.html?nTitleNo=42", "42"),
        ];
        for (url, id) in cases {
            assert_eq!(extractor(url).extract_reference().unwrap().title_no, id, "{url}");
        }
    }

    #[test]
    fn test_url_regex_rejects() {
        for url in [
            "http://afreeca.tv/36853014/v/58301",
            "http://www.afreecatv.com/app/index.cgi?nStationNo=1",
            "http://www.afreecatv.com/app/index.cgi?xnTitleNo=1",
            "ftp://vod.afreecatv.com/PLAYER/STATION/1",
        ] {
            assert!(!URL_REGEX.is_match(url), "{url}");
            assert!(matches!(
                extractor(url).extract_reference(),
                Err(ExtractorError::InvalidUrl(_))
            ));
        }
    }

    #[test]
    fn test_build_media_info() {
        let extractor = extractor("http://vod.afreecatv.com/PLAYER/STATION/18650793");
        let info = video_info(vec![
            Some("rtmp://decoy/app/mp4:x.mp4"),
            Some("rtmp://220.95.232.11/vod/mp4:clip/18650793.mp4"),
        ]);
        let media = extractor.build_media_info("18650793", info).unwrap();

        assert_eq!(media.id, "18650793");
        assert_eq!(media.title, "오늘은 다르다!");
        assert_eq!(media.uploader.as_deref(), Some("윈아디"));
        assert_eq!(media.uploader_id.as_deref(), Some("badkids"));
        assert_eq!(media.duration, Some(613));
        assert!(!media.is_live);
        assert!(!media.is_container());

        let [stream] = media.streams() else {
            panic!("expected exactly one stream");
        };
        assert_eq!(stream.url, "rtmp://220.95.232.11/vod/");
        assert_eq!(stream.play_path.as_deref(), Some("mp4:clip/18650793.mp4"));
        assert_eq!(stream.media_format, MediaFormat::Flv);
        assert_eq!(stream.stream_format, StreamFormat::Rtmp);
        assert!(stream.is_live);
    }

    #[test]
    fn test_play_path_split_on_first_marker() {
        let extractor = extractor("http://vod.afreecatv.com/PLAYER/STATION/1");
        let info = video_info(vec![None, Some("rtmp://h/app/mp4:a/mp4:b.mp4")]);
        let media = extractor.build_media_info("1", info).unwrap();
        assert_eq!(media.streams()[0].url, "rtmp://h/app/");
        assert_eq!(media.streams()[0].play_path.as_deref(), Some("mp4:a/mp4:b.mp4"));
    }

    #[test]
    fn test_missing_second_video() {
        let extractor = extractor("http://vod.afreecatv.com/PLAYER/STATION/1");
        for videos in [vec![], vec![Some("rtmp://a/mp4:b")], vec![Some("x"), None]] {
            let result = extractor.build_media_info("1", video_info(videos));
            match result {
                Err(ExtractorError::ContentUnavailable(msg)) => {
                    assert_eq!(msg, "Specified AfreecaTV video does not exist")
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_title() {
        let extractor = extractor("http://vod.afreecatv.com/PLAYER/STATION/1");
        let mut info = video_info(vec![None, Some("rtmp://h/app/mp4:a.mp4")]);
        info.title = None;
        assert!(matches!(
            extractor.build_media_info("1", info),
            Err(ExtractorError::MissingField("title"))
        ));
    }

    #[test]
    fn test_video_url_without_play_path() {
        let extractor = extractor("http://vod.afreecatv.com/PLAYER/STATION/1");
        let info = video_info(vec![None, Some("rtmp://h/app/clip.flv")]);
        assert!(matches!(
            extractor.build_media_info("1", info),
            Err(ExtractorError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    #[ignore]
    async fn test_extract() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
        let extractor = extractor("http://vod.afreecatv.com/PLAYER/STATION/18650793");
        let media_info = extractor.extract().await.unwrap();
        println!("{}", media_info.pretty_print());
    }
}
