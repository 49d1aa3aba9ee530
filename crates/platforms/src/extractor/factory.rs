use std::sync::LazyLock;

use super::error::ExtractorError;
use super::platform_extractor::PlatformExtractor;
use crate::extractor::platforms::afreecatv::{self, AfreecaTv, AfreecaTvGlobal};
use regex::Regex;
use reqwest::Client;
use tracing::debug;

// A type alias for a thread-safe constructor function.
type ExtractorConstructor =
    fn(String, Client, Option<String>, Option<serde_json::Value>) -> Box<dyn PlatformExtractor>;

struct PlatformEntry {
    name: &'static str,
    regex: &'static LazyLock<Regex>,
    constructor: ExtractorConstructor,
}

macro_rules! platform_registry {
    ( $( $name:expr, $regex:path => $builder:path ),+ $(,)? ) => {
        &[
            $(
                PlatformEntry {
                    name: $name,
                    regex: &$regex,
                    constructor: |url, client, cookies, extras| {
                        Box::new($builder(url, client, cookies, extras))
                            as Box<dyn PlatformExtractor>
                    },
                },
            )+
        ]
    };
}

// Static platform registry.
static PLATFORMS: &[PlatformEntry] = platform_registry![
    AfreecaTv::NAME, afreecatv::URL_REGEX => AfreecaTv::new,
    AfreecaTvGlobal::NAME, afreecatv::GLOBAL_URL_REGEX => AfreecaTvGlobal::new,
];

/// A factory for creating platform-specific extractors.
pub struct ExtractorFactory {
    client: Client,
}

impl ExtractorFactory {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Names of the registered extractors, in matching order.
    pub fn supported_platforms() -> impl Iterator<Item = &'static str> {
        PLATFORMS.iter().map(|p| p.name)
    }

    pub fn create_extractor(
        &self,
        url: &str,
        cookies: Option<String>,
        extras: Option<serde_json::Value>,
    ) -> Result<Box<dyn PlatformExtractor>, ExtractorError> {
        let platform = PLATFORMS
            .iter()
            .find(|platform| platform.regex.is_match(url))
            .ok_or(ExtractorError::UnsupportedExtractor)?;

        debug!(platform = platform.name, url, "Matched extractor");
        Ok((platform.constructor)(
            url.to_string(),
            self.client.clone(),
            cookies,
            extras,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> ExtractorFactory {
        ExtractorFactory::new(Client::new())
    }

    #[test]
    fn test_dispatch_by_url() {
        let factory = factory();
        let cases = [
            (
                "http://live.afreecatv.com:8079/app/index.cgi?szType=read_ucc_bbs&szBjId=dailyapril&nStationNo=16711924&nBbsNo=18605867&nTitleNo=36164052&szSkin=",
                "afreecatv",
            ),
            ("http://vod.afreecatv.com/PLAYER/STATION/18650793", "afreecatv"),
            ("http://afreeca.tv/36853014/v/58301", "afreecatv:global"),
            ("https://www.afreeca.tv/36853014", "afreecatv:global"),
        ];
        for (url, expected) in cases {
            let extractor = factory.create_extractor(url, None, None).unwrap();
            assert_eq!(extractor.platform_name(), expected, "{url}");
            assert_eq!(extractor.get_extractor().url, url);
        }
    }

    #[test]
    fn test_unsupported_url() {
        let result = factory().create_extractor("https://www.twitch.tv/someone", None, None);
        assert!(matches!(result, Err(ExtractorError::UnsupportedExtractor)));
    }

    #[test]
    fn test_supported_platforms() {
        let names: Vec<_> = ExtractorFactory::supported_platforms().collect();
        assert_eq!(names, ["afreecatv", "afreecatv:global"]);
    }
}
