use crate::extractor::default::DEFAULT_UA;

use super::{super::media::media_info::MediaInfo, error::ExtractorError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use rustc_hash::FxHashMap;
use std::str::FromStr;
use tracing::debug;

/// Base extractor shared by the platform implementations.
///
/// Holds the page URL, the HTTP client, the headers sent with every request
/// and a per-instance cookie store.
///
/// ```rust,no_run
/// # use reqwest::Client;
/// # use afreecatv_parser::extractor::platform_extractor::Extractor;
/// # async fn doc_test() -> Result<(), Box<dyn std::error::Error>> {
/// let mut extractor = Extractor::new("afreecatv", "http://vod.afreecatv.com/PLAYER/STATION/18650793", Client::new());
/// extractor.set_cookies_from_string("PdboxTicket=abc; isBbs=1");
///
/// // Cookies and platform headers are included in every request
/// let response = extractor.get("http://afbbs.afreecatv.com:8080/api/video/get_video_info.php").send().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Extractor {
    // url to extract from, e.g., "http://afreeca.tv/36853014/v/58301"
    pub url: String,
    // name of the platform, e.g., "afreecatv", "afreecatv:global"
    pub platform_name: String,
    // The reqwest client
    pub client: Client,
    platform_headers: HeaderMap,
    /// Cookie storage for the extractor.
    pub cookies: FxHashMap<String, String>,
}

impl Extractor {
    pub fn new<S1: Into<String>, S2: Into<String>>(
        platform_name: S1,
        platform_url: S2,
        client: Client,
    ) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(DEFAULT_UA),
        );
        default_headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,application/json,*/*;q=0.8",
            ),
        );
        default_headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7"),
        );

        Self {
            platform_name: platform_name.into(),
            url: platform_url.into(),
            client,
            platform_headers: default_headers,
            cookies: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn set_referer_static(&mut self, referer: &'static str) {
        self.platform_headers
            .insert(reqwest::header::REFERER, HeaderValue::from_static(referer));
    }

    /// Insert an arbitrary header; invalid names or values are skipped.
    pub fn add_header_str<K: AsRef<str>, V: AsRef<str>>(&mut self, key: K, value: V) {
        match HeaderName::from_str(key.as_ref()) {
            Ok(name) => match HeaderValue::from_str(value.as_ref()) {
                Ok(value) => {
                    self.platform_headers.insert(name, value);
                }
                Err(e) => {
                    debug!(error = %e, "Invalid header value; skipping");
                }
            },
            Err(e) => {
                debug!(error = %e, "Invalid header name; skipping");
            }
        }
    }

    /// Set cookies from a cookie string (format: "name1=value1; name2=value2").
    /// This is useful for importing cookies from browsers or external sources.
    pub fn set_cookies_from_string(&mut self, cookie_string: &str) {
        // Accept common separators: ';' from Cookie headers and '\n' from copy/paste.
        for part in cookie_string.split(&[';', '\n'][..]).map(str::trim) {
            if part.is_empty() {
                continue;
            }

            let Some((name, value)) = part.split_once('=') else {
                continue;
            };
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                continue;
            }

            self.cookies.insert(name.to_owned(), value.to_owned());
        }
    }

    fn build_cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }

        let mut pairs: Vec<_> = self.cookies.iter().collect();
        // Stable order so identical stores produce identical headers.
        pairs.sort();
        Some(
            pairs
                .into_iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    /// Create an HTTP request carrying the platform headers and the stored
    /// cookies.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url).headers(self.request_headers())
    }

    fn request_headers(&self) -> HeaderMap {
        let mut headers = self.platform_headers.clone();

        if let Some(cookie_header) = self.build_cookie_header() {
            match HeaderValue::from_str(&cookie_header) {
                Ok(value) => {
                    headers.insert(reqwest::header::COOKIE, value);
                }
                Err(e) => {
                    // If cookies are malformed, skip the Cookie header instead of sending
                    // an empty/invalid value.
                    debug!(error = %e, "Failed to build Cookie header");
                }
            }
        }

        headers
    }

    /// Headers for requests issued outside of [`Extractor::request`], such as
    /// playlist fetches.
    pub fn get_platform_headers(&self) -> HeaderMap {
        self.request_headers()
    }

    /// Request headers as plain strings, for handing over to a downloader.
    pub fn get_platform_headers_map(&self) -> FxHashMap<String, String> {
        let headers = self.request_headers();
        let mut headers_map =
            FxHashMap::with_capacity_and_hasher(headers.len(), Default::default());

        for (key, value) in &headers {
            if let Ok(value) = value.to_str() {
                headers_map.insert(key.as_str().to_owned(), value.to_owned());
            }
        }

        headers_map
    }
}

#[async_trait]
pub trait PlatformExtractor: Send + Sync {
    fn get_extractor(&self) -> &Extractor;

    fn platform_name(&self) -> &str {
        &self.get_extractor().platform_name
    }

    async fn extract(&self) -> Result<MediaInfo, ExtractorError>;
}
