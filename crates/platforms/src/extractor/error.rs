use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("unsupported extractor")]
    UnsupportedExtractor,
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("xml error: {0}")]
    XmlError(String),
    #[error("hls playlist error: {0}")]
    HlsPlaylistError(String),
    /// The platform reports that the requested content no longer exists.
    #[error("{0}")]
    ContentUnavailable(String),
    /// The platform API answered with an explicit failure code.
    #[error("{platform} said: {message}")]
    Upstream {
        platform: &'static str,
        message: String,
    },
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("no streams found")]
    NoStreamsFound,
}

impl ExtractorError {
    /// Whether this error describes a condition the end user should see as-is
    /// (unknown URL, deleted video, upstream refusal) rather than a bug or a
    /// transport failure.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            ExtractorError::InvalidUrl(_)
                | ExtractorError::UnsupportedExtractor
                | ExtractorError::ContentUnavailable(_)
                | ExtractorError::Upstream { .. }
        )
    }
}

impl From<quick_xml::Error> for ExtractorError {
    fn from(e: quick_xml::Error) -> Self {
        ExtractorError::XmlError(e.to_string())
    }
}
