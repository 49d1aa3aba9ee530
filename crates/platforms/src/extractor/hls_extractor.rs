use async_trait::async_trait;
use m3u8_rs::{MasterPlaylist, Playlist};
use reqwest::Client;
use reqwest::header::HeaderMap;
use tracing::debug;
use url::Url;

use super::error::ExtractorError;
use crate::media::{MediaFormat, StreamFormat, stream_info::StreamInfo};

/// Expands an HLS playlist URL into one stream per variant.
#[async_trait]
pub trait HlsExtractor {
    async fn extract_hls_stream(
        &self,
        client: &Client,
        headers: Option<HeaderMap>,
        m3u8_url: &str,
        id_prefix: &str,
    ) -> Result<Vec<StreamInfo>, ExtractorError> {
        let base_url =
            Url::parse(m3u8_url).map_err(|e| ExtractorError::HlsPlaylistError(e.to_string()))?;

        let response = client
            .get(m3u8_url)
            .headers(headers.unwrap_or_default())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let playlist = m3u8_rs::parse_playlist_res(&response)
            .map_err(|e| ExtractorError::HlsPlaylistError(e.to_string()))?;

        let streams = match playlist {
            Playlist::MasterPlaylist(pl) => process_master_playlist(pl, &base_url, id_prefix)?,
            Playlist::MediaPlaylist(_) => vec![
                StreamInfo::builder(m3u8_url, StreamFormat::Hls, MediaFormat::Mp4)
                    .format_id(id_prefix)
                    .build(),
            ],
        };
        debug!(url = m3u8_url, count = streams.len(), "Expanded HLS playlist");

        Ok(streams)
    }
}

fn process_master_playlist(
    playlist: MasterPlaylist,
    base_url: &Url,
    id_prefix: &str,
) -> Result<Vec<StreamInfo>, ExtractorError> {
    playlist
        .variants
        .into_iter()
        .filter(|variant| !variant.is_i_frame)
        .enumerate()
        .map(|(index, variant)| {
            let stream_url = base_url
                .join(&variant.uri)
                .map_err(|e| ExtractorError::HlsPlaylistError(e.to_string()))?;
            let bitrate = variant.average_bandwidth.unwrap_or(variant.bandwidth) / 1000;
            let format_id = if bitrate > 0 {
                format!("{id_prefix}-{bitrate}")
            } else {
                format!("{id_prefix}-{index}")
            };
            let (width, height) = variant
                .resolution
                .map(|r| (u32::try_from(r.width).ok(), u32::try_from(r.height).ok()))
                .unwrap_or_default();

            Ok(
                StreamInfo::builder(stream_url.as_str(), StreamFormat::Hls, MediaFormat::Mp4)
                    .format_id(format_id)
                    .bitrate_opt((bitrate > 0).then_some(bitrate))
                    .width_opt(width)
                    .height_opt(height)
                    .codec_opt(variant.codecs)
                    .fps_opt(variant.frame_rate)
                    .build(),
            )
        })
        .collect()
}
