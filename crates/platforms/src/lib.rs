//! Stream and metadata extraction for AfreecaTV.
//!
//! Two extractors are provided: [`AfreecaTv`](extractor::platforms::afreecatv::AfreecaTv)
//! for the legacy `afreecatv.com` player pages and
//! [`AfreecaTvGlobal`](extractor::platforms::afreecatv::AfreecaTvGlobal) for the
//! `afreeca.tv` live channels and on-demand videos. Most callers go through
//! [`default_factory`](extractor::default_factory) and the
//! [`PlatformExtractor`](extractor::platform_extractor::PlatformExtractor) trait.

pub mod extractor;
pub mod media;
