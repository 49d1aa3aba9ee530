use super::factory::ExtractorFactory;
use reqwest::Client;
use rustls::{ClientConfig, crypto::ring};
use rustls_platform_verifier::BuilderVerifierExt;
use std::{sync::Arc, time::Duration};
use tracing::warn;

pub(crate) const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

fn platform_tls_config() -> Result<ClientConfig, rustls::Error> {
    let provider = Arc::new(ring::default_provider());
    Ok(ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_platform_verifier()?
        .with_no_client_auth())
}

/// HTTP client used by [`default_factory`]: platform certificate verification
/// and a 30 second request timeout.
pub fn default_client() -> Client {
    let builder = Client::builder().timeout(DEFAULT_TIMEOUT);
    let builder = match platform_tls_config() {
        Ok(tls_config) => builder.use_preconfigured_tls(tls_config),
        Err(e) => {
            warn!(error = %e, "Platform TLS verifier unavailable; using bundled roots");
            builder
        }
    };

    builder.build().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to build configured HTTP client; using defaults");
        Client::new()
    })
}

/// Returns a new `ExtractorFactory` populated with all the supported platforms.
pub fn default_factory() -> ExtractorFactory {
    ExtractorFactory::new(default_client())
}
