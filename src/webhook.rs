use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use tracing::{debug, info};

use crate::domain::Manifest;
use crate::error::{ReleaserError, Result};

/// Delivers manifests to a webhook endpoint
pub trait WebhookClient {
    fn post(&self, url: &str, manifest: &Manifest) -> Result<()>;
}

/// Webhook client posting JSON over HTTP(S), single attempt
#[derive(Debug, Clone, Default)]
pub struct HttpWebhookClient {
    client: Client,
}

impl HttpWebhookClient {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Parse a webhook URL, requiring an http(s) scheme and a host
pub fn parse_webhook_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|_| ReleaserError::InvalidWebhookUrl(url.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ReleaserError::InvalidWebhookUrl(url.to_string()));
    }
    Ok(parsed)
}

impl WebhookClient for HttpWebhookClient {
    fn post(&self, url: &str, manifest: &Manifest) -> Result<()> {
        let endpoint = parse_webhook_url(url)?;
        let body = manifest.to_json()?;
        debug!("posting {} bytes to {}", body.len(), endpoint);

        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;

        let status = response.status();
        if status != StatusCode::OK {
            let reason = status.canonical_reason().unwrap_or_default().to_string();
            let body = response.text().unwrap_or_default();
            return Err(ReleaserError::WebhookStatus {
                url: url.to_string(),
                status: status.as_u16(),
                reason,
                body,
            });
        }

        info!("manifest delivered to {}", url);
        Ok(())
    }
}

/// Publishes a manifest to a webhook
pub struct ManifestNotifier<'a> {
    webhook_url: &'a str,
    manifest: &'a Manifest,
    client: &'a dyn WebhookClient,
}

impl<'a> ManifestNotifier<'a> {
    pub fn new(webhook_url: &'a str, manifest: &'a Manifest, client: &'a dyn WebhookClient) -> Self {
        ManifestNotifier {
            webhook_url,
            manifest,
            client,
        }
    }

    pub fn execute(&self) -> Result<()> {
        self.client.post(self.webhook_url, self.manifest)
    }
}
