use anyhow::{anyhow, Context, Result};
use reqwest::blocking::multipart::Form;
use reqwest::blocking::Client;
use reqwest::Url;
use std::path::Path;
use std::time::Duration;

use crate::config::Config;

/// Bounded wait on the upload so a slow or unreachable endpoint cannot
/// stall the run indefinitely.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimal Telegram Bot API client for pushing one artifact per run to the
/// single authorized chat. Blocking HTTP; the whole tool is one synchronous
/// pass.
#[derive(Debug, Clone)]
pub(crate) struct BotClient {
    http: Client,
    base_url: Url,
    token: String,
    chat_id: String,
}

impl BotClient {
    pub(crate) fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.api_base)
            .with_context(|| format!("Invalid TELEGRAM_API_URL: {}", config.api_base))?;
        if base_url.host_str().is_none() {
            return Err(anyhow!("TELEGRAM_API_URL is missing a host"));
        }

        let http = Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url,
            token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        })
    }

    /// Upload a file as a `document` attachment.
    pub(crate) fn send_document(&self, path: &Path, caption: &str) -> Result<()> {
        self.send_file("sendDocument", "document", path, caption)
    }

    /// Upload a file as a `photo` attachment.
    pub(crate) fn send_photo(&self, path: &Path, caption: &str) -> Result<()> {
        self.send_file("sendPhoto", "photo", path, caption)
    }

    fn send_file(&self, method: &str, field: &'static str, path: &Path, caption: &str) -> Result<()> {
        let endpoint = self.endpoint(method)?;

        let mut form = Form::new().text("chat_id", self.chat_id.clone());
        if !caption.is_empty() {
            form = form.text("caption", caption.to_string());
        }
        let form = form
            .file(field, path)
            .with_context(|| format!("Failed to read artifact: {}", path.display()))?;

        let response = self
            .http
            .post(endpoint.clone())
            .multipart(form)
            .send()
            .with_context(|| format!("POST {method} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(anyhow!(
                "Telegram {method} returned {status}: {}",
                snippet(&body)
            ));
        }

        Ok(())
    }

    fn endpoint(&self, method: &str) -> Result<Url> {
        self.base_url
            .join(&format!("bot{}/{method}", self.token))
            .with_context(|| format!("Failed to build Telegram {method} URL"))
    }
}

/// First line of an error body, clipped; Telegram error payloads are short
/// but arbitrary input should not flood stdout.
fn snippet(body: &str) -> String {
    let line = body.lines().next().unwrap_or("");
    line.chars().take(200).collect()
}
