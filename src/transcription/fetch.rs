//! Fetch a transcript over HTTP and convert it to WebVTT.

use super::transcript::{TimedWord, TranscriptError, parse_transcript_json};
use crate::subtitle::{CueConfig, json_to_vtt};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error(transparent)]
    Transcript(#[from] TranscriptError),
}

/// Downloads transcript documents
#[derive(Debug, Clone)]
pub struct TranscriptFetcher {
    client: Client,
    show_progress: bool,
}

impl Default for TranscriptFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptFetcher {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Use a preconfigured client (timeouts, proxies, headers)
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            show_progress: false,
        }
    }

    /// Draw a progress bar on stderr while the body downloads
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// GET `url` and return the body as text.
    ///
    /// Non-success statuses are logged but the body is still returned, so
    /// an error page surfaces later as a transcript syntax or format error.
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        info!("Fetching transcript from {}", url);

        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("HTTP {} from {}", status, url);
        }

        let pb = self.progress_bar(response.content_length());
        let mut body = Vec::new();

        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
            pb.set_position(body.len() as u64);
        }

        pb.finish_and_clear();
        info!("Fetched {} bytes from {}", body.len(), url);

        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Fetch and parse a transcript into its word list
    pub async fn fetch_words(&self, url: &str) -> Result<Vec<TimedWord>, FetchError> {
        let content = self.fetch_text(url).await?;
        Ok(parse_transcript_json(&content)?)
    }

    /// Fetch a transcript and convert it to WebVTT
    pub async fn load_vtt(&self, url: &str, config: &CueConfig) -> Result<String, FetchError> {
        let words = self.fetch_words(url).await?;
        Ok(json_to_vtt(&words, config))
    }

    fn progress_bar(&self, total: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        match total {
            Some(total) => {
                let pb = ProgressBar::new(total);
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                {
                    pb.set_style(style.progress_chars("#>-"));
                }
                pb
            }
            None => ProgressBar::new_spinner(),
        }
    }
}

/// Load a JSON transcript from `url` and convert it to WebVTT
pub async fn load_json_transcript(url: &str, config: &CueConfig) -> Result<String, FetchError> {
    TranscriptFetcher::new().load_vtt(url, config).await
}
