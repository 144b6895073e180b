use crate::{config::FetchConfig, PipelineError};
use reqwest::Client;
use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, warn};

/// Serial HTTP client: one request at a time with a minimum gap between
/// consecutive requests and a bounded number of attempts per URL.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
    last_request: Mutex<Option<Instant>>,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Fetcher, PipelineError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;
        Ok(Fetcher {
            client,
            config,
            last_request: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Body of `url`, retried with a `delay * attempt` pause after each failure.
    pub async fn get_text(&self, url: &str) -> Result<String, PipelineError> {
        let attempts = self.config.max_retries.max(1);
        let mut attempt = 1;
        loop {
            match self.request(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < attempts => {
                    warn!("Attempt {}/{} for {} failed: {}", attempt, attempts, url, e);
                    tokio::time::sleep(self.config.request_delay * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn request(&self, url: &str) -> Result<String, reqwest::Error> {
        let mut last_request = self.last_request.lock().await;
        let now = Instant::now();
        if let Some(last) = last_request.take() {
            let elapsed = now.duration_since(last);
            if elapsed < self.config.request_delay {
                tokio::time::sleep(self.config.request_delay - elapsed).await;
            }
        }

        debug!("Visit {}", url);
        let res = self.client.get(url).send().await;
        last_request.replace(Instant::now());

        res?.error_for_status()?.text().await
    }
}
