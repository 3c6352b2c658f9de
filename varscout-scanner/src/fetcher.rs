use crate::error::{Result, ScanError};
use crate::result::FetchedPage;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) varscout/0.1";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Builder for a [`Fetcher`].
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    user_agent: String,
    timeout_secs: u64,
}

impl FetcherConfig {
    pub fn new() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn build(self) -> Result<Fetcher> {
        let client = Client::builder()
            .user_agent(&self.user_agent)
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(self.timeout_secs.div_ceil(2)))
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Fetcher { client })
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Downloads listing pages, one at a time.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        FetcherConfig::new().build()
    }

    /// GET `url` and return whatever status and body came back.
    ///
    /// Non-200 statuses are not errors here; callers decide what to do with
    /// them via [`FetchedPage::is_ok`].
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let parsed = Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;
        debug!("Fetching {}", parsed);

        let start = Instant::now();
        let response = self.client.get(parsed).send().await?;
        let status_code = response.status().as_u16();
        let body = response.text().await?;

        let mut page = FetchedPage::new(url.to_string());
        page.status_code = status_code;
        page.body = body;
        page.response_time = start.elapsed();

        debug!(
            "{} -> {} ({} bytes in {:?})",
            url,
            status_code,
            page.body.len(),
            page.response_time
        );
        Ok(page)
    }
}
