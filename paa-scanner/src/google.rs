use crate::error::SourceError;
use crate::parse::parse_search_page;
use crate::source::{QuestionSource, SearchPage};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const SEARCH_URL: &str = "https://www.google.com/search";
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
pub const DEFAULT_COUNTRY: &str = "us";

/// [`QuestionSource`] backed by the Google search results page.
pub struct GoogleSource {
    client: Client,
    endpoint: Url,
    country: String,
}

impl GoogleSource {
    pub fn new() -> Result<Self, SourceError> {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        let endpoint = Url::parse(SEARCH_URL)
            .map_err(|e| SourceError::InvalidUrl(format!("{}: {}", SEARCH_URL, e)))?;

        Ok(Self {
            client,
            endpoint,
            country: DEFAULT_COUNTRY.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self, SourceError> {
        self.endpoint = Url::parse(endpoint)
            .map_err(|e| SourceError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        Ok(self)
    }

    pub fn with_country(mut self, country: &str) -> Self {
        self.country = country.to_string();
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn fetch(&self, question: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("q", question), ("gl", self.country.as_str())])
            .send()
            .await?;

        let status = response.status();
        debug!("GET {} for '{}' -> {}", self.endpoint, question, status);
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

impl QuestionSource for GoogleSource {
    async fn lookup(&self, question: &str) -> Result<SearchPage, SourceError> {
        let body = self.fetch(question).await?;
        parse_search_page(&body, &self.endpoint)
    }
}
