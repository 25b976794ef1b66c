//! HTTP client for the "on this day" births feed.

use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{
    domain::MonthDay,
    error::FeedError,
    protocol::{RawBirth, BIRTHS_FIELD},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

pub const DEFAULT_FEED_BASE_URL: &str = "https://api.wikimedia.org";
pub const DEFAULT_FEED_LANGUAGE: &str = "en";
/// The feed has been observed to take more than five seconds.
pub const DEFAULT_FEED_TIMEOUT: Duration = Duration::from_millis(8000);
pub const DEFAULT_USER_AGENT: &str = "BornToday/1.0";

/// Identifying header required by the feed operator.
pub const CLIENT_HEADER: &str = "Api-User-Agent";
/// Request-unique query parameter. The feed's cache has been seen to serve one
/// client's response to another client on the same IP without it.
pub const CACHE_BUST_PARAM: &str = "cache_bust";

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub base_url: String,
    pub language: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FEED_BASE_URL.into(),
            language: DEFAULT_FEED_LANGUAGE.into(),
            timeout: DEFAULT_FEED_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }
}

/// Source of raw births records for one date.
///
/// Implementations issue exactly one request per call and never retry; retry
/// policy belongs to the caller. Callers must not start a second fetch while
/// one is outstanding.
#[async_trait]
pub trait BirthsFeed: Send + Sync {
    async fn fetch(&self, date: MonthDay) -> Result<Vec<RawBirth>, FeedError>;

    async fn fetch_cancellable(
        &self,
        date: MonthDay,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawBirth>, FeedError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(%date, "births feed request cancelled");
                Err(FeedError::Cancelled)
            }
            result = self.fetch(date) => result,
        }
    }
}

pub struct FeedClient {
    http: Client,
    base_url: Url,
    language: String,
    user_agent: String,
}

impl FeedClient {
    pub fn new(settings: FeedSettings) -> anyhow::Result<Self> {
        let base_url = Url::parse(&settings.base_url)
            .with_context(|| format!("invalid feed base url '{}'", settings.base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("feed base url '{}' cannot carry a path", settings.base_url);
        }
        if settings.language.is_empty()
            || !settings
                .language
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            bail!("invalid feed language '{}'", settings.language);
        }

        let http = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .context("failed to build feed HTTP client")?;

        Ok(Self {
            http,
            base_url,
            language: settings.language,
            user_agent: settings.user_agent,
        })
    }

    /// Builds the request url for `date`, with a fresh cache-busting parameter.
    pub fn births_url(&self, date: MonthDay) -> Result<Url, FeedError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FeedError::InvalidParameter)?
            .pop_if_empty()
            .extend([
                "feed",
                "v1",
                "wikipedia",
                self.language.as_str(),
                "onthisday",
                "births",
                date.month_str().as_str(),
                date.day_str().as_str(),
            ]);
        url.query_pairs_mut()
            .append_pair(CACHE_BUST_PARAM, &Uuid::new_v4().simple().to_string());
        Ok(url)
    }

    async fn fetch_births(&self, date: MonthDay) -> Result<Vec<RawBirth>, FeedError> {
        let url = self.births_url(date)?;
        debug!(%url, "requesting births feed");

        let response = self
            .http
            .get(url)
            .header(CLIENT_HEADER, &self.user_agent)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return match status {
                StatusCode::NOT_FOUND => {
                    info!(%date, "births feed has no records for date");
                    Ok(Vec::new())
                }
                StatusCode::BAD_REQUEST => Err(FeedError::InvalidParameter),
                StatusCode::NOT_IMPLEMENTED => Err(FeedError::UnsupportedLanguage),
                other => {
                    warn!(status = other.as_u16(), %date, "unexpected births feed status");
                    Err(FeedError::UnexpectedStatus(other.as_u16()))
                }
            };
        }

        let body = response.bytes().await.map_err(classify_transport_error)?;
        let births = parse_births_payload(&body)?;
        info!(%date, count = births.len(), "fetched births feed");
        Ok(births)
    }
}

#[async_trait]
impl BirthsFeed for FeedClient {
    async fn fetch(&self, date: MonthDay) -> Result<Vec<RawBirth>, FeedError> {
        self.fetch_births(date).await
    }
}

fn classify_transport_error(err: reqwest::Error) -> FeedError {
    if err.is_timeout() {
        FeedError::Timeout
    } else {
        FeedError::NetworkUnavailable(err.to_string())
    }
}

/// Extracts the births collection from a 2xx body. Only a body that is not a
/// JSON object with a `births` array is an error; individual elements are
/// decoded leniently and judged by the normalizer.
pub fn parse_births_payload(body: &[u8]) -> Result<Vec<RawBirth>, FeedError> {
    let payload: serde_json::Value = serde_json::from_slice(body)
        .map_err(|err| FeedError::MalformedPayload(format!("body is not JSON: {err}")))?;

    let serde_json::Value::Object(mut fields) = payload else {
        return Err(FeedError::MalformedPayload(
            "body is not a JSON object".into(),
        ));
    };

    match fields.remove(BIRTHS_FIELD) {
        Some(serde_json::Value::Array(items)) => {
            Ok(items.into_iter().map(RawBirth::from_value).collect())
        }
        Some(_) => Err(FeedError::MalformedPayload(format!(
            "'{BIRTHS_FIELD}' is not an array"
        ))),
        None => Err(FeedError::MalformedPayload(format!(
            "missing '{BIRTHS_FIELD}' collection"
        ))),
    }
}

#[cfg(test)]
#[path = "tests/feed_tests.rs"]
mod tests;
