use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::WeatherError,
    model::{DayRecord, WeatherQuery},
};

use super::WeatherProvider;

const API_URL: &str =
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline";

const ELEMENTS: &[&str] = &[
    "datetime",
    "temp",
    "feelslike",
    "humidity",
    "windspeed",
    "pressure",
    "uvindex",
    "conditions",
];

/// Client for the Visual Crossing timeline API.
#[derive(Debug, Clone)]
pub struct VisualCrossingProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl VisualCrossingProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, API_URL.to_string())
    }

    /// Point the client at another timeline endpoint (used by tests).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url, http: Client::new() }
    }

    fn timeline_url(&self, query: &WeatherQuery) -> Result<Url, WeatherError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| WeatherError::InvalidBaseUrl(format!("{}: {e}", self.base_url)))?;

        url.path_segments_mut()
            .map_err(|_| WeatherError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push(&query.location)
            .push(&query.date);

        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct TimelineResponse {
    days: Vec<DayRecord>,
}

#[async_trait]
impl WeatherProvider for VisualCrossingProvider {
    async fn fetch(&self, query: &WeatherQuery) -> Result<DayRecord, WeatherError> {
        let url = self.timeline_url(query)?;
        let elements = ELEMENTS.join(",");

        debug!(
            location = %query.location,
            date = %query.date,
            unit_group = %query.unit_group,
            "requesting timeline"
        );

        let res = self
            .http
            .get(url)
            .query(&[
                ("unitGroup", query.unit_group.as_str()),
                ("key", self.api_key.as_str()),
                ("include", "days"),
                ("elements", elements.as_str()),
                ("lang", "en"),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                location = %query.location,
                "weather provider rejected request"
            );
            return Err(WeatherError::Upstream { status: status.as_u16(), body });
        }

        let parsed: TimelineResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::Malformed(e.to_string()))?;

        parsed.days.into_iter().next().ok_or(WeatherError::NoDays)
    }
}
