use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::{
    advisor::{RecommendationProvider, recommend_or_fallback},
    error::ApiError,
    model::{ResponseEnvelope, UnitGroup, WeatherQuery, WeatherRequestBody},
    provider::WeatherProvider,
};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Validates a weather request and runs the weather then recommendation calls.
#[derive(Debug, Clone)]
pub struct WeatherService {
    api_token: String,
    unit_group: UnitGroup,
    weather: Arc<dyn WeatherProvider>,
    advisor: Arc<dyn RecommendationProvider>,
}

const REQUIRED_FIELDS: &str = "requester_name, location and date are required";

/// Request fields as the caller sent them, plus the text used in the provider URL.
struct ValidRequest {
    requester_name: Value,
    location: Value,
    date: Value,
    query: WeatherQuery,
}

impl WeatherService {
    pub fn new(
        api_token: String,
        unit_group: UnitGroup,
        weather: Arc<dyn WeatherProvider>,
        advisor: Arc<dyn RecommendationProvider>,
    ) -> Self {
        Self { api_token, unit_group, weather, advisor }
    }

    pub async fn handle(&self, body: WeatherRequestBody) -> Result<ResponseEnvelope, ApiError> {
        let started_at = Utc::now();
        let request = self.validate(body)?;

        info!(
            requester = %request.requester_name,
            location = %request.query.location,
            date = %request.query.date,
            "weather request"
        );

        let day = self.weather.fetch(&request.query).await?;
        let ai_recommendation =
            recommend_or_fallback(self.advisor.as_ref(), &day, self.unit_group).await;

        Ok(ResponseEnvelope {
            requester_name: request.requester_name,
            timestamp: format_timestamp(started_at),
            location: request.location,
            date: request.date,
            weather: day,
            ai_recommendation,
        })
    }

    /// Checks run in order and the first failure wins.
    fn validate(&self, body: WeatherRequestBody) -> Result<ValidRequest, ApiError> {
        let token =
            present(body.token).ok_or_else(|| ApiError::bad_request("token is required"))?;

        if token.as_str() != Some(self.api_token.as_str()) {
            return Err(ApiError::with_status("wrong API token", 403));
        }

        let missing = || ApiError::bad_request(REQUIRED_FIELDS);
        let requester_name = present(body.requester_name).ok_or_else(missing)?;
        let location = present(body.location).ok_or_else(missing)?;
        let date = present(body.date).ok_or_else(missing)?;

        let query = WeatherQuery {
            location: path_text(&location).ok_or_else(missing)?,
            date: path_text(&date).ok_or_else(missing)?,
            unit_group: self.unit_group,
        };

        Ok(ValidRequest { requester_name, location, date, query })
    }
}

/// Drops values a caller cannot mean as "given": `null`, `false`, `0`, and empty
/// strings, arrays or objects.
fn present(value: Option<Value>) -> Option<Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    })
}

/// Strings and numbers can name a location or date; other JSON values cannot.
fn path_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
