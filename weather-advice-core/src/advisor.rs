//! Clothing recommendations generated from a day of weather.
//!
//! A failed recommendation never fails the request: [`recommend_or_fallback`]
//! replaces any provider error with [`FALLBACK_RECOMMENDATION`].

use async_trait::async_trait;
use std::fmt::Debug;
use tracing::warn;

use crate::{
    error::AdvisorError,
    model::{DayRecord, UnitGroup},
};

pub mod gemini;

pub use gemini::GeminiProvider;

pub const FALLBACK_RECOMMENDATION: &str = "AI recommendation service is currently unavailable.";

#[async_trait]
pub trait RecommendationProvider: Send + Sync + Debug {
    /// Complete `prompt` and return the generated text verbatim.
    async fn generate(&self, prompt: &str) -> Result<String, AdvisorError>;
}

pub fn build_prompt(day: &DayRecord, units: UnitGroup) -> String {
    let value = |field: &str| day.display(field).unwrap_or_else(|| "n/a".to_string());
    let temp = value("temp");
    let wind = value("windspeed");
    let humidity = value("humidity");
    let conditions = value("conditions");

    format!(
        "Weather Data:\n\
         - Temp: {temp}{temp_unit}\n\
         - Wind: {wind} {speed_unit}\n\
         - Humidity: {humidity}%\n\
         - Conditions: {conditions}\n\
         \n\
         Provide clothing advice fast in only one sentence",
        temp_unit = units.temperature_unit(),
        speed_unit = units.speed_unit(),
    )
}

/// Ask `provider` for advice on `day`, substituting the fixed fallback on any error.
pub async fn recommend_or_fallback(
    provider: &dyn RecommendationProvider,
    day: &DayRecord,
    units: UnitGroup,
) -> String {
    let prompt = build_prompt(day, units);

    match provider.generate(&prompt).await {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "recommendation failed, using fallback");
            FALLBACK_RECOMMENDATION.to_string()
        }
    }
}
