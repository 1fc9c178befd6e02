use crate::{DayRecord, WeatherQuery, error::WeatherError};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod visualcrossing;

pub use visualcrossing::VisualCrossingProvider;

/// Upstream service whose credentials live under `[providers.<id>]`.
///
/// Both providers are always used; the id only names which key `configure`
/// writes and which table the server reads it from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    VisualCrossing,
    Gemini,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::VisualCrossing => "visualcrossing",
            ProviderId::Gemini => "gemini",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::VisualCrossing, ProviderId::Gemini]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "visualcrossing" => Ok(ProviderId::VisualCrossing),
            "gemini" => Ok(ProviderId::Gemini),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: visualcrossing, gemini."
            )),
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch the first day record for `query`.
    async fn fetch(&self, query: &WeatherQuery) -> Result<DayRecord, WeatherError>;
}
