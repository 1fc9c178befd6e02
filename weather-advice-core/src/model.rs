use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Unit system understood by the Visual Crossing timeline API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitGroup {
    #[default]
    Metric,
    Us,
    Uk,
    Base,
}

impl UnitGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitGroup::Metric => "metric",
            UnitGroup::Us => "us",
            UnitGroup::Uk => "uk",
            UnitGroup::Base => "base",
        }
    }

    pub fn temperature_unit(&self) -> &'static str {
        match self {
            UnitGroup::Metric | UnitGroup::Uk => "°C",
            UnitGroup::Us => "°F",
            UnitGroup::Base => "K",
        }
    }

    pub fn speed_unit(&self) -> &'static str {
        match self {
            UnitGroup::Metric => "kph",
            UnitGroup::Us | UnitGroup::Uk => "mph",
            UnitGroup::Base => "m/s",
        }
    }
}

impl fmt::Display for UnitGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnitGroup {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(UnitGroup::Metric),
            "us" => Ok(UnitGroup::Us),
            "uk" => Ok(UnitGroup::Uk),
            "base" => Ok(UnitGroup::Base),
            _ => Err(anyhow::anyhow!(
                "Unknown unit group '{value}'. Supported unit groups: metric, us, uk, base."
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub location: String,
    pub date: String,
    pub unit_group: UnitGroup,
}

/// One day of the provider's timeline response, kept as the provider sent it.
///
/// The object is echoed back to callers unchanged (explicit `null`s and
/// fields beyond the requested elements included); accessors read the values
/// the recommendation prompt needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayRecord(Map<String, Value>);

impl DayRecord {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Text rendering of `field`; `None` when it is absent or `null`.
    pub fn display(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn datetime(&self) -> Option<&str> {
        self.get("datetime").and_then(Value::as_str)
    }

    pub fn conditions(&self) -> Option<&str> {
        self.get("conditions").and_then(Value::as_str)
    }
}

/// Inbound body of `POST /content/api/v1/weather`.
///
/// Fields are untyped so that a non-string token is answered as a wrong
/// token rather than as an unreadable body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherRequestBody {
    #[serde(default)]
    pub token: Option<Value>,
    #[serde(default)]
    pub requester_name: Option<Value>,
    #[serde(default)]
    pub location: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
}

/// Response body; the request fields are echoed as the caller sent them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub requester_name: Value,
    pub timestamp: String,
    pub location: Value,
    pub date: Value,
    pub weather: DayRecord,
    pub ai_recommendation: String,
}
