//! Core library for the weather advice service.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather provider abstraction and its Visual Crossing client
//! - The recommendation provider abstraction and its Gemini client
//! - Request validation and orchestration ([`WeatherService`])
//! - Shared domain models and the error taxonomy
//!
//! It is used by `weather-advice-server`, but carries no HTTP server code itself.

pub mod advisor;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod service;

pub use advisor::{FALLBACK_RECOMMENDATION, GeminiProvider, RecommendationProvider};
pub use config::{Config, ProviderConfig, ServerConfig};
pub use error::{AdvisorError, ApiError, WeatherError};
pub use model::{DayRecord, ResponseEnvelope, UnitGroup, WeatherQuery, WeatherRequestBody};
pub use provider::{ProviderId, VisualCrossingProvider, WeatherProvider};
pub use service::WeatherService;
