//! Routes and HTTP error mapping.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};
use weather_advice_core::{ApiError, ResponseEnvelope, WeatherRequestBody, WeatherService};

pub const WEATHER_PATH: &str = "/content/api/v1/weather";

const HOME_PAGE: &str = "<h2>Weather SaaS API</h2>";

pub type AppState = Arc<WeatherService>;

pub fn router(service: WeatherService) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route(WEATHER_PATH, post(weather))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(service))
}

async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn weather(
    State(service): State<AppState>,
    payload: Result<Json<WeatherRequestBody>, JsonRejection>,
) -> Result<Json<ResponseEnvelope>, HttpError> {
    let Json(body) = payload.map_err(|rejection| {
        debug!(error = %rejection, "rejected request body");
        ApiError::bad_request("request body must be a JSON object")
    })?;

    let envelope = service.handle(body).await?;
    Ok(Json(envelope))
}

/// [`ApiError`] rendered as `{"message": ...}` with its status code.
#[derive(Debug)]
pub struct HttpError(pub ApiError);

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code).unwrap_or(StatusCode::BAD_REQUEST);

        if status.is_server_error() {
            error!(status = status.as_u16(), message = %self.0.message, "request failed");
        } else {
            debug!(status = status.as_u16(), message = %self.0.message, "request rejected");
        }

        (status, Json(self.0.body())).into_response()
    }
}
