use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{NaiveDateTime, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use weather_advice_core::{
    AdvisorError, DayRecord, FALLBACK_RECOMMENDATION, GeminiProvider, RecommendationProvider,
    UnitGroup, VisualCrossingProvider, WeatherError, WeatherProvider, WeatherQuery,
    WeatherService, service::TIMESTAMP_FORMAT,
};
use weather_advice_server::{http::WEATHER_PATH, router};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

#[derive(Debug)]
struct StaticWeather(Result<Value, (u16, &'static str)>);

#[async_trait]
impl WeatherProvider for StaticWeather {
    async fn fetch(&self, _query: &WeatherQuery) -> Result<DayRecord, WeatherError> {
        match &self.0 {
            Ok(day) => Ok(serde_json::from_value(day.clone()).expect("fixture is a day record")),
            Err((status, body)) => {
                Err(WeatherError::Upstream { status: *status, body: body.to_string() })
            }
        }
    }
}

#[derive(Debug)]
struct StaticAdvisor(Option<&'static str>);

#[async_trait]
impl RecommendationProvider for StaticAdvisor {
    async fn generate(&self, _prompt: &str) -> Result<String, AdvisorError> {
        self.0
            .map(str::to_string)
            .ok_or_else(|| AdvisorError::Api { status: 503, message: "overloaded".into() })
    }
}

fn clear_day() -> Value {
    json!({"temp": 20, "windspeed": 10, "humidity": 50, "conditions": "Clear"})
}

fn app(weather: StaticWeather, advisor: StaticAdvisor) -> Router {
    router(WeatherService::new(
        TOKEN.into(),
        UnitGroup::Metric,
        Arc::new(weather),
        Arc::new(advisor),
    ))
}

fn default_app() -> Router {
    app(StaticWeather(Ok(clear_day())), StaticAdvisor(Some("Wear a light jacket.")))
}

fn valid_request() -> Value {
    json!({
        "token": TOKEN,
        "requester_name": "Ann",
        "location": "London",
        "date": "2024-05-01"
    })
}

async fn post_json(app: Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(WEATHER_PATH)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn home_page_is_html() {
    let response = default_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"<h2>Weather SaaS API</h2>");
}

#[tokio::test]
async fn health_reports_ok() {
    let response = default_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_token_is_bad_request() {
    let (status, body) = post_json(default_app(), json!({"requester_name": "Ann"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "token is required"}));
}

#[tokio::test]
async fn wrong_token_is_forbidden() {
    let mut request = valid_request();
    request["token"] = json!("nope");

    let (status, body) = post_json(default_app(), request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"message": "wrong API token"}));
}

#[tokio::test]
async fn numeric_token_is_forbidden() {
    let mut request = valid_request();
    request["token"] = json!(123);

    let (status, body) = post_json(default_app(), request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"message": "wrong API token"}));
}

#[tokio::test]
async fn missing_fields_are_bad_request() {
    for field in ["requester_name", "location", "date"] {
        let mut request = valid_request();
        request.as_object_mut().unwrap().remove(field);

        let (status, body) = post_json(default_app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "missing {field}");
        assert_eq!(body, json!({"message": "requester_name, location and date are required"}));
    }
}

#[tokio::test]
async fn success_combines_weather_and_recommendation() {
    let before = Utc::now();
    let (status, body) = post_json(default_app(), valid_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requester_name"], "Ann");
    assert_eq!(body["location"], "London");
    assert_eq!(body["date"], "2024-05-01");
    assert_eq!(body["weather"], clear_day());
    assert_eq!(body["ai_recommendation"], "Wear a light jacket.");

    let timestamp = body["timestamp"].as_str().unwrap();
    assert_eq!(timestamp.len(), "2024-05-01T00:00:00Z".len());
    assert!(timestamp.ends_with('Z'));

    let stamped = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).unwrap().and_utc();
    assert!((stamped - before).num_seconds().abs() <= 5);
}

#[tokio::test]
async fn failing_advisor_still_returns_ok() {
    let app = app(StaticWeather(Ok(clear_day())), StaticAdvisor(None));
    let (status, body) = post_json(app, valid_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ai_recommendation"], FALLBACK_RECOMMENDATION);
}

#[tokio::test]
async fn upstream_status_and_body_pass_through() {
    let app = app(StaticWeather(Err((404, "location not found"))), StaticAdvisor(Some("x")));
    let (status, body) = post_json(app, valid_request()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "location not found"}));
}

#[tokio::test]
async fn non_json_body_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri(WEATHER_PATH)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("token=abc"))
        .unwrap();

    let response = default_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"message": "request body must be a JSON object"}));
}

#[tokio::test]
async fn end_to_end_against_mocked_providers() {
    let weather_server = MockServer::start().await;
    let gemini_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/London/2024-05-01"))
        .and(query_param("key", "VC_KEY"))
        .and(query_param("unitGroup", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"days": [clear_day()]})))
        .expect(1)
        .mount(&weather_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "Wear a light jacket."}]}}]
        })))
        .expect(1)
        .mount(&gemini_server)
        .await;

    let service = WeatherService::new(
        TOKEN.into(),
        UnitGroup::Metric,
        Arc::new(VisualCrossingProvider::with_base_url("VC_KEY".into(), weather_server.uri())),
        Arc::new(GeminiProvider::with_base_url(
            Some("G_KEY".into()),
            "gemini-2.5-flash".into(),
            gemini_server.uri(),
        )),
    );

    let (status, body) = post_json(router(service), valid_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weather"], clear_day());
    assert_eq!(body["ai_recommendation"], "Wear a light jacket.");
}

#[tokio::test]
async fn empty_days_from_provider_is_bad_gateway() {
    let weather_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"days": []})))
        .mount(&weather_server)
        .await;

    let service = WeatherService::new(
        TOKEN.into(),
        UnitGroup::Metric,
        Arc::new(VisualCrossingProvider::with_base_url("VC_KEY".into(), weather_server.uri())),
        Arc::new(StaticAdvisor(Some("unused"))),
    );

    let (status, body) = post_json(router(service), valid_request()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["message"].as_str().unwrap().contains("no days"));
}

fn live_weather_app(base_url: String) -> Router {
    router(WeatherService::new(
        TOKEN.into(),
        UnitGroup::Metric,
        Arc::new(VisualCrossingProvider::with_base_url("SUPER_SECRET_KEY".into(), base_url)),
        Arc::new(StaticAdvisor(Some("unused"))),
    ))
}

#[tokio::test]
async fn unreachable_weather_provider_is_bad_gateway_without_key() {
    let app = live_weather_app("http://127.0.0.1:1".into());
    let (status, body) = post_json(app, valid_request()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"message": "could not reach weather provider"}));
    assert!(!body.to_string().contains("SUPER_SECRET_KEY"));
}

#[tokio::test]
async fn malformed_weather_body_is_bad_gateway() {
    let weather_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&weather_server)
        .await;

    let (status, body) = post_json(live_weather_app(weather_server.uri()), valid_request()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("weather provider returned an unreadable response"));
    assert!(!message.contains("SUPER_SECRET_KEY"));
}
