//! Tests for the OpenWeather provider against a mock HTTP server

use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wxbot_domain::Coordinates;
use wxbot_domain::ports::providers::WeatherProvider;
use wxbot_providers::weather::{OpenWeatherConfig, OpenWeatherProvider};

fn provider(server: &MockServer) -> OpenWeatherProvider {
    let config = OpenWeatherConfig::new("test-key")
        .with_geo_url(format!("{}/geo/1.0/direct", server.uri()))
        .with_weather_url(format!("{}/data/2.5/weather", server.uri()))
        .with_forecast_url(format!("{}/data/2.5/forecast", server.uri()))
        .with_timeout(Duration::from_secs(5));
    OpenWeatherProvider::from_config(config).unwrap()
}

#[tokio::test]
async fn test_resolve_coordinates_takes_first_place() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Москва"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"name": "Москва", "lat": 55.75, "lon": 37.62},
            {"name": "Москва", "lat": 1.0, "lon": 2.0}
        ])))
        .mount(&server)
        .await;

    let coords = provider(&server)
        .resolve_coordinates("Москва")
        .await
        .unwrap();
    assert_eq!(coords, Coordinates::new(55.75, 37.62));
}

#[tokio::test]
async fn test_resolve_coordinates_empty_result_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let err = provider(&server)
        .resolve_coordinates("Atlantis")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_fetch_snapshot_maps_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("units", "metric"))
        .and(query_param("lang", "ru"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "weather": [{"description": "ясно"}, {"description": "дымка"}],
            "main": {"temp": 20.5, "humidity": 40},
            "wind": {"speed": 3.0},
            "dt": 1_714_564_800
        })))
        .mount(&server)
        .await;

    let snapshot = provider(&server)
        .fetch_snapshot(Coordinates::new(55.75, 37.62))
        .await
        .unwrap();

    assert_eq!(snapshot.description, "ясно");
    assert_eq!(snapshot.temperature, 20.5);
    assert_eq!(snapshot.humidity, 40);
    assert_eq!(snapshot.wind_speed, 3.0);
    assert_eq!(snapshot.observed_at.unwrap().timestamp(), 1_714_564_800);
}

#[tokio::test]
async fn test_fetch_snapshot_without_conditions_has_empty_description() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "main": {"temp": -3.0, "humidity": 90},
            "wind": {"speed": 7.5}
        })))
        .mount(&server)
        .await;

    let snapshot = provider(&server)
        .fetch_snapshot(Coordinates::new(51.2, 58.6))
        .await
        .unwrap();
    assert_eq!(snapshot.description, "");
    assert!(snapshot.observed_at.is_none());
}

#[tokio::test]
async fn test_fetch_forecast_maps_every_entry_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("lat", "55.75"))
        .and(query_param("appid", "test-key"))
        .and(query_param("units", "metric"))
        .and(query_param("lang", "ru"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cnt": 2,
            "list": [
                {
                    "dt": 1_714_564_800,
                    "weather": [{"description": "ясно"}],
                    "main": {"temp": 18.0, "humidity": 50},
                    "wind": {"speed": 2.5}
                },
                {
                    "dt": 1_714_575_600,
                    "main": {"temp": 15.5, "humidity": 70},
                    "wind": {"speed": 4.0}
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let forecast = provider(&server)
        .fetch_forecast(Coordinates::new(55.75, 37.62))
        .await
        .unwrap();

    assert_eq!(forecast.len(), 2);
    assert_eq!(forecast[0].description, "ясно");
    assert_eq!(forecast[0].temperature, 18.0);
    assert_eq!(forecast[1].description, "");
    assert_eq!(forecast[1].humidity, 70);
    assert_eq!(forecast[1].wind_speed, 4.0);
    assert!(forecast[0].observed_at < forecast[1].observed_at);
}

#[tokio::test]
async fn test_fetch_forecast_without_list_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"cnt": 0})))
        .mount(&server)
        .await;

    let forecast = provider(&server)
        .fetch_forecast(Coordinates::new(1.0, 2.0))
        .await
        .unwrap();
    assert!(forecast.is_empty());
}

#[tokio::test]
async fn test_server_error_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .fetch_snapshot(Coordinates::new(0.0, 0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, wxbot_domain::Error::Provider { .. }));
    assert!(err.to_string().contains("502"));
}

#[tokio::test]
async fn test_unauthorized_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .resolve_coordinates("Москва")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("authentication failed"));
}
