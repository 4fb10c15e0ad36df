//! Dashboard flows against mocked providers.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use skycast_core::{
    Config, DeviceConfig, DevicePermission, MarineConfig, OpenWeatherConfig, PhotosConfig,
    UvConfig,
};
use skycast_weather::ConfiguredLocator;
use skycast_ui::{AppContext, Dashboard, Field, UiEvent};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEFAULT_BACKGROUND: &str = "https://images.example/default.jpeg";

fn config_for(server: &MockServer) -> Config {
    let uri = server.uri();
    Config {
        openweather: OpenWeatherConfig {
            api_key: "ow-key".to_string(),
            forecast_url: format!("{uri}/data/2.5/forecast"),
            weather_url: format!("{uri}/data/2.5/weather"),
            geocode_url: format!("{uri}/geo/1.0"),
            icon_url: format!("{uri}/img/wn"),
        },
        marine: MarineConfig {
            points_url: format!("{uri}/points"),
            user_agent: "skycast-test".to_string(),
        },
        photos: PhotosConfig {
            api_key: "photo-key".to_string(),
            search_url: format!("{uri}/v1/search"),
            default_background: DEFAULT_BACKGROUND.to_string(),
            ..PhotosConfig::default()
        },
        uv: UvConfig {
            api_key: None,
            url: format!("{uri}/api/v1/uv"),
        },
        ..Config::default()
    }
}

fn dashboard_for(config: &Config) -> Dashboard {
    Dashboard::new(AppContext::from_config(config).unwrap())
}

fn forecast_body() -> serde_json::Value {
    let entry = |dt_txt: &str, temp: f64, description: &str| {
        json!({
            "dt_txt": dt_txt,
            "main": { "temp": temp, "feels_like": temp, "humidity": 60 },
            "wind": { "speed": 3.0 },
            "weather": [{ "description": description, "icon": "04d" }]
        })
    };
    json!({
        "list": [
            entry("2024-06-01 12:00:00", 290.0, "overcast clouds"),
            entry("2024-06-01 15:00:00", 291.0, "overcast clouds"),
            entry("2024-06-02 12:00:00", 289.0, "light rain"),
            entry("2024-06-03 12:00:00", 288.0, "clear sky")
        ]
    })
}

async fn mount_forecast(server: &MockServer, lat: &str) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("lat", lat))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(server)
        .await;
}

async fn mount_city(server: &MockServer, q: &str, name: &str, lat: f64, lon: f64) {
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", q))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": name, "lat": lat, "lon": lon }
        ])))
        .mount(server)
        .await;
}

async fn mount_photos(server: &MockServer, urls: &[&str]) {
    let photos: Vec<_> = urls
        .iter()
        .map(|u| json!({ "src": { "original": u } }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "photos": photos })))
        .mount(server)
        .await;
}

async fn set_input(dashboard: &Dashboard, field: Field, value: &str) {
    dashboard
        .handle(
            UiEvent::Input {
                field,
                value: value.to_string(),
            },
            &CancellationToken::new(),
        )
        .await;
}

async fn search(dashboard: &Dashboard) {
    dashboard
        .handle(UiEvent::SearchClicked, &CancellationToken::new())
        .await;
}

#[tokio::test]
async fn test_unknown_city_notifies_and_skips_fetches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/points/10,10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&config_for(&server));
    set_input(&dashboard, Field::City, "Atlantis").await;
    search(&dashboard).await;

    let page = dashboard.page();
    assert_eq!(
        page.notifications(),
        ["An error occurred while fetching the coordinates!"]
    );
    assert!(page.current_weather.is_empty());
    // Input is only cleared after a successful resolution
    assert_eq!(page.city_input, "Atlantis");
    assert!(dashboard.state().is_idle());
}

#[tokio::test]
async fn test_zip_wins_over_city() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("zip", "10001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "coord": { "lat": 40.75, "lon": -73.99 },
            "name": "New York"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_forecast(&server, "40.75").await;

    let dashboard = dashboard_for(&config_for(&server));
    set_input(&dashboard, Field::City, "London").await;
    set_input(&dashboard, Field::Zip, " 10001 ").await;
    dashboard
        .handle(
            UiEvent::KeyUp {
                field: Field::Zip,
                key: "Enter".to_string(),
            },
            &CancellationToken::new(),
        )
        .await;

    let page = dashboard.page();
    assert!(page.notifications().is_empty(), "{:?}", page.notifications());
    assert!(page.current_weather.contains("New York (Saturday, Jun 1)"));
    assert_eq!(page.weather_cards.matches("<li class=\"card\">").count(), 2);
    assert!(page.city_input.is_empty());
    assert_eq!(page.zip_input, " 10001 ");
}

#[tokio::test]
async fn test_forecast_failure_notifies() {
    let server = MockServer::start().await;

    mount_city(&server, "Paris", "Paris", 48.85, 2.35).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&config_for(&server));
    set_input(&dashboard, Field::City, "Paris").await;
    search(&dashboard).await;

    assert_eq!(
        dashboard.take_notifications(),
        vec!["An error occurred while fetching the weather forecast!"]
    );
    assert!(dashboard.page().current_weather.is_empty());
}

#[tokio::test]
async fn test_marine_failure_keeps_forecast() {
    let server = MockServer::start().await;

    mount_city(&server, "Santa Cruz", "Santa Cruz", 36.97, -122.03).await;
    mount_forecast(&server, "36.97").await;
    Mock::given(method("GET"))
        .and(path("/points/36.97,-122.03"))
        .respond_with(ResponseTemplate::new(500).set_body_string("grid offline"))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&config_for(&server));
    set_input(&dashboard, Field::City, "Santa Cruz").await;
    search(&dashboard).await;

    let page = dashboard.page();
    assert!(page.notifications().is_empty());
    assert!(page.current_weather.contains("Santa Cruz"));
    assert_eq!(page.marine.wave_height, "Wave Height: N/A ft");
}

#[tokio::test]
async fn test_marine_partial_layers() {
    let server = MockServer::start().await;
    let grid_url = format!("{}/gridpoints/MTR/90,68", server.uri());

    mount_city(&server, "Santa Cruz", "Santa Cruz", 36.97, -122.03).await;
    mount_forecast(&server, "36.97").await;
    Mock::given(method("GET"))
        .and(path("/points/36.97,-122.03"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "properties": { "forecastGridData": grid_url }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gridpoints/MTR/90,68"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "properties": {
                "wavePeriod": { "uom": "wmoUnit:s", "values": [{ "value": 11 }] },
                "windWaveHeight": { "uom": "wmoUnit:m", "values": [{ "value": 2.0 }] }
            }
        })))
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&config_for(&server));
    set_input(&dashboard, Field::City, "Santa Cruz").await;
    search(&dashboard).await;

    let marine = dashboard.page().marine;
    assert_eq!(marine.wave_height, "Wave Height: N/A ft");
    assert_eq!(marine.wave_period, "Wave Period: 11 s");
    assert_eq!(marine.wind_wave_height, "Wind Wave Height: 6.56 ft");
    assert_eq!(marine.wave_direction, "Wave Direction: N/A°");
}

#[tokio::test]
async fn test_stale_submission_is_discarded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Slowtown"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "name": "Slowtown", "lat": 10.0, "lon": 10.0 }]))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    mount_city(&server, "Fasttown", "Fasttown", 20.0, 20.0).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("lat", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(0)
        .mount(&server)
        .await;
    mount_forecast(&server, "20").await;

    let dashboard = dashboard_for(&config_for(&server));
    set_input(&dashboard, Field::City, "Slowtown").await;

    let slow = {
        let dashboard = dashboard.clone();
        tokio::spawn(async move { search(&dashboard).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    set_input(&dashboard, Field::City, "Fasttown").await;
    search(&dashboard).await;
    slow.await.unwrap();

    let page = dashboard.page();
    assert!(page.current_weather.contains("Fasttown"));
    assert!(!page.current_weather.contains("Slowtown"));
    assert!(page.notifications().is_empty());
    assert!(dashboard.state().is_idle());
}

#[tokio::test]
async fn test_background_follows_forecast() {
    let server = MockServer::start().await;

    mount_city(&server, "Paris", "Paris", 48.85, 2.35).await;
    mount_forecast(&server, "48.85").await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("query", "overcast clouds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "photos": [{ "src": { "original": "https://images.example/clouds.jpeg" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&config_for(&server));
    set_input(&dashboard, Field::City, "Paris").await;
    search(&dashboard).await;

    assert_eq!(
        dashboard.page().background,
        "https://images.example/clouds.jpeg"
    );
}

#[tokio::test]
async fn test_startup_background() {
    let server = MockServer::start().await;
    mount_photos(&server, &["https://images.example/weather.jpeg"]).await;

    let dashboard = dashboard_for(&config_for(&server));
    assert_eq!(dashboard.page().background, DEFAULT_BACKGROUND);

    dashboard.start().await;
    assert_eq!(
        dashboard.page().background,
        "https://images.example/weather.jpeg"
    );
}

#[tokio::test]
async fn test_no_photos_keeps_background() {
    let server = MockServer::start().await;
    mount_photos(&server, &[]).await;

    let dashboard = dashboard_for(&config_for(&server));
    dashboard.start().await;

    let page = dashboard.page();
    assert_eq!(page.background, DEFAULT_BACKGROUND);
    assert!(page.notifications().is_empty());
}

#[tokio::test]
async fn test_locate_permission_denied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.device = DeviceConfig {
        permission: DevicePermission::Denied,
        latitude: Some(1.0),
        longitude: Some(1.0),
    };
    let dashboard = dashboard_for(&config);
    dashboard
        .handle(UiEvent::LocateClicked, &CancellationToken::new())
        .await;

    assert_eq!(
        dashboard.take_notifications(),
        vec!["Geolocation request denied. Please reset location permission to grant access again."]
    );
}

#[tokio::test]
async fn test_locate_without_position() {
    let server = MockServer::start().await;

    let dashboard = dashboard_for(&config_for(&server));
    dashboard
        .handle(UiEvent::LocateClicked, &CancellationToken::new())
        .await;

    assert_eq!(
        dashboard.take_notifications(),
        vec!["Geolocation request error. Please reset location permission."]
    );
}

#[tokio::test]
async fn test_locate_renders_reverse_geocoded_place() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/reverse"))
        .and(query_param("lat", "51.5"))
        .and(query_param("lon", "-0.12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "London", "lat": 51.5, "lon": -0.12 }
        ])))
        .mount(&server)
        .await;
    mount_forecast(&server, "51.5").await;

    let ctx = AppContext::from_config(&config_for(&server))
        .unwrap()
        .with_locator(Arc::new(ConfiguredLocator::new(DeviceConfig {
            permission: DevicePermission::Granted,
            latitude: Some(51.5),
            longitude: Some(-0.12),
        })));
    let dashboard = Dashboard::new(ctx);
    dashboard.locate(&CancellationToken::new()).await;

    let page = dashboard.page();
    assert!(page.notifications().is_empty());
    assert!(page.current_weather.contains("London (Saturday, Jun 1)"));
}

#[tokio::test]
async fn test_reverse_geocode_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.device = DeviceConfig {
        permission: DevicePermission::Granted,
        latitude: Some(0.5),
        longitude: Some(0.5),
    };
    let dashboard = dashboard_for(&config);
    dashboard.locate(&CancellationToken::new()).await;

    assert_eq!(
        dashboard.take_notifications(),
        vec!["An error occurred while fetching the city name!"]
    );
}

#[tokio::test]
async fn test_uv_index_rendered_when_enabled() {
    let server = MockServer::start().await;

    mount_city(&server, "Paris", "Paris", 48.85, 2.35).await;
    mount_forecast(&server, "48.85").await;
    Mock::given(method("GET"))
        .and(path("/api/v1/uv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": { "uv": 4.44 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.uv.api_key = Some("uv-key".to_string());
    let dashboard = dashboard_for(&config);
    set_input(&dashboard, Field::City, "Paris").await;
    search(&dashboard).await;

    assert_eq!(dashboard.page().uv_index, "UV Index: 4.4");
}

#[tokio::test]
async fn test_empty_form() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&config_for(&server));
    set_input(&dashboard, Field::City, "   ").await;
    search(&dashboard).await;

    assert_eq!(
        dashboard.take_notifications(),
        vec!["Please enter a city name or ZIP code!"]
    );
}

#[tokio::test]
async fn test_blank_initial_query_skips_startup_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "photos": [{ "src": { "original": "https://images.example/x.jpeg" } }]
        })))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.photos.initial_query = "  ".to_string();
    assert!(config
        .validate()
        .warnings
        .iter()
        .any(|w| w.field == "photos.initial_query"));

    let dashboard = dashboard_for(&config);
    dashboard.start().await;

    assert_eq!(dashboard.page().background, DEFAULT_BACKGROUND);
}

#[tokio::test]
async fn test_unknown_zip_notifies_and_skips_forecast() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("zip", "00000"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "cod": "404", "message": "city not found" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(0)
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&config_for(&server));
    set_input(&dashboard, Field::Zip, "00000").await;
    search(&dashboard).await;

    let page = dashboard.page();
    assert_eq!(
        page.notifications(),
        ["An error occurred while fetching the weather by ZIP code!"]
    );
    assert!(page.current_weather.is_empty());
    assert_eq!(page.zip_input, "00000");
}

#[tokio::test]
async fn test_slow_branches_of_superseded_lookup_are_discarded() {
    let server = MockServer::start().await;
    let grid_url = format!("{}/gridpoints/AAA/1,1", server.uri());

    mount_city(&server, "Alpha", "Alpha", 10.0, 10.0).await;
    mount_city(&server, "Beta", "Beta", 20.0, 20.0).await;

    // Alpha resolves at once but its forecast and marine answers arrive late
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("lat", "10"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(forecast_body())
                .set_delay(Duration::from_millis(400)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/points/10,10"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "properties": { "forecastGridData": grid_url } }))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gridpoints/AAA/1,1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "properties": {
                "wavePeriod": { "uom": "wmoUnit:s", "values": [{ "value": 14 }] }
            }
        })))
        .mount(&server)
        .await;
    mount_forecast(&server, "20").await;

    let dashboard = dashboard_for(&config_for(&server));
    set_input(&dashboard, Field::City, "Alpha").await;

    let first = {
        let dashboard = dashboard.clone();
        tokio::spawn(async move { search(&dashboard).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    set_input(&dashboard, Field::City, "Beta").await;
    search(&dashboard).await;
    first.await.unwrap();

    let page = dashboard.page();
    assert!(page.current_weather.contains("Beta (Saturday, Jun 1)"));
    assert!(!page.current_weather.contains("Alpha"));
    assert_eq!(page.marine.wave_period, "Wave Period: N/A s");
    assert!(page.notifications().is_empty());
    assert!(dashboard.state().is_idle());
}
