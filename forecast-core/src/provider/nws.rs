use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::{
    ForecastError,
    config::UpstreamConfig,
    model::{ForecastOutput, ForecastRequest, ForecastResponse, PointResponse},
};

use super::ForecastProvider;

/// Successful (2xx) upstream answer.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// api.weather.gov: resolves a point to its forecast URL, then fetches that forecast.
#[derive(Debug, Clone)]
pub struct NwsProvider {
    config: UpstreamConfig,
    http: Client,
}

impl NwsProvider {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ForecastError> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .map_err(ForecastError::Request)?;

        Ok(Self {
            config: config.clone(),
            http,
        })
    }

    /// GET `url`, failing on anything outside 2xx.
    pub async fn fetch(&self, url: &str) -> Result<UpstreamResponse, ForecastError> {
        let request = self.http.get(url).build().map_err(ForecastError::Request)?;

        debug!(%url, "requesting upstream");
        let res = self
            .http
            .execute(request)
            .await
            .map_err(ForecastError::Transport)?;

        let status = res.status();
        if !status.is_success() {
            warn!(%url, %status, "upstream answered with non-success status");
            return Err(ForecastError::UpstreamStatus(status));
        }

        let body = res.bytes().await.map_err(ForecastError::Body)?.to_vec();

        Ok(UpstreamResponse { status, body })
    }

    async fn fetch_point(&self, request: &ForecastRequest) -> Result<PointResponse, ForecastError> {
        let url = self
            .config
            .points_url(&request.latitude, &request.longitude);
        let res = self.fetch(&url).await?;

        PointResponse::decode(&res.body).map_err(ForecastError::PointDecode)
    }

    async fn fetch_forecast(&self, forecast_url: &str) -> Result<ForecastResponse, ForecastError> {
        let res = self.fetch(forecast_url).await?;

        ForecastResponse::decode(&res.body).map_err(ForecastError::ForecastDecode)
    }
}

#[async_trait]
impl ForecastProvider for NwsProvider {
    async fn forecast(&self, request: &ForecastRequest) -> Result<ForecastOutput, ForecastError> {
        let point = self.fetch_point(request).await?;

        let forecast_url = point.forecast_url();
        if forecast_url.is_empty() {
            return Err(ForecastError::MissingForecastUrl);
        }

        // Used as returned; it may live on another host than the points endpoint.
        let forecast = self.fetch_forecast(forecast_url).await?;

        let first = forecast
            .periods()
            .first()
            .ok_or(ForecastError::NoPeriods)?;

        Ok(ForecastOutput::from(first))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TemperatureCategory;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LAT: &str = "47.6062";
    const LON: &str = "-122.3321";

    fn provider_for(server: &MockServer) -> NwsProvider {
        NwsProvider::new(&UpstreamConfig::with_base_url(server.uri())).unwrap()
    }

    async fn mount_point(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path(format!("/points/{LAT},{LON}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "properties": { "forecast": format!("{}/forecast-url", server.uri()) }
            })))
            .mount(server)
            .await;
    }

    async fn mount_forecast(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/forecast-url"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    fn periods(periods: serde_json::Value) -> serde_json::Value {
        serde_json::json!({ "properties": { "periods": periods } })
    }

    #[tokio::test]
    async fn test_forecast_chains_point_and_forecast_lookups() {
        let server = MockServer::start().await;
        mount_point(&server).await;
        mount_forecast(
            &server,
            periods(serde_json::json!([{"shortForecast": "Partly Cloudy", "temperature": 65}])),
        )
        .await;

        let output = provider_for(&server)
            .forecast(&ForecastRequest::new(LAT, LON))
            .await
            .unwrap();

        assert_eq!(output.forecast, "Partly Cloudy");
        assert_eq!(output.temperature, TemperatureCategory::Moderate);
    }

    #[tokio::test]
    async fn test_only_first_period_is_used() {
        let server = MockServer::start().await;
        mount_point(&server).await;
        mount_forecast(
            &server,
            periods(serde_json::json!([
                {"shortForecast": "Snow", "temperature": 20},
                {"shortForecast": "Sunny", "temperature": 95},
                {"shortForecast": "Rain", "temperature": 55}
            ])),
        )
        .await;

        let output = provider_for(&server)
            .forecast(&ForecastRequest::new(LAT, LON))
            .await
            .unwrap();

        assert_eq!(output.forecast, "Snow");
        assert_eq!(output.temperature, TemperatureCategory::Cold);
    }

    #[tokio::test]
    async fn test_user_agent_header_is_sent() {
        let server = MockServer::start().await;
        let config = UpstreamConfig {
            base_url: server.uri(),
            user_agent: "(test-suite, qa@example.com)".into(),
            ..UpstreamConfig::default()
        };

        Mock::given(method("GET"))
            .and(path("/anything"))
            .and(header("User-Agent", "(test-suite, qa@example.com)"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let provider = NwsProvider::new(&config).unwrap();
        let res = provider
            .fetch(&format!("{}/anything", server.uri()))
            .await
            .unwrap();

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body, b"ok");
    }

    #[tokio::test]
    async fn test_point_error_status_skips_forecast_lookup() {
        for code in [404u16, 500] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path(format!("/points/{LAT},{LON}")))
                .respond_with(ResponseTemplate::new(code).set_body_json(
                    serde_json::json!({"status": code, "detail": "Error"}),
                ))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/forecast-url"))
                .respond_with(ResponseTemplate::new(200))
                .expect(0)
                .mount(&server)
                .await;

            let err = provider_for(&server)
                .forecast(&ForecastRequest::new(LAT, LON))
                .await
                .unwrap_err();

            assert_eq!(err.status().as_u16(), code);
            assert!(matches!(err, ForecastError::UpstreamStatus(_)));
        }
    }

    #[tokio::test]
    async fn test_forecast_error_status_is_passed_through() {
        let server = MockServer::start().await;
        mount_point(&server).await;
        Mock::given(method("GET"))
            .and(path("/forecast-url"))
            .respond_with(ResponseTemplate::new(503).set_body_json(
                serde_json::json!({"status": 503, "detail": "Service unavailable"}),
            ))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .forecast(&ForecastRequest::new(LAT, LON))
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_missing_forecast_url_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/points/{LAT},{LON}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"properties": {}})),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .forecast(&ForecastRequest::new(LAT, LON))
            .await
            .unwrap_err();

        assert!(matches!(err, ForecastError::MissingForecastUrl));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_empty_periods_is_not_found() {
        let server = MockServer::start().await;
        mount_point(&server).await;
        mount_forecast(&server, periods(serde_json::json!([]))).await;

        let err = provider_for(&server)
            .forecast(&ForecastRequest::new(LAT, LON))
            .await
            .unwrap_err();

        assert!(matches!(err, ForecastError::NoPeriods));
    }

    #[tokio::test]
    async fn test_malformed_point_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/points/{LAT},{LON}")))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .forecast(&ForecastRequest::new(LAT, LON))
            .await
            .unwrap_err();

        assert!(matches!(err, ForecastError::PointDecode(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_string().contains("oops"));
    }

    #[tokio::test]
    async fn test_malformed_forecast_body_is_decode_error() {
        let server = MockServer::start().await;
        mount_point(&server).await;
        Mock::given(method("GET"))
            .and(path("/forecast-url"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"properties\":"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .forecast(&ForecastRequest::new(LAT, LON))
            .await
            .unwrap_err();

        assert!(matches!(err, ForecastError::ForecastDecode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_transport_error() {
        // Nothing listens on the discard port of localhost.
        let provider =
            NwsProvider::new(&UpstreamConfig::with_base_url("http://127.0.0.1:9")).unwrap();

        let err = provider
            .forecast(&ForecastRequest::new(LAT, LON))
            .await
            .unwrap_err();

        assert!(matches!(err, ForecastError::Transport(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_invalid_url_is_request_error() {
        let provider = NwsProvider::new(&UpstreamConfig::with_base_url("not a url")).unwrap();

        let err = provider
            .forecast(&ForecastRequest::new(LAT, LON))
            .await
            .unwrap_err();

        assert!(matches!(err, ForecastError::Request(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_slow_upstream_hits_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/points/{LAT},{LON}")))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let config = UpstreamConfig {
            base_url: server.uri(),
            timeout_secs: 1,
            ..UpstreamConfig::default()
        };
        let err = NwsProvider::new(&config)
            .unwrap()
            .forecast(&ForecastRequest::new(LAT, LON))
            .await
            .unwrap_err();

        assert!(matches!(err, ForecastError::Transport(_)));
    }
}
