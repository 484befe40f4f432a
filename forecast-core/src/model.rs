use serde::{Deserialize, Deserializer, Serialize};

/// Coordinates as supplied by the caller. Forwarded to upstream verbatim,
/// without numeric validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    pub latitude: String,
    pub longitude: String,
}

impl ForecastRequest {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }
}

/// Envelope returned by `GET /points/{lat},{lon}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PointResponse {
    #[serde(default)]
    properties: Option<PointProperties>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PointProperties {
    #[serde(default)]
    forecast: Option<String>,
}

impl PointResponse {
    /// A `null` body decodes like an empty object.
    pub fn decode(body: &[u8]) -> serde_json::Result<Self> {
        Ok(serde_json::from_slice::<Option<Self>>(body)?.unwrap_or_default())
    }

    /// URL of the detailed forecast, empty when upstream did not provide one.
    pub fn forecast_url(&self) -> &str {
        self.properties
            .as_ref()
            .and_then(|p| p.forecast.as_deref())
            .unwrap_or_default()
    }
}

/// Envelope returned by the forecast URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    properties: Option<ForecastProperties>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ForecastProperties {
    #[serde(default, deserialize_with = "periods_or_empty")]
    periods: Vec<Period>,
}

/// `null` for the list yields no periods; a `null` entry yields an empty period.
fn periods_or_empty<'de, D>(deserializer: D) -> Result<Vec<Period>, D::Error>
where
    D: Deserializer<'de>,
{
    let periods = Option::<Vec<Option<Period>>>::deserialize(deserializer)?;
    Ok(periods
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

/// A single upstream forecast window ("Tonight", "Monday", ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    #[serde(default)]
    pub short_forecast: Option<String>,
    /// Degrees Fahrenheit, per upstream convention.
    #[serde(default)]
    pub temperature: Option<i64>,
}

impl ForecastResponse {
    /// A `null` body decodes like an empty object.
    pub fn decode(body: &[u8]) -> serde_json::Result<Self> {
        Ok(serde_json::from_slice::<Option<Self>>(body)?.unwrap_or_default())
    }

    pub fn periods(&self) -> &[Period] {
        self.properties
            .as_ref()
            .map(|p| p.periods.as_slice())
            .unwrap_or_default()
    }
}

/// Coarse temperature bucket reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureCategory {
    Cold,
    Moderate,
    Hot,
}

impl TemperatureCategory {
    const COLD_MAX: i64 = 30;
    const HOT_MIN: i64 = 80;

    pub fn from_temperature(temperature: i64) -> Self {
        if temperature <= Self::COLD_MAX {
            Self::Cold
        } else if temperature >= Self::HOT_MIN {
            Self::Hot
        } else {
            Self::Moderate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Moderate => "moderate",
            Self::Hot => "hot",
        }
    }
}

impl std::fmt::Display for TemperatureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a successful `/forecast` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastOutput {
    pub forecast: String,
    pub temperature: TemperatureCategory,
}

impl From<&Period> for ForecastOutput {
    fn from(period: &Period) -> Self {
        Self {
            forecast: period.short_forecast.clone().unwrap_or_default(),
            temperature: TemperatureCategory::from_temperature(
                period.temperature.unwrap_or_default(),
            ),
        }
    }
}
