use crate::{
    ForecastError, ForecastOutput, ForecastRequest, config::UpstreamConfig,
    provider::nws::NwsProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod nws;

#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn forecast(&self, request: &ForecastRequest) -> Result<ForecastOutput, ForecastError>;
}

/// Construct the api.weather.gov provider from upstream settings.
pub fn provider_from_config(
    config: &UpstreamConfig,
) -> Result<Box<dyn ForecastProvider>, ForecastError> {
    Ok(Box::new(NwsProvider::new(config)?))
}
