//! Core library for the `forecast` service.
//!
//! This crate defines:
//! - Configuration of the upstream api.weather.gov client and the listener
//! - The upstream client and the two-step point/forecast lookup
//! - Response decoders, the temperature classifier and the output model
//!
//! It is used by `forecast-server`, but the provider can be reused by other binaries.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;

pub use config::{Config, ServerConfig, UpstreamConfig};
pub use error::ForecastError;
pub use model::{ForecastOutput, ForecastRequest, TemperatureCategory};
pub use provider::{ForecastProvider, nws::NwsProvider, provider_from_config};
