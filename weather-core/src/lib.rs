//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weatherapi.com provider and condition icons
//! - Optional Gemini advice
//! - The lookup flow and the panel it renders into
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod advice;
pub mod config;
pub mod error;
pub mod icon;
pub mod lookup;
pub mod model;
pub mod provider;
pub mod view;

pub use advice::{AdviceService, GeminiAdvisor};
pub use config::{Config, ServiceConfig, ServiceId};
pub use error::{AdviceError, ErrorReport, LookupError};
pub use icon::{Icon, IconFormat};
pub use lookup::WeatherLookup;
pub use model::{CurrentConditions, LookupOutcome, WeatherSummary};
pub use provider::{WeatherApiProvider, WeatherProvider};
pub use view::WeatherPanel;
