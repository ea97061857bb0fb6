use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::LookupError, icon::Icon, model::CurrentConditions};

pub mod weatherapi;

pub use weatherapi::WeatherApiProvider;

/// Source of current conditions and their icons.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for a free-text city query.
    async fn current(&self, city: &str) -> Result<CurrentConditions, LookupError>;

    /// Fetch the condition icon behind a provider icon reference.
    async fn icon(&self, reference: &str) -> Result<Icon, LookupError>;
}
