//! Client configuration.
//!
//! A CSR bundle has no process environment, so overrides are baked in at
//! build time through `PARCEL_ROUTE_VIEWER_API`.

use serde::Deserialize;

use crate::error::ClientError;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Timing and bounds of the synthetic progress indicator.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
	pub interval_ms: u32,
	/// Progress holds here until the real result arrives. Must stay below 100.
	pub ceiling: u32,
	/// Each tick adds a step drawn from `1..=max_step`.
	pub max_step: u32,
}

impl Default for ProgressConfig {
	fn default() -> Self {
		Self {
			interval_ms: 1300,
			ceiling: 85,
			max_step: 5,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
	pub api_base_url: String,
	pub progress: ProgressConfig,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			api_base_url: DEFAULT_API_BASE_URL.to_string(),
			progress: ProgressConfig::default(),
		}
	}
}

impl ClientConfig {
	pub fn from_env() -> Result<Self, ClientError> {
		let mut config = Self::default();
		if let Some(url) = option_env!("PARCEL_ROUTE_VIEWER_API") {
			config.api_base_url = url.to_string();
		}
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), ClientError> {
		if self.api_base_url.trim().is_empty() {
			return Err(ClientError::InvalidConfig("api_base_url is empty".into()));
		}
		let progress = &self.progress;
		if progress.interval_ms == 0 {
			return Err(ClientError::InvalidConfig(
				"progress.interval_ms must be positive".into(),
			));
		}
		if !(1..100).contains(&progress.ceiling) {
			return Err(ClientError::InvalidConfig(format!(
				"progress.ceiling must be in 1..100, got {}",
				progress.ceiling
			)));
		}
		if progress.max_step == 0 {
			return Err(ClientError::InvalidConfig(
				"progress.max_step must be at least 1".into(),
			));
		}
		Ok(())
	}
}
