//! Engine configuration.
//!
//! All fields have reference defaults, so an empty JSON object is a valid configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration as StdDuration;

const fn default_sampling_step_minutes() -> u32 {
    15
}
const fn default_max_forecast_days() -> u32 {
    14
}
const fn default_max_obstructions() -> usize {
    256
}
const fn default_position_ttl_seconds() -> u64 {
    86_400
}
const fn default_result_ttl_seconds() -> u64 {
    300
}
const fn default_max_cache_entries() -> usize {
    1000
}
const fn default_coordinate_decimals() -> u32 {
    3
}
const fn default_time_bucket_seconds() -> u32 {
    60
}

/// Tunables for [`crate::SunlightEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Interval scanner step in minutes (1..=240).
    #[serde(default = "default_sampling_step_minutes")]
    pub sampling_step_minutes: u32,
    /// Upper bound on forecast length in days.
    #[serde(default = "default_max_forecast_days")]
    pub max_forecast_days: u32,
    /// Upper bound on obstructions per request.
    #[serde(default = "default_max_obstructions")]
    pub max_obstructions: usize,
    /// Lifetime of cached positions and sun times.
    #[serde(default = "default_position_ttl_seconds")]
    pub position_ttl_seconds: u64,
    /// Lifetime of cached sunlight verdicts.
    #[serde(default = "default_result_ttl_seconds")]
    pub result_ttl_seconds: u64,
    /// Cache size above which expired entries are swept.
    #[serde(default = "default_max_cache_entries")]
    pub max_cache_entries: usize,
    /// Decimal places kept from coordinates when building cache keys (0..=6).
    #[serde(default = "default_coordinate_decimals")]
    pub coordinate_decimals: u32,
    /// Width of the time bucket instants are floored to for cache keys.
    #[serde(default = "default_time_bucket_seconds")]
    pub time_bucket_seconds: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sampling_step_minutes: default_sampling_step_minutes(),
            max_forecast_days: default_max_forecast_days(),
            max_obstructions: default_max_obstructions(),
            position_ttl_seconds: default_position_ttl_seconds(),
            result_ttl_seconds: default_result_ttl_seconds(),
            max_cache_entries: default_max_cache_entries(),
            coordinate_decimals: default_coordinate_decimals(),
            time_bucket_seconds: default_time_bucket_seconds(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for malformed JSON, unknown fields or out-of-range values.
    ///
    /// # Example
    /// ```
    /// use sun_exposure::EngineConfig;
    ///
    /// let config = EngineConfig::from_json_str(r#"{"sampling_step_minutes": 5}"#).unwrap();
    /// assert_eq!(config.sampling_step_minutes, 5);
    /// assert_eq!(config.max_forecast_days, 14);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::invalid_config(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field against its allowed range.
    ///
    /// # Errors
    /// Returns `InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if !(1..=240).contains(&self.sampling_step_minutes) {
            return Err(Error::invalid_config(format!(
                "sampling_step_minutes must be within 1..=240, got {}",
                self.sampling_step_minutes
            )));
        }
        if self.max_forecast_days == 0 {
            return Err(Error::invalid_config("max_forecast_days must be at least 1"));
        }
        if self.max_obstructions == 0 {
            return Err(Error::invalid_config("max_obstructions must be at least 1"));
        }
        if self.max_cache_entries == 0 {
            return Err(Error::invalid_config("max_cache_entries must be at least 1"));
        }
        if self.coordinate_decimals > 6 {
            return Err(Error::invalid_config(format!(
                "coordinate_decimals must be within 0..=6, got {}",
                self.coordinate_decimals
            )));
        }
        if self.time_bucket_seconds == 0 {
            return Err(Error::invalid_config("time_bucket_seconds must be at least 1"));
        }
        Ok(())
    }

    /// Scanner step as a duration.
    #[must_use]
    pub fn sampling_step(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.sampling_step_minutes))
    }

    /// Lifetime of cached positions and sun times.
    #[must_use]
    pub const fn position_ttl(&self) -> StdDuration {
        StdDuration::from_secs(self.position_ttl_seconds)
    }

    /// Lifetime of cached sunlight verdicts.
    #[must_use]
    pub const fn result_ttl(&self) -> StdDuration {
        StdDuration::from_secs(self.result_ttl_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.sampling_step_minutes, 15);
        assert_eq!(config.max_forecast_days, 14);
        assert_eq!(config.max_obstructions, 256);
        assert_eq!(config.position_ttl(), StdDuration::from_secs(86_400));
        assert_eq!(config.result_ttl(), StdDuration::from_secs(300));
        assert_eq!(config.max_cache_entries, 1000);
        assert_eq!(config.coordinate_decimals, 3);
        assert_eq!(config.time_bucket_seconds, 60);
        assert_eq!(config.sampling_step(), chrono::Duration::minutes(15));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(EngineConfig::from_json_str("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config =
            EngineConfig::from_json_str(r#"{"max_forecast_days": 7, "result_ttl_seconds": 30}"#)
                .unwrap();
        assert_eq!(config.max_forecast_days, 7);
        assert_eq!(config.result_ttl(), StdDuration::from_secs(30));
        assert_eq!(config.sampling_step_minutes, 15);
    }

    #[test]
    fn test_rejects_bad_input() {
        for json in [
            r#"{"sampling_step_minutes": 0}"#,
            r#"{"sampling_step_minutes": 241}"#,
            r#"{"max_forecast_days": 0}"#,
            r#"{"coordinate_decimals": 7}"#,
            r#"{"time_bucket_seconds": 0}"#,
            r#"{"max_cache_entries": 0}"#,
            r#"{"sampling_step": 15}"#,
            r#"{"sampling_step_minutes": -1}"#,
            "not json",
        ] {
            let err = EngineConfig::from_json_str(json).unwrap_err();
            assert!(matches!(err, Error::InvalidConfig { .. }), "{json}: {err}");
        }
    }
}
