//! Cached facade over the calculator, sampler, scanner and forecast.
//!
//! `SunlightEngine` is `Send + Sync` and meant to be shared by reference (or behind an
//! `Arc`) between request handlers. Near-duplicate requests (same venue to a few
//! decimals, same time bucket) are answered from memory and concurrent identical misses
//! share one computation.
//!
//! A cached position or verdict is the one computed for the first request in its
//! bucket, so callers asking for instants a few seconds apart may see identical values.

use crate::cache::{CacheKey, CacheStats, TtlCache};
use crate::config::EngineConfig;
use crate::forecast::{DayForecast, forecast_with};
use crate::obstruction::{Obstruction, fingerprint, validate_obstructions};
use crate::position::solar_position;
use crate::sampler::is_sunlit_at;
use crate::scanner::scan_daylight;
use crate::times::{SunTimes, sun_times};
use crate::{GeoPoint, Result, SunExposure, SunPosition, SunnyInterval};
use chrono::{DateTime, NaiveDate, Utc};

/// Counters for each of the engine's caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineCacheStats {
    /// Sun positions.
    pub positions: CacheStats,
    /// Sunlight verdicts.
    pub verdicts: CacheStats,
    /// Daily sun times.
    pub times: CacheStats,
}

/// Sun exposure engine with memoized positions, verdicts and sun times.
///
/// # Example
/// ```
/// use sun_exposure::{EngineConfig, GeoPoint, Obstruction, SunlightEngine};
/// use chrono::{NaiveDate, TimeZone, Utc};
///
/// let engine = SunlightEngine::new(EngineConfig::default()).unwrap();
/// let venue = GeoPoint::new(57.7089, 11.9746).unwrap();
/// let buildings = [Obstruction::at(20.0, 20.0, 180.0).unwrap()];
///
/// let noon = Utc.with_ymd_and_hms(2024, 6, 21, 11, 12, 0).unwrap();
/// assert!(engine.is_sunlit(&venue, noon, &buildings).unwrap());
///
/// let start = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
/// let week = engine.forecast(&venue, &buildings, start, 7).unwrap();
/// assert_eq!(week.len(), 7);
/// ```
pub struct SunlightEngine {
    config: EngineConfig,
    positions: TtlCache<CacheKey, SunPosition>,
    verdicts: TtlCache<CacheKey, bool>,
    times: TtlCache<CacheKey, SunTimes>,
}

impl std::fmt::Debug for SunlightEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SunlightEngine")
            .field("config", &self.config)
            .field("stats", &self.cache_stats())
            .finish()
    }
}

impl SunlightEngine {
    /// Creates an engine with empty caches.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the configuration does not validate.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let max = config.max_cache_entries;
        Ok(Self {
            positions: TtlCache::new(config.position_ttl(), max),
            verdicts: TtlCache::new(config.result_ttl(), max),
            times: TtlCache::new(config.position_ttl(), max),
            config,
        })
    }

    /// The configuration this engine was built with.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn instant_key(&self, point: &GeoPoint, instant: DateTime<Utc>, salt: u64) -> CacheKey {
        CacheKey::for_instant(
            point,
            instant,
            self.config.coordinate_decimals,
            self.config.time_bucket_seconds,
            salt,
        )
    }

    /// Sun position for `point` at `instant`.
    ///
    /// # Errors
    /// Propagates calculator errors.
    pub fn position(&self, point: &GeoPoint, instant: DateTime<Utc>) -> Result<SunPosition> {
        self.positions
            .get_or_compute(self.instant_key(point, instant, 0), || {
                solar_position(point, instant)
            })
    }

    /// Named sun events for `point` on the UTC `date`.
    ///
    /// # Errors
    /// Propagates calculator errors.
    pub fn times(&self, point: &GeoPoint, date: NaiveDate) -> Result<SunTimes> {
        let key = CacheKey::for_date(point, date, self.config.coordinate_decimals);
        self.times.get_or_compute(key, || sun_times(point, date))
    }

    /// Whether `point` is in direct sunlight at `instant`.
    ///
    /// # Errors
    /// Returns `TooManyObstructions` / `InvalidObstruction` for a bad obstruction set and
    /// propagates calculator errors.
    pub fn is_sunlit(
        &self,
        point: &GeoPoint,
        instant: DateTime<Utc>,
        obstructions: &[Obstruction],
    ) -> Result<bool> {
        validate_obstructions(obstructions, self.config.max_obstructions)?;
        self.cached_verdict(point, instant, obstructions, fingerprint(obstructions))
    }

    fn cached_verdict(
        &self,
        point: &GeoPoint,
        instant: DateTime<Utc>,
        obstructions: &[Obstruction],
        salt: u64,
    ) -> Result<bool> {
        self.verdicts
            .get_or_compute(self.instant_key(point, instant, salt), || {
                let position = self.position(point, instant)?;
                Ok(is_sunlit_at(&position, obstructions))
            })
    }

    /// Sun position and sunlight verdict for one instant.
    ///
    /// # Errors
    /// Same as [`SunlightEngine::is_sunlit`].
    pub fn exposure(
        &self,
        point: &GeoPoint,
        instant: DateTime<Utc>,
        obstructions: &[Obstruction],
    ) -> Result<SunExposure> {
        let sunlit = self.is_sunlit(point, instant, obstructions)?;
        let position = self.position(point, instant)?;
        Ok(SunExposure { position, sunlit })
    }

    /// Sunny intervals for `point` on the UTC `date`, sampled at the configured step.
    ///
    /// # Errors
    /// Same as [`SunlightEngine::is_sunlit`].
    pub fn sunny_intervals(
        &self,
        point: &GeoPoint,
        date: NaiveDate,
        obstructions: &[Obstruction],
    ) -> Result<Vec<SunnyInterval>> {
        validate_obstructions(obstructions, self.config.max_obstructions)?;
        self.scan_day(point, date, obstructions, fingerprint(obstructions))
    }

    fn scan_day(
        &self,
        point: &GeoPoint,
        date: NaiveDate,
        obstructions: &[Obstruction],
        salt: u64,
    ) -> Result<Vec<SunnyInterval>> {
        let times = self.times(point, date)?;
        self.scan_times(point, &times, obstructions, salt)
    }

    fn scan_times(
        &self,
        point: &GeoPoint,
        times: &SunTimes,
        obstructions: &[Obstruction],
        salt: u64,
    ) -> Result<Vec<SunnyInterval>> {
        scan_daylight(times, obstructions, self.config.sampling_step(), |instant| {
            self.cached_verdict(point, instant, obstructions, salt)
        })
    }

    /// Day-by-day sunshine forecast, clamped to the configured maximum length.
    ///
    /// # Errors
    /// Same as [`SunlightEngine::is_sunlit`], plus `InvalidDate` past the calendar range.
    #[tracing::instrument(level = "debug", skip(self, point, obstructions), fields(obstructions = obstructions.len()))]
    pub fn forecast(
        &self,
        point: &GeoPoint,
        obstructions: &[Obstruction],
        start_date: NaiveDate,
        days: u32,
    ) -> Result<Vec<DayForecast>> {
        validate_obstructions(obstructions, self.config.max_obstructions)?;
        let salt = fingerprint(obstructions);
        forecast_with(start_date, days, self.config.max_forecast_days, |date| {
            let times = self.times(point, date)?;
            let intervals = self.scan_times(point, &times, obstructions, salt)?;
            Ok((times, intervals))
        })
    }

    /// Hit/miss counters for every cache.
    #[must_use]
    pub fn cache_stats(&self) -> EngineCacheStats {
        EngineCacheStats {
            positions: self.positions.stats(),
            verdicts: self.verdicts.stats(),
            times: self.times.stats(),
        }
    }

    /// Drops all cached values.
    pub fn clear_caches(&self) {
        self.positions.clear();
        self.verdicts.clear();
        self.times.clear();
    }
}
