//! # Sun Exposure
//!
//! Answers "is this spot in direct sunlight, and when will it be" for a point on Earth
//! surrounded by nearby buildings.
//!
//! The crate is built from a few layers, each usable on its own:
//! - [`position`]: sun azimuth and elevation for a point and instant (Grena's algorithm 3,
//!   about 0.01° over 2010-2110, degrading gracefully outside)
//! - [`times`]: sunrise, sunset, twilights, golden hour and solar noon for a UTC date
//! - [`obstruction`] and [`sampler`]: whether any nearby box obstruction hides the sun
//! - [`scanner`]: sunny intervals of a day, sampled at a fixed step
//! - [`forecast`]: per-day sunshine statistics over a bounded number of days
//! - [`engine`]: all of the above behind TTL caches with single-flight deduplication
//!
//! All instants are UTC. Converting to a venue's local zone is left to the caller.
//!
//! ## Quick Start
//!
//! ### Is the terrace sunny right now?
//! ```rust
//! use sun_exposure::{EngineConfig, GeoPoint, Obstruction, SunlightEngine};
//! use chrono::{TimeZone, Utc};
//!
//! let engine = SunlightEngine::new(EngineConfig::default()).unwrap();
//! let terrace = GeoPoint::new(57.7089, 11.9746).unwrap();
//!
//! // 20 m tall building, 20 m south of the terrace
//! let buildings = [Obstruction::at(20.0, 20.0, 180.0).unwrap()];
//!
//! let afternoon = Utc.with_ymd_and_hms(2024, 6, 21, 11, 12, 0).unwrap();
//! let exposure = engine.exposure(&terrace, afternoon, &buildings).unwrap();
//! println!(
//!     "sun at {:.1}° elevation, {:.1}° azimuth, sunlit: {}",
//!     exposure.position.elevation(),
//!     exposure.position.azimuth(),
//!     exposure.sunlit
//! );
//! ```
//!
//! ### Sunny periods for the next week
//! ```rust
//! use sun_exposure::{EngineConfig, GeoPoint, Obstruction, SunlightEngine};
//! use chrono::NaiveDate;
//!
//! let engine = SunlightEngine::new(EngineConfig::default()).unwrap();
//! let terrace = GeoPoint::new(57.7089, 11.9746).unwrap();
//! let buildings = [Obstruction::at(12.0, 15.0, 200.0).unwrap()];
//!
//! let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
//! for day in engine.forecast(&terrace, &buildings, start, 7).unwrap() {
//!     println!("{}: {}% sunshine", day.date, day.sunshine_percentage);
//!     for period in &day.sunny_periods {
//!         println!("  {} - {}", period.start().format("%H:%M"), period.end().format("%H:%M"));
//!     }
//! }
//! ```
//!
//! ## Coordinate System
//!
//! - **Azimuth**: 0° = North, measured clockwise (0° to 360°)
//! - **Elevation angle**: 0° = horizon, 90° = directly overhead (-90° to +90°)
//! - **Obstruction direction**: compass bearing from the point to the obstruction
//!
//! ## References
//!
//! - Grena, R. (2012). Five new algorithms for the computation of sun position from 2010 to 2110.
//!   Solar Energy, 86(5), 1323-1337. DOI: <http://dx.doi.org/10.1016/j.solener.2012.01.024>
//! - Espenak, F.; Meeus, J. Polynomial expressions for Delta T.
//!   <https://eclipse.gsfc.nasa.gov/SEcat5/deltatpoly.html>

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery, clippy::all)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::float_cmp, // Exact comparisons of normalized bearings in tests
)]

// Public API exports
pub use crate::cache::TtlCache;
pub use crate::config::EngineConfig;
pub use crate::engine::SunlightEngine;
pub use crate::error::{Error, Result};
pub use crate::forecast::{DayForecast, ForecastSummary};
pub use crate::obstruction::Obstruction;
pub use crate::times::SunTimes;
pub use crate::types::{
    Daylight, GeoPoint, Horizon, SunExposure, SunPosition, SunnyInterval, SunriseResult,
};

// Core modules
pub mod error;
pub mod types;

// Internal modules
mod math;

// Public modules
pub mod cache;
pub mod config;
pub mod engine;
pub mod forecast;
pub mod obstruction;
pub mod position;
pub mod sampler;
pub mod scanner;
pub mod time;
pub mod times;
