//! Sunny-interval scanner.
//!
//! Walks the daylight window of a date in fixed steps, asks a sampler whether the point
//! is sunlit at each step, and merges consecutive sunlit samples into intervals.
//!
//! An interval opened at a sunlit sample runs until the first shaded sample after it (or
//! the end of the window), so every interval covers at least one step unless it is cut
//! short by the window end. Samples are evaluated strictly in chronological order.

use crate::obstruction::{Obstruction, casts_no_shadow};
use crate::sampler::is_sunlit;
use crate::times::{SunTimes, sun_times};
use crate::{Error, GeoPoint, Result, SunnyInterval};
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Reference sampling step.
pub const DEFAULT_STEP_MINUTES: u32 = 15;

/// Finest accepted sampling step, in minutes.
pub const MIN_STEP_MINUTES: u32 = 1;

/// Returns the reference sampling step as a duration.
#[must_use]
pub fn default_step() -> Duration {
    Duration::minutes(i64::from(DEFAULT_STEP_MINUTES))
}

/// Sunny intervals of `point` on the UTC `date`, sampled every `step`.
///
/// With no obstructions (or only degenerate ones) the whole daylight window is returned
/// without sampling. Polar nights yield no intervals; polar days scan the whole UTC date.
///
/// # Errors
/// Returns `InvalidConfig` for a step below one minute and propagates calculator errors.
///
/// # Example
/// ```
/// use sun_exposure::{GeoPoint, Obstruction, scanner};
/// use chrono::NaiveDate;
///
/// let point = GeoPoint::new(57.7089, 11.9746).unwrap();
/// let date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
/// let tower = [Obstruction::at(60.0, 30.0, 180.0).unwrap()];
///
/// let intervals = scanner::sunny_intervals(&point, date, &tower, scanner::default_step()).unwrap();
/// for pair in intervals.windows(2) {
///     assert!(pair[0].end() <= pair[1].start());
/// }
/// ```
#[tracing::instrument(level = "debug", skip(point, obstructions), fields(obstructions = obstructions.len()))]
pub fn sunny_intervals(
    point: &GeoPoint,
    date: NaiveDate,
    obstructions: &[Obstruction],
    step: Duration,
) -> Result<Vec<SunnyInterval>> {
    check_step(step)?;
    let times = sun_times(point, date)?;
    sunny_intervals_for(point, &times, obstructions, step)
}

/// Like [`sunny_intervals`], for sun times the caller already has.
///
/// # Errors
/// Returns `InvalidConfig` for a step below one minute and propagates calculator errors.
pub fn sunny_intervals_for(
    point: &GeoPoint,
    times: &SunTimes,
    obstructions: &[Obstruction],
    step: Duration,
) -> Result<Vec<SunnyInterval>> {
    scan_daylight(times, obstructions, step, |instant| {
        is_sunlit(point, instant, obstructions)
    })
}

/// Scans the daylight window of `times` with an arbitrary sampler.
///
/// Shared by the plain and cached scanners: a polar night yields nothing, and a set in
/// which no obstruction can cast a shadow yields the whole window unsampled.
///
/// # Errors
/// Returns `InvalidConfig` for a step below one minute and propagates sampler errors.
pub fn scan_daylight<F>(
    times: &SunTimes,
    obstructions: &[Obstruction],
    step: Duration,
    sample: F,
) -> Result<Vec<SunnyInterval>>
where
    F: FnMut(DateTime<Utc>) -> Result<bool>,
{
    check_step(step)?;
    let Some((start, end)) = times.daylight_window() else {
        return Ok(Vec::new());
    };

    if casts_no_shadow(obstructions) {
        return Ok(SunnyInterval::new(start, end).into_iter().collect());
    }

    scan_window(start, end, step, sample)
}

/// Builds merged intervals over `[start, end]` from a sampler evaluated every `step`.
///
/// The sampler is called in chronological order, starting at `start`; the last sample is
/// the latest step not after `end`.
///
/// # Errors
/// Returns `InvalidConfig` for a step below one minute and propagates sampler errors.
pub fn scan_window<F>(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
    mut sample: F,
) -> Result<Vec<SunnyInterval>>
where
    F: FnMut(DateTime<Utc>) -> Result<bool>,
{
    check_step(step)?;

    let mut intervals = Vec::new();
    let mut open: Option<DateTime<Utc>> = None;
    let mut t = start;

    while t <= end {
        if sample(t)? {
            open.get_or_insert(t);
        } else if let Some(opened) = open.take() {
            intervals.extend(SunnyInterval::new(opened, t));
        }
        t = match t.checked_add_signed(step) {
            Some(next) => next,
            None => break,
        };
    }

    if let Some(opened) = open {
        intervals.extend(SunnyInterval::new(opened, t.min(end)));
    }

    Ok(intervals)
}

fn check_step(step: Duration) -> Result<()> {
    if step < Duration::minutes(i64::from(MIN_STEP_MINUTES)) {
        return Err(Error::invalid_config(format!(
            "sampling step must be at least {MIN_STEP_MINUTES} minute, got {step}"
        )));
    }
    Ok(())
}

/// Total length of a set of intervals in (fractional) minutes.
#[must_use]
pub fn total_minutes(intervals: &[SunnyInterval]) -> f64 {
    intervals.iter().map(SunnyInterval::minutes).sum()
}
