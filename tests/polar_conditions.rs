//! Polar day and polar night handling across the calculator, scanner and forecast.

use chrono::{Duration, NaiveDate};
use sun_exposure::{
    Daylight, EngineConfig, GeoPoint, Horizon, Obstruction, SunlightEngine, SunriseResult,
    position, scanner, times,
};

fn tromso() -> GeoPoint {
    GeoPoint::new(69.6492, 18.9553).unwrap()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn midnight_sun_covers_the_whole_date() {
    let day = times::sun_times(&tromso(), date(2024, 6, 21)).unwrap();
    assert_eq!(day.daylight, Daylight::AlwaysUp);
    assert_eq!(day.sunrise, None);
    assert_eq!(day.sunset, None);
    assert_eq!(day.day_length_minutes(), 1440.0);

    let (start, end) = day.daylight_window().unwrap();
    assert_eq!(start, date(2024, 6, 21).and_hms_opt(0, 0, 0).unwrap().and_utc());
    assert_eq!(end - start, Duration::days(1));

    // sun stays above the horizon at local midnight
    let midnight_local = start + Duration::minutes(22 * 60 + 45);
    assert!(position::solar_position(&tromso(), midnight_local).unwrap().elevation() > 0.0);
}

#[test]
fn polar_night_has_no_intervals() {
    let winter = date(2024, 12, 21);
    let day = times::sun_times(&tromso(), winter).unwrap();
    assert_eq!(day.daylight, Daylight::AlwaysDown);
    assert!(day.daylight_window().is_none());
    // civil twilight still happens around noon
    assert!(day.dawn.is_some() && day.dusk.is_some());

    let intervals = scanner::sunny_intervals(&tromso(), winter, &[], scanner::default_step())
        .unwrap();
    assert!(intervals.is_empty());
}

#[test]
fn midnight_sun_with_a_building_is_scanned_around_the_clock() {
    let engine = SunlightEngine::new(EngineConfig::default()).unwrap();
    // the low midnight sun sits due north, behind this building
    let north_wall = [Obstruction::at(15.0, 20.0, 0.0).unwrap()];
    let day = date(2024, 6, 21);

    let forecast = engine.forecast(&tromso(), &north_wall, day, 1).unwrap();
    let today = &forecast[0];
    assert_eq!(today.daylight, Daylight::AlwaysUp);
    assert_eq!(today.day_length_minutes, 1440.0);
    assert!(!today.sunny_periods.is_empty());
    assert!(today.sunshine_percentage > 0 && today.sunshine_percentage < 100);
    assert!(today.sunshine_minutes < today.day_length_minutes);
}

#[test]
fn per_horizon_results_at_the_poles() {
    let north_pole = GeoPoint::new(90.0, 0.0).unwrap();
    let south_pole = GeoPoint::new(-90.0, 0.0).unwrap();
    let june = date(2024, 6, 21);

    let north = times::sunrise_sunset_for_horizon(&north_pole, june, Horizon::SunriseSunset)
        .unwrap();
    let south = times::sunrise_sunset_for_horizon(&south_pole, june, Horizon::SunriseSunset)
        .unwrap();
    assert!(matches!(north, SunriseResult::AllDay { .. }));
    assert!(matches!(south, SunriseResult::AllNight { .. }));
    assert_eq!(north.daylight(), Daylight::AlwaysUp);
    assert_eq!(south.daylight(), Daylight::AlwaysDown);
}

#[test]
fn polar_transition_is_regular_again() {
    // early February, the sun is back over Tromsø for a few hours
    let day = times::sun_times(&tromso(), date(2024, 2, 10)).unwrap();
    assert_eq!(day.daylight, Daylight::Regular);
    let minutes = day.day_length_minutes();
    assert!(minutes > 0.0 && minutes < 8.0 * 60.0, "day length {minutes}");
}
