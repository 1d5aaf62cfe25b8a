use chrono::{DateTime, Duration, NaiveDate, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use sun_exposure::{EngineConfig, GeoPoint, Obstruction, SunlightEngine, forecast, scanner};

fn venue() -> GeoPoint {
    GeoPoint::new(57.7089, 11.9746).unwrap()
}

fn buildings() -> Vec<Obstruction> {
    vec![
        Obstruction::at(18.0, 22.0, 170.0).unwrap(),
        Obstruction::at(12.0, 15.0, 250.0).unwrap(),
        Obstruction::at(25.0, 40.0, 95.0).unwrap(),
    ]
}

fn benchmark_uncached_forecast(c: &mut Criterion) {
    let mut group = c.benchmark_group("forecast_uncached");
    let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let (point, obstructions) = (venue(), buildings());

    for days in [1_u32, 7, 14] {
        group.throughput(Throughput::Elements(u64::from(days)));
        group.bench_with_input(BenchmarkId::new("days", days), &days, |b, &days| {
            b.iter(|| {
                forecast::forecast(
                    black_box(&point),
                    &obstructions,
                    start,
                    days,
                    scanner::default_step(),
                    forecast::DEFAULT_MAX_DAYS,
                )
                .unwrap()
            });
        });
    }

    group.finish();
}

fn benchmark_engine_warm_cache(c: &mut Criterion) {
    let engine = SunlightEngine::new(EngineConfig::default()).unwrap();
    let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let (point, obstructions) = (venue(), buildings());
    engine.forecast(&point, &obstructions, start, 14).unwrap();

    c.bench_function("forecast_engine_warm_14_days", |b| {
        b.iter(|| engine.forecast(black_box(&point), &obstructions, start, 14).unwrap());
    });
}

fn benchmark_engine_burst(c: &mut Criterion) {
    let engine = SunlightEngine::new(EngineConfig::default()).unwrap();
    let instant = "2024-05-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
    let (point, obstructions) = (venue(), buildings());

    // near-duplicate requests within one time bucket
    c.bench_function("is_sunlit_engine_burst", |b| {
        let mut second = 0;
        b.iter(|| {
            second = (second + 1) % 60;
            let t = instant + Duration::seconds(second);
            engine.is_sunlit(black_box(&point), t, &obstructions).unwrap()
        });
    });
}

criterion_group!(
    benches,
    benchmark_uncached_forecast,
    benchmark_engine_warm_cache,
    benchmark_engine_burst
);
criterion_main!(benches);
