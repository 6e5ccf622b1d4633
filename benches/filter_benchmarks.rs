//! Benchmarks for smoothing, gesture classification and coordinate mapping

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hand_interaction::{
    filters::{exponential::ExponentialFilter, NoFilter, PositionFilter},
    gesture::GestureClassifier,
    homography::{homography_from_4pt, DestinationRect},
    landmarks::{HandPose, Handedness, Landmark},
    mapper::{CoordinateMapper, PixelPoint},
};

fn benchmark_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters");

    // Jittery fingertip track in normalized coordinates
    let test_data: Vec<(f64, f64)> = (0..100)
        .map(|i| {
            let t = f64::from(i) * 0.1;
            (0.5 + 0.1 * t.sin() + 0.002 * (7.3 * t).sin(), 0.5 + 0.1 * t.cos())
        })
        .collect();

    let filter_configs = vec![
        ("no_filter", Box::new(NoFilter) as Box<dyn PositionFilter>),
        ("exponential_0.5", Box::new(ExponentialFilter::new(0.5))),
        ("exponential_0.7", Box::new(ExponentialFilter::new(0.7))),
    ];

    for (name, mut filter) in filter_configs {
        group.bench_with_input(BenchmarkId::new("sequence_100", name), &test_data, |b, data| {
            b.iter(|| {
                filter.reset();
                for &(x, y) in data {
                    black_box(filter.apply(black_box(x), black_box(y)));
                }
            });
        });
    }

    group.finish();
}

fn spread_hand() -> HandPose {
    let landmarks = std::array::from_fn(|i| {
        let finger = i.saturating_sub(1) / 4;
        let joint = i.saturating_sub(1) % 4;
        Landmark::new(0.35 + 0.06 * finger as f64, 0.7 - 0.05 * joint as f64)
    });
    HandPose::new(landmarks, Handedness::Right, 0.9)
}

fn benchmark_classifier(c: &mut Criterion) {
    let classifier = GestureClassifier::default();
    let pose = spread_hand();
    c.bench_function("classify_hand", |b| {
        b.iter(|| black_box(classifier.classify(black_box(&pose))))
    });
}

fn benchmark_mapping(c: &mut Criterion) {
    let dest = DestinationRect::new(1920.0, 1080.0);
    let src = [
        PixelPoint::new(120.0, 60.0),
        PixelPoint::new(610.0, 95.0),
        PixelPoint::new(580.0, 450.0),
        PixelPoint::new(40.0, 400.0),
    ];

    c.bench_function("homography_solve", |b| {
        b.iter(|| black_box(homography_from_4pt(black_box(&src), &dest.corners(), 1e-3)))
    });

    if let Ok(h) = homography_from_4pt(&src, &dest.corners(), 1e-3) {
        let filter = Box::new(ExponentialFilter::new(0.7));
        let mut mapper = CoordinateMapper::new(dest, 640.0, 480.0, filter);
        let point = PixelPoint::new(320.0, 240.0);
        c.bench_function("map_point", |b| {
            b.iter(|| black_box(mapper.map(black_box(point), Some(&h))))
        });
    }
}

criterion_group!(benches, benchmark_filters, benchmark_classifier, benchmark_mapping);
criterion_main!(benches);
