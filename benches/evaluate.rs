use criterion::{black_box, Criterion, criterion_group, criterion_main};
use faer::Mat;
use kryst_monitor::config::{DivergenceOptions, StopOptions};
use kryst_monitor::solver::{CgSolver, LinearSolver};

fn bench_monitor(c: &mut Criterion) {
    let n = 10_000;
    let b: Vec<f64> = (0..n).map(|i| (i as f64).cos()).collect();
    let x: Vec<f64> = (0..n).map(|i| (i as f64).sin()).collect();
    let r: Vec<f64> = b.iter().map(|v| v * 1e-3).collect();

    let opts = StopOptions {
        divergence: Some(DivergenceOptions::default()),
        ..StopOptions::default()
    };
    let mut monitor = opts.build::<f64>().unwrap();

    c.bench_function("evaluate 4 criteria, n = 10000", |ben| {
        ben.iter(|| {
            monitor.reset_to_precalculation_state();
            let _status = monitor.evaluate(black_box(1), black_box(&x), black_box(&b), black_box(&r)).unwrap();
        })
    });

    let m = 200;
    let a = Mat::from_fn(m, m, |i, j| if i == j { 4.0 } else if i.abs_diff(j) == 1 { -1.0 } else { 0.0 });
    let rhs: Vec<f64> = (0..m).map(|i| (i as f64).cos()).collect();
    c.bench_function("monitored CG, n = 200", |ben| {
        let mut solver = CgSolver::new(1e-8, 1000).unwrap();
        ben.iter(|| {
            let mut y = vec![0.0; m];
            let _stats = solver.solve(black_box(&a), black_box(&rhs), &mut y).unwrap();
        })
    });
}

criterion_group!(benches, bench_monitor);
criterion_main!(benches);
