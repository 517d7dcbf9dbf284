//! Criterion benchmarks for the transform hot paths.
//!
//! 1. Percentage change over a long monthly series
//! 2. Rebasing
//! 3. Real wage (nearest join + deflate + YoY)
//! 4. Summary assembly (outer + left joins)

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use econtrends_core::domain::TidySeries;
use econtrends_core::transform::{
    compute_pct_change, compute_real_wage, rebase_index, SummaryTable, YOY_PERIODS,
};

fn make_monthly(n: usize, phase: f64) -> TidySeries {
    TidySeries::from_pairs((0..n).map(|i| {
        let year = 1900 + (i / 12) as i32;
        let month = (i % 12) as u32 + 1;
        let value = 100.0 + ((i as f64) * 0.1 + phase).sin() * 10.0 + i as f64;
        (NaiveDate::from_ymd_opt(year, month, 1).unwrap(), value)
    }))
}

fn bench_transforms(c: &mut Criterion) {
    let mut group = c.benchmark_group("transforms");
    for n in [120usize, 1_200] {
        let wages = make_monthly(n, 0.0);
        let prices = make_monthly(n, 1.0);

        group.bench_with_input(BenchmarkId::new("pct_change", n), &wages, |b, s| {
            b.iter(|| compute_pct_change(black_box(s), YOY_PERIODS))
        });
        group.bench_with_input(BenchmarkId::new("rebase", n), &wages, |b, s| {
            b.iter(|| rebase_index(black_box(s), None))
        });
        group.bench_with_input(
            BenchmarkId::new("real_wage", n),
            &(wages.clone(), prices.clone()),
            |b, (w, p)| b.iter(|| compute_real_wage(black_box(w), black_box(p))),
        );
    }
    group.finish();
}

fn bench_summary(c: &mut Criterion) {
    let series: Vec<TidySeries> = (0..4).map(|k| make_monthly(600, k as f64)).collect();
    let col = |s: &TidySeries| s.iter().map(|o| (o.date, Some(o.value))).collect::<Vec<_>>();

    c.bench_function("summary_merge_600x11", |b| {
        b.iter(|| {
            let mut t = SummaryTable::from_column("c0", col(&series[0]));
            for (k, s) in series.iter().enumerate().skip(1) {
                t = t.outer_join(format!("c{k}"), col(s)).unwrap();
            }
            for k in 0..7 {
                t = t.left_join(format!("d{k}"), col(&series[k % 4])).unwrap();
            }
            black_box(t)
        })
    });
}

criterion_group!(benches, bench_transforms, bench_summary);
criterion_main!(benches);
